//! Authentication Module
//!
//! This module handles registration, login, session tokens, email
//! confirmation, password reset and the role policy that every resource
//! handler consults.
//!
//! # Architecture
//!
//! - **`sessions`** - `TokenService`: JWT issue, verify and refresh
//! - **`password`** - bcrypt hashing on the blocking pool
//! - **`policy`** - role and ownership rules
//! - **`handlers`** - HTTP handlers for `/api/auth`
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── sessions.rs     - JWT token management
//! ├── password.rs     - Password hashing
//! ├── policy.rs       - Authorization rules
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Account Lifecycle
//!
//! 1. **Signup**: account created unconfirmed, confirmation link emailed
//! 2. **Confirm**: link verifies an `email_confirmation` token
//! 3. **Login**: password checked, access and refresh tokens issued, the
//!    refresh token stored on the user
//! 4. **Refresh**: the stored refresh token buys a new access token
//! 5. **Logout** or **password reset**: the stored refresh token is cleared
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - Access tokens are short-lived; refresh tokens are revocable
//! - Invalid credentials return 401 with no hint which part was wrong

/// JWT token generation and validation
pub mod sessions;

/// Password hashing
pub mod password;

/// Role and ownership rules
pub mod policy;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::types::{LoginRequest, SignupRequest, TokenResponse, UserResponse};
pub use policy::Policy;
pub use sessions::{Claims, Identity, TokenService, TokenType};
