//! Authentication Handlers Module
//!
//! This module contains all HTTP handlers for authentication endpoints.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs            - Module exports and documentation
//! ├── types.rs          - Request and response types
//! ├── signup.rs         - User registration
//! ├── login.rs          - Credential check and token issue
//! ├── session.rs        - Refresh and logout
//! ├── email.rs          - Email confirmation and re-send
//! └── password_reset.rs - Password reset request and completion
//! ```
//!
//! # Handlers
//!
//! - **`signup`** - POST /api/auth/signup
//! - **`login`** - POST /api/auth/login
//! - **`refresh_token`** - GET /api/auth/refresh_token
//! - **`logout`** - POST /api/auth/logout (authenticated)
//! - **`confirmed_email`** - GET /api/auth/confirmed_email/{token}
//! - **`request_email`** - POST /api/auth/request_email
//! - **`request_password_reset`** - POST /api/auth/request_password_reset
//! - **`reset_password`** - POST /api/auth/reset_password

/// Request and response types
pub mod types;

/// Signup handler
pub mod signup;

/// Login handler
pub mod login;

/// Refresh and logout handlers
pub mod session;

/// Email confirmation handlers
pub mod email;

/// Password reset handlers
pub mod password_reset;

pub use types::{
    EmailRequest, LoginRequest, MessageResponse, ResetPasswordRequest, SignupRequest,
    TokenResponse, UserResponse,
};

pub use email::{confirmed_email, request_email};
pub use login::login;
pub use password_reset::{request_password_reset, reset_password};
pub use session::{logout, refresh_token};
pub use signup::signup;
