/**
 * Session Management and JWT Tokens
 *
 * `TokenService` issues and verifies every token the API hands out:
 * short-lived access tokens, longer-lived refresh tokens, and the
 * single-purpose email-confirmation and password-reset tokens.
 *
 * # Verification Order
 *
 * 1. Structure (three segments, base64, JSON, required claims) - `MalformedToken`
 * 2. Algorithm and signature - `InvalidToken`
 * 3. Expiry, with zero leeway - `ExpiredToken`
 * 4. Token type - `InvalidToken`
 *
 * Expiry is checked before the type so an expired token always reports
 * `ExpiredToken`.
 */

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::shared::config::{AuthConfig, JwtAlgorithm};
use crate::shared::Role;

/// What a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
    EmailConfirmation,
    PasswordReset,
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    pub email: String,
    /// Role at the time of issue
    pub role: Role,
    pub token_type: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique token id, so two tokens issued in the same second differ
    pub jti: Uuid,
    /// Fingerprint of the password hash a reset token was issued against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pwd: Option<String>,
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.sub,
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Who a token is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Issues and verifies signed tokens
///
/// Built once at startup from `AuthConfig` and shared read-only.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
    access_ttl: i64,
    refresh_ttl: i64,
    email_ttl: i64,
    password_reset_ttl: i64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create the service
    ///
    /// # Errors
    ///
    /// `Configuration` if the secret is empty or the lifetimes are inconsistent.
    pub fn new(config: &AuthConfig) -> Result<Self, BackendError> {
        if config.jwt_secret.trim().is_empty() {
            return Err(BackendError::configuration("JWT secret is not set"));
        }
        if config.access_token_ttl_secs <= 0
            || config.refresh_token_ttl_secs <= config.access_token_ttl_secs
        {
            return Err(BackendError::configuration(
                "refresh token lifetime must exceed access token lifetime",
            ));
        }

        let algorithm = match config.jwt_algorithm {
            JwtAlgorithm::HS256 => Algorithm::HS256,
            JwtAlgorithm::HS512 => Algorithm::HS512,
        };

        let mut validation = Validation::new(algorithm);
        // Expiry is checked by hand so it can be ordered before the type check
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            algorithm,
            validation,
            access_ttl: config.access_token_ttl_secs,
            refresh_ttl: config.refresh_token_ttl_secs,
            email_ttl: config.email_token_ttl_secs,
            password_reset_ttl: config.password_reset_ttl_secs,
        })
    }

    /// Lifetime in seconds for tokens of `token_type`
    pub fn lifetime(&self, token_type: TokenType) -> i64 {
        match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
            TokenType::EmailConfirmation => self.email_ttl,
            TokenType::PasswordReset => self.password_reset_ttl,
        }
    }

    /// Issue a token of `token_type` for `identity`, valid from now
    pub fn issue(&self, identity: &Identity, token_type: TokenType) -> Result<String, BackendError> {
        self.issue_at(identity, token_type, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(
        &self,
        identity: &Identity,
        token_type: TokenType,
        now: i64,
    ) -> Result<String, BackendError> {
        let claims = Claims {
            sub: identity.user_id,
            email: identity.email.clone(),
            role: identity.role,
            token_type,
            iat: now,
            exp: now + self.lifetime(token_type),
            jti: Uuid::new_v4(),
            pwd: None,
        };
        self.sign(&claims)
    }

    /// Issue a password-reset token bound to the user's current password
    ///
    /// Once the password changes the fingerprint no longer matches, so
    /// the token is good for one reset at most.
    pub fn issue_password_reset(
        &self,
        identity: &Identity,
        password_hash: &str,
    ) -> Result<String, BackendError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: identity.user_id,
            email: identity.email.clone(),
            role: identity.role,
            token_type: TokenType::PasswordReset,
            iat: now,
            exp: now + self.password_reset_ttl,
            jti: Uuid::new_v4(),
            pwd: Some(password_fingerprint(password_hash)),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, BackendError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign token: {:?}", e);
            BackendError::internal("failed to sign token")
        })
    }

    /// Verify `token` and require it to be of type `expected`
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, BackendError> {
        self.verify_at(token, expected, Utc::now().timestamp())
    }

    /// Verify `token` as if the current time were `now`
    pub fn verify_at(
        &self,
        token: &str,
        expected: TokenType,
        now: i64,
    ) -> Result<Claims, BackendError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(map_decode_error)?;
        let claims = data.claims;

        if now >= claims.exp {
            return Err(BackendError::ExpiredToken);
        }
        if claims.token_type != expected {
            tracing::warn!(
                "Token type mismatch: expected {:?}, got {:?}",
                expected,
                claims.token_type
            );
            return Err(BackendError::invalid_token("wrong token type"));
        }

        Ok(claims)
    }

    /// Issue a new access token from verified refresh-token claims
    ///
    /// The role comes from the caller, so a role change since login is
    /// reflected in the new access token.
    pub fn refresh(&self, refresh_claims: &Claims, current_role: Role) -> Result<String, BackendError> {
        if refresh_claims.token_type != TokenType::Refresh {
            return Err(BackendError::invalid_token("not a refresh token"));
        }
        let identity = Identity {
            role: current_role,
            ..refresh_claims.identity()
        };
        self.issue(&identity, TokenType::Access)
    }
}

/// Hex SHA-256 of a stored password hash
///
/// The hash itself never goes into a token.
pub fn password_fingerprint(password_hash: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password_hash.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn map_decode_error(err: jsonwebtoken::errors::Error) -> BackendError {
    match err.kind() {
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::MissingRequiredClaim(_) => {
            tracing::debug!("Malformed token: {}", err);
            BackendError::MalformedToken
        }
        ErrorKind::ExpiredSignature => BackendError::ExpiredToken,
        _ => {
            tracing::warn!("Token rejected: {}", err);
            BackendError::invalid_token(err.to_string())
        }
    }
}
