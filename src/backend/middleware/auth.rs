/**
 * Authentication Middleware
 *
 * This module provides middleware for protecting routes that require
 * user authentication. It extracts the bearer token from the
 * Authorization header, verifies it as an access token, loads the caller
 * from the user store and attaches an `AuthenticatedUser` to the request.
 *
 * The role attached to the request is the one currently stored, not the
 * one in the token, so a role change takes effect on the next request.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::backend::auth::sessions::TokenType;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::Role;

/// Caller identity resolved by `auth_middleware`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
    pub role: Role,
}

/// Pull the token out of `Authorization: Bearer <token>`
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, BackendError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Missing Authorization header");
            BackendError::invalid_token("missing bearer token")
        })?;

    match header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => {
            tracing::warn!("Invalid Authorization header format");
            Err(BackendError::invalid_token("expected a bearer token"))
        }
    }
}

/// Authentication middleware
///
/// This middleware:
/// 1. Extracts the bearer token from the Authorization header
/// 2. Verifies it as an access token
/// 3. Loads the user the token names
/// 4. Attaches an `AuthenticatedUser` to request extensions
///
/// Returns 401 if the token is missing, invalid, expired, or names a user
/// that no longer exists.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = bearer_token(request.headers())?;
    let claims = state.tokens.verify(token, TokenType::Access)?;

    let user = state.users.user_by_id(claims.sub).await?.ok_or_else(|| {
        tracing::warn!("Token names unknown user {}", claims.sub);
        BackendError::invalid_token("user no longer exists")
    })?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: user.id,
        email: user.email,
        username: user.username,
        role: user.role,
    });

    Ok(next.run(request).await)
}

/// Axum extractor for authenticated user
///
/// Only usable behind `auth_middleware`; elsewhere it rejects with 401.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("AuthenticatedUser not found in request extensions");
                BackendError::invalid_token("not authenticated")
            })?;

        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token(&headers("bearer abc")).unwrap(), "abc");
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        assert_matches!(
            bearer_token(&headers("Basic dXNlcjpwYXNz")),
            Err(BackendError::InvalidToken { .. })
        );
        assert_matches!(bearer_token(&headers("Bearer ")), Err(BackendError::InvalidToken { .. }));
        assert_matches!(bearer_token(&HeaderMap::new()), Err(BackendError::InvalidToken { .. }));
    }

    #[tokio::test]
    async fn test_extractor_requires_middleware() {
        let request = axum::http::Request::builder()
            .uri("http://example.com")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        let result = AuthUser::from_request_parts(&mut parts, &()).await;
        assert_matches!(result, Err(BackendError::InvalidToken { .. }));
    }

    #[tokio::test]
    async fn test_extractor_reads_extension() {
        let user = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            username: "ann".to_string(),
            role: Role::Moderator,
        };
        let mut request = axum::http::Request::builder()
            .uri("http://example.com")
            .body(())
            .unwrap();
        request.extensions_mut().insert(user.clone());
        let (mut parts, _) = request.into_parts();

        let AuthUser(extracted) = AuthUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted, user);
    }
}
