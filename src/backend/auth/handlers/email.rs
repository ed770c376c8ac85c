/**
 * Email Confirmation Handlers
 *
 * - `GET /api/auth/confirmed_email/{token}` - confirm the account the token names
 * - `POST /api/auth/request_email` - send another confirmation link
 *
 * Confirmation is idempotent: following a link for an account that is
 * already confirmed succeeds with a different message.
 */

use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::backend::auth::handlers::types::{EmailRequest, MessageResponse};
use crate::backend::auth::sessions::{Identity, TokenType};
use crate::backend::error::BackendError;
use crate::backend::mail::OutgoingMail;
use crate::backend::server::state::AppState;
use crate::backend::store::User;
use crate::shared::user::validate_email;

const CHECK_EMAIL: &str = "Check your email for confirmation.";
const ALREADY_CONFIRMED: &str = "Your email is already confirmed";

/// Issue an email-confirmation token for `user` and mail the link
pub(crate) async fn send_confirmation(state: &AppState, user: &User) -> Result<(), BackendError> {
    let identity = Identity {
        user_id: user.id,
        email: user.email.clone(),
        role: user.role,
    };
    let token = state.tokens.issue(&identity, TokenType::EmailConfirmation)?;
    let link = format!("{}/api/auth/confirmed_email/{}", state.public_url(), token);

    state
        .mailer
        .send(OutgoingMail::confirmation(&user.email, &user.username, &link))
        .await?;
    Ok(())
}

/// Confirm an account from the emailed link
///
/// # Errors
///
/// * `401 Unauthorized` - token expired, invalid, not a confirmation token,
///   or names an account that no longer exists
pub async fn confirmed_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, BackendError> {
    let claims = state.tokens.verify(&token, TokenType::EmailConfirmation)?;
    let user = state.users.user_by_id(claims.sub).await?.ok_or_else(|| {
        tracing::warn!("Confirmation token for unknown user {}", claims.sub);
        BackendError::invalid_token("user no longer exists")
    })?;

    if state.users.confirm_email(user.id).await? {
        tracing::info!("Email confirmed for {}", user.email);
        Ok(Json(MessageResponse::new("Email confirmed")))
    } else {
        tracing::debug!("Email already confirmed for {}", user.email);
        Ok(Json(MessageResponse::new(ALREADY_CONFIRMED)))
    }
}

/// Send another confirmation link
///
/// Unknown addresses get the same answer as a successful send.
pub async fn request_email(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, BackendError> {
    let email = request.email.trim().to_lowercase();
    validate_email(&email)?;

    match state.users.user_by_email(&email).await? {
        Some(user) if user.confirmed => Ok(Json(MessageResponse::new(ALREADY_CONFIRMED))),
        Some(user) => {
            send_confirmation(&state, &user).await?;
            tracing::info!("Confirmation email re-sent to {}", user.email);
            Ok(Json(MessageResponse::new(CHECK_EMAIL)))
        }
        None => {
            tracing::info!("Confirmation requested for unknown email {}", email);
            Ok(Json(MessageResponse::new(CHECK_EMAIL)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::handlers::signup::signup;
    use crate::backend::auth::handlers::types::SignupRequest;
    use crate::backend::test_support::fixture;
    use assert_matches::assert_matches;

    fn token_from(body: &str) -> String {
        body.split("/api/auth/confirmed_email/")
            .nth(1)
            .and_then(|rest| rest.split_whitespace().next())
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_confirm_is_idempotent() {
        let fx = fixture();
        signup(
            State(fx.state.clone()),
            Json(SignupRequest {
                username: "ann".to_string(),
                email: "ann@example.com".to_string(),
                password: "secret1".to_string(),
            }),
        )
        .await
        .unwrap();
        let token = token_from(&fx.outbox.last_to("ann@example.com").await.unwrap().body);

        let Json(first) = confirmed_email(State(fx.state.clone()), Path(token.clone()))
            .await
            .unwrap();
        assert_eq!(first.message, "Email confirmed");

        let Json(second) = confirmed_email(State(fx.state.clone()), Path(token)).await.unwrap();
        assert_eq!(second.message, ALREADY_CONFIRMED);

        let user = fx.state.users.user_by_email("ann@example.com").await.unwrap().unwrap();
        assert!(user.confirmed);
    }

    #[tokio::test]
    async fn test_access_token_cannot_confirm() {
        let fx = fixture();
        let user = fx.user("ann", crate::shared::Role::Regular).await;
        let access = fx
            .state
            .tokens
            .issue(
                &Identity {
                    user_id: user.id,
                    email: user.email.clone(),
                    role: user.role,
                },
                TokenType::Access,
            )
            .unwrap();

        let result = confirmed_email(State(fx.state.clone()), Path(access)).await;
        assert_matches!(result, Err(BackendError::InvalidToken { .. }));
    }

    #[tokio::test]
    async fn test_request_email_for_unknown_address() {
        let fx = fixture();
        let Json(response) = request_email(
            State(fx.state.clone()),
            Json(EmailRequest {
                email: "nobody@example.com".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.message, CHECK_EMAIL);
        assert!(fx.outbox.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_request_email_for_confirmed_account() {
        let fx = fixture();
        fx.user("ann", crate::shared::Role::Regular).await;
        let Json(response) = request_email(
            State(fx.state.clone()),
            Json(EmailRequest {
                email: "ann@example.com".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.message, ALREADY_CONFIRMED);
    }
}
