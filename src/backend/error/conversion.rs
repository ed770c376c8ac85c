/**
 * Error Conversion
 *
 * `BackendError` implements `IntoResponse`, so handlers return it directly.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "error": "Token has expired",
 *   "code": "token_expired",
 *   "status": 401
 * }
 * ```
 *
 * 401 responses also carry `WWW-Authenticate: Bearer`.
 */

use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Json, Response},
};

use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(code = self.code(), "Request failed: {}", self);
        } else {
            tracing::debug!(code = self.code(), "Request rejected: {}", self);
        }

        let body = serde_json::json!({
            "error": self.message(),
            "code": self.code(),
            "status": status.as_u16(),
        });

        let mut response = (status, Json(body)).into_response();
        if self.is_unauthorized() {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::StatusCode;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_json_body() {
        let response = BackendError::not_found("photo").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());

        let body = body_json(response).await;
        assert_eq!(body["error"], "photo not found");
        assert_eq!(body["code"], "not_found");
        assert_eq!(body["status"], 404);
    }

    #[tokio::test]
    async fn test_unauthorized_sets_challenge() {
        let response = BackendError::ExpiredToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
        let body = body_json(response).await;
        assert_eq!(body["code"], "token_expired");
    }
}
