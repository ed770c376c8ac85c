/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Layers
 *
 * - `DefaultBodyLimit` - caps request bodies (uploads included) at
 *   `server.max_upload_bytes`
 * - `TraceLayer` - one tracing span per request
 *
 * Unknown paths fall through to a JSON 404.
 */

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::backend::error::BackendError;
use crate::backend::routes::api_routes::{
    auth_routes, comment_routes, healthchecker, image_routes, transform_routes, user_routes,
};
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    let body_limit = app_state.config.server.max_upload_bytes;

    Router::new()
        .route("/api/healthchecker", get(healthchecker))
        .nest("/api/auth", auth_routes(app_state.clone()))
        .nest("/api/images", image_routes(app_state.clone()))
        .nest("/api/comments", comment_routes(app_state.clone()))
        .nest("/api/users", user_routes(app_state.clone()))
        .nest("/api/transform", transform_routes(app_state.clone()))
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn fallback() -> BackendError {
    BackendError::not_found("route")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::server::state::AppState;
    use crate::backend::test_support::config;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(AppState::in_memory(config()).unwrap())
    }

    #[tokio::test]
    async fn test_healthchecker() {
        let response = app()
            .oneshot(Request::get("/api/healthchecker").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let response = app()
            .oneshot(Request::get("/api/users/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()["www-authenticate"], "Bearer");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let response = app()
            .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
