/**
 * API Route Configuration
 *
 * One function per resource, each returning a router meant to be nested
 * under its prefix. Protected routes sit behind `auth_middleware` via
 * `route_layer`, so an unknown path still answers 404 rather than 401.
 *
 * # Routes
 *
 * ## `/api/auth`
 * - `POST /signup`, `POST /login` - public
 * - `GET /refresh_token` - public; the refresh token is the bearer
 * - `GET /confirmed_email/{token}`, `POST /request_email` - public
 * - `POST /request_password_reset`, `POST /reset_password` - public
 * - `POST /logout` - authenticated
 *
 * ## `/api/images` (authenticated)
 * - `POST /upload_image`, `GET /`
 * - `GET /{id}`, `PATCH /{id}`, `DELETE /{id}`
 * - `POST /{id}/tags`, `DELETE /{id}/tags/{name}`
 *
 * ## `/api/comments`
 * - `GET /all/{id}` - public
 * - `POST /{id}`, `PATCH /{id}`, `DELETE /{id}` - authenticated
 *
 * ## `/api/users` (authenticated)
 * - `GET /me`, `PATCH /avatar`, `GET /profile/{username}`, `PATCH /role/{user_id}`
 *
 * ## `/api/transform` (authenticated)
 * - `POST /create_transform/{photo_id}`, `GET /user_transforms`
 * - `GET /{id}`, `PATCH /{id}`, `DELETE /{id}`
 */

use axum::{
    extract::State,
    middleware::from_fn_with_state,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use serde_json::{json, Value};

use crate::backend::auth::handlers::{
    confirmed_email, login, logout, refresh_token, request_email, request_password_reset,
    reset_password, signup,
};
use crate::backend::comments::{create_comment, delete_comment, list_comments, update_comment};
use crate::backend::error::BackendError;
use crate::backend::middleware::auth_middleware;
use crate::backend::photos::{
    add_tag, delete_image, get_image, list_images, remove_tag, update_image, upload_image,
};
use crate::backend::server::state::AppState;
use crate::backend::transforms::{
    create_transform, delete_transform, get_transform, update_transform, user_transforms,
};
use crate::backend::users::{change_role, get_me, get_profile, update_avatar};

/// Routes nested under `/api/auth`
pub fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/logout", post(logout))
        .route_layer(from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/refresh_token", get(refresh_token))
        .route("/confirmed_email/{token}", get(confirmed_email))
        .route("/request_email", post(request_email))
        .route("/request_password_reset", post(request_password_reset))
        .route("/reset_password", post(reset_password))
        .merge(protected)
}

/// Routes nested under `/api/images`
pub fn image_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_images))
        .route("/upload_image", post(upload_image))
        .route("/{id}", get(get_image).patch(update_image).delete(delete_image))
        .route("/{id}/tags", post(add_tag))
        .route("/{id}/tags/{name}", axum::routing::delete(remove_tag))
        .route_layer(from_fn_with_state(state, auth_middleware))
}

/// Routes nested under `/api/comments`
pub fn comment_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route(
            "/{id}",
            post(create_comment).patch(update_comment).delete(delete_comment),
        )
        .route_layer(from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/all/{id}", get(list_comments))
        .merge(protected)
}

/// Routes nested under `/api/users`
pub fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/avatar", patch(update_avatar))
        .route("/profile/{username}", get(get_profile))
        .route("/role/{user_id}", patch(change_role))
        .route_layer(from_fn_with_state(state, auth_middleware))
}

/// Routes nested under `/api/transform`
pub fn transform_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/create_transform/{photo_id}", post(create_transform))
        .route("/user_transforms", get(user_transforms))
        .route(
            "/{id}",
            get(get_transform).patch(update_transform).delete(delete_transform),
        )
        .route_layer(from_fn_with_state(state, auth_middleware))
}

/// Health check: succeeds only if the store answers
pub async fn healthchecker(State(state): State<AppState>) -> Result<Json<Value>, BackendError> {
    state.users.ping().await.map_err(|e| {
        tracing::error!("Health check failed: {}", e);
        BackendError::internal("store is not reachable")
    })?;
    Ok(Json(json!({ "status": "ok", "message": "Welcome to ImageHub" })))
}
