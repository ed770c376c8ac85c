//! Common test utilities and helpers
//!
//! `TestApp` wraps the full router over the in-memory store, the outbox
//! mailer and the in-process image host, and drives it with
//! `tower::ServiceExt::oneshot`. Account helpers go through the real
//! signup, confirmation and login endpoints.

#![allow(dead_code)]

#[macro_use]
pub mod assertions;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use imagehub::backend::mail::OutboxMailer;
use imagehub::backend::media::MemoryImageHost;
use imagehub::backend::routes::create_router;
use imagehub::backend::server::state::AppState;
use imagehub::backend::store::MemoryStore;
use imagehub::shared::{AppConfig, Role};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "password1";

const BOUNDARY: &str = "imagehub-test-boundary";

pub fn test_config() -> AppConfig {
    AppConfig::builder()
        .jwt_secret(TEST_SECRET)
        .bcrypt_cost(4)
        .build()
        .expect("test config")
}

/// An account created through the API
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// One part of a multipart body
pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn image(data: &'a [u8]) -> Self {
        Self {
            name: "file",
            file_name: Some("photo.png"),
            content_type: Some("image/png"),
            data,
        }
    }

    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            file_name: None,
            content_type: None,
            data: value.as_bytes(),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub outbox: OutboxMailer,
    pub images: MemoryImageHost,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let outbox = OutboxMailer::new();
        let images = MemoryImageHost::new();
        let state = AppState::new(
            config,
            MemoryStore::new(),
            Arc::new(images.clone()),
            Arc::new(outbox.clone()),
        )
        .expect("test state");

        Self {
            router: create_router(state.clone()),
            state,
            outbox,
            images,
        }
    }

    /// Send a request with an optional bearer token and JSON body
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Send a `multipart/form-data` request
    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        token: &str,
        parts: &[Part<'_>],
    ) -> (StatusCode, Value) {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
            if let Some(file_name) = part.file_name {
                disposition.push_str(&format!("; filename=\"{}\"", file_name));
            }
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(b"\r\n");
            if let Some(content_type) = part.content_type {
                body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
            }
            body.extend_from_slice(b"\r\n");
            body.extend_from_slice(part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .expect("request");

        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        // Extractor rejections from axum itself are plain text
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    /// Sign up without confirming; returns the response body
    pub async fn signup(&self, username: &str) -> (StatusCode, Value) {
        self.post(
            "/api/auth/signup",
            None,
            json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": PASSWORD,
            }),
        )
        .await
    }

    /// Token from the latest confirmation email sent to `email`
    pub async fn confirmation_token(&self, email: &str) -> String {
        let mail = self.outbox.last_to(email).await.expect("confirmation email");
        mail.body
            .split("/api/auth/confirmed_email/")
            .nth(1)
            .and_then(|rest| rest.split_whitespace().next())
            .expect("confirmation link")
            .to_string()
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.post(
            "/api/auth/login",
            None,
            json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Sign up, confirm and log in through the API
    ///
    /// The first account created in a `TestApp` is an admin.
    pub async fn user(&self, username: &str) -> TestUser {
        let (status, body) = self.signup(username).await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);
        let email = format!("{}@example.com", username);

        let token = self.confirmation_token(&email).await;
        let (status, body) = self
            .get(&format!("/api/auth/confirmed_email/{}", token), None)
            .await;
        assert_eq!(status, StatusCode::OK, "confirmation failed: {}", body);

        let (status, tokens) = self.login(&email, PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", tokens);

        TestUser {
            id: body_id(&self.get("/api/users/me", tokens["access_token"].as_str()).await.1),
            username: username.to_string(),
            email,
            access_token: tokens["access_token"].as_str().expect("access").to_string(),
            refresh_token: tokens["refresh_token"].as_str().expect("refresh").to_string(),
        }
    }

    /// Set a role directly in the store
    pub async fn set_role(&self, user: &TestUser, role: Role) {
        self.state.users.set_role(user.id, role).await.expect("set role");
    }

    /// Upload a small PNG and return the created photo
    pub async fn upload(&self, user: &TestUser, tags: Option<&str>) -> Value {
        let mut parts = vec![Part::image(b"\x89PNG\r\n\x1a\nfake")];
        if let Some(tags) = tags {
            parts.push(Part::text("tags", tags));
        }
        let (status, body) = self
            .multipart(Method::POST, "/api/images/upload_image", &user.access_token, &parts)
            .await;
        assert_eq!(status, StatusCode::CREATED, "upload failed: {}", body);
        body
    }
}

/// `id` field of a JSON object as a UUID
pub fn body_id(body: &Value) -> Uuid {
    body["id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(|| panic!("no id in {}", body))
}
