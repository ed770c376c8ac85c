//! In-process fixtures for handler unit tests

use std::sync::Arc;

use crate::backend::auth::password::hash_password;
use crate::backend::mail::OutboxMailer;
use crate::backend::media::MemoryImageHost;
use crate::backend::middleware::AuthenticatedUser;
use crate::backend::server::state::AppState;
use crate::backend::store::{MemoryStore, NewUser, User};
use crate::shared::{AppConfig, Role};

pub struct Fixture {
    pub state: AppState,
    pub outbox: OutboxMailer,
    pub images: MemoryImageHost,
}

pub fn config() -> AppConfig {
    AppConfig::builder()
        .jwt_secret("unit-test-secret")
        .bcrypt_cost(4)
        .build()
        .expect("test config")
}

pub fn fixture() -> Fixture {
    let outbox = OutboxMailer::new();
    let images = MemoryImageHost::new();
    let state = AppState::new(
        config(),
        MemoryStore::new(),
        Arc::new(images.clone()),
        Arc::new(outbox.clone()),
    )
    .expect("test state");
    Fixture {
        state,
        outbox,
        images,
    }
}

impl Fixture {
    /// Insert a confirmed user straight into the store
    pub async fn user(&self, username: &str, role: Role) -> User {
        let password_hash = hash_password("password1", 4).await.expect("hash");
        let user = self
            .state
            .users
            .create_user(NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash,
                role,
                avatar_url: None,
            })
            .await
            .expect("create user");
        self.state.users.confirm_email(user.id).await.expect("confirm");
        self.state
            .users
            .user_by_id(user.id)
            .await
            .expect("lookup")
            .expect("user exists")
    }
}

pub fn caller(user: &User) -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: user.id,
        email: user.email.clone(),
        username: user.username.clone(),
        role: user.role,
    }
}
