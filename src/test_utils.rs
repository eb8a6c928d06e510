//! Shared helpers for integration tests.

use axum_test::TestServer;
use sqlx::PgPool;

use crate::{
    AppState,
    api::models::users::Role,
    auth::{password, session},
    config::Config,
    db::{
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserDBResponse},
    },
};

/// Password used for every test account.
pub const TEST_PASSWORD: &str = "testpassword123";

pub fn create_test_config() -> Config {
    Config {
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        ..Default::default()
    }
}

pub fn create_test_state(pool: PgPool) -> AppState {
    AppState::builder().db(pool).config(create_test_config()).build()
}

pub fn create_test_server(pool: PgPool) -> TestServer {
    let router = crate::build_router(create_test_state(pool)).expect("Failed to build router");
    TestServer::new(router).expect("Failed to create test server")
}

/// Insert a user with [`TEST_PASSWORD`] and the given role.
pub async fn create_test_user(pool: &PgPool, role: Role) -> UserDBResponse {
    let tag = crate::types::abbrev_uuid(&uuid::Uuid::new_v4());
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut repo = Users::new(&mut conn);

    repo.create(&UserCreateDBRequest {
        username: format!("user-{tag}"),
        email: format!("user-{tag}@example.com"),
        password_hash: password::hash_password(TEST_PASSWORD).expect("Failed to hash password"),
        role,
    })
    .await
    .expect("Failed to create test user")
}

/// Insert a user and mint a bearer token for it.
pub async fn create_test_user_with_token(pool: &PgPool, role: Role) -> (UserDBResponse, String) {
    let user = create_test_user(pool, role).await;
    let token = session::create_session_token(user.id, user.role, &create_test_config()).expect("Failed to create token");
    (user, token)
}

/// Value for the `Authorization` header.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
