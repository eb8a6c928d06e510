//! API request/response models for authentication.

use super::users::UserResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body for profile updates; omitting `password` keeps the current one.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileUpdateRequest {
    pub username: String,
    pub email: String,
    pub password: Option<String>,
}

/// Issued on successful registration and login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}
