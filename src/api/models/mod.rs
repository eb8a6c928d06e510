//! API request/response models.

pub mod action_logs;
pub mod auth;
pub mod categories;
pub mod pagination;
pub mod questions;
pub mod users;

use serde::Serialize;
use utoipa::ToSchema;

/// Plain confirmation body used by delete endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
