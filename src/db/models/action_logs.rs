//! Database models for the audit trail.

use crate::types::{ActionLogId, UserId};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Database request for appending an audit entry
#[derive(Debug, Clone)]
pub struct ActionLogCreateDBRequest {
    pub user_id: UserId,
    pub action_type: String,
    pub description: String,
    pub entity_id: Option<Uuid>,
    pub entity_type: String,
}

/// Audit entry joined with the acting user's name for display.
///
/// `username` is None when the user has since been deleted.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActionLogDBResponse {
    pub id: ActionLogId,
    pub user_id: Option<UserId>,
    pub username: Option<String>,
    pub action_type: String,
    pub description: String,
    pub entity_id: Option<Uuid>,
    pub entity_type: String,
    pub created_at: DateTime<Utc>,
}
