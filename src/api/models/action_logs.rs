//! API response models for the audit trail.

use crate::db::models::action_logs::ActionLogDBResponse;
use crate::types::{ActionLogId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Acting user back-reference, kept as a nested object for display.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActionLogUser {
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionLogResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ActionLogId,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub user_id: Option<UserId>,
    pub action_type: String,
    pub description: String,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub entity_id: Option<Uuid>,
    pub entity_type: String,
    pub created_at: DateTime<Utc>,
    /// None when the acting user has since been deleted
    pub user: Option<ActionLogUser>,
}

impl From<ActionLogDBResponse> for ActionLogResponse {
    fn from(db: ActionLogDBResponse) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            action_type: db.action_type,
            description: db.description,
            entity_id: db.entity_id,
            entity_type: db.entity_type,
            created_at: db.created_at,
            user: db.username.map(|username| ActionLogUser { username }),
        }
    }
}
