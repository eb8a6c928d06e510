//! Action logging sink.
//!
//! Every mutating admin operation appends an audit entry through
//! [`record`]. The append is best-effort: a failure to write the log entry
//! must never roll back or block the mutation that triggered it, so errors
//! are reported to the operational log and swallowed.

use tracing::warn;
use uuid::Uuid;

use crate::{
    AppState,
    db::{handlers::ActionLogs, models::action_logs::ActionLogCreateDBRequest},
    types::UserId,
};

/// Append an audit entry, swallowing any failure.
pub async fn record(
    state: &AppState,
    user_id: UserId,
    action_type: &str,
    description: String,
    entity_id: Option<Uuid>,
    entity_type: &str,
) {
    let request = ActionLogCreateDBRequest {
        user_id,
        action_type: action_type.to_string(),
        description,
        entity_id,
        entity_type: entity_type.to_string(),
    };

    let result = async {
        let mut conn = state.db.acquire().await?;
        ActionLogs::new(&mut conn).record(&request).await.map_err(anyhow::Error::from)
    }
    .await;

    if let Err(e) = result {
        warn!(action_type, "Failed to record action log entry: {e:#}");
    }
}
