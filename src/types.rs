//! Common type definitions.
//!
//! All entity IDs are UUIDs wrapped in type aliases:
//!
//! - [`UserId`]: user account identifier
//! - [`CategoryId`]: knowledge base category identifier
//! - [`QuestionId`]: question identifier
//! - [`ActionLogId`]: audit log entry identifier

use uuid::Uuid;

pub type UserId = Uuid;
pub type CategoryId = Uuid;
pub type QuestionId = Uuid;
pub type ActionLogId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
