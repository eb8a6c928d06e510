//! Database models for questions.

use crate::types::{CategoryId, QuestionId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct QuestionCreateDBRequest {
    pub question: String,
    pub answer: String,
    pub category_id: Option<CategoryId>,
}

/// Full-row update: the handler validates and supplies every field.
#[derive(Debug, Clone)]
pub struct QuestionUpdateDBRequest {
    pub question: String,
    pub answer: String,
    pub category_id: Option<CategoryId>,
}

#[derive(Debug, Clone)]
pub struct QuestionDBResponse {
    pub id: QuestionId,
    pub question: String,
    pub answer: String,
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Export row: question joined with its category name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QuestionExportDBRow {
    pub id: QuestionId,
    pub question: String,
    pub answer: String,
    pub category_name: Option<String>,
    pub created_at: DateTime<Utc>,
}
