//! API request/response models for questions.

use super::pagination::Pagination;
use crate::db::models::questions::QuestionDBResponse;
use crate::types::{CategoryId, QuestionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionCreate {
    pub question: String,
    pub answer: String,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub category_id: Option<CategoryId>,
}

/// Updates replace the whole row; the same validation as creation applies.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionUpdate {
    pub question: String,
    pub answer: String,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub category_id: Option<CategoryId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: QuestionId,
    pub question: String,
    pub answer: String,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<QuestionDBResponse> for QuestionResponse {
    fn from(db: QuestionDBResponse) -> Self {
        Self {
            id: db.id,
            question: db.question,
            answer: db.answer,
            category_id: db.category_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Query parameters for listing questions
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListQuestionsQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Restrict the listing to one category
    #[param(value_type = Option<String>, format = "uuid")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub category_id: Option<CategoryId>,
}
