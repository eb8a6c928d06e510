//! Database repository for questions.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::questions::{QuestionCreateDBRequest, QuestionDBResponse, QuestionExportDBRow, QuestionUpdateDBRequest},
};
use crate::types::{CategoryId, QuestionId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing questions
#[derive(Debug, Clone)]
pub struct QuestionFilter {
    pub skip: i64,
    pub limit: i64,
    pub category_id: Option<CategoryId>,
}

impl QuestionFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            category_id: None,
        }
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Question {
    pub id: QuestionId,
    pub question: String,
    pub answer: String,
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Question> for QuestionDBResponse {
    fn from(question: Question) -> Self {
        Self {
            id: question.id,
            question: question.question,
            answer: question.answer,
            category_id: question.category_id,
            created_at: question.created_at,
            updated_at: question.updated_at,
        }
    }
}

pub struct Questions<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Questions<'c> {
    type CreateRequest = QuestionCreateDBRequest;
    type UpdateRequest = QuestionUpdateDBRequest;
    type Response = QuestionDBResponse;
    type Id = QuestionId;

    #[instrument(skip(self, request), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let question = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (id, question, answer, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.question)
        .bind(&request.answer)
        .bind(request.category_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(QuestionDBResponse::from(question))
    }

    #[instrument(skip(self), fields(question_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let question = sqlx::query_as::<_, Question>("SELECT * FROM questions WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(question.map(QuestionDBResponse::from))
    }

    #[instrument(skip(self, request), fields(question_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let question = sqlx::query_as::<_, Question>(
            r#"
            UPDATE questions SET
                question = $2,
                answer = $3,
                category_id = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.question)
        .bind(&request.answer)
        .bind(request.category_id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(QuestionDBResponse::from(question))
    }

    #[instrument(skip(self), fields(question_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }
}

impl<'c> Questions<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Find a question holding `question` text, optionally ignoring one row
    /// (the pre-write uniqueness check; `exclude` is the row being updated).
    #[instrument(skip(self, question), err)]
    pub async fn find_by_text(&mut self, question: &str, exclude: Option<QuestionId>) -> Result<Option<QuestionDBResponse>> {
        let row = match exclude {
            Some(id) => {
                sqlx::query_as::<_, Question>("SELECT * FROM questions WHERE question = $1 AND id != $2")
                    .bind(question)
                    .bind(id)
                    .fetch_optional(&mut *self.db)
                    .await?
            }
            None => {
                sqlx::query_as::<_, Question>("SELECT * FROM questions WHERE question = $1")
                    .bind(question)
                    .fetch_optional(&mut *self.db)
                    .await?
            }
        };

        Ok(row.map(QuestionDBResponse::from))
    }

    /// One page of questions under canonical order (created_at descending).
    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    pub async fn list(&mut self, filter: &QuestionFilter) -> Result<Vec<QuestionDBResponse>> {
        let questions = match filter.category_id {
            Some(category_id) => {
                sqlx::query_as::<_, Question>(
                    "SELECT * FROM questions WHERE category_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
                )
                .bind(category_id)
                .bind(filter.limit)
                .bind(filter.skip)
                .fetch_all(&mut *self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, Question>("SELECT * FROM questions ORDER BY created_at DESC LIMIT $1 OFFSET $2")
                    .bind(filter.limit)
                    .bind(filter.skip)
                    .fetch_all(&mut *self.db)
                    .await?
            }
        };

        Ok(questions.into_iter().map(QuestionDBResponse::from).collect())
    }

    /// Total count over the same predicate as [`list`](Self::list).
    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &QuestionFilter) -> Result<i64> {
        let count = match filter.category_id {
            Some(category_id) => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions WHERE category_id = $1")
                    .bind(category_id)
                    .fetch_one(&mut *self.db)
                    .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions")
                    .fetch_one(&mut *self.db)
                    .await?
            }
        };

        Ok(count)
    }

    /// All questions in a category, newest first (unpaginated).
    #[instrument(skip(self), fields(category_id = %abbrev_uuid(&category_id)), err)]
    pub async fn list_by_category(&mut self, category_id: CategoryId) -> Result<Vec<QuestionDBResponse>> {
        let questions = sqlx::query_as::<_, Question>("SELECT * FROM questions WHERE category_id = $1 ORDER BY created_at DESC")
            .bind(category_id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(questions.into_iter().map(QuestionDBResponse::from).collect())
    }

    /// Delete every question in a category, returning how many went.
    #[instrument(skip(self), fields(category_id = %abbrev_uuid(&category_id)), err)]
    pub async fn delete_by_category(&mut self, category_id: CategoryId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM questions WHERE category_id = $1")
            .bind(category_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected())
    }

    /// Full result set for CSV export: questions joined with their category
    /// name, newest first.
    #[instrument(skip(self), err)]
    pub async fn list_all_for_export(&mut self) -> Result<Vec<QuestionExportDBRow>> {
        let rows = sqlx::query_as::<_, QuestionExportDBRow>(
            r#"
            SELECT q.id, q.question, q.answer, c.name AS category_name, q.created_at
            FROM questions q
            LEFT JOIN categories c ON q.category_id = c.id
            ORDER BY q.created_at DESC
            "#,
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows)
    }
}
