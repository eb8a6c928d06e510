//! Database repository for categories.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::categories::{CategoryCreateDBRequest, CategoryDBResponse, CategoryUpdateDBRequest},
};
use crate::types::{CategoryId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{Connection, FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryDBResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

pub struct Categories<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Categories<'c> {
    type CreateRequest = CategoryCreateDBRequest;
    type UpdateRequest = CategoryUpdateDBRequest;
    type Response = CategoryDBResponse;
    type Id = CategoryId;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, name, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.description)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(CategoryDBResponse::from(category))
    }

    #[instrument(skip(self), fields(category_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(category.map(CategoryDBResponse::from))
    }

    #[instrument(skip(self, request), fields(category_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // Atomic update with conditional field updates
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.description)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(CategoryDBResponse::from(category))
    }

    /// Cascade delete: dependent questions and the category row go in one
    /// transaction, so no orphaned questions can survive a completed delete.
    #[instrument(skip(self), fields(category_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM questions WHERE category_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM categories WHERE id = $1").bind(id).execute(&mut *tx).await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}

impl<'c> Categories<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// All categories in canonical order (name ascending).
    #[instrument(skip(self), err)]
    pub async fn list_all(&mut self) -> Result<Vec<CategoryDBResponse>> {
        let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(categories.into_iter().map(CategoryDBResponse::from).collect())
    }

    /// Find a category holding `name`, optionally ignoring one row (the
    /// pre-write uniqueness check; `exclude` is the row being updated).
    #[instrument(skip(self, name), err)]
    pub async fn find_by_name(&mut self, name: &str, exclude: Option<CategoryId>) -> Result<Option<CategoryDBResponse>> {
        let category = match exclude {
            Some(id) => {
                sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE name = $1 AND id != $2")
                    .bind(name)
                    .bind(id)
                    .fetch_optional(&mut *self.db)
                    .await?
            }
            None => {
                sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE name = $1")
                    .bind(name)
                    .fetch_optional(&mut *self.db)
                    .await?
            }
        };

        Ok(category.map(CategoryDBResponse::from))
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::Repository;
    use super::*;
    use crate::db::{
        handlers::Questions,
        models::questions::QuestionCreateDBRequest,
    };
    use sqlx::PgPool;

    fn create_request(name: &str) -> CategoryCreateDBRequest {
        CategoryCreateDBRequest {
            name: name.to_string(),
            description: Some(format!("Вопросы по теме {name}")),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_get(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Categories::new(&mut conn);

        let created = repo.create(&create_request("Кардиология")).await.unwrap();
        assert_eq!(created.name, "Кардиология");

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.description, created.description);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_name_is_a_unique_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Categories::new(&mut conn);

        repo.create(&create_request("Неврология")).await.unwrap();
        let err = repo.create(&create_request("Неврология")).await.unwrap_err();

        match err {
            DbError::UniqueViolation { table, .. } => assert_eq!(table.as_deref(), Some("categories")),
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_all_is_name_ascending(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Categories::new(&mut conn);

        for name in ["Хирургия", "Кардиология", "Неврология"] {
            repo.create(&create_request(name)).await.unwrap();
        }

        let names: Vec<String> = repo.list_all().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Кардиология", "Неврология", "Хирургия"]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_find_by_name_excluding(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Categories::new(&mut conn);

        let category = repo.create(&create_request("Терапия")).await.unwrap();

        assert!(repo.find_by_name("Терапия", None).await.unwrap().is_some());
        // The row being updated does not conflict with itself
        assert!(repo.find_by_name("Терапия", Some(category.id)).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Categories::new(&mut conn);

        let category = repo.create(&create_request("Старое имя")).await.unwrap();
        let updated = repo
            .update(
                category.id,
                &CategoryUpdateDBRequest {
                    name: Some("Новое имя".to_string()),
                    description: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Новое имя");
        // Description untouched
        assert_eq!(updated.description, category.description);

        let err = repo.update(Uuid::new_v4(), &CategoryUpdateDBRequest::default()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_cascade_delete_removes_questions(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();

        let category = {
            let mut repo = Categories::new(&mut conn);
            repo.create(&create_request("Кардиология")).await.unwrap()
        };

        let question = {
            let mut questions = Questions::new(&mut conn);
            questions
                .create(&QuestionCreateDBRequest {
                    question: "Что такое аритмия?".to_string(),
                    answer: "Нарушение ритма сердца.".to_string(),
                    category_id: Some(category.id),
                })
                .await
                .unwrap()
        };

        let mut repo = Categories::new(&mut conn);
        assert!(repo.delete(category.id).await.unwrap());
        assert!(repo.get_by_id(category.id).await.unwrap().is_none());

        let mut questions = Questions::new(&mut conn);
        assert!(questions.get_by_id(question.id).await.unwrap().is_none());

        let remaining = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions WHERE category_id = $1")
            .bind(category.id)
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_missing_category_returns_false(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Categories::new(&mut conn);

        assert!(!repo.delete(Uuid::new_v4()).await.unwrap());
    }
}
