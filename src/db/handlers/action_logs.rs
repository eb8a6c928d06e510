//! Database repository for the audit trail.
//!
//! Append-only: entries are recorded and read, never updated or deleted, so
//! this repository does not implement the [`Repository`] trait.
//!
//! [`Repository`]: crate::db::handlers::Repository

use crate::db::{
    errors::Result,
    models::action_logs::{ActionLogCreateDBRequest, ActionLogDBResponse},
};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

pub struct ActionLogs<'c> {
    db: &'c mut PgConnection,
}

impl<'c> ActionLogs<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Append one audit entry.
    #[instrument(skip(self, request), fields(action_type = %request.action_type), err)]
    pub async fn record(&mut self, request: &ActionLogCreateDBRequest) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO action_logs (id, user_id, action_type, description, entity_id, entity_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.user_id)
        .bind(&request.action_type)
        .bind(&request.description)
        .bind(request.entity_id)
        .bind(&request.entity_type)
        .execute(&mut *self.db)
        .await?;

        Ok(())
    }

    /// One page of entries, newest first, with the acting username joined in.
    #[instrument(skip(self), err)]
    pub async fn list(&mut self, skip: i64, limit: i64) -> Result<Vec<ActionLogDBResponse>> {
        let logs = sqlx::query_as::<_, ActionLogDBResponse>(
            r#"
            SELECT l.id, l.user_id, u.username, l.action_type, l.description,
                   l.entity_id, l.entity_type, l.created_at
            FROM action_logs l
            LEFT JOIN users u ON l.user_id = u.id
            ORDER BY l.created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(logs)
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM action_logs")
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    /// Full result set for CSV export, newest first.
    #[instrument(skip(self), err)]
    pub async fn list_all(&mut self) -> Result<Vec<ActionLogDBResponse>> {
        let logs = sqlx::query_as::<_, ActionLogDBResponse>(
            r#"
            SELECT l.id, l.user_id, u.username, l.action_type, l.description,
                   l.entity_id, l.entity_type, l.created_at
            FROM action_logs l
            LEFT JOIN users u ON l.user_id = u.id
            ORDER BY l.created_at DESC
            "#,
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::models::users::Role, test_utils::create_test_user};
    use sqlx::PgPool;

    fn entry(user_id: Uuid, description: &str) -> ActionLogCreateDBRequest {
        ActionLogCreateDBRequest {
            user_id,
            action_type: "create_category".to_string(),
            description: description.to_string(),
            entity_id: Some(Uuid::new_v4()),
            entity_type: "category".to_string(),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_record_and_list(pool: PgPool) {
        let user = create_test_user(&pool, Role::Admin).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = ActionLogs::new(&mut conn);

        repo.record(&entry(user.id, "Создана категория \"Кардиология\"")).await.unwrap();

        let logs = repo.list(0, 20).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].username.as_deref(), Some(user.username.as_str()));
        assert_eq!(logs[0].action_type, "create_category");
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_log_outlives_its_user(pool: PgPool) {
        let user = create_test_user(&pool, Role::Admin).await;
        let mut conn = pool.acquire().await.unwrap();

        {
            let mut repo = ActionLogs::new(&mut conn);
            repo.record(&entry(user.id, "Удален вопрос")).await.unwrap();
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user.id)
            .execute(&mut *conn)
            .await
            .unwrap();

        let mut repo = ActionLogs::new(&mut conn);
        let logs = repo.list_all().await.unwrap();
        assert_eq!(logs.len(), 1);
        // Reference severed, entry intact
        assert!(logs[0].user_id.is_none());
        assert!(logs[0].username.is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_pagination_window(pool: PgPool) {
        let user = create_test_user(&pool, Role::Admin).await;
        let mut conn = pool.acquire().await.unwrap();

        {
            let mut repo = ActionLogs::new(&mut conn);
            for i in 0..5 {
                repo.record(&entry(user.id, &format!("Запись {i}"))).await.unwrap();
            }
        }

        let mut repo = ActionLogs::new(&mut conn);
        assert_eq!(repo.count().await.unwrap(), 5);
        assert_eq!(repo.list(0, 2).await.unwrap().len(), 2);
        assert_eq!(repo.list(4, 2).await.unwrap().len(), 1);
        assert!(repo.list(10, 2).await.unwrap().is_empty());
    }
}
