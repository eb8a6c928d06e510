use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};

use crate::{
    AppState,
    api::models::{
        action_logs::ActionLogResponse,
        pagination::{PaginatedResponse, Pagination},
    },
    auth::permissions::RequireSuperAdmin,
    csv::{CsvDocument, format_timestamp},
    db::handlers::ActionLogs,
    errors::{Error, Result},
};

/// Read the audit log with pagination
#[utoipa::path(
    get,
    path = "/api/actionlogs",
    tag = "actionlogs",
    params(Pagination),
    responses(
        (status = 200, description = "One page of audit entries, newest first"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Superadmin role required"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_action_logs(
    State(state): State<AppState>,
    _superadmin: RequireSuperAdmin,
    Query(pagination): Query<Pagination>,
) -> Result<Json<PaginatedResponse<ActionLogResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = ActionLogs::new(&mut conn);

    let rows = repo.list(pagination.offset(), pagination.limit()).await?;
    let total_count = repo.count().await?;

    Ok(Json(PaginatedResponse::new(
        rows.into_iter().map(ActionLogResponse::from).collect(),
        total_count,
        &pagination,
    )))
}

/// Export the full audit log as CSV
#[utoipa::path(
    get,
    path = "/api/actionlogs/export",
    tag = "actionlogs",
    responses(
        (status = 200, description = "CSV download", content_type = "text/csv"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Superadmin role required"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn export_action_logs(State(state): State<AppState>, _superadmin: RequireSuperAdmin) -> Result<impl IntoResponse> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = ActionLogs::new(&mut conn);

    let logs = repo.list_all().await?;

    let mut doc = CsvDocument::new("ID,Пользователь,Тип действия,Описание,ID сущности,Тип сущности,Дата");
    for log in &logs {
        doc.push_row([
            log.id.to_string(),
            log.username.clone().unwrap_or_else(|| "Неизвестный".to_string()),
            log.action_type.clone(),
            log.description.clone(),
            log.entity_id.map(|id| id.to_string()).unwrap_or_default(),
            log.entity_type.clone(),
            format_timestamp(&log.created_at),
        ]);
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"action_logs.csv\""),
        ],
        doc.into_string(),
    ))
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::users::Role,
        db::{handlers::ActionLogs, models::action_logs::ActionLogCreateDBRequest},
        test_utils::{bearer, create_test_server, create_test_user, create_test_user_with_token},
    };
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;
    use uuid::Uuid;

    async fn seed_log(pool: &PgPool, user_id: Uuid, description: &str) {
        let mut conn = pool.acquire().await.unwrap();
        ActionLogs::new(&mut conn)
            .record(&ActionLogCreateDBRequest {
                user_id,
                action_type: "create_category".to_string(),
                description: description.to_string(),
                entity_id: Some(Uuid::new_v4()),
                entity_type: "category".to_string(),
            })
            .await
            .unwrap();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_listing_requires_superadmin(pool: PgPool) {
        let server = create_test_server(pool.clone());

        let response = server.get("/api/actionlogs").await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let (_admin, token) = create_test_user_with_token(&pool, Role::Admin).await;
        let response = server.get("/api/actionlogs").add_header("authorization", bearer(&token)).await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = server.get("/api/actionlogs/export").add_header("authorization", bearer(&token)).await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_paginated_listing_with_username(pool: PgPool) {
        let server = create_test_server(pool.clone());
        let (superadmin, token) = create_test_user_with_token(&pool, Role::SuperAdmin).await;

        for i in 0..3 {
            seed_log(&pool, superadmin.id, &format!("Запись {i}")).await;
        }

        let response = server
            .get("/api/actionlogs?page=1&limit=2")
            .add_header("authorization", bearer(&token))
            .await;
        response.assert_status(StatusCode::OK);

        let body: serde_json::Value = response.json();
        assert_eq!(body["rows"].as_array().unwrap().len(), 2);
        assert_eq!(body["totalCount"], 3);
        assert_eq!(body["totalPages"], 2);
        assert_eq!(body["currentPage"], 1);
        assert_eq!(body["rows"][0]["user"]["username"], superadmin.username);
        assert_eq!(body["rows"][0]["actionType"], "create_category");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_mutations_are_audited(pool: PgPool) {
        let server = create_test_server(pool.clone());
        let (_admin, admin_token) = create_test_user_with_token(&pool, Role::Admin).await;
        let (_superadmin, token) = create_test_user_with_token(&pool, Role::SuperAdmin).await;

        server
            .post("/api/categories")
            .add_header("authorization", bearer(&admin_token))
            .json(&json!({ "name": "Кардиология" }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server.get("/api/actionlogs").add_header("authorization", bearer(&token)).await;
        let body: serde_json::Value = response.json();
        assert_eq!(body["totalCount"], 1);
        assert_eq!(body["rows"][0]["description"], "Создана категория \"Кардиология\"");
        assert_eq!(body["rows"][0]["entityType"], "category");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_export(pool: PgPool) {
        let server = create_test_server(pool.clone());
        let (superadmin, token) = create_test_user_with_token(&pool, Role::SuperAdmin).await;

        seed_log(&pool, superadmin.id, "Обновлена категория \"Кардиология\"").await;
        seed_log(&pool, superadmin.id, "Простая запись").await;

        let response = server.get("/api/actionlogs/export").add_header("authorization", bearer(&token)).await;
        response.assert_status(StatusCode::OK);
        assert!(
            response
                .headers()
                .get("content-type")
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/csv")
        );
        assert_eq!(
            response.headers().get("content-disposition").unwrap(),
            "attachment; filename=\"action_logs.csv\""
        );

        let body = response.text();
        // BOM, then exactly one header line plus one line per row
        assert!(body.starts_with("\u{feff}ID,Пользователь,Тип действия,Описание,ID сущности,Тип сущности,Дата\n"));
        assert_eq!(body.lines().count(), 3);
        // Embedded double quotes in the description are doubled
        assert!(body.contains("\"Обновлена категория \"\"Кардиология\"\"\""));
        assert!(body.contains(&format!("\"{}\"", superadmin.username)));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_export_after_user_deletion(pool: PgPool) {
        let server = create_test_server(pool.clone());
        let (_superadmin, token) = create_test_user_with_token(&pool, Role::SuperAdmin).await;
        let doomed = create_test_user(&pool, Role::Admin).await;

        seed_log(&pool, doomed.id, "Запись обреченного").await;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(doomed.id)
            .execute(&pool)
            .await
            .unwrap();

        let response = server.get("/api/actionlogs/export").add_header("authorization", bearer(&token)).await;
        response.assert_status(StatusCode::OK);
        // The vanished user renders as the placeholder
        assert!(response.text().contains("\"Неизвестный\""));
    }
}
