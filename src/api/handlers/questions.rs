use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::{
    AppState, audit,
    api::models::{
        MessageResponse,
        pagination::PaginatedResponse,
        questions::{ListQuestionsQuery, QuestionCreate, QuestionResponse, QuestionUpdate},
    },
    auth::permissions::RequireAdmin,
    csv::{CsvDocument, format_timestamp},
    db::{
        errors::DbError,
        handlers::{Categories, Questions, Repository, questions::QuestionFilter},
        models::questions::{QuestionCreateDBRequest, QuestionUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{CategoryId, QuestionId},
};

async fn ensure_category_exists(conn: &mut sqlx::PgConnection, id: CategoryId) -> Result<()> {
    let mut repo = Categories::new(conn);
    repo.get_by_id(id).await?.ok_or_else(|| Error::not_found("Категория не найдена"))?;
    Ok(())
}

/// List questions with pagination and an optional category filter
#[utoipa::path(
    get,
    path = "/api/questions",
    tag = "questions",
    params(ListQuestionsQuery),
    responses(
        (status = 200, description = "One page of questions, newest first"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_questions(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<ListQuestionsQuery>,
) -> Result<Json<PaginatedResponse<QuestionResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Questions::new(&mut conn);

    let mut filter = QuestionFilter::new(query.pagination.offset(), query.pagination.limit());
    if let Some(category_id) = query.category_id {
        filter = filter.with_category(category_id);
    }

    let rows = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        rows.into_iter().map(QuestionResponse::from).collect(),
        total_count,
        &query.pagination,
    )))
}

/// Create a question
#[utoipa::path(
    post,
    path = "/api/questions",
    request_body = QuestionCreate,
    tag = "questions",
    responses(
        (status = 201, description = "Question created", body = QuestionResponse),
        (status = 400, description = "Missing fields or question text already exists"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Category not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_question(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(request): Json<QuestionCreate>,
) -> Result<(StatusCode, Json<QuestionResponse>)> {
    if request.question.is_empty() || request.answer.is_empty() {
        return Err(Error::bad_request("Текст вопроса и ответ обязательны для заполнения"));
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if let Some(category_id) = request.category_id {
        ensure_category_exists(&mut conn, category_id).await?;
    }

    let mut repo = Questions::new(&mut conn);
    if repo.find_by_text(&request.question, None).await?.is_some() {
        return Err(Error::duplicate_question());
    }

    let question = repo
        .create(&QuestionCreateDBRequest {
            question: request.question,
            answer: request.answer,
            category_id: request.category_id,
        })
        .await?;

    audit::record(
        &state,
        admin.id,
        "create_question",
        format!("Создан вопрос \"{}\"", question.question),
        Some(question.id),
        "question",
    )
    .await;

    Ok((StatusCode::CREATED, Json(QuestionResponse::from(question))))
}

/// Update a question
#[utoipa::path(
    put,
    path = "/api/questions/{id}",
    request_body = QuestionUpdate,
    tag = "questions",
    params(("id" = String, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Updated question", body = QuestionResponse),
        (status = 400, description = "Missing fields or question text already exists"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Question or category not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_question(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<QuestionId>,
    Json(request): Json<QuestionUpdate>,
) -> Result<Json<QuestionResponse>> {
    if request.question.is_empty() || request.answer.is_empty() {
        return Err(Error::bad_request("Текст вопроса и ответ обязательны для заполнения"));
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if let Some(category_id) = request.category_id {
        ensure_category_exists(&mut conn, category_id).await?;
    }

    let mut repo = Questions::new(&mut conn);
    if repo.find_by_text(&request.question, Some(id)).await?.is_some() {
        return Err(Error::duplicate_question());
    }

    let question = repo
        .update(
            id,
            &QuestionUpdateDBRequest {
                question: request.question,
                answer: request.answer,
                category_id: request.category_id,
            },
        )
        .await
        .map_err(|e| match e {
            DbError::NotFound => Error::not_found("Вопрос не найден"),
            other => Error::Database(other),
        })?;

    audit::record(
        &state,
        admin.id,
        "update_question",
        format!("Обновлен вопрос \"{}\"", question.question),
        Some(question.id),
        "question",
    )
    .await;

    Ok(Json(QuestionResponse::from(question)))
}

/// Delete a question
#[utoipa::path(
    delete,
    path = "/api/questions/{id}",
    tag = "questions",
    params(("id" = String, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Question deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Question not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_question(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<QuestionId>,
) -> Result<Json<MessageResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Questions::new(&mut conn);

    let question = repo.get_by_id(id).await?.ok_or_else(|| Error::not_found("Вопрос не найден"))?;
    repo.delete(id).await?;

    audit::record(
        &state,
        admin.id,
        "delete_question",
        format!("Удален вопрос \"{}\"", question.question),
        Some(id),
        "question",
    )
    .await;

    Ok(Json(MessageResponse::new("Вопрос успешно удален")))
}

/// Export all questions as CSV
#[utoipa::path(
    get,
    path = "/api/questions/export",
    tag = "questions",
    responses(
        (status = 200, description = "CSV download", content_type = "text/csv"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn export_questions(State(state): State<AppState>, _admin: RequireAdmin) -> Result<impl IntoResponse> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Questions::new(&mut conn);

    let rows = repo.list_all_for_export().await?;

    let mut doc = CsvDocument::new("ID,Вопрос,Ответ,Категория,Дата создания");
    for row in &rows {
        doc.push_row([
            row.id.to_string(),
            row.question.clone(),
            row.answer.clone(),
            row.category_name.clone().unwrap_or_default(),
            format_timestamp(&row.created_at),
        ]);
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"questions.csv\""),
        ],
        doc.into_string(),
    ))
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::{categories::CategoryResponse, questions::QuestionResponse, users::Role},
        test_utils::{bearer, create_test_server, create_test_user_with_token},
    };
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_question(pool: PgPool) {
        let server = create_test_server(pool.clone());
        let (_admin, token) = create_test_user_with_token(&pool, Role::Admin).await;

        let response = server
            .post("/api/questions")
            .add_header("authorization", bearer(&token))
            .json(&json!({ "question": "Что такое гипертония?", "answer": "Повышенное артериальное давление." }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: QuestionResponse = response.json();
        assert_eq!(body.question, "Что такое гипертония?");
        assert!(body.category_id.is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_question_unknown_category(pool: PgPool) {
        let server = create_test_server(pool.clone());
        let (_admin, token) = create_test_user_with_token(&pool, Role::Admin).await;

        let response = server
            .post("/api/questions")
            .add_header("authorization", bearer(&token))
            .json(&json!({
                "question": "Вопрос без категории?",
                "answer": "Ответ.",
                "categoryId": uuid::Uuid::new_v4()
            }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Категория не найдена");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_question_text(pool: PgPool) {
        let server = create_test_server(pool.clone());
        let (_admin, token) = create_test_user_with_token(&pool, Role::Admin).await;

        server
            .post("/api/questions")
            .add_header("authorization", bearer(&token))
            .json(&json!({ "question": "Что такое анемия?", "answer": "Снижение гемоглобина." }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post("/api/questions")
            .add_header("authorization", bearer(&token))
            .json(&json!({ "question": "Что такое анемия?", "answer": "Другой ответ." }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Вопрос с таким текстом уже существует");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_missing_fields_rejected(pool: PgPool) {
        let server = create_test_server(pool.clone());
        let (_admin, token) = create_test_user_with_token(&pool, Role::Admin).await;

        let response = server
            .post("/api/questions")
            .add_header("authorization", bearer(&token))
            .json(&json!({ "question": "Вопрос без ответа?", "answer": "" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Текст вопроса и ответ обязательны для заполнения");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_question(pool: PgPool) {
        let server = create_test_server(pool.clone());
        let (_admin, token) = create_test_user_with_token(&pool, Role::Admin).await;

        let created: QuestionResponse = server
            .post("/api/questions")
            .add_header("authorization", bearer(&token))
            .json(&json!({ "question": "Старый вопрос?", "answer": "Старый ответ." }))
            .await
            .json();

        let category: CategoryResponse = server
            .post("/api/categories")
            .add_header("authorization", bearer(&token))
            .json(&json!({ "name": "Терапия" }))
            .await
            .json();

        let response = server
            .put(&format!("/api/questions/{}", created.id))
            .add_header("authorization", bearer(&token))
            .json(&json!({
                "question": "Новый вопрос?",
                "answer": "Новый ответ.",
                "categoryId": category.id
            }))
            .await;

        response.assert_status(StatusCode::OK);
        let updated: QuestionResponse = response.json();
        assert_eq!(updated.question, "Новый вопрос?");
        assert_eq!(updated.category_id, Some(category.id));

        // Updating a question to keep its own text is not a conflict
        let response = server
            .put(&format!("/api/questions/{}", created.id))
            .add_header("authorization", bearer(&token))
            .json(&json!({ "question": "Новый вопрос?", "answer": "Уточненный ответ." }))
            .await;
        response.assert_status(StatusCode::OK);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_question(pool: PgPool) {
        let server = create_test_server(pool.clone());
        let (_admin, token) = create_test_user_with_token(&pool, Role::Admin).await;

        let created: QuestionResponse = server
            .post("/api/questions")
            .add_header("authorization", bearer(&token))
            .json(&json!({ "question": "Временный вопрос?", "answer": "Ответ." }))
            .await
            .json();

        let response = server
            .delete(&format!("/api/questions/{}", created.id))
            .add_header("authorization", bearer(&token))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .delete(&format!("/api/questions/{}", created.id))
            .add_header("authorization", bearer(&token))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Вопрос не найден");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_paginated_listing_envelope(pool: PgPool) {
        let server = create_test_server(pool.clone());
        let (_admin, token) = create_test_user_with_token(&pool, Role::Admin).await;

        for i in 0..5 {
            server
                .post("/api/questions")
                .add_header("authorization", bearer(&token))
                .json(&json!({ "question": format!("Вопрос {i}?"), "answer": "Ответ." }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server
            .get("/api/questions?page=2&limit=2")
            .add_header("authorization", bearer(&token))
            .await;
        response.assert_status(StatusCode::OK);

        let body: serde_json::Value = response.json();
        assert_eq!(body["rows"].as_array().unwrap().len(), 2);
        assert_eq!(body["totalCount"], 5);
        assert_eq!(body["totalPages"], 3);
        assert_eq!(body["currentPage"], 2);

        // Page past the end: empty rows, totals intact
        let response = server
            .get("/api/questions?page=100&limit=2")
            .add_header("authorization", bearer(&token))
            .await;
        let body: serde_json::Value = response.json();
        assert!(body["rows"].as_array().unwrap().is_empty());
        assert_eq!(body["totalCount"], 5);

        // An absurd limit is clamped server-side, not an error
        let response = server
            .get("/api/questions?page=1&limit=100000")
            .add_header("authorization", bearer(&token))
            .await;
        response.assert_status(StatusCode::OK);
        let body: serde_json::Value = response.json();
        assert_eq!(body["totalPages"], 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_listing_filtered_by_category(pool: PgPool) {
        let server = create_test_server(pool.clone());
        let (_admin, token) = create_test_user_with_token(&pool, Role::Admin).await;

        let category: CategoryResponse = server
            .post("/api/categories")
            .add_header("authorization", bearer(&token))
            .json(&json!({ "name": "Кардиология" }))
            .await
            .json();

        server
            .post("/api/questions")
            .add_header("authorization", bearer(&token))
            .json(&json!({ "question": "В категории?", "answer": "Да.", "categoryId": category.id }))
            .await
            .assert_status(StatusCode::CREATED);
        server
            .post("/api/questions")
            .add_header("authorization", bearer(&token))
            .json(&json!({ "question": "Вне категории?", "answer": "Да." }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .get(&format!("/api/questions?categoryId={}", category.id))
            .add_header("authorization", bearer(&token))
            .await;
        response.assert_status(StatusCode::OK);

        let body: serde_json::Value = response.json();
        assert_eq!(body["totalCount"], 1);
        assert_eq!(body["rows"][0]["question"], "В категории?");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_listing_requires_admin(pool: PgPool) {
        let server = create_test_server(pool.clone());
        let (_user, token) = create_test_user_with_token(&pool, Role::User).await;

        let response = server.get("/api/questions").add_header("authorization", bearer(&token)).await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_export_questions(pool: PgPool) {
        let server = create_test_server(pool.clone());
        let (_admin, token) = create_test_user_with_token(&pool, Role::Admin).await;

        let category: CategoryResponse = server
            .post("/api/categories")
            .add_header("authorization", bearer(&token))
            .json(&json!({ "name": "Кардиология" }))
            .await
            .json();

        server
            .post("/api/questions")
            .add_header("authorization", bearer(&token))
            .json(&json!({
                "question": "Что такое \"синусовый ритм\"?",
                "answer": "Нормальный ритм сердца.",
                "categoryId": category.id
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server.get("/api/questions/export").add_header("authorization", bearer(&token)).await;
        response.assert_status(StatusCode::OK);
        assert_eq!(
            response.headers().get("content-disposition").unwrap(),
            "attachment; filename=\"questions.csv\""
        );

        let body = response.text();
        assert!(body.starts_with("\u{feff}ID,Вопрос,Ответ,Категория,Дата создания\n"));
        // Embedded quotes are doubled
        assert!(body.contains("\"Что такое \"\"синусовый ритм\"\"?\""));
        assert!(body.contains("\"Кардиология\""));
    }
}
