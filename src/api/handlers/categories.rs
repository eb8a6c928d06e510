use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::{
    AppState, audit,
    api::models::{
        MessageResponse,
        categories::{BulkDeleteResponse, CategoryCreate, CategoryResponse, CategoryUpdate},
        questions::QuestionResponse,
    },
    auth::permissions::RequireAdmin,
    csv::{CsvDocument, format_timestamp},
    db::{
        errors::DbError,
        handlers::{Categories, Questions, Repository},
        models::categories::{CategoryCreateDBRequest, CategoryUpdateDBRequest},
    },
    errors::{Error, Result},
    types::CategoryId,
};

/// List all categories (public)
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "categories",
    responses(
        (status = 200, description = "All categories, name ascending", body = Vec<CategoryResponse>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<CategoryResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Categories::new(&mut conn);

    let categories = repo.list_all().await?;
    Ok(Json(categories.into_iter().map(CategoryResponse::from).collect()))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CategoryCreate,
    tag = "categories",
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Missing name or name already taken"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_category(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(request): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<CategoryResponse>)> {
    if request.name.is_empty() {
        return Err(Error::bad_request("Название категории обязательно для заполнения"));
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Categories::new(&mut conn);

    if repo.find_by_name(&request.name, None).await?.is_some() {
        return Err(Error::duplicate_category());
    }

    let category = repo
        .create(&CategoryCreateDBRequest {
            name: request.name,
            description: request.description,
        })
        .await?;

    audit::record(
        &state,
        admin.id,
        "create_category",
        format!("Создана категория \"{}\"", category.name),
        Some(category.id),
        "category",
    )
    .await;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    request_body = CategoryUpdate,
    tag = "categories",
    params(("id" = String, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Updated category", body = CategoryResponse),
        (status = 400, description = "Name already taken"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Category not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_category(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<CategoryId>,
    Json(request): Json<CategoryUpdate>,
) -> Result<Json<CategoryResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Categories::new(&mut conn);

    if let Some(name) = request.name.as_deref() {
        if repo.find_by_name(name, Some(id)).await?.is_some() {
            return Err(Error::duplicate_category());
        }
    }

    let category = repo
        .update(
            id,
            &CategoryUpdateDBRequest {
                name: request.name,
                description: request.description,
            },
        )
        .await
        .map_err(|e| match e {
            DbError::NotFound => Error::not_found("Категория не найдена"),
            other => Error::Database(other),
        })?;

    audit::record(
        &state,
        admin.id,
        "update_category",
        format!("Обновлена категория \"{}\"", category.name),
        Some(category.id),
        "category",
    )
    .await;

    Ok(Json(CategoryResponse::from(category)))
}

/// Delete a category together with all of its questions
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "categories",
    params(("id" = String, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category and its questions deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Category not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_category(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<Json<MessageResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Categories::new(&mut conn);

    let category = repo.get_by_id(id).await?.ok_or_else(|| Error::not_found("Категория не найдена"))?;

    repo.delete(id).await?;

    audit::record(
        &state,
        admin.id,
        "delete_category",
        format!("Удалена категория \"{}\" со всеми вопросами", category.name),
        Some(id),
        "category",
    )
    .await;

    Ok(Json(MessageResponse::new("Категория и все вопросы в ней успешно удалены")))
}

/// List the questions filed under a category
#[utoipa::path(
    get,
    path = "/api/categories/{id}/questions",
    tag = "categories",
    params(("id" = String, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Questions in the category, newest first", body = Vec<QuestionResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Category not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn category_questions(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<Json<Vec<QuestionResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    {
        let mut repo = Categories::new(&mut conn);
        repo.get_by_id(id).await?.ok_or_else(|| Error::not_found("Категория не найдена"))?;
    }

    let mut questions = Questions::new(&mut conn);
    let rows = questions.list_by_category(id).await?;

    Ok(Json(rows.into_iter().map(QuestionResponse::from).collect()))
}

/// Bulk-delete the questions filed under a category
#[utoipa::path(
    delete,
    path = "/api/categories/{id}/questions",
    tag = "categories",
    params(("id" = String, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Questions deleted", body = BulkDeleteResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Category not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_category_questions(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<Json<BulkDeleteResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let category = {
        let mut repo = Categories::new(&mut conn);
        repo.get_by_id(id).await?.ok_or_else(|| Error::not_found("Категория не найдена"))?
    };

    let mut questions = Questions::new(&mut conn);
    let deleted_count = questions.delete_by_category(id).await?;

    audit::record(
        &state,
        admin.id,
        "bulk_delete_questions",
        format!("Удалены все вопросы категории \"{}\" ({deleted_count} шт.)", category.name),
        Some(id),
        "category",
    )
    .await;

    Ok(Json(BulkDeleteResponse {
        message: format!("Удалено {deleted_count} вопросов из категории"),
        deleted_count,
    }))
}

/// Export all categories as CSV
#[utoipa::path(
    get,
    path = "/api/categories/export",
    tag = "categories",
    responses(
        (status = 200, description = "CSV download", content_type = "text/csv"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn export_categories(State(state): State<AppState>, _admin: RequireAdmin) -> Result<impl IntoResponse> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Categories::new(&mut conn);

    let categories = repo.list_all().await?;

    let mut doc = CsvDocument::new("ID,Название,Описание,Дата создания");
    for category in &categories {
        doc.push_row([
            category.id.to_string(),
            category.name.clone(),
            category.description.clone().unwrap_or_default(),
            format_timestamp(&category.created_at),
        ]);
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"categories.csv\""),
        ],
        doc.into_string(),
    ))
}
