use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    AppState, audit,
    api::models::{
        MessageResponse,
        pagination::PaginatedResponse,
        users::{ListUsersQuery, RoleUpdateRequest, UserResponse},
    },
    auth::permissions::RequireSuperAdmin,
    db::handlers::{Repository, Users, users::UserFilter},
    errors::{Error, Result},
    types::UserId,
};

/// List user accounts with pagination
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "One page of users, newest first"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Superadmin role required"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    _superadmin: RequireSuperAdmin,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<PaginatedResponse<UserResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let rows = repo
        .list(&UserFilter::new(query.pagination.offset(), query.pagination.limit()))
        .await?;
    let total_count = repo.count().await?;

    Ok(Json(PaginatedResponse::new(
        rows.into_iter().map(UserResponse::from).collect(),
        total_count,
        &query.pagination,
    )))
}

/// Change a user's role
#[utoipa::path(
    put,
    path = "/api/users/{id}/role",
    request_body = RoleUpdateRequest,
    tag = "users",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Superadmin role required"),
        (status = 404, description = "User not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_user_role(
    State(state): State<AppState>,
    superadmin: RequireSuperAdmin,
    Path(id): Path<UserId>,
    Json(request): Json<RoleUpdateRequest>,
) -> Result<Json<UserResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    repo.get_by_id(id).await?.ok_or_else(|| Error::not_found("Пользователь не найден"))?;

    let updated = repo.update_role(id, request.role).await?;

    audit::record(
        &state,
        superadmin.id,
        "update_user_role",
        format!("Пользователю \"{}\" назначена роль {:?}", updated.username, updated.role),
        Some(id),
        "user",
    )
    .await;

    Ok(Json(UserResponse::from(updated)))
}

/// Delete a user account
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Attempt to delete own account"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Superadmin role required"),
        (status = 404, description = "User not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_user(
    State(state): State<AppState>,
    superadmin: RequireSuperAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<MessageResponse>> {
    if id == superadmin.id {
        return Err(Error::bad_request("Нельзя удалить собственную учетную запись"));
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let user = repo.get_by_id(id).await?.ok_or_else(|| Error::not_found("Пользователь не найден"))?;
    repo.delete(id).await?;

    audit::record(
        &state,
        superadmin.id,
        "delete_user",
        format!("Удален пользователь \"{}\"", user.username),
        Some(id),
        "user",
    )
    .await;

    Ok(Json(MessageResponse::new("Пользователь успешно удален")))
}
