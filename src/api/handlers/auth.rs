use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    api::models::{
        auth::{AuthResponse, LoginRequest, ProfileUpdateRequest, RegisterRequest},
        users::{CurrentUser, Role, UserResponse},
    },
    auth::{password, session},
    db::{
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    errors::{Error, Result},
};

/// Register a new user account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    tag = "auth",
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Missing fields or email already taken"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(State(state): State<AppState>, Json(request): Json<RegisterRequest>) -> Result<(StatusCode, Json<AuthResponse>)> {
    if request.username.is_empty() || request.email.is_empty() || request.password.is_empty() {
        return Err(Error::bad_request("Все поля обязательны для заполнения"));
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut conn);

    if user_repo.get_user_by_email(&request.email).await?.is_some() {
        return Err(Error::duplicate_email());
    }

    // Hash the password on a blocking thread to avoid blocking the async runtime
    let plain = request.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    // Registration is for portal staff; new accounts land on the admin tier.
    let created = user_repo
        .create(&UserCreateDBRequest {
            username: request.username,
            email: request.email,
            password_hash,
            role: Role::Admin,
        })
        .await?;

    let token = session::create_session_token(created.id, created.role, &state.config)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserResponse::from(created),
        }),
    ))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    tag = "auth",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Missing fields or invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Json<AuthResponse>> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(Error::bad_request("Email и пароль обязательны для заполнения"));
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut conn);

    // Unknown email and wrong password must be indistinguishable to the caller
    let user = user_repo
        .get_user_by_email(&request.email)
        .await?
        .ok_or_else(|| Error::bad_request("Неверный email или пароль"))?;

    let plain = request.password.clone();
    let hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_password(&plain, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::bad_request("Неверный email или пароль"));
    }

    let token = session::create_session_token(user.id, user.role, &state.config)?;

    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from(user),
    }))
}

/// Return the identity resolved from the bearer token
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Resolved identity", body = CurrentUser),
        (status = 401, description = "Missing, invalid or expired token"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn me(current_user: CurrentUser) -> Json<CurrentUser> {
    Json(current_user)
}

/// Update the authenticated user's own profile
#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = ProfileUpdateRequest,
    tag = "auth",
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Missing fields, weak password or email already taken"),
        (status = 401, description = "Missing, invalid or expired token"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<ProfileUpdateRequest>,
) -> Result<Json<UserResponse>> {
    if request.username.is_empty() || request.email.is_empty() {
        return Err(Error::bad_request("Имя пользователя и email обязательны для заполнения"));
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut conn);

    if user_repo.find_by_email_excluding(&request.email, current_user.id).await?.is_some() {
        return Err(Error::duplicate_email());
    }

    let password_hash = match request.password {
        Some(plain) => {
            if plain.chars().count() < state.config.auth.password.min_length {
                return Err(Error::bad_request(format!(
                    "Пароль должен содержать минимум {} символов",
                    state.config.auth.password.min_length
                )));
            }
            Some(
                tokio::task::spawn_blocking(move || password::hash_password(&plain))
                    .await
                    .map_err(|e| Error::Internal {
                        operation: format!("spawn password hashing task: {e}"),
                    })??,
            )
        }
        None => None,
    };

    let updated = user_repo
        .update(
            current_user.id,
            &UserUpdateDBRequest {
                username: Some(request.username),
                email: Some(request.email),
                password_hash,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(updated)))
}
