use crate::api::models::users::Role;
use crate::db::errors::DbError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Authentication required but not provided or not valid
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Valid identity but the role tier is too low for the route
    #[error("Requires at least the {required:?} role")]
    Forbidden { required: Role },

    /// Invalid request data or business rule violation
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found
    #[error("{message}")]
    NotFound { message: String },

    /// Pre-write uniqueness check found an existing row. `entity` identifies
    /// which uniqueness rule was hit so the response layer can decide how
    /// loudly to log it.
    #[error("{message}")]
    Duplicate { entity: &'static str, message: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Error::BadRequest { message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound { message: message.into() }
    }

    pub fn duplicate_email() -> Self {
        Error::Duplicate {
            entity: "user",
            message: "Пользователь с таким email уже существует".to_string(),
        }
    }

    pub fn duplicate_category() -> Self {
        Error::Duplicate {
            entity: "category",
            message: "Категория с таким названием уже существует".to_string(),
        }
    }

    pub fn duplicate_question() -> Self {
        Error::Duplicate {
            entity: "question",
            message: "Вопрос с таким текстом уже существует".to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::Forbidden { .. } => StatusCode::FORBIDDEN,
            Error::BadRequest { .. } | Error::Duplicate { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. } | DbError::CheckViolation { .. } => {
                    StatusCode::BAD_REQUEST
                }
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message.clone().unwrap_or_else(|| "Требуется авторизация".to_string()),
            Error::Forbidden { .. } => "Недостаточно прав для выполнения операции".to_string(),
            Error::BadRequest { message } | Error::NotFound { message } | Error::Duplicate { message, .. } => message.clone(),
            Error::Internal { .. } => "Ошибка сервера".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Запись не найдена".to_string(),
                // The storage-level unique index is the backstop for the
                // check-then-write race: its violation must read exactly like
                // the pre-check path.
                DbError::UniqueViolation { constraint, table, .. } => {
                    match (table.as_deref(), constraint.as_deref()) {
                        (Some("users"), Some(c)) if c.contains("email") => "Пользователь с таким email уже существует".to_string(),
                        (Some("users"), Some(c)) if c.contains("username") => "Пользователь с таким именем уже существует".to_string(),
                        (Some("categories"), _) => "Категория с таким названием уже существует".to_string(),
                        (Some("questions"), _) => "Вопрос с таким текстом уже существует".to_string(),
                        _ => "Запись с такими данными уже существует".to_string(),
                    }
                }
                DbError::ForeignKeyViolation { .. } => "Ссылка на несуществующую запись".to_string(),
                DbError::CheckViolation { .. } => "Недопустимые данные".to_string(),
                DbError::Other(_) => "Ошибка сервера".to_string(),
            },
            Error::Other(_) => "Ошибка сервера".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity.
        match &self {
            // Duplicate questions are an expected operator mistake surfaced
            // inline in the UI; they are kept out of the operational log.
            Error::Duplicate { entity: "question", .. } => {}
            Error::Database(DbError::UniqueViolation { table, .. }) if table.as_deref() == Some("questions") => {}
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::Unauthenticated { .. } | Error::Forbidden { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::BadRequest { .. } | Error::NotFound { .. } | Error::Duplicate { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        (status, Json(json!({ "message": self.user_message() }))).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
