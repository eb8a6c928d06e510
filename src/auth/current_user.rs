//! Extractor resolving a bearer token to the authenticated user.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{instrument, trace};

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    db::{
        errors::DbError,
        handlers::{Repository, Users},
    },
    errors::{Error, Result},
};

/// Pull the raw token out of the `Authorization: Bearer <token>` header.
///
/// Returns:
/// - None: no Authorization header present
/// - Some(Ok(token)): well-formed bearer header
/// - Some(Err(error)): header present but malformed
fn bearer_token(parts: &Parts) -> Option<Result<&str>> {
    let header = parts.headers.get(axum::http::header::AUTHORIZATION)?;

    let value = match header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid authorization header: {e}"),
            }));
        }
    };

    match value.strip_prefix("Bearer ") {
        Some(token) => Some(Ok(token)),
        None => Some(Err(Error::Unauthenticated {
            message: Some("Требуется авторизация".to_string()),
        })),
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = match bearer_token(parts) {
            Some(token) => token?,
            None => {
                trace!("No bearer token found in request");
                return Err(Error::Unauthenticated { message: None });
            }
        };

        let claims = session::verify_session_token(token, &state.config)?;

        // The token only proves identity; the user row is authoritative for
        // username, email and the current role.
        let mut conn = state.db.acquire().await.map_err(|e| Error::Database(DbError::from(e)))?;
        let mut user_repo = Users::new(&mut conn);
        let user = user_repo.get_by_id(claims.sub).await?.ok_or_else(|| Error::Unauthenticated {
            message: Some("Недействительный токен".to_string()),
        })?;

        Ok(CurrentUser {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        })
    }
}
