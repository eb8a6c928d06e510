//! Role-gating guard extractors.
//!
//! Both guards resolve the identity first and only then examine the role, so
//! a request without a valid token is rejected with 401 before any 403 can be
//! produced. The checks themselves are pure predicates over the resolved
//! user.

use axum::{extract::FromRequestParts, http::request::Parts};
use std::ops::Deref;

use crate::{
    AppState,
    api::models::users::{CurrentUser, Role},
    errors::{Error, Result},
};

fn require_role(user: CurrentUser, required: Role) -> Result<CurrentUser> {
    if user.role >= required {
        Ok(user)
    } else {
        Err(Error::Forbidden { required })
    }
}

/// Passes for `admin` and `superadmin`.
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        require_role(user, Role::Admin).map(Self)
    }
}

impl Deref for RequireAdmin {
    type Target = CurrentUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Passes only for `superadmin`.
pub struct RequireSuperAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireSuperAdmin {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        require_role(user, Role::SuperAdmin).map(Self)
    }
}

impl Deref for RequireSuperAdmin {
    type Target = CurrentUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
