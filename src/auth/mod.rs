//! Authentication and authorization.
//!
//! Identity is carried by a signed bearer token issued at registration or
//! login and presented as `Authorization: Bearer <token>`. Verification is
//! synchronous and side-effect-free; the [`current_user`] extractor then
//! resolves the token subject to a live user row, so revoked accounts stop
//! authenticating as soon as their row is gone.
//!
//! Authorization is a single ordered role tier (`user < admin < superadmin`)
//! enforced by the guard extractors in [`permissions`]. Guards run strictly
//! after identity resolution: a missing or invalid token is a 401 before any
//! role is examined, an insufficient role is a 403.
//!
//! # Modules
//!
//! - [`current_user`]: extractor resolving the bearer token to a user record
//! - [`password`]: password hashing and verification using Argon2
//! - [`permissions`]: role-gating guard extractors
//! - [`session`]: session token creation and verification

pub mod current_user;
pub mod password;
pub mod permissions;
pub mod session;
