//! Database layer.
//!
//! Data access goes through the repository pattern: each entity has a
//! repository in [`handlers`] wrapping a `&mut PgConnection`, taking request
//! structs from [`models`] and returning response structs from the same
//! place. Multi-statement writes (user creation with the unique backstops,
//! category cascade deletion) open a transaction on the wrapped connection.
//!
//! Errors are classified in [`errors`]: constraint violations become typed
//! [`errors::DbError`] variants the service layer can translate into
//! user-facing duplicate/reference messages, everything else is
//! non-recoverable.

pub mod errors;
pub mod handlers;
pub mod models;
