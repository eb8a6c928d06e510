//! Repository implementations for database access.
//!
//! Each repository wraps a SQLx connection, provides strongly-typed
//! operations, and returns domain models from [`crate::db::models`].
//! [`Users`], [`Categories`] and [`Questions`] implement the common
//! [`Repository`] trait for create/get/update/delete; list operations are
//! inherent methods because each entity has its own filter and canonical
//! order. [`ActionLogs`] is append-only and exposes only record/read methods.
//!
//! Usage pattern:
//!
//! ```ignore
//! let mut conn = pool.acquire().await?;
//! let mut repo = Categories::new(&mut conn);
//! let category = repo.create(&request).await?;
//! ```

pub mod action_logs;
pub mod categories;
pub mod questions;
pub mod repository;
pub mod users;

pub use action_logs::ActionLogs;
pub use categories::Categories;
pub use questions::Questions;
pub use repository::Repository;
pub use users::Users;
