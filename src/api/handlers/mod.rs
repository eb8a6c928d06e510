//! HTTP request handlers for all API endpoints.
//!
//! Each handler is responsible for request validation, authorization checks
//! (via the guard extractors), business logic through the database
//! repositories, and response shaping. Mutating handlers append an audit
//! entry through [`crate::audit`] after the write succeeds.
//!
//! Handlers return [`crate::errors::Error`], which converts to the
//! appropriate HTTP status with a `{"message": ...}` JSON body.

pub mod action_logs;
pub mod auth;
pub mod categories;
pub mod questions;
pub mod users;
