//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all endpoints
//! - **[`models`]**: request/response structures for the wire format
//!
//! The wire format is camelCase JSON; every error body is
//! `{"message": "..."}`. All endpoints are documented with `utoipa`
//! annotations; the rendered document is served at `/api/docs`.

pub mod handlers;
pub mod models;
