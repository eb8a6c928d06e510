//! # medqa: administrative portal for a Q/A knowledge base
//!
//! `medqa` is the backend of an administrative portal for a medical
//! question/answer knowledge base. It manages categories, the questions filed
//! under them, user accounts, and an append-only audit log of admin actions,
//! all backed by PostgreSQL and exposed as a JSON-over-HTTP API.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) with
//! PostgreSQL for persistence (via SQLx). A request flows through the
//! authentication extractor (bearer token -> user row), then a role guard
//! (`user < admin < superadmin`), then the handler, which talks to the
//! repositories in [`db::handlers`]. Mutating handlers append an entry to the
//! audit trail through the fire-and-forget sink in [`audit`].
//!
//! Listing endpoints share one pagination contract
//! ([`api::models::pagination`]) and three of them offer a CSV export of the
//! full result set ([`csv`]); both are deliberately small, stable surfaces
//! because the portal frontend and spreadsheet users depend on their exact
//! shapes.
//!
//! ## Quick start
//!
//! ```no_run
//! use clap::Parser;
//! use medqa::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = medqa::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     medqa::telemetry::init_telemetry();
//!
//!     Application::new(config)
//!         .await?
//!         .serve(async {
//!             tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!         })
//!         .await
//! }
//! ```
//!
//! Migrations run automatically on startup; see [`migrator`].

pub mod api;
pub mod audit;
pub mod auth;
pub mod config;
pub mod csv;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{
    api::models::users::Role,
    auth::password,
    db::handlers::{Repository, Users},
    db::models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    errors::Error,
    openapi::ApiDoc,
};
use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, instrument, warn, Level};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{ActionLogId, CategoryId, QuestionId, UserId};

/// Application state shared across all request handlers.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial superadmin user if it doesn't exist.
///
/// Idempotent: called on every startup. An existing account gets its password
/// refreshed when one is configured; a missing account is created with the
/// `superadmin` role. Without a configured password no account can be
/// created, only a warning is emitted.
#[instrument(skip_all)]
pub async fn create_initial_superadmin(email: &str, plain_password: Option<&str>, db: &PgPool) -> anyhow::Result<Option<UserId>> {
    let password_hash = plain_password.map(password::hash_password).transpose()?;

    let mut conn = db.acquire().await?;
    let mut user_repo = Users::new(&mut conn);

    if let Some(existing) = user_repo.get_user_by_email(email).await? {
        if let Some(password_hash) = password_hash {
            user_repo
                .update(
                    existing.id,
                    &UserUpdateDBRequest {
                        username: None,
                        email: None,
                        password_hash: Some(password_hash),
                    },
                )
                .await?;
        }
        return Ok(Some(existing.id));
    }

    let Some(password_hash) = password_hash else {
        warn!("superadmin_password is not configured; skipping initial superadmin creation");
        return Ok(None);
    };

    let created = user_repo
        .create(&UserCreateDBRequest {
            username: email.to_string(),
            email: email.to_string(),
            password_hash,
            role: Role::SuperAdmin,
        })
        .await?;

    info!("Created initial superadmin user {}", created.username);
    Ok(Some(created.id))
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors = &config.auth.cors;

    // Credentialed CORS cannot use wildcards; mirror the request instead.
    let layer = if cors.allow_credentials {
        let mut origins = Vec::new();
        for origin in &cors.allowed_origins {
            origins.push(origin.parse::<HeaderValue>()?);
        }
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else if cors.allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        let mut origins = Vec::new();
        for origin in &cors.allowed_origins {
            origins.push(origin.parse::<HeaderValue>()?);
        }
        CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
    };

    Ok(layer)
}

/// Build the application router with all endpoints and middleware.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let api_routes = Router::new()
        // Authentication and own profile
        .route("/auth/register", post(api::handlers::auth::register))
        .route("/auth/login", post(api::handlers::auth::login))
        .route("/auth/me", get(api::handlers::auth::me))
        .route("/auth/profile", put(api::handlers::auth::update_profile))
        // Categories (listing is public, mutations are admin-gated)
        .route(
            "/categories",
            get(api::handlers::categories::list_categories).post(api::handlers::categories::create_category),
        )
        .route("/categories/export", get(api::handlers::categories::export_categories))
        .route(
            "/categories/{id}",
            put(api::handlers::categories::update_category).delete(api::handlers::categories::delete_category),
        )
        .route(
            "/categories/{id}/questions",
            get(api::handlers::categories::category_questions).delete(api::handlers::categories::delete_category_questions),
        )
        // Questions
        .route(
            "/questions",
            get(api::handlers::questions::list_questions).post(api::handlers::questions::create_question),
        )
        .route("/questions/export", get(api::handlers::questions::export_questions))
        .route(
            "/questions/{id}",
            put(api::handlers::questions::update_question).delete(api::handlers::questions::delete_question),
        )
        // User management
        .route("/users", get(api::handlers::users::list_users))
        .route("/users/{id}/role", put(api::handlers::users::update_user_role))
        .route("/users/{id}", delete(api::handlers::users::delete_user))
        // Audit trail
        .route("/actionlogs", get(api::handlers::action_logs::list_action_logs))
        .route("/actionlogs/export", get(api::handlers::action_logs::export_action_logs))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api", api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .fallback(|| async { Error::not_found("Маршрут не найден") });

    let cors_layer = create_cors_layer(&state.config)?;

    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The assembled application: pool, router and configuration.
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.pool.max_connections)
            .min_connections(config.pool.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.pool.acquire_timeout_secs))
            .connect(&config.database_url)
            .await?;

        migrator().run(&pool).await?;

        create_initial_superadmin(&config.superadmin_email, config.superadmin_password.as_deref(), &pool).await?;

        let state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Portal API listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
