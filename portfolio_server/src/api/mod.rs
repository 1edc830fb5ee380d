//! HTTP API surface.
//!
//! Route map:
//!
//! | Method | Path                        | Auth | Purpose                        |
//! |--------|-----------------------------|------|--------------------------------|
//! | GET    | `/`                         | none | Liveness text                  |
//! | GET    | `/health`                   | none | Health probe                   |
//! | POST   | `/api/auth/register`        | none | Create administrator           |
//! | POST   | `/api/auth/login`           | none | Issue session token            |
//! | POST   | `/api/auth/logout`          | none | Clear session cookie           |
//! | GET    | `/api/auth/me`              | none | Session introspection          |
//! | POST   | `/api/auth/change-password` | gate | Rotate own password            |
//! | POST   | `/api/auth/forgot-password` | none | Email a password-reset token   |
//! | POST   | `/api/contact`              | none | Contact-form intake            |
//!
//! Every non-success response body is the `{"error": "..."}` envelope.

pub mod auth;
pub mod contact;
pub mod middleware;
pub mod request_id;
pub mod session;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use portfolio::db::CredentialStore;
use portfolio::{AuthService, BrevoClient, ContactService};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::config::SessionConfig;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub contact: Arc<ContactService>,
    /// Used directly for transactional mail (password resets)
    pub mailer: BrevoClient,
    /// Used directly for the health probe
    pub store: Arc<dyn CredentialStore>,
    pub session: SessionConfig,
}

/// Standard error envelope for non-success responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health probe response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: bool,
    pub timestamp: String,
}

/// Builds the complete router with middleware applied.
///
/// Only `change-password` sits behind the session gate; everything else is
/// public, including `/api/auth/me` which reports rather than enforces
/// authentication.
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/contact", post(contact::submit));

    let protected = Router::new()
        .route("/auth/change-password", post(auth::change_password))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_session,
        ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", public.merge(protected))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "Backend is running"
}

/// Reports service status plus a live probe of the credential store.
///
/// Answers `200` when the store is reachable and `503` otherwise, with the
/// same JSON body either way.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = state.store.ping().await.is_ok();

    let status_code = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if database { "healthy" } else { "unhealthy" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }),
    )
}
