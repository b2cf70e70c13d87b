// rest_api/src/lib.rs

use std::sync::Arc;

use anyhow::Context;
use axum::extract::FromRef;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use models::DomainError;
use security::TokenKeys;
use services::{AppointmentService, DirectoryService, IdentityService};
use storage::ClinicStore;

pub mod config;
pub mod guards;
mod handlers;

pub use config::AppConfig;

/// REST-boundary error: a domain error carried to its HTTP status mapping.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DomainError::Validation(_) | DomainError::Duplicate(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Authentication(_) => StatusCode::UNAUTHORIZED,
            DomainError::Authorization(_) | DomainError::Conflict(_) => StatusCode::FORBIDDEN,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(message = %self.0, "request failed with internal error");
        }

        let body = Json(json!({
            "status": "error",
            "message": self.0.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Shared state for the axum application.
#[derive(Clone)]
pub struct AppState {
    pub identities: Arc<IdentityService>,
    pub directory: Arc<DirectoryService>,
    pub appointments: Arc<AppointmentService>,
    pub keys: TokenKeys,
}

impl AppState {
    /// Wires the service layer over one store with the given configuration.
    pub fn build(config: &AppConfig, store: Arc<dyn ClinicStore>) -> Self {
        let keys = TokenKeys::from_secret(config.jwt_secret.as_bytes());
        Self {
            identities: Arc::new(IdentityService::new(
                store.clone(),
                keys.clone(),
                config.doctor_domain.clone(),
            )),
            directory: Arc::new(DirectoryService::new(store.clone())),
            appointments: Arc::new(AppointmentService::new(store)),
            keys,
        }
    }
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(state: &AppState) -> TokenKeys {
        state.keys.clone()
    }
}

/// Builds the full route table under the common `/api` prefix.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/users/profile", get(handlers::users::profile))
        .route("/api/doctors", get(handlers::doctors::list_approved))
        .route(
            "/api/doctors/profile",
            get(handlers::doctors::own_profile).put(handlers::doctors::update_profile),
        )
        .route("/api/doctors/pending", get(handlers::doctors::pending))
        .route("/api/doctors/approve/:id", put(handlers::doctors::approve))
        .route("/api/appointments/book", post(handlers::appointments::book))
        .route(
            "/api/appointments/my-appointments",
            get(handlers::appointments::my_appointments),
        )
        .route(
            "/api/appointments/:id/status",
            put(handlers::appointments::update_status),
        )
        .with_state(state)
        .layer(cors)
}

/// Binds the configured address and serves until ctrl-c.
pub async fn serve(config: &AppConfig, state: AppState) -> anyhow::Result<()> {
    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address: {}", addr))?;
    info!(%addr, "REST API server listening");

    axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("REST API server failed")?;

    info!("REST API server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    }
}
