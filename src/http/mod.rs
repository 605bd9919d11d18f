use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::auth::AuthError;
use crate::state::AppState;
use crate::store::StoreError;

mod accounts;
mod dashboard;
mod pages;
mod session;

pub use session::AuthenticatedIntern;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let api_router = accounts::router().merge(dashboard::router());
    Router::new()
        .merge(pages::router())
        .route("/health", get(health_live))
        .route("/health/ready", get(health_ready))
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_live(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "live",
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

async fn health_ready(State(state): State<AppState>) -> Result<Json<ReadyResponse>, HttpError> {
    state.database.ping().await.map_err(|err| {
        HttpError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "database_unavailable",
            err.to_string(),
        )
    })?;

    Ok(Json(ReadyResponse {
        status: "ready",
        database: "ok",
    }))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
struct ReadyResponse {
    status: &'static str,
    database: &'static str,
}

/// Error leaving a handler, rendered as `{"error": ..., "code": ...}`.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, code: &'static str, message: String) -> Self {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Error status must be 4xx or 5xx"
        );
        assert!(!message.is_empty(), "Error message cannot be empty");
        Self {
            status,
            code,
            message,
        }
    }

    /// 500 with a generic body; the detail only reaches the log.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        error!("Internal error: {detail}");
        HttpError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            INTERNAL_ERROR_MESSAGE.to_string(),
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

impl From<StoreError> for HttpError {
    fn from(err: StoreError) -> Self {
        let (status, code) = match &err {
            StoreError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            StoreError::Uniqueness { .. } => (StatusCode::CONFLICT, "uniqueness_violation"),
            StoreError::ReferentialIntegrity { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "referential_integrity")
            }
            StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            StoreError::Invariant { .. } | StoreError::Database(_) => {
                return HttpError::internal(&err);
            }
        };
        HttpError::new(status, code, err.to_string())
    }
}

impl From<AuthError> for HttpError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Store(inner) => inner.into(),
            AuthError::InvalidCredentials => {
                HttpError::new(StatusCode::UNAUTHORIZED, "authentication_failed", err.to_string())
            }
            AuthError::NotAuthenticated => {
                HttpError::new(StatusCode::UNAUTHORIZED, "not_authenticated", err.to_string())
            }
            AuthError::Hashing(_) | AuthError::Signing(_) => HttpError::internal(&err),
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        HttpError::new(
            StatusCode::BAD_REQUEST,
            "validation_error",
            rejection.body_text(),
        )
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(code = self.code, "HTTP error: {}", self.message);
        } else {
            info!(code = self.code, "HTTP error: {}", self.message);
        }
        let body = Json(ErrorBody {
            error: self.message,
            code: self.code,
        });
        (self.status, body).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}
