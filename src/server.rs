//! HTTP server.
//!
//! Exposes ChurnWise over a JSON HTTP API for the dashboard frontend.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/register` | Create a user |
//! | `POST` | `/token` | Exchange credentials for a bearer token |
//! | `POST` | `/predict` | Churn prediction (bearer token required) |
//! | `GET`  | `/customer-profile?customer_id=` | First record with the id |
//! | `GET`  | `/chat?query=` | Best-matching document content |
//! | `GET`  | `/dashboard-data` | Aggregate statistics |
//! | `GET`  | `/health` | Model availability and version |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "customer not found: 0001-XYZ" } }
//! ```
//!
//! Malformed bodies, forms, and query strings are reported as `bad_request`
//! in the same envelope.
//!
//! Error codes: `bad_request` (400), `unauthorized` (401), `not_found` (404),
//! `schema_error` (500), `empty_dataset` (500), `internal` (500),
//! `model_unavailable` (503).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the browser dashboard
//! can be served from a different origin.

use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use churnwise_core::table::Record;
use churnwise_core::CoreError;

use crate::auth::TokenResponse;
use crate::chat::{self, ChatResponse};
use crate::config::Config;
use crate::context::AppContext;
use crate::dashboard::{self, DashboardResponse};
use crate::error::ServiceError;
use crate::predict::{self, PredictRequest, PredictResponse};
use crate::profile;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
type AppState = Arc<AppContext>;

/// Load the application context and serve until the process is terminated.
///
/// All inputs are loaded before the listener binds.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let cfg = config.clone();
    let ctx = tokio::task::spawn_blocking(move || AppContext::load(&cfg)).await??;
    run_server_with_context(Arc::new(ctx)).await
}

/// Serve an already-built context. Tests use this to inject fixtures.
pub async fn run_server_with_context(ctx: Arc<AppContext>) -> anyhow::Result<()> {
    let bind_addr = ctx.config.server.bind.clone();

    if !ctx.model.is_loaded() {
        tracing::warn!("Serving without a model; /predict will return 503");
    }

    let app = router(ctx);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("ChurnWise API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router with all routes and the CORS layer.
pub fn router(ctx: Arc<AppContext>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/register", post(handle_register))
        .route("/token", post(handle_token))
        .route("/predict", post(handle_predict))
        .route("/customer-profile", get(handle_customer_profile))
        .route("/chat", get(handle_chat))
        .route("/dashboard-data", get(handle_dashboard))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(ctx)
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// Inner error detail with a machine-readable code and human-readable message.
#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"not_found"`).
    code: String,
    /// Human-readable error message.
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Flatten a typed service error into a status code and error code.
///
/// Internal failures are logged here and reported without details.
impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::BadRequest(m) => AppError::new(StatusCode::BAD_REQUEST, "bad_request", m),
            ServiceError::Unauthorized(m) => {
                AppError::new(StatusCode::UNAUTHORIZED, "unauthorized", m)
            }
            ServiceError::Core(e) => match e {
                CoreError::NotFound(_) => {
                    AppError::new(StatusCode::NOT_FOUND, "not_found", e.to_string())
                }
                CoreError::ModelUnavailable(_) => AppError::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "model_unavailable",
                    e.to_string(),
                ),
                CoreError::SchemaError { .. } => {
                    tracing::error!("Dashboard schema error: {}", e);
                    AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "schema_error", e.to_string())
                }
                CoreError::EmptyDataset => AppError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "empty_dataset",
                    e.to_string(),
                ),
                other => internal(&other),
            },
            ServiceError::Internal(e) => internal(&e),
        }
    }
}

// Extractor failures share the envelope instead of axum's plain-text bodies.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::new(StatusCode::BAD_REQUEST, "bad_request", rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::new(StatusCode::BAD_REQUEST, "bad_request", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::new(StatusCode::BAD_REQUEST, "bad_request", rejection.body_text())
    }
}

fn internal(err: &dyn std::fmt::Display) -> AppError {
    tracing::error!("Internal error: {:#}", err);
    AppError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal",
        "internal server error",
    )
}

// ============ POST /register ============

#[derive(Deserialize)]
struct RegisterRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

async fn handle_register(
    State(ctx): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(req) = payload?;
    ctx.users.register(&req.email, &req.password).await?;
    Ok(Json(MessageResponse {
        message: "User registered successfully".to_string(),
    }))
}

// ============ POST /token ============

/// OAuth2 password-flow form fields.
#[derive(Deserialize)]
struct TokenForm {
    username: String,
    password: String,
}

async fn handle_token(
    State(ctx): State<AppState>,
    payload: Result<Form<TokenForm>, FormRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Form(form) = payload?;
    let token = ctx.users.login(&form.username, &form.password).await?;
    Ok(Json(token))
}

// ============ POST /predict ============

/// Extract the bearer token from the `Authorization` header.
///
/// Only presence is checked; the token is the caller's email.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let token = value
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .unwrap_or("");
    if token.is_empty() {
        return Err(AppError::new(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Not authenticated",
        ));
    }
    Ok(token)
}

async fn handle_predict(
    State(ctx): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    // Authentication is decided before the body is looked at.
    bearer_token(&headers)?;
    let Json(req) = payload?;
    let out = predict::predict_churn(&ctx, &req.features)?;
    Ok(Json(out))
}

// ============ GET /customer-profile ============

#[derive(Deserialize)]
struct ProfileQuery {
    customer_id: String,
}

async fn handle_customer_profile(
    State(ctx): State<AppState>,
    query: Result<Query<ProfileQuery>, QueryRejection>,
) -> Result<Json<Record>, AppError> {
    let Query(q) = query?;
    let record = profile::customer_profile(&ctx, &q.customer_id)?;
    Ok(Json(record))
}

// ============ GET /chat ============

#[derive(Deserialize)]
struct ChatQuery {
    query: String,
}

async fn handle_chat(
    State(ctx): State<AppState>,
    query: Result<Query<ChatQuery>, QueryRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Query(q) = query?;
    let reply = chat::answer(&ctx, &q.query)?;
    Ok(Json(reply))
}

// ============ GET /dashboard-data ============

async fn handle_dashboard(
    State(ctx): State<AppState>,
) -> Result<Json<DashboardResponse>, AppError> {
    let config = ctx.config.clone();
    let data = tokio::task::spawn_blocking(move || dashboard::dashboard_data(&config))
        .await
        .map_err(|e| internal(&e))??;
    Ok(Json(data))
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    /// `"up"` when a model is loaded, `"down"` otherwise.
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    /// The crate version from `Cargo.toml`.
    version: &'static str,
}

/// Handler for `GET /health`. Reflects predictor availability only.
async fn handle_health(State(ctx): State<AppState>) -> Json<HealthResponse> {
    let (status, reason) = match ctx.model.reason() {
        None => ("up", None),
        Some(r) => ("down", Some(r.to_string())),
    };
    Json(HealthResponse {
        status,
        reason,
        version: env!("CARGO_PKG_VERSION"),
    })
}
