mod runs;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chanlens_pipeline::{
    spawn_run, ChannelSource, EventSink, InsightGenerator, Pipeline, ReportRenderer, RunRequest,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::AuthState;
use crate::middleware::{enforce_rate_limit, request_id, require_session, RateLimitState, RequestId};
use crate::web;

pub(crate) use runs::{build_request, RunLimits, MAX_DAYS, MIN_DAYS};

type LaunchFn = dyn Fn(RunRequest, EventSink) -> JoinHandle<()> + Send + Sync;

/// Starts pipeline runs on background tasks.
///
/// Hides the pipeline's source, insights and renderer types from the router.
#[derive(Clone)]
pub struct RunLauncher(Arc<LaunchFn>);

impl RunLauncher {
    pub fn new<S, I, R>(pipeline: Pipeline<S, I, R>) -> Self
    where
        S: ChannelSource + 'static,
        I: InsightGenerator + 'static,
        R: ReportRenderer + 'static,
    {
        let pipeline = Arc::new(pipeline);
        Self(Arc::new(move |request, events| {
            spawn_run(Arc::clone(&pipeline), request, events)
        }))
    }

    pub fn launch(&self, request: RunRequest, events: EventSink) -> JoinHandle<()> {
        (self.0)(request, events)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub launcher: RunLauncher,
    pub limits: RunLimits,
    pub auth: AuthState,
}

/// Envelope for successful JSON responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

/// JSON error body: `{"error": {"code", "message"}, "meta": {...}}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        status: StatusCode,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            error: ErrorBody {
                code,
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    /// A 400 for a submission that failed validation.
    pub fn validation(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            request_id,
            StatusCode::BAD_REQUEST,
            "validation_error",
            message,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    version: &'static str,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/run", post(web::submit_run))
        .route("/api/v1/runs", post(runs::create_run))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(auth, require_session)),
        )
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/", get(web::index))
        .route("/logout", post(web::logout));

    let login_route = Router::new()
        .route("/login", post(web::login))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit.clone(),
            enforce_rate_limit,
        ));

    Router::new()
        .merge(public_routes)
        .merge(login_route)
        .merge(protected_router(state.auth.clone(), rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

/// Requests per minute shared by login attempts and run launches.
pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(30, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
