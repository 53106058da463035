use std::{
    collections::VecDeque,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{
        header::{LOCATION, RETRY_AFTER},
        HeaderMap, HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;
use crate::auth::AuthState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest caller-supplied request id that is echoed back.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Request id stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Sliding-window limiter shared by login attempts and run launches.
///
/// Remembers the instant of every admitted request in the last `window`.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    admitted: Arc<Mutex<VecDeque<Instant>>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            admitted: Arc::new(Mutex::new(VecDeque::with_capacity(max_requests))),
        }
    }

    /// Admit a request now, or say how long until a slot frees up.
    async fn try_admit(&self, now: Instant) -> Result<(), Duration> {
        let mut admitted = self.admitted.lock().await;
        while admitted
            .front()
            .is_some_and(|at| now.duration_since(*at) >= self.window)
        {
            admitted.pop_front();
        }

        if admitted.len() < self.max_requests {
            admitted.push_back(now);
            return Ok(());
        }

        let oldest = admitted.front().copied().unwrap_or(now);
        Err(self.window.saturating_sub(now.duration_since(oldest)))
    }
}

/// The caller's request id when it is printable and reasonably short.
fn incoming_request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_owned)
}

/// Tags every request and response with an `x-request-id`, generating a
/// `UUIDv4` when the caller did not send a usable one.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = incoming_request_id(req.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());
    req.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default()
}

/// Requires a live session when the password gate is on.
///
/// API callers get a JSON 401; browsers are sent back to the login page.
pub async fn require_session(State(auth): State<AuthState>, req: Request, next: Next) -> Response {
    if auth.is_authenticated(req.headers()).await {
        return next.run(req).await;
    }

    if req.uri().path().starts_with("/api/") {
        return ApiError::new(
            request_id_of(&req),
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "missing or expired session",
        )
        .into_response();
    }

    (StatusCode::SEE_OTHER, [(LOCATION, "/")]).into_response()
}

/// Rejects requests over the limit with 429 and a `Retry-After` hint.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    match rate_limit.try_admit(Instant::now()).await {
        Ok(()) => next.run(req).await,
        Err(wait) => {
            tracing::warn!(path = %req.uri().path(), retry_after_secs = wait.as_secs(), "rate limit exceeded");
            let mut response = ApiError::new(
                request_id_of(&req),
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "rate limit exceeded",
            )
            .into_response();
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(wait.as_secs().max(1)));
            response
        }
    }
}
