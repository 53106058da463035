use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Extension, Json,
};
use chanlens_core::AppConfig;
use chanlens_pipeline::{EventSink, PipelineEvent, RunRequest};
use futures::stream::{self, Stream};
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiError, AppState};
use crate::middleware::RequestId;

pub const MIN_DAYS: u32 = 7;
pub const MAX_DAYS: u32 = 365;

/// Progress events buffered before a slow client applies back-pressure.
const EVENT_BUFFER: usize = 64;

/// Bounds applied to web and API run submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLimits {
    pub min_competitors: usize,
    pub max_competitors: usize,
    pub default_days: u32,
}

impl RunLimits {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            min_competitors: config.min_competitors,
            max_competitors: config.max_competitors,
            default_days: config.default_days,
        }
    }
}

/// Validate a submission and turn it into a [`RunRequest`].
///
/// Blank competitor entries are ignored. Errors are user-facing sentences.
/// Each accepted request gets a fresh run id so concurrent runs write their
/// artifacts to separate directories.
pub(crate) fn build_request(
    channel: &str,
    competitors: &[String],
    days: Option<u32>,
    skip_report: bool,
    limits: &RunLimits,
) -> Result<RunRequest, String> {
    let channel = channel.trim();
    if channel.is_empty() {
        return Err("Please enter your channel handle.".to_string());
    }

    let competitors: Vec<String> = competitors
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
        .collect();
    if competitors.len() < limits.min_competitors {
        return Err(format!(
            "Need at least {} competitors, got {}.",
            limits.min_competitors,
            competitors.len()
        ));
    }
    if competitors.len() > limits.max_competitors {
        return Err(format!(
            "Max {} competitors, got {}.",
            limits.max_competitors,
            competitors.len()
        ));
    }

    let days = days.unwrap_or(limits.default_days);
    if !(MIN_DAYS..=MAX_DAYS).contains(&days) {
        return Err(format!(
            "Analysis window must be between {MIN_DAYS} and {MAX_DAYS} days, got {days}."
        ));
    }

    Ok(RunRequest {
        channel: channel.to_string(),
        competitors,
        days,
        skip_report,
        run_id: Some(Uuid::new_v4().to_string()),
    })
}

#[derive(Debug, Deserialize)]
pub(super) struct RunBody {
    channel: String,
    #[serde(default)]
    competitors: Vec<String>,
    days: Option<u32>,
    #[serde(default)]
    skip_report: bool,
}

fn sse_event(event: &PipelineEvent) -> Result<Event, axum::Error> {
    let kind = match event {
        PipelineEvent::Progress { .. } => "progress",
        PipelineEvent::Error { .. } => "error",
        PipelineEvent::Result { .. } => "result",
    };
    Event::default().event(kind).json_data(event)
}

/// Start a run and stream its events as server-sent events.
///
/// The stream closes after the terminal `error` or `result` event. A client
/// that disconnects early does not cancel the run.
pub(super) async fn create_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<RunBody>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let request = build_request(
        &body.channel,
        &body.competitors,
        body.days,
        body.skip_report,
        &state.limits,
    )
    .map_err(|message| ApiError::validation(req_id.0.clone(), message))?;

    tracing::info!(
        request_id = %req_id.0,
        channel = %request.channel,
        competitors = request.competitors.len(),
        days = request.days,
        "run started via api"
    );

    let (sink, events) = EventSink::channel(EVENT_BUFFER);
    drop(state.launcher.launch(request, sink));

    let stream = stream::unfold(events, |mut events| async move {
        let event = events.recv().await?;
        Some((sse_event(&event), events))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
