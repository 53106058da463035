//! Browser-facing routes: login, the run form and its result page.

pub mod pages;

use axum::{
    extract::State,
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{Html, IntoResponse, Response},
    Form,
};
use chanlens_pipeline::{EventSink, PipelineEvent};
use serde::Deserialize;

use crate::api::{build_request, AppState};
use crate::auth::session_token;
use pages::{FormValues, RunOutcome};

/// Progress lines buffered while the form handler waits for a run to finish.
const EVENT_BUFFER: usize = 64;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    password: String,
}

#[derive(Debug, Deserialize)]
pub struct RunForm {
    #[serde(default)]
    channel: String,
    #[serde(default)]
    competitors: String,
    #[serde(default)]
    days: String,
}

fn redirect_home() -> Response {
    (StatusCode::SEE_OTHER, [(LOCATION, "/")]).into_response()
}

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    if state.auth.is_authenticated(&headers).await {
        Html(pages::form_page(
            &FormValues::default(),
            None,
            &state.limits,
            state.auth.enabled,
        ))
    } else {
        Html(pages::login_page(None))
    }
}

pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    if !state.auth.enabled {
        return redirect_home();
    }

    if !state.auth.verify_password(&form.password) {
        tracing::warn!("rejected login attempt");
        return (
            StatusCode::UNAUTHORIZED,
            Html(pages::login_page(Some("Incorrect password."))),
        )
            .into_response();
    }

    let token = state.auth.create_session().await;
    (
        StatusCode::SEE_OTHER,
        [
            (LOCATION, "/".to_string()),
            (SET_COOKIE, state.auth.session_cookie(&token)),
        ],
    )
        .into_response()
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.auth.revoke_session(token).await;
    }
    (
        StatusCode::SEE_OTHER,
        [
            (LOCATION, "/".to_string()),
            (SET_COOKIE, state.auth.clear_cookie()),
        ],
    )
        .into_response()
}

/// Run the pipeline for a form submission and render the outcome.
///
/// The request stays open until the run finishes.
pub async fn submit_run(State(state): State<AppState>, Form(form): Form<RunForm>) -> Response {
    let show_logout = state.auth.enabled;
    let values = FormValues {
        channel: form.channel,
        competitors: form.competitors,
        days: form.days.trim().to_string(),
    };
    let reject = |message: &str| {
        (
            StatusCode::BAD_REQUEST,
            Html(pages::form_page(&values, Some(message), &state.limits, show_logout)),
        )
            .into_response()
    };

    let days = if values.days.is_empty() {
        None
    } else {
        match values.days.parse::<u32>() {
            Ok(days) => Some(days),
            Err(_) => return reject("Analysis window must be a whole number of days."),
        }
    };
    let competitors: Vec<String> = values.competitors.lines().map(str::to_owned).collect();
    let request = match build_request(&values.channel, &competitors, days, false, &state.limits) {
        Ok(request) => request,
        Err(message) => return reject(&message),
    };

    tracing::info!(
        channel = %request.channel,
        competitors = request.competitors.len(),
        days = request.days,
        "run started via web form"
    );

    let (sink, mut events) = EventSink::channel(EVENT_BUFFER);
    let handle = state.launcher.launch(request, sink);

    let mut progress = Vec::new();
    let mut outcome = None;
    while let Some(event) = events.recv().await {
        match event {
            PipelineEvent::Progress { message } => progress.push(message),
            PipelineEvent::Error { message } => outcome = Some(RunOutcome::Failed(message)),
            PipelineEvent::Result { summary, .. } => {
                outcome = Some(RunOutcome::Finished(summary));
            }
        }
    }
    if let Err(e) = handle.await {
        tracing::error!(error = %e, "run task failed");
    }

    let outcome = outcome
        .unwrap_or_else(|| RunOutcome::Failed("The run ended without a result.".to_string()));
    Html(pages::result_page(&progress, &outcome, show_logout)).into_response()
}
