//! Pipelines wired to the real YouTube, Anthropic and Google clients.

use chanlens_core::{AppConfig, ConfigError};
use chanlens_insights::InsightsClient;
use chanlens_slides::{CredentialSource, SlidesRenderer};
use chanlens_youtube::{FetchOptions, YoutubeClient};

use crate::error::PipelineError;
use crate::pipeline::{Pipeline, PipelineOptions};

/// Language-model replies run long; this replaces the general request timeout for them.
pub const INSIGHTS_TIMEOUT_SECS: u64 = 120;

pub type LivePipeline = Pipeline<YoutubeClient, InsightsClient, SlidesRenderer>;

/// Build a pipeline from application configuration.
///
/// Insights are enabled when `ANTHROPIC_API_KEY` is set; rendering when
/// `GOOGLE_SLIDES_TEMPLATE_ID` is set.
///
/// # Errors
///
/// - [`PipelineError::Config`] when `YOUTUBE_API_KEY` is missing.
/// - [`PipelineError::Setup`] when an HTTP client cannot be built.
pub fn live_pipeline(config: &AppConfig) -> Result<LivePipeline, PipelineError> {
    let api_key = config
        .youtube_api_key
        .as_deref()
        .ok_or_else(|| ConfigError::MissingEnvVar("YOUTUBE_API_KEY".to_string()))?;

    let youtube = YoutubeClient::new(api_key, config.request_timeout_secs)
        .map_err(|e| PipelineError::Setup {
            client: "YouTube",
            message: e.to_string(),
        })?
        .with_options(FetchOptions {
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_ms,
            shorts_check_delay_ms: config.shorts_check_delay_ms,
            baseline_size: config.baseline_size,
            ..FetchOptions::default()
        });

    let insights = config
        .anthropic_api_key
        .as_deref()
        .map(|key| InsightsClient::new(key, &config.anthropic_model, INSIGHTS_TIMEOUT_SECS))
        .transpose()
        .map_err(|e| PipelineError::Setup {
            client: "Anthropic",
            message: e.to_string(),
        })?;

    let renderer = config
        .slides_template_id
        .as_deref()
        .map(|template_id| {
            SlidesRenderer::new(
                Some(template_id),
                CredentialSource {
                    token_json: config.google_token_json.clone(),
                    token_path: config.google_token_path.clone(),
                },
                config.request_timeout_secs,
            )
            .map(|renderer| renderer.with_retry(config.max_retries, config.retry_backoff_ms))
        })
        .transpose()
        .map_err(|e| PipelineError::Setup {
            client: "Google Slides",
            message: e.to_string(),
        })?;

    Ok(Pipeline::new(youtube, PipelineOptions::from_config(config))
        .with_insights(insights)
        .with_renderer(renderer))
}
