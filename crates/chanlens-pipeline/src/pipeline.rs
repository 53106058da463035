//! Run orchestration: fetch, analyze, narrate, render.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use chanlens_core::format;
use chanlens_core::{
    dedupe_competitors, validate_competitor_count, AnalyticsConfig, AnalyticsInput,
    AnalyticsOutput, Analyzer, ChannelData, ChannelRole, Insights, Narrative, NarrativeConfig,
};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::error::PipelineError;
use crate::events::{EventSink, PipelineEvent, RunSummary};
use crate::sources::{ChannelSource, Disabled, InsightGenerator, ReportRenderer};

/// YouTube API units a single channel fetch costs, roughly.
const QUOTA_UNITS_PER_CHANNEL: usize = 6;

/// What to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub channel: String,
    pub competitors: Vec<String>,
    pub days: u32,
    pub skip_report: bool,
    /// Subdirectory of the output directory that holds this run's artifacts.
    /// `None` writes straight into the output directory.
    pub run_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub min_competitors: usize,
    pub max_competitors: usize,
    /// Competitor fetches in flight at once; results are still reported in input order.
    pub max_concurrent_fetches: usize,
    /// Where `raw_data.json`, `analytics.json` and `insights.json` go; `None` writes nothing.
    pub output_dir: Option<PathBuf>,
    pub analytics: AnalyticsConfig,
    pub narrative: NarrativeConfig,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            min_competitors: 4,
            max_competitors: 7,
            max_concurrent_fetches: 1,
            output_dir: None,
            analytics: AnalyticsConfig::default(),
            narrative: NarrativeConfig::default(),
        }
    }
}

impl PipelineOptions {
    /// Options derived from application configuration.
    #[must_use]
    pub fn from_config(config: &chanlens_core::AppConfig) -> Self {
        Self {
            min_competitors: config.min_competitors,
            max_competitors: config.max_competitors,
            max_concurrent_fetches: config.max_concurrent_fetches,
            output_dir: Some(config.output_dir.clone()),
            ..Self::default()
        }
    }
}

/// A configured run: a channel source plus optional insight and report stages.
pub struct Pipeline<S, I, R> {
    source: S,
    insights: Option<I>,
    renderer: Option<R>,
    options: PipelineOptions,
}

impl<S: ChannelSource> Pipeline<S, Disabled, Disabled> {
    /// A pipeline with neither insights nor report rendering.
    pub fn new(source: S, options: PipelineOptions) -> Self {
        Self {
            source,
            insights: None,
            renderer: None,
            options,
        }
    }
}

impl<S, I, R> Pipeline<S, I, R>
where
    S: ChannelSource,
    I: InsightGenerator,
    R: ReportRenderer,
{
    /// Attach (or, with `None`, leave out) the insights stage.
    pub fn with_insights<I2: InsightGenerator>(self, insights: Option<I2>) -> Pipeline<S, I2, R> {
        Pipeline {
            source: self.source,
            insights,
            renderer: self.renderer,
            options: self.options,
        }
    }

    /// Attach (or, with `None`, leave out) the report stage.
    pub fn with_renderer<R2: ReportRenderer>(self, renderer: Option<R2>) -> Pipeline<S, I, R2> {
        Pipeline {
            source: self.source,
            insights: self.insights,
            renderer,
            options: self.options,
        }
    }

    #[must_use]
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Run the whole analysis, reporting progress on `events`.
    ///
    /// Competitor fetch failures, insight failures and report failures are
    /// reported as progress and do not fail the run.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Config`] when the competitor count is out of bounds.
    /// - [`PipelineError::TooFewUnique`] when deduplication leaves too few competitors.
    /// - [`PipelineError::PrimaryFetch`] when the primary channel cannot be fetched.
    /// - [`PipelineError::TooFewFetched`] when too many competitor fetches fail.
    /// - [`PipelineError::InvalidRunId`] when the run id is not a single path segment.
    /// - [`PipelineError::Io`] / [`PipelineError::Serialize`] when raw data or
    ///   analytics cannot be written.
    pub async fn run(
        &self,
        request: &RunRequest,
        events: &EventSink,
    ) -> Result<RunSummary, PipelineError> {
        let opts = &self.options;
        let run_dir = resolve_run_dir(opts.output_dir.as_deref(), request.run_id.as_deref())?;
        validate_competitor_count(
            request.competitors.len(),
            opts.min_competitors,
            opts.max_competitors,
        )?;

        let (competitors, warnings) = dedupe_competitors(&request.channel, &request.competitors);
        for warning in warnings {
            events.progress(format!("  Warning: {warning}")).await;
        }
        if competitors.len() < opts.min_competitors {
            return Err(PipelineError::TooFewUnique {
                remaining: competitors.len(),
                min: opts.min_competitors,
            });
        }

        events.progress(format!("Channel: {}", request.channel)).await;
        events
            .progress(format!("Competitors: {}", competitors.join(", ")))
            .await;
        events.progress(format!("Window: {} days", request.days)).await;

        events
            .progress(format!("Fetching data for {}...", request.channel))
            .await;
        let primary = match self.source.fetch_channel(&request.channel, request.days).await {
            Ok(data) => data.with_role(ChannelRole::Primary),
            Err(e) => {
                return Err(PipelineError::PrimaryFetch {
                    handle: request.channel.clone(),
                    message: e.to_string(),
                })
            }
        };
        events.progress(cohort_line(&primary)).await;
        let mut total_videos = primary.period_videos.len() + primary.baseline_videos.len();

        let results: Vec<(String, Result<ChannelData, String>)> = stream::iter(competitors)
            .map(|handle| async move {
                events.progress(format!("Fetching data for {handle}...")).await;
                let result = self
                    .source
                    .fetch_channel(&handle, request.days)
                    .await
                    .map_err(|e| e.to_string());
                (handle, result)
            })
            .buffered(opts.max_concurrent_fetches.max(1))
            .collect()
            .await;

        let mut fetched = Vec::with_capacity(results.len());
        let mut failed_channels = Vec::new();
        for (handle, result) in results {
            match result {
                Ok(data) => {
                    events.progress(cohort_line(&data)).await;
                    total_videos += data.period_videos.len() + data.baseline_videos.len();
                    fetched.push(data.with_role(ChannelRole::Competitor));
                }
                Err(message) => {
                    tracing::warn!(handle = %handle, error = %message, "competitor fetch failed");
                    events
                        .progress(format!("  Warning: skipping {handle} — {message}"))
                        .await;
                    failed_channels.push(handle);
                }
            }
        }
        if fetched.len() < opts.min_competitors {
            return Err(PipelineError::TooFewFetched {
                fetched: fetched.len(),
                min: opts.min_competitors,
            });
        }

        let input = AnalyticsInput {
            generated_at: Some(Utc::now()),
            days: request.days,
            channel: primary,
            competitors: fetched,
        };
        let raw_path = match &run_dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir)
                    .await
                    .map_err(|source| PipelineError::Io {
                        path: dir.display().to_string(),
                        source,
                    })?;
                let path = dir.join("raw_data.json");
                write_json(&path, &input, "raw data").await?;
                Some(path)
            }
            None => None,
        };

        events.progress("Running analytics...").await;
        let analytics = Analyzer::new(opts.analytics.clone()).process_all(&input);
        if let Some(dir) = &run_dir {
            write_json(&dir.join("analytics.json"), &analytics, "analytics").await?;
        }
        report_highlights(&analytics, events).await;

        let insights = self
            .generate_insights(&analytics, run_dir.as_deref(), events)
            .await;
        let narrative = Narrative::resolve(&analytics, insights.as_ref(), &opts.narrative);
        let report_url = self
            .render_report(&analytics, &narrative, request.skip_report, events)
            .await;

        let channels_fetched = 1 + input.competitors.len();
        Ok(RunSummary {
            channels_fetched,
            failed_channels,
            total_videos,
            quota_estimate: channels_fetched * QUOTA_UNITS_PER_CHANNEL,
            output_path: raw_path,
            report_url,
        })
    }

    /// Generate and save insights. Any failure, including failing to save
    /// `insights.json`, falls back to the data-driven narrative.
    async fn generate_insights(
        &self,
        analytics: &AnalyticsOutput,
        run_dir: Option<&Path>,
        events: &EventSink,
    ) -> Option<Insights> {
        let Some(generator) = &self.insights else {
            events
                .progress("Skipping AI insights (ANTHROPIC_API_KEY not set)")
                .await;
            return None;
        };

        events.progress("Generating AI insights...").await;
        let outcome = match generator.generate(analytics).await {
            Ok(insights) => match run_dir {
                Some(dir) => write_json(&dir.join("insights.json"), &insights, "insights")
                    .await
                    .map(|()| insights)
                    .map_err(|e| e.to_string()),
                None => Ok(insights),
            },
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok(insights) => {
                events.progress("  AI insights generated").await;
                Some(insights)
            }
            Err(message) => {
                tracing::warn!(error = %message, "insight generation failed");
                events
                    .progress(format!("  Warning: AI insights failed — {message}"))
                    .await;
                events
                    .progress("  Continuing with data-driven fallback content.")
                    .await;
                None
            }
        }
    }

    async fn render_report(
        &self,
        analytics: &AnalyticsOutput,
        narrative: &Narrative,
        skip: bool,
        events: &EventSink,
    ) -> Option<String> {
        if skip {
            events.progress("Skipping Google Slides report (skip requested)").await;
            return None;
        }
        let Some(renderer) = &self.renderer else {
            events
                .progress("Skipping Google Slides report (not configured)")
                .await;
            return None;
        };

        events.progress("Generating Google Slides report...").await;
        match renderer.render(analytics, narrative).await {
            Ok(url) => {
                events.progress(format!("  Report URL: {url}")).await;
                Some(url)
            }
            Err(e) => {
                tracing::warn!(error = %e, "report rendering failed");
                events
                    .progress(format!("  Warning: report generation failed — {e}"))
                    .await;
                None
            }
        }
    }
}

/// Where this run's artifacts go, if anywhere.
fn resolve_run_dir(
    output_dir: Option<&Path>,
    run_id: Option<&str>,
) -> Result<Option<PathBuf>, PipelineError> {
    let Some(base) = output_dir else {
        return Ok(None);
    };
    let Some(id) = run_id else {
        return Ok(Some(base.to_path_buf()));
    };
    let mut components = Path::new(id).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(Some(base.join(id))),
        _ => Err(PipelineError::InvalidRunId(id.to_string())),
    }
}

fn cohort_line(data: &ChannelData) -> String {
    format!(
        "  {}: {} videos in period, {} baseline",
        data.channel_name,
        data.period_videos.len(),
        data.baseline_videos.len()
    )
}

async fn report_highlights(analytics: &AnalyticsOutput, events: &EventSink) {
    let comparative = &analytics.comparative;
    let Some(top_video) = comparative.cross_channel_leaderboard.first() else {
        return;
    };
    events
        .progress(format!(
            "  Top performer: {}",
            comparative.top_performer.as_deref().unwrap_or("N/A")
        ))
        .await;
    events
        .progress(format!(
            "  Highest outlier: \"{}\" by {}",
            top_video.title, top_video.channel_name
        ))
        .await;
    events
        .progress(format!(
            "    {} median ({} views)",
            format::outlier(top_video.outlier_score),
            format::number(top_video.views)
        ))
        .await;
}

async fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    context: &str,
) -> Result<(), PipelineError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| PipelineError::Serialize {
        context: context.to_string(),
        source,
    })?;
    tokio::fs::write(path, json)
        .await
        .map_err(|source| PipelineError::Io {
            path: path.display().to_string(),
            source,
        })
}

/// Run `pipeline` on its own task, forwarding progress to `events` and
/// finishing with exactly one `Error` or `Result` event.
pub fn spawn_run<S, I, R>(
    pipeline: Arc<Pipeline<S, I, R>>,
    request: RunRequest,
    events: EventSink,
) -> JoinHandle<()>
where
    S: ChannelSource + 'static,
    I: InsightGenerator + 'static,
    R: ReportRenderer + 'static,
{
    tokio::spawn(async move {
        let inner_events = events.clone();
        let run = tokio::spawn(async move { pipeline.run(&request, &inner_events).await });

        let terminal = match run.await {
            Ok(Ok(summary)) => PipelineEvent::Result {
                report_url: summary.report_url.clone(),
                summary,
            },
            Ok(Err(e)) => PipelineEvent::Error {
                message: e.to_string(),
            },
            Err(join_err) => {
                tracing::error!(error = %join_err, "pipeline task aborted");
                PipelineEvent::Error {
                    message: format!("pipeline task failed: {join_err}"),
                }
            }
        };
        events.send(terminal).await;
    })
}
