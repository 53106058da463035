//! Subcommands that work from saved JSON artifacts instead of a live fetch.

use std::path::{Path, PathBuf};

use chanlens_core::{
    format, AnalyticsConfig, AnalyticsInput, AnalyticsOutput, Analyzer, AppConfig, Insights,
    Narrative, NarrativeConfig,
};
use chanlens_insights::InsightsClient;
use chanlens_pipeline::live::INSIGHTS_TIMEOUT_SECS;
use chanlens_slides::{CredentialSource, SlidesRenderer};
use serde::Serialize;

/// `dir/of/input/<name>`, or just `<name>` when the input has no parent.
pub(crate) fn sibling(path: &Path, name: &str) -> PathBuf {
    path.parent()
        .map_or_else(|| PathBuf::from(name), |dir| dir.join(name))
}

async fn read_text(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))
}

async fn write_pretty<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))
}

async fn load_analytics(path: &Path) -> anyhow::Result<AnalyticsOutput> {
    Ok(AnalyticsOutput::from_json(&read_text(path).await?)?)
}

/// Recompute `analytics.json` from a saved `raw_data.json`.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed, or the output
/// cannot be written.
pub(crate) async fn run_analyze(input: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let raw = AnalyticsInput::from_json(&read_text(input).await?)?;
    let analytics = Analyzer::new(AnalyticsConfig::default()).process_all(&raw);

    let output = output.map_or_else(|| sibling(input, "analytics.json"), Path::to_path_buf);
    write_pretty(&output, &analytics).await?;

    println!(
        "  Channels analyzed: {}",
        1 + analytics.competitors.len()
    );
    println!(
        "  Top performer:    {}",
        analytics.comparative.top_performer.as_deref().unwrap_or("N/A")
    );
    println!("  Analytics saved:  {}", output.display());
    Ok(())
}

/// Generate `insights.json` for a saved `analytics.json`.
///
/// # Errors
///
/// Returns an error if `ANTHROPIC_API_KEY` is unset, the analytics file is
/// unreadable, or any language-model request fails.
pub(crate) async fn run_insights(
    config: &AppConfig,
    analytics_path: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let api_key = config
        .anthropic_api_key
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("ANTHROPIC_API_KEY is not set; cannot generate insights"))?;

    let analytics = load_analytics(analytics_path).await?;
    let client = InsightsClient::new(api_key, &config.anthropic_model, INSIGHTS_TIMEOUT_SECS)
        .map_err(|e| anyhow::anyhow!("failed to build Anthropic client: {e}"))?;

    println!("Generating AI insights for {}...", analytics.channel.channel_name);
    let insights = client.generate_insights(&analytics).await?;

    let output = output.map_or_else(|| sibling(analytics_path, "insights.json"), Path::to_path_buf);
    write_pretty(&output, &insights).await?;

    println!("  Insights saved: {}", output.display());
    println!(
        "  Comparative overview: {}",
        format::truncate(&insights.comparative_analysis.overview, 100)
    );
    println!("  Video ideas: {}", insights.video_ideas.len());
    println!("  Takeaways: {}", insights.takeaways.len());
    Ok(())
}

/// Load insights from an explicit path, or from `insights.json` beside the
/// analytics file when that exists.
pub(crate) async fn load_insights(
    analytics_path: &Path,
    explicit: Option<&Path>,
) -> anyhow::Result<Option<Insights>> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = sibling(analytics_path, "insights.json");
            if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                return Ok(None);
            }
            candidate
        }
    };
    Ok(Some(Insights::from_json(&read_text(&path).await?)?))
}

/// Render a Google Slides report from saved artifacts.
///
/// # Errors
///
/// Returns an error if the artifacts cannot be read, or the template,
/// credentials or Google APIs fail.
pub(crate) async fn run_report(
    config: &AppConfig,
    analytics_path: &Path,
    insights_path: Option<&Path>,
) -> anyhow::Result<()> {
    let analytics = load_analytics(analytics_path).await?;
    let insights = load_insights(analytics_path, insights_path).await?;
    if insights.is_none() {
        println!("  No insights found; using data-driven fallback content.");
    }
    let narrative = Narrative::resolve(&analytics, insights.as_ref(), &NarrativeConfig::default());

    let renderer = SlidesRenderer::new(
        config.slides_template_id.as_deref(),
        CredentialSource {
            token_json: config.google_token_json.clone(),
            token_path: config.google_token_path.clone(),
        },
        config.request_timeout_secs,
    )
    .map_err(|e| anyhow::anyhow!("failed to build Google Slides client: {e}"))?
    .with_retry(config.max_retries, config.retry_backoff_ms);

    println!("Generating Google Slides report...");
    let url = renderer.render(&analytics, &narrative).await?;
    println!("\n  Report URL: {url}");
    Ok(())
}
