use std::path::PathBuf;
use std::sync::Arc;

use chanlens_core::{load_channel_set, AppConfig};
use chanlens_pipeline::{live_pipeline, spawn_run, EventSink, PipelineEvent, RunRequest, RunSummary};

/// Arguments of `chanlens run`, as parsed.
#[derive(Debug, Default)]
pub(crate) struct RunArgs {
    pub channel: Option<String>,
    pub competitors: Vec<String>,
    pub days: Option<u32>,
    pub skip_slides: bool,
    pub channel_set: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

/// Merge command-line flags over an optional channel-set file.
///
/// Flags win over the file; days fall back to the configured default.
///
/// # Errors
///
/// Returns an error if the channel-set file is invalid, no channel or
/// competitors are given, or the window is zero days.
pub(crate) fn resolve_request(args: &RunArgs, config: &AppConfig) -> anyhow::Result<RunRequest> {
    let set = args
        .channel_set
        .as_deref()
        .map(|path| load_channel_set(path, config.min_competitors, config.max_competitors))
        .transpose()?;

    let channel = args
        .channel
        .clone()
        .or_else(|| set.as_ref().map(|s| s.channel.clone()))
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("--channel is required unless --config is given"))?;

    let competitors = if args.competitors.is_empty() {
        set.as_ref().map(|s| s.competitors.clone()).unwrap_or_default()
    } else {
        args.competitors.clone()
    };
    if competitors.is_empty() {
        anyhow::bail!("--competitors is required unless --config is given");
    }

    let days = args
        .days
        .or_else(|| set.as_ref().and_then(|s| s.days))
        .unwrap_or(config.default_days);
    if days == 0 {
        anyhow::bail!("--days must be at least 1");
    }

    Ok(RunRequest {
        channel: channel.trim().to_string(),
        competitors: competitors.iter().map(|c| c.trim().to_string()).collect(),
        days,
        skip_report: args.skip_slides,
        run_id: None,
    })
}

/// Run the full pipeline, printing progress as it arrives.
///
/// # Errors
///
/// Returns an error if configuration is incomplete or the run fails.
pub(crate) async fn run_pipeline(mut config: AppConfig, args: RunArgs) -> anyhow::Result<()> {
    let request = resolve_request(&args, &config)?;
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }

    let pipeline = Arc::new(live_pipeline(&config)?);
    tracing::info!(
        channel = %request.channel,
        competitors = request.competitors.len(),
        days = request.days,
        "starting run"
    );

    println!("\n=== YouTube Competitor Analysis ===");
    let (sink, mut events) = EventSink::channel(64);
    let handle = spawn_run(pipeline, request, sink);

    let mut failure = None;
    while let Some(event) = events.recv().await {
        match event {
            PipelineEvent::Progress { message } => println!("{message}"),
            PipelineEvent::Error { message } => failure = Some(message),
            PipelineEvent::Result { summary, .. } => print_summary(&summary),
        }
    }
    handle.await?;

    match failure {
        Some(message) => anyhow::bail!(message),
        None => Ok(()),
    }
}

fn print_summary(summary: &RunSummary) {
    println!("\n=== Summary ===");
    println!("Channels fetched: {}", summary.channels_fetched);
    if !summary.failed_channels.is_empty() {
        println!(
            "Channels failed:  {} ({})",
            summary.failed_channels.len(),
            summary.failed_channels.join(", ")
        );
    }
    println!("Total videos:     {}", summary.total_videos);
    println!(
        "Est. quota used:  ~{} units (of 10,000 daily)",
        summary.quota_estimate
    );
    if let Some(path) = &summary.output_path {
        println!("Output saved to:  {}", path.display());
    }
    if let Some(url) = &summary.report_url {
        println!("Report:           {url}");
    }
}
