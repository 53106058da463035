//! Pipeline runs against in-memory sources.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chanlens_core::{AnalyticsOutput, ChannelData, ChannelRole, Insights, Narrative, Video};
use chanlens_pipeline::{
    spawn_run, ChannelSource, EventSink, InsightGenerator, Pipeline, PipelineError,
    PipelineEvent, PipelineOptions, ReportRenderer, RunRequest,
};
use chrono::Utc;

fn video(id: &str, views: u64) -> Video {
    Video {
        video_id: id.to_string(),
        title: format!("Video {id}"),
        published_at: Utc::now(),
        views,
        likes: views / 20,
        comments: 0,
        duration_seconds: 600,
    }
}

fn channel(handle: &str, views: u64) -> ChannelData {
    let name = handle.trim_start_matches('@').to_uppercase();
    ChannelData {
        channel_id: format!("UC{name}"),
        channel_name: name.clone(),
        subscriber_count: Some(1_000),
        total_views: 0,
        uploads_playlist_id: None,
        role: ChannelRole::Competitor,
        period_videos: vec![video(&format!("{name}-1"), views), video(&format!("{name}-2"), views / 2)],
        baseline_videos: vec![video(&format!("{name}-b"), 100)],
    }
}

#[derive(Default)]
struct FakeSource {
    failures: HashMap<String, String>,
    delays_ms: HashMap<String, u64>,
}

impl FakeSource {
    fn failing(mut self, handle: &str, message: &str) -> Self {
        self.failures.insert(handle.to_string(), message.to_string());
        self
    }

    fn delayed(mut self, handle: &str, ms: u64) -> Self {
        self.delays_ms.insert(handle.to_string(), ms);
        self
    }
}

impl ChannelSource for FakeSource {
    type Error = String;

    async fn fetch_channel(&self, handle: &str, _days: u32) -> Result<ChannelData, String> {
        if let Some(ms) = self.delays_ms.get(handle) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }
        match self.failures.get(handle) {
            Some(message) => Err(message.clone()),
            None => Ok(channel(handle, 1_000 + handle.len() as u64 * 100)),
        }
    }
}

struct FakeInsights(Result<Insights, String>);

impl InsightGenerator for FakeInsights {
    type Error = String;

    async fn generate(&self, _analytics: &AnalyticsOutput) -> Result<Insights, String> {
        self.0.clone()
    }
}

struct FakeRenderer {
    result: Result<String, String>,
    calls: Arc<AtomicUsize>,
}

impl FakeRenderer {
    fn new(result: Result<String, String>) -> Self {
        Self {
            result,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ReportRenderer for FakeRenderer {
    type Error = String;

    async fn render(&self, _analytics: &AnalyticsOutput, narrative: &Narrative) -> Result<String, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(narrative.takeaways.len(), 3);
        self.result.clone()
    }
}

fn request(competitors: &[&str]) -> RunRequest {
    RunRequest {
        channel: "@main".to_string(),
        competitors: competitors.iter().map(ToString::to_string).collect(),
        days: 30,
        skip_report: false,
        run_id: None,
    }
}

const FOUR: [&str; 4] = ["@alpha", "@beta", "@gamma", "@delta"];

async fn run_collecting<S, I, R>(
    pipeline: &Pipeline<S, I, R>,
    request: &RunRequest,
) -> (Result<chanlens_pipeline::RunSummary, PipelineError>, Vec<String>)
where
    S: ChannelSource,
    I: InsightGenerator,
    R: ReportRenderer,
{
    let (sink, mut rx) = EventSink::channel(1_024);
    let result = pipeline.run(request, &sink).await;
    drop(sink);
    let mut messages = Vec::new();
    while let Some(event) = rx.recv().await {
        if let PipelineEvent::Progress { message } = event {
            messages.push(message);
        }
    }
    (result, messages)
}

#[tokio::test]
async fn full_run_writes_artifacts_and_summarizes() {
    let dir = tempfile::tempdir().unwrap();
    let options = PipelineOptions {
        output_dir: Some(dir.path().join("out")),
        ..PipelineOptions::default()
    };
    let insights = Insights {
        takeaways: vec!["a".into(), "b".into(), "c".into()],
        ..Insights::default()
    };
    let renderer = FakeRenderer::new(Ok("https://docs.example/deck".to_string()));
    let calls = Arc::clone(&renderer.calls);
    let pipeline = Pipeline::new(FakeSource::default(), options)
        .with_insights(Some(FakeInsights(Ok(insights))))
        .with_renderer(Some(renderer));

    let (result, messages) = run_collecting(&pipeline, &request(&FOUR)).await;
    let summary = result.expect("run should succeed");

    assert_eq!(summary.channels_fetched, 5);
    assert!(summary.failed_channels.is_empty());
    assert_eq!(summary.total_videos, 15);
    assert_eq!(summary.quota_estimate, 30);
    assert_eq!(summary.report_url.as_deref(), Some("https://docs.example/deck"));
    assert_eq!(summary.output_path, Some(dir.path().join("out").join("raw_data.json")));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    for file in ["raw_data.json", "analytics.json", "insights.json"] {
        assert!(dir.path().join("out").join(file).exists(), "{file} missing");
    }
    let analytics = AnalyticsOutput::from_json(
        &std::fs::read_to_string(dir.path().join("out").join("analytics.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(analytics.days, 30);
    assert_eq!(analytics.channel.role, ChannelRole::Primary);
    assert_eq!(analytics.competitors.len(), 4);

    assert_eq!(messages[0], "Channel: @main");
    assert_eq!(messages[1], "Competitors: @alpha, @beta, @gamma, @delta");
    assert_eq!(messages[2], "Window: 30 days");
    assert!(messages.contains(&"  MAIN: 2 videos in period, 1 baseline".to_string()));
    assert!(messages.contains(&"  AI insights generated".to_string()));
    assert!(messages.iter().any(|m| m.starts_with("  Highest outlier: \"Video ")));
}

#[tokio::test]
async fn duplicates_are_dropped_with_warnings() {
    let pipeline = Pipeline::new(FakeSource::default(), PipelineOptions::default());

    let (result, messages) =
        run_collecting(&pipeline, &request(&["@alpha", "@Main", "@beta", "@gamma", "@delta"])).await;

    let summary = result.expect("four unique competitors remain");
    assert_eq!(summary.channels_fetched, 5);
    assert_eq!(messages[0], "  Warning: duplicate handle @main — skipping");
}

#[tokio::test]
async fn too_few_unique_competitors_is_an_error() {
    let pipeline = Pipeline::new(FakeSource::default(), PipelineOptions::default());

    let (result, _) =
        run_collecting(&pipeline, &request(&["@alpha", "@ALPHA", "@beta", "@gamma"])).await;

    let err = result.unwrap_err();
    assert!(matches!(err, PipelineError::TooFewUnique { remaining: 3, min: 4 }), "got {err:?}");
    assert_eq!(
        err.to_string(),
        "After deduplication, only 3 unique competitors remain (need 4)"
    );
}

#[tokio::test]
async fn competitor_count_is_bounded() {
    let pipeline = Pipeline::new(FakeSource::default(), PipelineOptions::default());

    let (result, _) = run_collecting(&pipeline, &request(&["@alpha", "@beta", "@gamma"])).await;
    assert!(result.unwrap_err().to_string().contains("need at least 4 competitors, got 3"));

    let eight = ["@a", "@b", "@c", "@d", "@e", "@f", "@g", "@h"];
    let (result, _) = run_collecting(&pipeline, &request(&eight)).await;
    assert!(result.unwrap_err().to_string().contains("max 7 competitors, got 8"));
}

#[tokio::test]
async fn primary_fetch_failure_is_fatal() {
    let source = FakeSource::default().failing("@main", "channel not found for handle: @main");
    let pipeline = Pipeline::new(source, PipelineOptions::default());

    let (result, _) = run_collecting(&pipeline, &request(&FOUR)).await;

    assert_eq!(
        result.unwrap_err().to_string(),
        "Error fetching @main: channel not found for handle: @main\nCannot continue without the primary channel."
    );
}

#[tokio::test]
async fn failed_competitor_is_skipped() {
    let source = FakeSource::default().failing("@beta", "quota exceeded");
    let pipeline = Pipeline::new(source, PipelineOptions::default());

    let (result, messages) = run_collecting(
        &pipeline,
        &request(&["@alpha", "@beta", "@gamma", "@delta", "@epsilon"]),
    )
    .await;

    let summary = result.expect("four competitors still fetched");
    assert_eq!(summary.failed_channels, vec!["@beta".to_string()]);
    assert_eq!(summary.channels_fetched, 5);
    assert!(messages.contains(&"  Warning: skipping @beta — quota exceeded".to_string()));
}

#[tokio::test]
async fn too_many_competitor_failures_abort() {
    let source = FakeSource::default().failing("@beta", "boom");
    let pipeline = Pipeline::new(source, PipelineOptions::default());

    let (result, _) = run_collecting(&pipeline, &request(&FOUR)).await;

    assert!(matches!(
        result.unwrap_err(),
        PipelineError::TooFewFetched { fetched: 3, min: 4 }
    ));
}

#[tokio::test]
async fn insight_failure_falls_back_and_render_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let options = PipelineOptions {
        output_dir: Some(dir.path().to_path_buf()),
        ..PipelineOptions::default()
    };
    let pipeline = Pipeline::new(FakeSource::default(), options)
        .with_insights(Some(FakeInsights(Err("rate limited".to_string()))))
        .with_renderer(Some(FakeRenderer::new(Err("template missing".to_string()))));

    let (result, messages) = run_collecting(&pipeline, &request(&FOUR)).await;

    let summary = result.expect("insight and render failures are not fatal");
    assert_eq!(summary.report_url, None);
    assert!(!dir.path().join("insights.json").exists());
    assert!(messages.contains(&"  Warning: AI insights failed — rate limited".to_string()));
    assert!(messages.contains(&"  Continuing with data-driven fallback content.".to_string()));
    assert!(messages.contains(&"  Warning: report generation failed — template missing".to_string()));
}

#[tokio::test]
async fn unwritable_insights_file_falls_back_instead_of_failing() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("insights.json")).unwrap();
    let options = PipelineOptions {
        output_dir: Some(dir.path().to_path_buf()),
        ..PipelineOptions::default()
    };
    let pipeline = Pipeline::new(FakeSource::default(), options)
        .with_insights(Some(FakeInsights(Ok(Insights::default()))));

    let (result, messages) = run_collecting(&pipeline, &request(&FOUR)).await;

    let summary = result.expect("an unsaved insights file is not fatal");
    assert_eq!(summary.channels_fetched, 5);
    assert!(dir.path().join("analytics.json").is_file());
    assert!(messages
        .iter()
        .any(|m| m.starts_with("  Warning: AI insights failed — failed to write")));
    assert!(messages.contains(&"  Continuing with data-driven fallback content.".to_string()));
    assert!(!messages.contains(&"  AI insights generated".to_string()));
}

#[tokio::test]
async fn run_id_keeps_artifacts_in_their_own_directory() {
    let dir = tempfile::tempdir().unwrap();
    let options = PipelineOptions {
        output_dir: Some(dir.path().to_path_buf()),
        ..PipelineOptions::default()
    };
    let pipeline = Pipeline::new(FakeSource::default(), options);

    let mut first = request(&FOUR);
    first.run_id = Some("run-a".to_string());
    let mut second = request(&FOUR);
    second.run_id = Some("run-b".to_string());

    let (a, b) = tokio::join!(
        run_collecting(&pipeline, &first),
        run_collecting(&pipeline, &second)
    );

    let a = a.0.expect("first run succeeds");
    let b = b.0.expect("second run succeeds");
    assert_eq!(a.output_path, Some(dir.path().join("run-a").join("raw_data.json")));
    assert_eq!(b.output_path, Some(dir.path().join("run-b").join("raw_data.json")));
    assert!(dir.path().join("run-a").join("analytics.json").is_file());
    assert!(dir.path().join("run-b").join("analytics.json").is_file());
    assert!(!dir.path().join("raw_data.json").exists());
}

#[tokio::test]
async fn run_id_must_be_a_single_path_segment() {
    let dir = tempfile::tempdir().unwrap();
    let options = PipelineOptions {
        output_dir: Some(dir.path().join("out")),
        ..PipelineOptions::default()
    };
    let pipeline = Pipeline::new(FakeSource::default(), options);

    for bad in ["../escape", "a/b", ".."] {
        let mut req = request(&FOUR);
        req.run_id = Some(bad.to_string());
        let (result, _) = run_collecting(&pipeline, &req).await;
        assert!(
            matches!(result, Err(PipelineError::InvalidRunId(ref id)) if id == bad),
            "{bad} should be rejected"
        );
    }
    assert!(!dir.path().join("out").exists());
}

#[tokio::test]
async fn skip_report_never_calls_renderer() {
    let renderer = FakeRenderer::new(Ok("unused".to_string()));
    let calls = Arc::clone(&renderer.calls);
    let pipeline =
        Pipeline::new(FakeSource::default(), PipelineOptions::default()).with_renderer(Some(renderer));
    let mut req = request(&FOUR);
    req.skip_report = true;

    let (result, _) = run_collecting(&pipeline, &req).await;

    assert!(result.unwrap().report_url.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn concurrent_fetches_report_in_input_order() {
    let source = FakeSource::default()
        .delayed("@alpha", 60)
        .delayed("@beta", 5)
        .delayed("@gamma", 30);
    let options = PipelineOptions {
        max_concurrent_fetches: 4,
        ..PipelineOptions::default()
    };
    let pipeline = Pipeline::new(source, options);

    let (result, messages) = run_collecting(&pipeline, &request(&FOUR)).await;
    result.expect("run should succeed");

    let cohorts: Vec<&str> = messages
        .iter()
        .filter(|m| m.ends_with("baseline") && !m.contains("MAIN"))
        .map(String::as_str)
        .collect();
    assert_eq!(
        cohorts,
        vec![
            "  ALPHA: 2 videos in period, 1 baseline",
            "  BETA: 2 videos in period, 1 baseline",
            "  GAMMA: 2 videos in period, 1 baseline",
            "  DELTA: 2 videos in period, 1 baseline",
        ]
    );
}

#[tokio::test]
async fn spawned_run_ends_with_one_terminal_event() {
    let pipeline = Arc::new(Pipeline::new(FakeSource::default(), PipelineOptions::default()));
    let (sink, mut rx) = EventSink::channel(16);
    let handle = spawn_run(pipeline, request(&FOUR), sink);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    handle.await.unwrap();

    assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
    match events.last() {
        Some(PipelineEvent::Result { summary, report_url }) => {
            assert_eq!(summary.channels_fetched, 5);
            assert!(report_url.is_none());
        }
        other => panic!("expected result event, got {other:?}"),
    }
}

#[tokio::test]
async fn spawned_run_reports_errors_as_terminal_event() {
    let pipeline = Arc::new(Pipeline::new(FakeSource::default(), PipelineOptions::default()));
    let (sink, mut rx) = EventSink::channel(16);
    spawn_run(pipeline, request(&["@alpha"]), sink);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    assert_eq!(events.len(), 1);
    assert!(
        matches!(&events[0], PipelineEvent::Error { message } if message.contains("need at least 4")),
        "got {events:?}"
    );
}
