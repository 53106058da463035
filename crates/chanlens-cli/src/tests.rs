use std::io::Write;
use std::path::Path;

use clap::Parser;

use super::*;
use crate::artifacts::{load_insights, sibling};
use crate::run::{resolve_request, RunArgs};

fn test_config() -> chanlens_core::AppConfig {
    chanlens_core::build_app_config(|_| Err(std::env::VarError::NotPresent))
        .expect("defaults should build")
}

fn handles(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

#[test]
fn cli_parses_run_with_competitors() {
    let cli = Cli::try_parse_from([
        "chanlens",
        "run",
        "--channel",
        "@mine",
        "--competitors",
        "@a",
        "@b",
        "@c",
        "@d",
        "--days",
        "30",
        "--skip-slides",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Commands::Run {
            channel,
            competitors,
            days,
            skip_slides,
            config,
            output_dir,
        } => {
            assert_eq!(channel.as_deref(), Some("@mine"));
            assert_eq!(competitors, handles(&["@a", "@b", "@c", "@d"]));
            assert_eq!(days, Some(30));
            assert!(skip_slides);
            assert!(config.is_none());
            assert!(output_dir.is_none());
        }
        other => panic!("expected run command, got {other:?}"),
    }
}

#[test]
fn cli_parses_run_with_channel_set_only() {
    let cli = Cli::try_parse_from(["chanlens", "run", "--config", "channels.yaml"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Run { config: Some(ref path), .. } if path == Path::new("channels.yaml")
    ));
}

#[test]
fn cli_parses_artifact_commands() {
    let cli = Cli::try_parse_from(["chanlens", "analyze", "--input", "raw_data.json"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Analyze { output: None, .. }));

    let cli = Cli::try_parse_from([
        "chanlens",
        "insights",
        "--analytics",
        "out/analytics.json",
        "--output",
        "out/ai.json",
    ])
    .expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Insights { output: Some(_), .. }));

    let cli = Cli::try_parse_from(["chanlens", "report", "--analytics", "analytics.json"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Report { insights: None, .. }));
}

#[test]
fn cli_parses_placeholders_without_arguments() {
    let cli = Cli::try_parse_from(["chanlens", "placeholders"]).expect("should parse");
    assert!(matches!(cli.command, Commands::Placeholders));
    assert!(Cli::try_parse_from(["chanlens", "placeholders", "--analytics", "a.json"]).is_err());
}

#[test]
fn cli_rejects_missing_subcommand_and_non_numeric_days() {
    assert!(Cli::try_parse_from(["chanlens"]).is_err());
    assert!(Cli::try_parse_from(["chanlens", "run", "--channel", "@a", "--days", "sixty"]).is_err());
    assert!(Cli::try_parse_from(["chanlens", "analyze"]).is_err());
}

#[test]
fn resolve_request_uses_flags_and_default_days() {
    let config = test_config();
    let args = RunArgs {
        channel: Some(" @mine ".to_string()),
        competitors: handles(&["@a", "@b", "@c", "@d"]),
        ..RunArgs::default()
    };

    let request = resolve_request(&args, &config).expect("valid request");
    assert_eq!(request.channel, "@mine");
    assert_eq!(request.competitors.len(), 4);
    assert_eq!(request.days, config.default_days);
    assert!(!request.skip_report);
}

#[test]
fn resolve_request_reads_channel_set_and_lets_flags_win() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        "channel: \"@fromfile\"\ncompetitors: [\"@a\", \"@b\", \"@c\", \"@d\"]\ndays: 14"
    )
    .expect("write channel set");

    let config = test_config();
    let mut args = RunArgs {
        channel_set: Some(file.path().to_path_buf()),
        ..RunArgs::default()
    };
    let request = resolve_request(&args, &config).expect("valid request");
    assert_eq!(request.channel, "@fromfile");
    assert_eq!(request.days, 14);

    args.days = Some(90);
    args.channel = Some("@override".to_string());
    let request = resolve_request(&args, &config).expect("valid request");
    assert_eq!(request.channel, "@override");
    assert_eq!(request.days, 90);
    assert_eq!(request.competitors, handles(&["@a", "@b", "@c", "@d"]));
}

#[test]
fn resolve_request_requires_channel_and_competitors() {
    let config = test_config();

    let err = resolve_request(&RunArgs::default(), &config).unwrap_err();
    assert!(err.to_string().contains("--channel"));

    let args = RunArgs {
        channel: Some("@mine".to_string()),
        ..RunArgs::default()
    };
    let err = resolve_request(&args, &config).unwrap_err();
    assert!(err.to_string().contains("--competitors"));

    let args = RunArgs {
        channel: Some("@mine".to_string()),
        competitors: handles(&["@a", "@b", "@c", "@d"]),
        days: Some(0),
        ..RunArgs::default()
    };
    assert!(resolve_request(&args, &config).is_err());
}

#[test]
fn sibling_paths_sit_next_to_the_input() {
    assert_eq!(
        sibling(Path::new(".tmp/raw_data.json"), "analytics.json"),
        Path::new(".tmp/analytics.json")
    );
    assert_eq!(
        sibling(Path::new("raw_data.json"), "analytics.json"),
        Path::new("analytics.json")
    );
}

#[tokio::test]
async fn load_insights_is_optional_without_a_sibling_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let analytics = dir.path().join("analytics.json");

    assert!(load_insights(&analytics, None)
        .await
        .expect("missing sibling is fine")
        .is_none());

    std::fs::write(dir.path().join("insights.json"), r#"{"takeaways": ["ship more"]}"#)
        .expect("write insights");
    let insights = load_insights(&analytics, None)
        .await
        .expect("sibling parses")
        .expect("sibling found");
    assert_eq!(insights.takeaways, vec!["ship more".to_string()]);

    let missing = dir.path().join("nope.json");
    assert!(load_insights(&analytics, Some(&missing)).await.is_err());
}

#[tokio::test]
async fn analyze_writes_analytics_next_to_raw_data() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("raw_data.json");
    let video = |id: &str, views: u64| {
        serde_json::json!({
            "video_id": id,
            "title": format!("Video {id}"),
            "published_at": "2026-09-01T00:00:00Z",
            "views": views,
            "likes": 10,
            "comments": 2,
        })
    };
    let channel = |name: &str| {
        serde_json::json!({
            "channel_id": format!("UC{name}"),
            "channel_name": name,
            "period_videos": [video(&format!("{name}-1"), 1_000)],
            "baseline_videos": [video(&format!("{name}-b"), 500)],
        })
    };
    let raw = serde_json::json!({
        "days": 30,
        "channel": channel("Mine"),
        "competitors": [channel("Rival")],
    });
    std::fs::write(&input, raw.to_string()).expect("write raw data");

    artifacts::run_analyze(&input, None).await.expect("analyze succeeds");

    let written =
        std::fs::read_to_string(dir.path().join("analytics.json")).expect("analytics written");
    let analytics = chanlens_core::AnalyticsOutput::from_json(&written).expect("valid analytics");
    assert_eq!(analytics.channel.channel_name, "Mine");
    assert_eq!(analytics.competitors.len(), 1);
}
