mod artifacts;
mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "chanlens",
    about = "Compare a YouTube channel against its competitors"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch, analyze, narrate and render a full competitor report
    Run {
        /// Your channel's @handle
        #[arg(long)]
        channel: Option<String>,

        /// Competitor @handles (4-7)
        #[arg(long, num_args = 1..)]
        competitors: Vec<String>,

        /// Analysis window in days [default: `CHANLENS_DEFAULT_DAYS`]
        #[arg(long)]
        days: Option<u32>,

        /// Stop after analytics and insights
        #[arg(long)]
        skip_slides: bool,

        /// Channel-set YAML file providing channel, competitors and days
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory for raw_data.json, analytics.json and insights.json
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Recompute analytics from a saved raw_data.json
    Analyze {
        #[arg(long)]
        input: PathBuf,

        /// Defaults to analytics.json next to the input
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Generate language-model insights for a saved analytics.json
    Insights {
        #[arg(long)]
        analytics: PathBuf,

        /// Defaults to insights.json next to the analytics file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Render a Google Slides report from saved artifacts
    Report {
        #[arg(long)]
        analytics: PathBuf,

        /// Defaults to insights.json next to the analytics file, when present
        #[arg(long)]
        insights: Option<PathBuf>,
    },
    /// Print every `{{key}}` token a Slides template can use
    Placeholders,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = chanlens_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            channel,
            competitors,
            days,
            skip_slides,
            config: channel_set,
            output_dir,
        } => {
            let args = run::RunArgs {
                channel,
                competitors,
                days,
                skip_slides,
                channel_set,
                output_dir,
            };
            run::run_pipeline(config, args).await
        }
        Commands::Analyze { input, output } => {
            artifacts::run_analyze(&input, output.as_deref()).await
        }
        Commands::Insights { analytics, output } => {
            artifacts::run_insights(&config, &analytics, output.as_deref()).await
        }
        Commands::Report {
            analytics,
            insights,
        } => artifacts::run_report(&config, &analytics, insights.as_deref()).await,
        Commands::Placeholders => {
            for key in chanlens_slides::placeholder_keys() {
                println!("{{{{{key}}}}}");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests;
