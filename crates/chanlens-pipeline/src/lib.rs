//! End-to-end competitor analysis runs.
//!
//! A [`Pipeline`] fetches the primary channel and its competitors, runs the
//! analytics engine, optionally asks a language model for insights, and
//! renders a report. Progress is reported as [`PipelineEvent`]s so the CLI
//! and the web server can present the same run differently.

pub mod error;
pub mod events;
pub mod live;
pub mod pipeline;
pub mod sources;

pub use error::PipelineError;
pub use events::{EventSink, PipelineEvent, RunSummary};
pub use live::{live_pipeline, LivePipeline};
pub use pipeline::{spawn_run, Pipeline, PipelineOptions, RunRequest};
pub use sources::{ChannelSource, Disabled, InsightGenerator, ReportRenderer};
