//! Progress events emitted by a run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Totals reported at the end of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Primary plus successfully fetched competitors.
    pub channels_fetched: usize,
    pub failed_channels: Vec<String>,
    /// Period and baseline videos across all fetched channels.
    pub total_videos: usize,
    /// Rough YouTube API units spent: six per channel.
    pub quota_estimate: usize,
    pub output_path: Option<PathBuf>,
    pub report_url: Option<String>,
}

/// One step of a run. A run ends with exactly one `Error` or `Result`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PipelineEvent {
    Progress {
        message: String,
    },
    Error {
        message: String,
    },
    Result {
        report_url: Option<String>,
        summary: RunSummary,
    },
}

impl PipelineEvent {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }
}

/// Sending half of a run's event stream.
///
/// A dropped receiver (a closed browser tab, say) does not stop the run;
/// later events are discarded.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<PipelineEvent>,
}

impl EventSink {
    /// Create a sink and the receiver that drains it.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<PipelineEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    pub async fn send(&self, event: PipelineEvent) {
        if self.tx.send(event).await.is_err() {
            tracing::debug!("event receiver dropped; discarding pipeline event");
        }
    }

    pub async fn progress(&self, message: impl Into<String>) {
        self.send(PipelineEvent::Progress {
            message: message.into(),
        })
        .await;
    }
}
