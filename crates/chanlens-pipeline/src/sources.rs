//! Seams between the pipeline and the network clients.

use std::fmt::Display;
use std::future::Future;

use chanlens_core::{AnalyticsOutput, ChannelData, Insights, Narrative};
use chanlens_insights::{InsightsClient, InsightsError};
use chanlens_slides::{SlidesError, SlidesRenderer};
use chanlens_youtube::{YoutubeClient, YoutubeError};

/// Fetches one channel's period and baseline cohorts.
pub trait ChannelSource: Send + Sync {
    type Error: Display + Send;

    fn fetch_channel(
        &self,
        handle: &str,
        days: u32,
    ) -> impl Future<Output = Result<ChannelData, Self::Error>> + Send;
}

/// Produces language-model insights for an analytics run.
pub trait InsightGenerator: Send + Sync {
    type Error: Display + Send;

    fn generate(
        &self,
        analytics: &AnalyticsOutput,
    ) -> impl Future<Output = Result<Insights, Self::Error>> + Send;
}

/// Renders a finished run and returns the report URL.
pub trait ReportRenderer: Send + Sync {
    type Error: Display + Send;

    fn render(
        &self,
        analytics: &AnalyticsOutput,
        narrative: &Narrative,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

impl ChannelSource for YoutubeClient {
    type Error = YoutubeError;

    async fn fetch_channel(&self, handle: &str, days: u32) -> Result<ChannelData, YoutubeError> {
        self.fetch_channel_data(handle, days).await
    }
}

impl InsightGenerator for InsightsClient {
    type Error = InsightsError;

    async fn generate(&self, analytics: &AnalyticsOutput) -> Result<Insights, InsightsError> {
        self.generate_insights(analytics).await
    }
}

impl ReportRenderer for SlidesRenderer {
    type Error = SlidesError;

    async fn render(
        &self,
        analytics: &AnalyticsOutput,
        narrative: &Narrative,
    ) -> Result<String, SlidesError> {
        SlidesRenderer::render(self, analytics, narrative).await
    }
}

/// Placeholder for a stage that is not configured.
///
/// A [`Pipeline`](crate::Pipeline) built without insights or a renderer holds
/// `None` of this type, so its methods are never reached.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disabled;

impl InsightGenerator for Disabled {
    type Error = &'static str;

    async fn generate(&self, _analytics: &AnalyticsOutput) -> Result<Insights, Self::Error> {
        Err("insights are disabled")
    }
}

impl ReportRenderer for Disabled {
    type Error = &'static str;

    async fn render(
        &self,
        _analytics: &AnalyticsOutput,
        _narrative: &Narrative,
    ) -> Result<String, Self::Error> {
        Err("report rendering is disabled")
    }
}
