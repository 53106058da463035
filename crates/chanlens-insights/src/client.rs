//! Anthropic Messages API client that turns analytics into narrative insights.
//!
//! Every request ends with an assistant turn holding the opening bracket of
//! the expected JSON, so the model continues raw JSON without prose around it.

use std::time::Duration;

use chanlens_core::{AnalyticsOutput, ComparativeAnalysis, Insights, VideoIdea};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::context::build_context;
use crate::error::InsightsError;
use crate::prompts;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4_096;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

const IDEA_COUNT: usize = 5;
const TAKEAWAY_COUNT: usize = 3;

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    system: &'a str,
    messages: [Message<'a>; 2],
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// One prompt round trip: system text, user text, sampling temperature and
/// the JSON opener used as prefill.
struct Prompt<'a> {
    label: &'a str,
    system: &'a str,
    user: &'a str,
    temperature: f64,
    prefill: &'a str,
}

/// Client for the Anthropic Messages API.
///
/// Use [`InsightsClient::new`] for production or
/// [`InsightsClient::with_base_url`] to point at a mock server in tests.
pub struct InsightsClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
}

impl InsightsClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`InsightsError::Http`] if the `reqwest` client cannot be built.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, InsightsError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`InsightsError::Http`] if the `reqwest` client cannot be
    /// built, or [`InsightsError::Api`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, InsightsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("chanlens/0.1 (competitor-analytics)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| InsightsError::Api {
            status: 0,
            message: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Asks for an overview, trends, content gaps and a top-performer note.
    ///
    /// # Errors
    ///
    /// - [`InsightsError::Http`] on network failure.
    /// - [`InsightsError::Api`] on a non-2xx response.
    /// - [`InsightsError::EmptyResponse`] when the reply has no text.
    /// - [`InsightsError::Deserialize`] when the reply is not the expected JSON.
    pub async fn generate_comparative(
        &self,
        analytics: &AnalyticsOutput,
        context: &str,
    ) -> Result<ComparativeAnalysis, InsightsError> {
        let user = prompts::comparative(&analytics.channel.channel_name, context);
        self.complete(&Prompt {
            label: "comparative analysis",
            system: prompts::ANALYST_SYSTEM,
            user: &user,
            temperature: 0.3,
            prefill: "{",
        })
        .await
    }

    /// Asks for video ideas grounded in the comparative analysis; at most five are kept.
    ///
    /// # Errors
    ///
    /// Same as [`InsightsClient::generate_comparative`].
    pub async fn generate_video_ideas(
        &self,
        analytics: &AnalyticsOutput,
        context: &str,
        analysis: &ComparativeAnalysis,
    ) -> Result<Vec<VideoIdea>, InsightsError> {
        let user = prompts::video_ideas(
            &analytics.channel.channel_name,
            context,
            analysis,
            IDEA_COUNT,
        );
        let mut ideas: Vec<VideoIdea> = self
            .complete(&Prompt {
                label: "video ideas",
                system: prompts::IDEAS_SYSTEM,
                user: &user,
                temperature: 0.5,
                prefill: "[",
            })
            .await?;
        ideas.truncate(IDEA_COUNT);
        Ok(ideas)
    }

    /// Asks for strategic takeaways; at most three are kept.
    ///
    /// # Errors
    ///
    /// Same as [`InsightsClient::generate_comparative`].
    pub async fn generate_takeaways(
        &self,
        analytics: &AnalyticsOutput,
        context: &str,
        analysis: &ComparativeAnalysis,
    ) -> Result<Vec<String>, InsightsError> {
        let user = prompts::takeaways(
            &analytics.channel.channel_name,
            context,
            analysis,
            TAKEAWAY_COUNT,
        );
        let mut takeaways: Vec<String> = self
            .complete(&Prompt {
                label: "takeaways",
                system: prompts::TAKEAWAYS_SYSTEM,
                user: &user,
                temperature: 0.3,
                prefill: "[",
            })
            .await?;
        takeaways.truncate(TAKEAWAY_COUNT);
        Ok(takeaways)
    }

    /// Runs the comparative, ideas and takeaways requests in sequence.
    ///
    /// # Errors
    ///
    /// Returns the first error from any of the three requests.
    pub async fn generate_insights(
        &self,
        analytics: &AnalyticsOutput,
    ) -> Result<Insights, InsightsError> {
        let context = build_context(analytics);

        tracing::info!(model = %self.model, "generating comparative analysis");
        let comparative_analysis = self.generate_comparative(analytics, &context).await?;

        tracing::info!(model = %self.model, "generating video ideas");
        let video_ideas = self
            .generate_video_ideas(analytics, &context, &comparative_analysis)
            .await?;

        tracing::info!(model = %self.model, "generating takeaways");
        let takeaways = self
            .generate_takeaways(analytics, &context, &comparative_analysis)
            .await?;

        Ok(Insights {
            comparative_analysis,
            video_ideas,
            takeaways,
        })
    }

    async fn complete<T: DeserializeOwned>(&self, prompt: &Prompt<'_>) -> Result<T, InsightsError> {
        let url = self.base_url.join("v1/messages").map_err(|e| InsightsError::Api {
            status: 0,
            message: format!("invalid messages URL: {e}"),
        })?;

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: prompt.temperature,
            system: prompt.system,
            messages: [
                Message {
                    role: "user",
                    content: prompt.user,
                },
                Message {
                    role: "assistant",
                    content: prompt.prefill,
                },
            ],
        };

        let response = self
            .client
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(text);
            return Err(InsightsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: MessagesResponse =
            serde_json::from_str(&text).map_err(|source| InsightsError::Deserialize {
                context: format!("{} response envelope", prompt.label),
                source,
            })?;

        let continuation = parsed
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| InsightsError::EmptyResponse(prompt.label.to_string()))?;

        let json = format!("{}{continuation}", prompt.prefill);
        serde_json::from_str(&json).map_err(|source| InsightsError::Deserialize {
            context: prompt.label.to_string(),
            source,
        })
    }
}
