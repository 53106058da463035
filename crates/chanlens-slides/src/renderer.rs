//! Drive and Slides calls that turn the template deck into a shared report.

use std::time::Duration;

use chanlens_core::{AnalyticsOutput, Narrative};
use chrono::Utc;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::auth::CredentialSource;
use crate::error::SlidesError;
use crate::placeholders::{build_replacements, report_title};
use crate::retry::retry_with_backoff;

const DEFAULT_DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3/";
const DEFAULT_SLIDES_BASE_URL: &str = "https://slides.googleapis.com/v1/";

#[derive(Serialize)]
struct CopyRequest<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct CopyResponse {
    id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContainsText {
    text: String,
    match_case: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplaceAllText {
    contains_text: ContainsText,
    replace_text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Request {
    replace_all_text: ReplaceAllText,
}

#[derive(Serialize)]
struct BatchUpdate {
    requests: Vec<Request>,
}

#[derive(Serialize)]
struct Permission<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    role: &'a str,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn endpoint(base: &Url, path: &str) -> Result<Url, SlidesError> {
    base.join(path).map_err(|e| SlidesError::Api {
        status: 0,
        message: format!("invalid request path '{path}': {e}"),
    })
}

fn parse_base_url(raw: &str) -> Result<Url, SlidesError> {
    let normalised = format!("{}/", raw.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| SlidesError::Api {
        status: 0,
        message: format!("invalid base URL '{raw}': {e}"),
    })
}

/// Renders reports into copies of a Google Slides template.
///
/// Use [`SlidesRenderer::new`] for production or
/// [`SlidesRenderer::with_base_urls`] to point at mock servers in tests.
pub struct SlidesRenderer {
    client: Client,
    template_id: Option<String>,
    credentials: CredentialSource,
    drive_base: Url,
    slides_base: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl SlidesRenderer {
    /// # Errors
    ///
    /// Returns [`SlidesError::Http`] if the `reqwest` client cannot be built.
    pub fn new(
        template_id: Option<&str>,
        credentials: CredentialSource,
        timeout_secs: u64,
    ) -> Result<Self, SlidesError> {
        Self::with_base_urls(
            template_id,
            credentials,
            timeout_secs,
            DEFAULT_DRIVE_BASE_URL,
            DEFAULT_SLIDES_BASE_URL,
        )
    }

    /// # Errors
    ///
    /// Returns [`SlidesError::Http`] if the `reqwest` client cannot be built,
    /// or [`SlidesError::Api`] if a base URL does not parse.
    pub fn with_base_urls(
        template_id: Option<&str>,
        credentials: CredentialSource,
        timeout_secs: u64,
        drive_base: &str,
        slides_base: &str,
    ) -> Result<Self, SlidesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("chanlens/0.1 (competitor-analytics)")
            .build()?;

        Ok(Self {
            client,
            template_id: template_id
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_owned),
            credentials,
            drive_base: parse_base_url(drive_base)?,
            slides_base: parse_base_url(slides_base)?,
            max_retries: 3,
            backoff_base_ms: 2_000,
        })
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Copies the template, fills every placeholder, shares the copy and
    /// returns its edit URL.
    ///
    /// # Errors
    ///
    /// - [`SlidesError::MissingTemplate`] when no template id is configured.
    /// - [`SlidesError::MissingCredentials`] / [`SlidesError::Auth`] when no
    ///   usable access token can be obtained.
    /// - [`SlidesError::Http`] / [`SlidesError::Api`] on Drive or Slides failures.
    pub async fn render(
        &self,
        analytics: &AnalyticsOutput,
        narrative: &Narrative,
    ) -> Result<String, SlidesError> {
        let template_id = self
            .template_id
            .as_deref()
            .ok_or(SlidesError::MissingTemplate)?;
        let token = self.credentials.access_token(&self.client).await?;
        let now = Utc::now();

        let title = report_title(&analytics.channel.channel_name, now);
        let copy_url = endpoint(&self.drive_base, &format!("files/{template_id}/copy"))?;
        let copy: CopyResponse = self
            .post_json(&token, copy_url, &CopyRequest { name: &title }, "Drive copy")
            .await?;
        tracing::info!(report_id = %copy.id, title = %title, "report created from template");

        let requests = build_replacements(analytics, narrative, now)
            .into_iter()
            .map(|(key, value)| Request {
                replace_all_text: ReplaceAllText {
                    contains_text: ContainsText {
                        text: format!("{{{{{key}}}}}"),
                        match_case: true,
                    },
                    replace_text: value,
                },
            })
            .collect();
        let update_url = endpoint(
            &self.slides_base,
            &format!("presentations/{}:batchUpdate", copy.id),
        )?;
        let _: serde_json::Value = self
            .post_json(&token, update_url, &BatchUpdate { requests }, "Slides batchUpdate")
            .await?;

        let mut share_url = endpoint(&self.drive_base, &format!("files/{}/permissions", copy.id))?;
        share_url.query_pairs_mut().append_pair("fields", "id");
        let _: serde_json::Value = self
            .post_json(
                &token,
                share_url,
                &Permission {
                    kind: "anyone",
                    role: "reader",
                },
                "Drive permissions",
            )
            .await?;

        let url = format!("https://docs.google.com/presentation/d/{}/edit", copy.id);
        tracing::info!(url = %url, "report filled and shared");
        Ok(url)
    }

    async fn post_json<B, T>(
        &self,
        token: &str,
        url: Url,
        body: &B,
        context: &str,
    ) -> Result<T, SlidesError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .post(url)
                    .bearer_auth(token)
                    .json(body)
                    .send()
                    .await?;

                let status = response.status();
                let text = response.text().await?;
                if !status.is_success() {
                    let message = serde_json::from_str::<ErrorEnvelope>(&text)
                        .map(|e| e.error.message)
                        .unwrap_or(text);
                    return Err(SlidesError::Api {
                        status: status.as_u16(),
                        message,
                    });
                }

                serde_json::from_str(&text).map_err(|source| SlidesError::Deserialize {
                    context: context.to_string(),
                    source,
                })
            }
        })
        .await
    }
}
