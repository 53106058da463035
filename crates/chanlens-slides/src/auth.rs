//! Authorized-user OAuth credentials for the Drive and Slides APIs.
//!
//! Tokens come from `GOOGLE_TOKEN_JSON` when set, otherwise from the token
//! file written by an earlier interactive authorization. An expired access
//! token is refreshed with the stored refresh token; tokens loaded from the
//! file are written back after a refresh.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::SlidesError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
/// Tokens this close to expiry are refreshed ahead of use.
const EXPIRY_SKEW_SECS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Contents of an authorized-user `token.json`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthorizedUser {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// RFC 3339 timestamp; unparseable values count as expired.
    #[serde(default)]
    pub expiry: Option<String>,
    /// Fields such as `scopes` that are carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl std::fmt::Debug for AuthorizedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedUser")
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .field("token_uri", &self.token_uri)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[redacted]"))
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

impl AuthorizedUser {
    /// Parse a `token.json` document.
    ///
    /// # Errors
    ///
    /// Returns [`SlidesError::Deserialize`] when the document is not valid JSON.
    pub fn from_json(json: &str) -> Result<Self, SlidesError> {
        serde_json::from_str(json).map_err(|source| SlidesError::Deserialize {
            context: "authorized-user token".to_string(),
            source,
        })
    }

    /// `true` when an access token is present and not about to expire.
    /// A token without an expiry is taken at face value.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        if self.token.as_deref().is_none_or(str::is_empty) {
            return false;
        }
        match &self.expiry {
            None => true,
            Some(raw) => DateTime::parse_from_rfc3339(raw).is_ok_and(|expiry| {
                expiry.with_timezone(&Utc) - Duration::seconds(EXPIRY_SKEW_SECS) > now
            }),
        }
    }

    /// Exchange the refresh token for a new access token and store it on `self`.
    ///
    /// # Errors
    ///
    /// - [`SlidesError::Auth`] when the refresh fields are missing or the
    ///   token endpoint rejects the refresh.
    /// - [`SlidesError::Http`] on network failure.
    pub async fn refresh(&mut self, client: &Client) -> Result<(), SlidesError> {
        let (Some(refresh_token), Some(client_id), Some(client_secret)) = (
            self.refresh_token.as_deref(),
            self.client_id.as_deref(),
            self.client_secret.as_deref(),
        ) else {
            return Err(SlidesError::Auth(
                "access token expired and no refresh token is stored".to_string(),
            ));
        };

        let response = client
            .post(&self.token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let reason = serde_json::from_str::<TokenError>(&body)
                .map(|e| e.error_description.unwrap_or(e.error))
                .unwrap_or(body);
            return Err(SlidesError::Auth(format!("token refresh failed ({status}): {reason}")));
        }

        let refreshed: TokenResponse =
            serde_json::from_str(&body).map_err(|source| SlidesError::Deserialize {
                context: "token refresh".to_string(),
                source,
            })?;

        self.token = Some(refreshed.access_token);
        self.expiry = refreshed
            .expires_in
            .map(|secs| (Utc::now() + Duration::seconds(secs)).to_rfc3339());
        Ok(())
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Deserialize)]
struct TokenError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Where to look for the authorized-user token.
#[derive(Clone)]
pub struct CredentialSource {
    /// Inline token JSON; takes precedence over the file.
    pub token_json: Option<String>,
    pub token_path: PathBuf,
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSource")
            .field("token_json", &self.token_json.as_ref().map(|_| "[redacted]"))
            .field("token_path", &self.token_path)
            .finish()
    }
}

impl CredentialSource {
    fn load(&self) -> Result<(AuthorizedUser, bool), SlidesError> {
        if let Some(json) = self.token_json.as_deref().filter(|j| !j.trim().is_empty()) {
            return Ok((AuthorizedUser::from_json(json)?, false));
        }

        match std::fs::read_to_string(&self.token_path) {
            Ok(json) => Ok((AuthorizedUser::from_json(&json)?, true)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SlidesError::MissingCredentials(format!(
                    "set GOOGLE_TOKEN_JSON or authorize once locally to create {}",
                    self.token_path.display()
                )))
            }
            Err(e) => Err(SlidesError::MissingCredentials(format!(
                "cannot read {}: {e}",
                self.token_path.display()
            ))),
        }
    }

    /// Returns a usable access token, refreshing it when stale.
    ///
    /// # Errors
    ///
    /// - [`SlidesError::MissingCredentials`] when no token is available.
    /// - [`SlidesError::Auth`] / [`SlidesError::Http`] when the refresh fails.
    pub async fn access_token(&self, client: &Client) -> Result<String, SlidesError> {
        let (mut user, from_file) = self.load()?;

        if !user.is_fresh(Utc::now()) {
            tracing::info!("refreshing Google access token");
            user.refresh(client).await?;

            if from_file {
                match serde_json::to_string_pretty(&user) {
                    Ok(json) => {
                        if let Err(e) = std::fs::write(&self.token_path, json) {
                            tracing::warn!(
                                path = %self.token_path.display(),
                                error = %e,
                                "could not cache refreshed token"
                            );
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "could not serialize refreshed token"),
                }
            }
        }

        user.token
            .ok_or_else(|| SlidesError::Auth("token endpoint returned no access token".to_string()))
    }
}
