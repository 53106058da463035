use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{header::COOKIE, HeaderMap};
use chanlens_core::{AppConfig, Environment};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "chanlens_session";

const SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Password gate plus the in-memory session store behind it.
///
/// Sessions live only as long as the process; a restart logs everyone out.
#[derive(Clone)]
pub struct AuthState {
    password_digest: Option<[u8; 32]>,
    sessions: Arc<Mutex<HashMap<String, Instant>>>,
    ttl: Duration,
    secure_cookie: bool,
    pub enabled: bool,
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("password_digest", &self.password_digest.map(|_| "[redacted]"))
            .field("ttl", &self.ttl)
            .field("secure_cookie", &self.secure_cookie)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl AuthState {
    /// Builds auth from `APP_PASSWORD`.
    ///
    /// In development a missing password disables the gate for local
    /// iteration. Anywhere else it fails startup.
    ///
    /// # Errors
    ///
    /// Returns an error when `APP_PASSWORD` is unset outside development.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let is_development = config.env == Environment::Development;
        match config.app_password.as_deref() {
            Some(password) => Ok(Self::with_password(password, !is_development)),
            None if is_development => {
                tracing::warn!("APP_PASSWORD not set; login disabled in development environment");
                Ok(Self::disabled())
            }
            None => anyhow::bail!(
                "APP_PASSWORD is required outside development; set it to gate the web form"
            ),
        }
    }

    #[must_use]
    pub fn with_password(password: &str, secure_cookie: bool) -> Self {
        Self {
            password_digest: Some(Sha256::digest(password.as_bytes()).into()),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl: SESSION_TTL,
            secure_cookie,
            enabled: true,
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self {
            password_digest: None,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl: SESSION_TTL,
            secure_cookie: false,
            enabled: false,
        }
    }

    /// Compares digests in constant time so response timing does not leak
    /// how much of the password matched.
    #[must_use]
    pub fn verify_password(&self, candidate: &str) -> bool {
        self.password_digest.is_some_and(|expected| {
            let digest = Sha256::digest(candidate.as_bytes());
            bool::from(digest.as_slice().ct_eq(&expected))
        })
    }

    pub async fn create_session(&self) -> String {
        let token = Uuid::new_v4().to_string();
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, expires_at| *expires_at > now);
        sessions.insert(token.clone(), now + self.ttl);
        token
    }

    pub async fn revoke_session(&self, token: &str) {
        self.sessions.lock().await.remove(token);
    }

    async fn is_valid_session(&self, token: &str) -> bool {
        let sessions = self.sessions.lock().await;
        sessions
            .get(token)
            .is_some_and(|expires_at| *expires_at > Instant::now())
    }

    /// True when the gate is off or the request carries a live session cookie.
    pub async fn is_authenticated(&self, headers: &HeaderMap) -> bool {
        if !self.enabled {
            return true;
        }
        match session_token(headers) {
            Some(token) => self.is_valid_session(token).await,
            None => false,
        }
    }

    #[must_use]
    pub fn session_cookie(&self, token: &str) -> String {
        let secure = if self.secure_cookie { "; Secure" } else { "" };
        format!(
            "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{secure}",
            self.ttl.as_secs()
        )
    }

    #[must_use]
    pub fn clear_cookie(&self) -> String {
        let secure = if self.secure_cookie { "; Secure" } else { "" };
        format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{secure}")
    }
}

/// The session token from the request's `Cookie` headers, if any.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .find(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn verify_password_matches_only_the_configured_password() {
        let auth = AuthState::with_password("hunter2", false);
        assert!(auth.verify_password("hunter2"));
        assert!(!auth.verify_password("hunter3"));
        assert!(!auth.verify_password(""));
        assert!(!AuthState::disabled().verify_password("anything"));
    }

    #[test]
    fn session_token_is_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; chanlens_session=abc-123; other=1"),
        );
        assert_eq!(session_token(&headers), Some("abc-123"));

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("chanlens_session_old=x; chanlens_session="));
        assert_eq!(session_token(&headers), None);
    }

    #[tokio::test]
    async fn sessions_authenticate_until_revoked() {
        let auth = AuthState::with_password("pw", false);
        let token = auth.create_session().await;

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{SESSION_COOKIE}={token}")).unwrap(),
        );
        assert!(auth.is_authenticated(&headers).await);

        auth.revoke_session(&token).await;
        assert!(!auth.is_authenticated(&headers).await);
        assert!(!auth.is_authenticated(&HeaderMap::new()).await);
    }

    #[tokio::test]
    async fn disabled_gate_lets_everyone_in() {
        assert!(AuthState::disabled().is_authenticated(&HeaderMap::new()).await);
    }

    #[test]
    fn cookies_carry_secure_flag_outside_development() {
        let auth = AuthState::with_password("pw", true);
        assert!(auth.session_cookie("t").ends_with("; Secure"));
        assert!(auth.clear_cookie().contains("Max-Age=0"));
        assert!(!AuthState::with_password("pw", false)
            .session_cookie("t")
            .contains("Secure"));
    }

    #[test]
    fn debug_redacts_the_password_digest() {
        let rendered = format!("{:?}", AuthState::with_password("pw", false));
        assert!(rendered.contains("[redacted]"));
    }
}
