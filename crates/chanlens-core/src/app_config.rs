use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub output_dir: PathBuf,
    pub youtube_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub slides_template_id: Option<String>,
    pub google_token_json: Option<String>,
    pub google_token_path: PathBuf,
    pub app_password: Option<String>,
    pub default_days: u32,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub shorts_check_delay_ms: u64,
    pub baseline_size: usize,
    pub min_competitors: usize,
    pub max_competitors: usize,
    pub max_concurrent_fetches: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("output_dir", &self.output_dir)
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "anthropic_api_key",
                &self.anthropic_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("anthropic_model", &self.anthropic_model)
            .field("slides_template_id", &self.slides_template_id)
            .field(
                "google_token_json",
                &self.google_token_json.as_ref().map(|_| "[redacted]"),
            )
            .field("google_token_path", &self.google_token_path)
            .field(
                "app_password",
                &self.app_password.as_ref().map(|_| "[redacted]"),
            )
            .field("default_days", &self.default_days)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("shorts_check_delay_ms", &self.shorts_check_delay_ms)
            .field("baseline_size", &self.baseline_size)
            .field("min_competitors", &self.min_competitors)
            .field("max_competitors", &self.max_competitors)
            .field("max_concurrent_fetches", &self.max_concurrent_fetches)
            .finish()
    }
}
