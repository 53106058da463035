use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every credential is optional here: each pipeline stage decides whether a
/// missing key is fatal (`YOUTUBE_API_KEY`) or just disables the stage
/// (`ANTHROPIC_API_KEY`, `GOOGLE_SLIDES_TEMPLATE_ID`).
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if a value is present but does not parse.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    // Blank values in `.env` templates count as unset.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("CHANLENS_ENV", "development"))?;

    let bind_addr = or_default("CHANLENS_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("CHANLENS_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("CHANLENS_LOG_LEVEL", "info");
    let output_dir = PathBuf::from(or_default("CHANLENS_OUTPUT_DIR", "./.tmp"));

    let youtube_api_key = optional("YOUTUBE_API_KEY");
    let anthropic_api_key = optional("ANTHROPIC_API_KEY");
    let anthropic_model = or_default("ANTHROPIC_MODEL", "claude-sonnet-4-5-20250929");
    let slides_template_id = optional("GOOGLE_SLIDES_TEMPLATE_ID");
    let google_token_json = optional("GOOGLE_TOKEN_JSON");
    let google_token_path = PathBuf::from(or_default("GOOGLE_TOKEN_PATH", "./token.json"));
    let app_password = optional("APP_PASSWORD");

    let default_days = parse_u32("CHANLENS_DEFAULT_DAYS", "60")?;
    if default_days == 0 {
        return Err(invalid("CHANLENS_DEFAULT_DAYS", "must be at least 1".to_string()));
    }

    let request_timeout_secs = parse_u64("CHANLENS_REQUEST_TIMEOUT_SECS", "30")?;
    let max_retries = parse_u32("CHANLENS_MAX_RETRIES", "1")?;
    let retry_backoff_ms = parse_u64("CHANLENS_RETRY_BACKOFF_MS", "2000")?;
    let shorts_check_delay_ms = parse_u64("CHANLENS_SHORTS_CHECK_DELAY_MS", "300")?;
    let baseline_size = parse_usize("CHANLENS_BASELINE_SIZE", "50")?;
    let min_competitors = parse_usize("CHANLENS_MIN_COMPETITORS", "4")?;
    let max_competitors = parse_usize("CHANLENS_MAX_COMPETITORS", "7")?;
    let max_concurrent_fetches = parse_usize("CHANLENS_MAX_CONCURRENT_FETCHES", "1")?;

    if min_competitors > max_competitors {
        return Err(invalid(
            "CHANLENS_MIN_COMPETITORS",
            format!("{min_competitors} exceeds CHANLENS_MAX_COMPETITORS ({max_competitors})"),
        ));
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        output_dir,
        youtube_api_key,
        anthropic_api_key,
        anthropic_model,
        slides_template_id,
        google_token_json,
        google_token_path,
        app_password,
        default_days,
        request_timeout_secs,
        max_retries,
        retry_backoff_ms,
        shorts_check_delay_ms,
        baseline_size,
        min_competitors,
        max_competitors,
        max_concurrent_fetches,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CHANLENS_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
