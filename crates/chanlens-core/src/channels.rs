use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A channel handle without its leading `@`, lowercased.
#[must_use]
pub fn normalize_handle(handle: &str) -> String {
    handle.trim().trim_start_matches('@').to_lowercase()
}

/// Drop competitors that repeat the primary handle or an earlier competitor.
///
/// Returns the surviving competitors (original spelling, input order) and one
/// warning per dropped handle.
#[must_use]
pub fn dedupe_competitors(primary: &str, competitors: &[String]) -> (Vec<String>, Vec<String>) {
    let mut seen = HashSet::from([normalize_handle(primary)]);
    let mut unique = Vec::with_capacity(competitors.len());
    let mut warnings = Vec::new();

    for handle in competitors {
        let normalized = normalize_handle(handle);
        if seen.insert(normalized.clone()) {
            unique.push(handle.clone());
        } else {
            warnings.push(format!("duplicate handle @{normalized} — skipping"));
        }
    }

    (unique, warnings)
}

/// Check that `count` competitors fall within `[min, max]`.
///
/// # Errors
///
/// Returns `ConfigError::Validation` naming the violated bound.
pub fn validate_competitor_count(count: usize, min: usize, max: usize) -> Result<(), ConfigError> {
    if count < min {
        return Err(ConfigError::Validation(format!(
            "need at least {min} competitors, got {count}"
        )));
    }
    if count > max {
        return Err(ConfigError::Validation(format!(
            "max {max} competitors, got {count}"
        )));
    }
    Ok(())
}

/// A primary channel and its competitors, as stored in a channel-set YAML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSet {
    pub channel: String,
    pub competitors: Vec<String>,
    #[serde(default)]
    pub days: Option<u32>,
}

/// Load and validate a channel set from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_channel_set(path: &Path, min: usize, max: usize) -> Result<ChannelSet, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ChannelSetIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let set: ChannelSet = serde_yaml::from_str(&content).map_err(ConfigError::ChannelSetParse)?;

    validate_channel_set(&set, min, max)?;

    Ok(set)
}

fn validate_channel_set(set: &ChannelSet, min: usize, max: usize) -> Result<(), ConfigError> {
    if normalize_handle(&set.channel).is_empty() {
        return Err(ConfigError::Validation(
            "channel handle must be non-empty".to_string(),
        ));
    }

    if let Some(handle) = set.competitors.iter().find(|h| normalize_handle(h).is_empty()) {
        return Err(ConfigError::Validation(format!(
            "competitor handle '{handle}' is empty"
        )));
    }

    if set.days == Some(0) {
        return Err(ConfigError::Validation(
            "days must be at least 1".to_string(),
        ));
    }

    validate_competitor_count(set.competitors.len(), min, max)
}
