use serde::{Deserialize, Serialize};

use crate::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComparativeAnalysis {
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub key_trends: Vec<String>,
    #[serde(default)]
    pub content_gaps: Vec<String>,
    #[serde(default)]
    pub top_performer_note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoIdea {
    pub title: String,
    #[serde(default)]
    pub title_variations: Vec<String>,
    #[serde(default)]
    pub hooks: Vec<String>,
    #[serde(default)]
    pub topic: String,
}

/// Language-model commentary on an analytics run; the `insights.json` shape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Insights {
    #[serde(default)]
    pub comparative_analysis: ComparativeAnalysis,
    #[serde(default)]
    pub video_ideas: Vec<VideoIdea>,
    #[serde(default)]
    pub takeaways: Vec<String>,
}

impl Insights {
    /// Parse an `insights.json` document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Input`] when the document is not valid insights JSON.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json).map_err(|source| CoreError::Input {
            context: "insights".to_string(),
            source,
        })
    }
}
