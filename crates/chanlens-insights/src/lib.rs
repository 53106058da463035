//! Language-model commentary for chanlens analytics.
//!
//! Sends the analytics output to the Anthropic Messages API in three steps
//! (comparative analysis, video ideas, takeaways) and returns
//! [`chanlens_core::Insights`].

pub mod client;
pub mod context;
pub mod error;
mod prompts;

pub use client::{InsightsClient, DEFAULT_MODEL};
pub use context::build_context;
pub use error::InsightsError;
