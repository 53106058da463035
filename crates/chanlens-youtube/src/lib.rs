//! YouTube Data API v3 client producing [`chanlens_core::ChannelData`].

pub mod client;
pub mod error;
pub mod normalize;
pub(crate) mod retry;
pub mod types;

pub use client::{FetchOptions, YoutubeClient};
pub use error::YoutubeError;
pub use normalize::{parse_iso8601_duration, ChannelInfo};
