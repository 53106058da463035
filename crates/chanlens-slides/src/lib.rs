//! Google Slides report rendering.
//!
//! A template deck is copied through the Drive API, its `{{placeholder}}`
//! tokens are replaced in one Slides `batchUpdate`, and the copy is shared
//! read-only with anyone holding the link.
//!
//! The template keys are documented in [`placeholders`].

pub mod auth;
pub mod error;
pub mod placeholders;
pub mod renderer;
pub(crate) mod retry;

pub use auth::{AuthorizedUser, CredentialSource};
pub use error::SlidesError;
pub use placeholders::{build_replacements, placeholder_keys, report_title};
pub use renderer::SlidesRenderer;
