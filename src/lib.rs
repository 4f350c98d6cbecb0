//! comment_finder - locate a target comment under a short-form video
//!
//! Given a video link (short or canonical), the finder expands it, pages
//! through the comment listing API and returns the comment that mentions one
//! of the target phrases and has the most replies.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`matcher`] - Text normalization and phrase matching
//! - [`crawler`] - HTTP client, link expansion and comment pagination
//! - [`finder`] - Candidate selection and the retrying lookup
//! - [`models`] - Core data structures and the lookup result
//! - [`error`] - Unified error types
//! - [`utils`] - Retry helpers and small utilities
//!
//! # Example
//!
//! ```no_run
//! use comment_finder::config::Config;
//! use comment_finder::finder::CommentFinder;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let finder = CommentFinder::new(&config)?;
//!     let result = finder.find("https://vm.tiktok.com/ZMabc123/").await;
//!     println!("{}", serde_json::to_string(&result)?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod finder;
pub mod matcher;
pub mod models;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, FinderErrorTrait, Result};
    pub use crate::finder::CommentFinder;
    pub use crate::matcher::{has_target_phrase, normalize, PhraseMatcher};
    pub use crate::models::{Candidate, Comment, FindResult, FoundComment, NotFoundReason};
}

// Direct re-exports for convenience
pub use finder::CommentFinder;
pub use models::{FindResult, NotFoundReason};
