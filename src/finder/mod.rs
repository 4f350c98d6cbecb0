//! Lookup orchestration
//!
//! One lookup runs `resolve → fetch → select`, repeating fetch and select
//! up to `retry_count` more times while no candidate turns up (comment
//! indexing upstream lags behind posting). Every failure along the way is
//! absorbed; the caller only ever sees a [`FindResult`].

pub mod select;

use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::crawler::build_client;
use crate::crawler::comment::CommentClient;
use crate::crawler::url::{build_comment_link, extract_video_id, LinkResolver};
use crate::error::{FinderErrorTrait, Result};
use crate::matcher::PhraseMatcher;
use crate::models::{Candidate, FindResult, FoundComment, NotFoundReason};
use crate::utils::retry::{retry_until_found, Backoff, RetryConfig, TokioBackoff};
use crate::utils::truncate_text;

use self::select::{select_best, Selection};

/// Resolves a video link to its target comment
///
/// Cheap to share: the HTTP client is reference counted and a lookup keeps
/// all of its state on its own stack, so concurrent [`find`](Self::find)
/// calls do not interfere.
pub struct CommentFinder {
    resolver: LinkResolver,
    comments: CommentClient,
    matcher: PhraseMatcher,
    retry: RetryConfig,
    scan_limit: usize,
    backoff: Arc<dyn Backoff>,
}

impl CommentFinder {
    /// Create a finder with its own HTTP client
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for invalid configuration and `Error::Fetch`
    /// if the HTTP client cannot be built
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let client = build_client(&config.finder)?;
        Ok(Self::with_client(config, client))
    }

    /// Create a finder on top of an existing client
    ///
    /// The client is used as-is; its timeout, headers and redirect policy
    /// take the place of the ones in `config`.
    pub fn with_client(config: &Config, client: Client) -> Self {
        Self {
            resolver: LinkResolver::new(client.clone()),
            comments: CommentClient::new(client, &config.finder),
            matcher: config.matcher(),
            retry: config.retry_config(),
            scan_limit: config.finder.scan_limit,
            backoff: Arc::new(TokioBackoff),
        }
    }

    /// Replace the pause taken between attempts
    #[must_use]
    pub fn with_backoff(mut self, backoff: Arc<dyn Backoff>) -> Self {
        self.backoff = backoff;
        self
    }

    /// Look up the target comment for a video link
    pub async fn find(&self, video_url: &str) -> FindResult {
        let video_url = self.resolver.expand(video_url).await;

        let video_id = match extract_video_id(&video_url) {
            Ok(id) => id,
            Err(e) => {
                warn!(url = %video_url, error = %e, "No video id after expansion");
                return FindResult::NotFound(NotFoundReason::NoVideoId);
            }
        };

        info!(
            video_id = %video_id,
            attempts = self.retry.total_attempts(),
            "Searching comments"
        );

        let video_id = video_id.as_str();
        let outcome = retry_until_found(&self.retry, self.backoff.as_ref(), move |attempt| {
            self.run_attempt(video_id, attempt)
        })
        .await;

        match outcome {
            Some(((candidate, top_likes), attempt)) => {
                info!(
                    video_id = %video_id,
                    cid = %candidate.cid,
                    replies = candidate.replies,
                    attempt,
                    "Target comment found"
                );
                FindResult::Found(FoundComment {
                    video_id: video_id.to_string(),
                    comment_link: build_comment_link(&video_url, &candidate.cid),
                    my_likes: candidate.likes,
                    top_likes,
                    replies: candidate.replies,
                    username: candidate.username,
                    matched_text: candidate.text,
                    attempt,
                })
            }
            None => {
                info!(video_id = %video_id, "No matching comment in any attempt");
                FindResult::NotFound(NotFoundReason::NoMatch)
            }
        }
    }

    /// One fetch-and-select cycle; `None` asks for another attempt
    async fn run_attempt(&self, video_id: &str, attempt: u32) -> Option<(Candidate, i64)> {
        let fetched = self.comments.fetch_all(video_id).await;

        if let Some(e) = &fetched.stopped_by {
            warn!(
                video_id = %video_id,
                attempt = attempt + 1,
                pages = fetched.pages,
                kept = fetched.comments.len(),
                category = e.category().as_str(),
                recoverable = e.is_recoverable(),
                error = %e,
                "Comment pagination cut short"
            );
        }

        if fetched.comments.is_empty() {
            debug!(video_id = %video_id, attempt = attempt + 1, "No comments returned");
            return None;
        }

        let Selection {
            best, top_likes, ..
        } = select_best(&fetched.comments, &self.matcher, self.scan_limit);

        match best {
            Some(candidate) => {
                debug!(
                    attempt = attempt + 1,
                    text = %truncate_text(&candidate.text, 60),
                    "Candidate selected"
                );
                Some((candidate, top_likes))
            }
            None => {
                debug!(
                    video_id = %video_id,
                    attempt = attempt + 1,
                    scanned = fetched.comments.len().min(self.scan_limit),
                    "No comment matched"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finder_creation() {
        let finder = CommentFinder::new(&Config::default());
        assert!(finder.is_ok());
    }

    #[test]
    fn test_invalid_config_fails() {
        let mut config = Config::default();
        config.finder.page_size = 0;
        let finder = CommentFinder::new(&config);
        assert!(matches!(finder, Err(crate::error::Error::Config(_))));
    }

    #[tokio::test]
    async fn test_unresolvable_link_has_no_video_id() {
        let mut config = Config::default();
        config.finder.request_timeout_secs = 1;
        let finder = CommentFinder::new(&config).unwrap();

        let result = finder.find("http://127.0.0.1:1/share/abc").await;
        assert_eq!(result, FindResult::NotFound(NotFoundReason::NoVideoId));
    }
}
