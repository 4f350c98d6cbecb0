//! Best-candidate selection
//!
//! A single linear pass over the head of the comment list. Ranking is by
//! reply count only; the earliest comment wins a tie because a later one
//! must have strictly more replies to take over.

use serde_json::Value;
use tracing::debug;

use crate::crawler::comment::decode_comment;
use crate::error::FinderErrorTrait;
use crate::matcher::PhraseMatcher;
use crate::models::Candidate;

/// Comments scanned per attempt
pub const DEFAULT_SCAN_LIMIT: usize = 80;

/// Outcome of one scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Matching comment with the most replies
    pub best: Option<Candidate>,

    /// Highest like count among scanned comments, matching or not
    pub top_likes: i64,

    /// Reply count of `best`, or -1 when nothing matched
    pub best_replies: i64,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            best: None,
            top_likes: 0,
            best_replies: -1,
        }
    }
}

/// Pick the best matching comment among the first `scan_limit` records
///
/// Records that fail to decode (not an object, or a count that cannot be
/// coerced) are skipped and take no part in `top_likes`.
pub fn select_best(comments: &[Value], matcher: &PhraseMatcher, scan_limit: usize) -> Selection {
    let mut selection = Selection::default();

    for (index, raw) in comments.iter().take(scan_limit).enumerate() {
        let comment = match decode_comment(raw) {
            Ok(comment) => comment,
            Err(e) => {
                debug!(
                    index,
                    category = e.category().as_str(),
                    error = %e,
                    "Skipping malformed comment"
                );
                continue;
            }
        };

        selection.top_likes = selection.top_likes.max(comment.likes);

        if !matcher.matches(&comment.text) {
            continue;
        }

        if comment.replies > selection.best_replies {
            debug!(
                index,
                cid = %comment.cid,
                replies = comment.replies,
                "New best candidate"
            );
            selection.best_replies = comment.replies;
            selection.best = Some(Candidate::from(comment));
        }
    }

    selection
}
