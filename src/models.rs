//! Core data structures
//!
//! - [`Comment`]: a decoded comment record
//! - [`Candidate`]: a matching comment competing for "best"
//! - [`FindResult`]: the single value a lookup produces

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Decoded comment, with defaults applied to absent fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment identifier (`cid`), empty when the API omitted it
    pub cid: String,

    /// Comment body
    pub text: String,

    /// Like count (`digg_count`)
    pub likes: i64,

    /// Reply count (`reply_comment_total`, else `reply_count`)
    pub replies: i64,

    /// Author handle (`user.unique_id`)
    pub username: Option<String>,
}

/// Best matching comment found so far
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub cid: String,
    pub likes: i64,
    pub replies: i64,
    pub username: Option<String>,
    pub text: String,
}

impl From<Comment> for Candidate {
    fn from(comment: Comment) -> Self {
        Self {
            cid: comment.cid,
            likes: comment.likes,
            replies: comment.replies,
            username: comment.username,
            text: comment.text,
        }
    }
}

/// Why a lookup produced no comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundReason {
    /// The resolved URL carries no video id
    NoVideoId,

    /// No comment matched in any attempt
    NoMatch,
}

impl NotFoundReason {
    /// Wire name of the reason
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoVideoId => "no_video_id",
            Self::NoMatch => "no_match",
        }
    }
}

impl std::fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields of a successful lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundComment {
    /// Numeric video id
    pub video_id: String,

    /// Resolved video URL without query string, plus `?cid=<cid>`
    pub comment_link: String,

    /// Likes on the selected comment
    pub my_likes: i64,

    /// Highest like count among all scanned comments
    pub top_likes: i64,

    /// Replies on the selected comment
    pub replies: i64,

    /// Author handle of the selected comment
    pub username: Option<String>,

    /// Original text of the selected comment
    pub matched_text: String,

    /// 1-based attempt that produced the result
    pub attempt: u32,
}

/// Result of one lookup
///
/// Serializes to a flat JSON object tagged by a boolean `found` field:
/// `{"found": false, "reason": "no_match"}` or `{"found": true, "video_id": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindResult {
    Found(FoundComment),
    NotFound(NotFoundReason),
}

impl FindResult {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The found fields, if any
    pub fn found(&self) -> Option<&FoundComment> {
        match self {
            Self::Found(found) => Some(found),
            Self::NotFound(_) => None,
        }
    }

    /// The not-found reason, if any
    pub fn reason(&self) -> Option<NotFoundReason> {
        match self {
            Self::Found(_) => None,
            Self::NotFound(reason) => Some(*reason),
        }
    }
}

impl Serialize for FindResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Found(found) => {
                let mut map = serializer.serialize_map(Some(9))?;
                map.serialize_entry("found", &true)?;
                map.serialize_entry("video_id", &found.video_id)?;
                map.serialize_entry("comment_link", &found.comment_link)?;
                map.serialize_entry("my_likes", &found.my_likes)?;
                map.serialize_entry("top_likes", &found.top_likes)?;
                map.serialize_entry("replies", &found.replies)?;
                map.serialize_entry("username", &found.username)?;
                map.serialize_entry("matched_text", &found.matched_text)?;
                map.serialize_entry("attempt", &found.attempt)?;
                map.end()
            }
            Self::NotFound(reason) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("found", &false)?;
                map.serialize_entry("reason", reason)?;
                map.end()
            }
        }
    }
}
