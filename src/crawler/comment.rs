//! Comment listing API client
//!
//! This module handles fetching comment pages for a video and decoding the
//! loosely typed records they contain. Pages are read strictly in sequence;
//! the first failing page ends pagination and whatever was gathered so far
//! is kept.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::FinderConfig;
use crate::models::Comment;
use crate::utils::error::{FetchError, ParseError};

// ============================================================================
// API Constants
// ============================================================================

/// Comment listing API defaults
pub mod api {
    /// Comment listing endpoint
    pub const COMMENT_API_URL: &str = "https://www.tiktok.com/api/comment/list/";

    /// Application id sent as `aid`
    pub const APP_ID: u32 = 1988;

    /// Comments requested per page
    pub const PAGE_SIZE: u32 = 50;

    /// Maximum pages read per attempt
    pub const MAX_PAGES: u32 = 4;
}

// ============================================================================
// Lenient Value Coercion
// ============================================================================

/// Whether a JSON value counts as "present" for field fallbacks
///
/// Null, `false`, zero, the empty string and empty containers are treated as
/// absent.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Coerce a count field to an integer
///
/// Absent or empty values count as 0, booleans as 0/1, floats are truncated
/// and numeric strings are parsed after trimming.
///
/// # Errors
///
/// Returns `ParseError::MalformedField` for anything else
///
/// # Example
/// ```
/// use comment_finder::crawler::comment::coerce_count;
/// use serde_json::json;
///
/// assert_eq!(coerce_count("digg_count", Some(&json!("12"))).unwrap(), 12);
/// assert_eq!(coerce_count("digg_count", None).unwrap(), 0);
/// assert!(coerce_count("digg_count", Some(&json!("many"))).is_err());
/// ```
pub fn coerce_count(field: &'static str, value: Option<&Value>) -> Result<i64, ParseError> {
    let malformed = |value: &Value| ParseError::MalformedField {
        field,
        value: value.to_string(),
    };

    let Some(value) = value else {
        return Ok(0);
    };
    if !is_truthy(value) {
        return Ok(0);
    }

    match value {
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f.abs() < i64::MAX as f64 => Ok(f.trunc() as i64),
                    _ => Err(malformed(value)),
                }
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| malformed(value)),
        _ => Err(malformed(value)),
    }
}

// ============================================================================
// API Response Structures
// ============================================================================

/// Render a scalar field as text
///
/// Strings are taken as-is and numbers in decimal; anything else is absent.
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Comment record as delivered by the API
///
/// Every field is optional and loosely typed; [`RawComment::decode`]
/// applies the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawComment {
    /// Comment id, string or number
    #[serde(default)]
    pub cid: Option<Value>,

    /// Comment body
    #[serde(default)]
    pub text: Option<Value>,

    /// Like count
    #[serde(default)]
    pub digg_count: Option<Value>,

    /// Reply count (preferred field)
    #[serde(default)]
    pub reply_comment_total: Option<Value>,

    /// Reply count (fallback field)
    #[serde(default)]
    pub reply_count: Option<Value>,

    /// Author block, normally `{"unique_id": ...}`
    #[serde(default)]
    pub user: Option<Value>,
}

impl RawComment {
    /// Parse one element of the `comments` array
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidComment` if the element is not an object
    pub fn from_value(value: &Value) -> Result<Self, ParseError> {
        Self::deserialize(value).map_err(|e| ParseError::InvalidComment(e.to_string()))
    }

    /// Apply defaults and fallbacks
    ///
    /// - `cid` and `text`: string as-is, number rendered in decimal,
    ///   otherwise empty
    /// - `likes`: `digg_count`, 0 when absent
    /// - `replies`: `reply_comment_total` if present and non-zero, else
    ///   `reply_count`, else 0
    /// - `username`: `user.unique_id` rendered like `cid`, `None` when the
    ///   author block is missing or not an object
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MalformedField` if a count cannot be coerced
    pub fn decode(self) -> Result<Comment, ParseError> {
        let likes = coerce_count("digg_count", self.digg_count.as_ref())?;

        let reply_field = match &self.reply_comment_total {
            Some(total) if is_truthy(total) => ("reply_comment_total", Some(total)),
            _ => ("reply_count", self.reply_count.as_ref()),
        };
        let replies = coerce_count(reply_field.0, reply_field.1)?;

        let username = self
            .user
            .as_ref()
            .and_then(|user| scalar_text(user.get("unique_id")));

        Ok(Comment {
            cid: scalar_text(self.cid.as_ref()).unwrap_or_default(),
            text: scalar_text(self.text.as_ref()).unwrap_or_default(),
            likes,
            replies,
            username,
        })
    }
}

/// Decode one raw element of a comment page into a [`Comment`]
///
/// # Errors
///
/// Returns a `ParseError` describing why the record was rejected
pub fn decode_comment(value: &Value) -> Result<Comment, ParseError> {
    RawComment::from_value(value)?.decode()
}

#[derive(Debug, Deserialize)]
struct RawCommentPage {
    #[serde(default)]
    comments: Option<Vec<Value>>,

    #[serde(default)]
    has_more: Option<Value>,

    #[serde(default)]
    cursor: Option<Value>,
}

/// One decoded page of the listing
///
/// Comments stay as raw JSON so a single malformed record only costs that
/// record, not the page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentPage {
    pub comments: Vec<Value>,
    pub has_more: bool,
    pub cursor: i64,
}

impl CommentPage {
    /// Parse a response body
    ///
    /// A missing or null `comments` is an empty page; a missing `has_more` is
    /// false; a missing or unparseable `cursor` is 0.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Decode` if the body is not a JSON object of the
    /// listing shape
    pub fn from_json(body: &str) -> Result<Self, FetchError> {
        let raw: RawCommentPage =
            serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

        Ok(Self {
            comments: raw.comments.unwrap_or_default(),
            has_more: raw.has_more.as_ref().is_some_and(is_truthy),
            cursor: coerce_count("cursor", raw.cursor.as_ref()).unwrap_or(0),
        })
    }
}

/// Comments gathered for one attempt
#[derive(Debug, Default)]
pub struct FetchedComments {
    /// Comments in delivery order
    pub comments: Vec<Value>,

    /// Pages read successfully
    pub pages: u32,

    /// Error that ended pagination early, if any
    pub stopped_by: Option<FetchError>,
}

#[derive(Debug, Serialize)]
struct PageQuery<'a> {
    aid: u32,
    count: u32,
    cursor: i64,
    aweme_id: &'a str,
}

// ============================================================================
// Comment API Client
// ============================================================================

/// Comment API client
#[derive(Debug, Clone)]
pub struct CommentClient {
    client: Client,
    api_url: String,
    app_id: u32,
    page_size: u32,
    max_pages: u32,
}

impl CommentClient {
    /// Create a client using the limits and endpoint from configuration
    pub fn new(client: Client, config: &FinderConfig) -> Self {
        Self {
            client,
            api_url: config.comment_api_url.clone(),
            app_id: config.app_id,
            page_size: config.page_size,
            max_pages: config.max_pages,
        }
    }

    /// Fetch one page of comments
    ///
    /// # Errors
    ///
    /// Returns `FetchError::ServerError` on a non-success status, and the
    /// transport or decode error otherwise
    pub async fn fetch_page(&self, video_id: &str, cursor: i64) -> Result<CommentPage, FetchError> {
        let query = PageQuery {
            aid: self.app_id,
            count: self.page_size,
            cursor,
            aweme_id: video_id,
        };

        tracing::debug!(video_id = %video_id, cursor, "Fetching comment page");

        let response = self.client.get(&self.api_url).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::ServerError(status.as_u16()));
        }

        let body = response.text().await?;
        let mut page = CommentPage::from_json(&body)?;
        page.comments.truncate(self.page_size as usize);

        Ok(page)
    }

    /// Fetch up to `max_pages` pages, following the server cursor
    ///
    /// Never fails: the first error stops pagination and is reported in
    /// [`FetchedComments::stopped_by`] alongside the comments gathered so far.
    pub async fn fetch_all(&self, video_id: &str) -> FetchedComments {
        let mut fetched = FetchedComments::default();
        let mut cursor = 0;

        while fetched.pages < self.max_pages {
            let page = match self.fetch_page(video_id, cursor).await {
                Ok(page) => page,
                Err(e) => {
                    fetched.stopped_by = Some(e);
                    break;
                }
            };

            fetched.pages += 1;
            fetched.comments.extend(page.comments);

            if !page.has_more {
                break;
            }
            cursor = page.cursor;
        }

        tracing::debug!(
            video_id = %video_id,
            pages = fetched.pages,
            total = fetched.comments.len(),
            truncated = fetched.stopped_by.is_some(),
            "Fetched comments"
        );

        fetched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_count_variants() {
        assert_eq!(coerce_count("f", Some(&json!(7))).unwrap(), 7);
        assert_eq!(coerce_count("f", Some(&json!(-3))).unwrap(), -3);
        assert_eq!(coerce_count("f", Some(&json!(3.9))).unwrap(), 3);
        assert_eq!(coerce_count("f", Some(&json!(" 42 "))).unwrap(), 42);
        assert_eq!(coerce_count("f", Some(&json!(true))).unwrap(), 1);
        assert_eq!(coerce_count("f", Some(&json!(null))).unwrap(), 0);
        assert_eq!(coerce_count("f", Some(&json!(""))).unwrap(), 0);
        assert_eq!(coerce_count("f", Some(&json!([]))).unwrap(), 0);
        assert_eq!(coerce_count("f", None).unwrap(), 0);
    }

    #[test]
    fn test_coerce_count_malformed() {
        assert!(coerce_count("f", Some(&json!("abc"))).is_err());
        assert!(coerce_count("f", Some(&json!("1.5"))).is_err());
        assert!(coerce_count("f", Some(&json!([1]))).is_err());
        assert!(coerce_count("f", Some(&json!({"n": 1}))).is_err());
        assert!(coerce_count("f", Some(&json!(u64::MAX))).is_err());
    }

    #[test]
    fn test_decode_full_comment() {
        let value = json!({
            "cid": "c1",
            "text": "ENCRYPTED MONEY CODE!",
            "digg_count": 5,
            "reply_comment_total": 3,
            "user": {"unique_id": "handle"}
        });

        let comment = decode_comment(&value).unwrap();
        assert_eq!(comment.cid, "c1");
        assert_eq!(comment.text, "ENCRYPTED MONEY CODE!");
        assert_eq!(comment.likes, 5);
        assert_eq!(comment.replies, 3);
        assert_eq!(comment.username.as_deref(), Some("handle"));
    }

    #[test]
    fn test_decode_defaults() {
        let comment = decode_comment(&json!({})).unwrap();
        assert_eq!(comment.cid, "");
        assert_eq!(comment.text, "");
        assert_eq!(comment.likes, 0);
        assert_eq!(comment.replies, 0);
        assert!(comment.username.is_none());

        let comment = decode_comment(&json!({"cid": 7301, "text": null, "user": null})).unwrap();
        assert_eq!(comment.cid, "7301");
        assert_eq!(comment.text, "");
        assert!(comment.username.is_none());
    }

    #[test]
    fn test_decode_loose_text_and_author() {
        let comment =
            decode_comment(&json!({"text": 42, "user": {"unique_id": 12345}})).unwrap();
        assert_eq!(comment.text, "42");
        assert_eq!(comment.username.as_deref(), Some("12345"));

        let comment = decode_comment(&json!({"text": ["a"], "user": "deleted"})).unwrap();
        assert_eq!(comment.text, "");
        assert!(comment.username.is_none());

        let comment = decode_comment(&json!({"user": {"unique_id": null}})).unwrap();
        assert!(comment.username.is_none());
    }

    #[test]
    fn test_reply_count_fallback_order() {
        let preferred = json!({"reply_comment_total": 4, "reply_count": 9});
        assert_eq!(decode_comment(&preferred).unwrap().replies, 4);

        let zero_total = json!({"reply_comment_total": 0, "reply_count": 9});
        assert_eq!(decode_comment(&zero_total).unwrap().replies, 9);

        let only_fallback = json!({"reply_count": "2"});
        assert_eq!(decode_comment(&only_fallback).unwrap().replies, 2);

        // The fallback field is not consulted once the preferred one is set
        let bad_fallback = json!({"reply_comment_total": 1, "reply_count": "junk"});
        assert_eq!(decode_comment(&bad_fallback).unwrap().replies, 1);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(matches!(
            decode_comment(&json!({"digg_count": "lots"})),
            Err(ParseError::MalformedField {
                field: "digg_count",
                ..
            })
        ));
        assert!(matches!(
            decode_comment(&json!("just a string")),
            Err(ParseError::InvalidComment(_))
        ));
    }

    #[test]
    fn test_page_from_json() {
        let page = CommentPage::from_json(
            r#"{"comments": [{"cid": "a"}, {"cid": "b"}], "has_more": 1, "cursor": "100"}"#,
        )
        .unwrap();
        assert_eq!(page.comments.len(), 2);
        assert!(page.has_more);
        assert_eq!(page.cursor, 100);
    }

    #[test]
    fn test_page_defaults() {
        let page = CommentPage::from_json(r#"{"comments": null}"#).unwrap();
        assert!(page.comments.is_empty());
        assert!(!page.has_more);
        assert_eq!(page.cursor, 0);

        let page = CommentPage::from_json(r#"{"has_more": true, "cursor": "next"}"#).unwrap();
        assert!(page.has_more);
        assert_eq!(page.cursor, 0);
    }

    #[test]
    fn test_page_invalid_body() {
        assert!(matches!(
            CommentPage::from_json("<html>blocked</html>"),
            Err(FetchError::Decode(_))
        ));
        assert!(CommentPage::from_json("[]").is_err());
        assert!(CommentPage::from_json(r#"{"comments": {"a": 1}}"#).is_err());
    }
}
