//! Common test utilities

#![allow(dead_code)]

use comment_finder::config::Config;
use serde_json::{json, Value};

/// Path of the comment listing endpoint on the mock server
pub const COMMENT_API_PATH: &str = "/api/comment/list/";

/// Config pointing the comment API at a mock server, with a short timeout
pub fn test_config(mock_uri: &str) -> Config {
    let mut config = Config::default();
    config.finder.comment_api_url = format!("{mock_uri}{COMMENT_API_PATH}");
    config.finder.request_timeout_secs = 1;
    config
}

/// Build one comment record in the API shape
pub fn comment_json(cid: &str, text: &str, likes: i64, replies: i64) -> Value {
    json!({
        "cid": cid,
        "text": text,
        "digg_count": likes,
        "reply_comment_total": replies,
        "user": {"unique_id": format!("user_{cid}")}
    })
}

/// Build a page body
pub fn page_json(comments: Vec<Value>, has_more: bool, cursor: i64) -> Value {
    json!({
        "comments": comments,
        "has_more": has_more,
        "cursor": cursor,
        "status_code": 0
    })
}

/// `count` filler comments that never match a target phrase
pub fn filler_comments(prefix: &str, count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| comment_json(&format!("{prefix}{i}"), "nice video", 1, 0))
        .collect()
}
