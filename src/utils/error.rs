//! Error types for the comment finder
//!
//! This module defines the domain errors returned up each layer. None of
//! them abort a lookup: the finder turns them into fallbacks, truncated
//! pagination or skipped comments.

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Non-success status code
    #[error("Server returned status {0}")]
    ServerError(u16),

    /// Response body could not be decoded
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Header value rejected by the HTTP stack
    #[error("Invalid header value for {name}: {value}")]
    InvalidHeader { name: &'static str, value: String },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Http(err)
        }
    }
}

/// Errors that can occur while decoding links and comment records
#[derive(Error, Debug)]
pub enum ParseError {
    /// URL carries no `/video/<digits>` segment
    #[error("No video id in URL: {0}")]
    NoVideoId(String),

    /// Comment record is not an object of the expected shape
    #[error("Invalid comment record: {0}")]
    InvalidComment(String),

    /// A single field could not be coerced
    #[error("Malformed field {field}: {value}")]
    MalformedField { field: &'static str, value: String },
}
