//! HTTP plumbing: link expansion and the comment listing API
//!
//! All requests go through one [`reqwest::Client`] carrying the static
//! header set, the per-request timeout and redirect following.

pub mod comment;
pub mod headers;
pub mod url;

use reqwest::{redirect, Client};

use crate::config::FinderConfig;
use crate::utils::error::FetchError;

/// Maximum redirects followed during link expansion
pub const MAX_REDIRECTS: usize = 10;

/// Build the shared HTTP client
///
/// # Errors
///
/// Returns `FetchError::InvalidHeader` for unusable header values and
/// `FetchError::Http` if the client cannot be created
pub fn build_client(config: &FinderConfig) -> Result<Client, FetchError> {
    let headers = headers::build_default_headers(&config.user_agent, &config.accept)?;

    let client = Client::builder()
        .default_headers(headers)
        .timeout(config.request_timeout())
        .redirect(redirect::Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .build()?;

    Ok(client)
}
