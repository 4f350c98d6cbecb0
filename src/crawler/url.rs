//! Link expansion and video id extraction
//!
//! Shared links come in short forms (`vm.` / `vt.` redirectors, share
//! pages) that only reveal the canonical `/@user/video/<id>` path after
//! following redirects. Expansion never fails: when both probes fail the
//! input is returned as-is and the missing id surfaces at extraction.

use regex::Regex;
use reqwest::{Client, Method};
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::utils::error::{FetchError, ParseError};
use crate::utils::strip_query;

/// Marker present in every canonical video URL
pub const VIDEO_MARKER: &str = "/video/";

static VIDEO_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/video/(\d+)").unwrap());

/// Extract the numeric video id from a canonical URL
///
/// # Errors
///
/// Returns `ParseError::NoVideoId` when the URL has no `/video/<digits>`
/// segment
///
/// # Examples
///
/// ```
/// use comment_finder::crawler::url::extract_video_id;
///
/// let id = extract_video_id("https://www.tiktok.com/@user/video/7123456789?lang=en").unwrap();
/// assert_eq!(id, "7123456789");
/// assert!(extract_video_id("https://vm.tiktok.com/ZMabc/").is_err());
/// ```
pub fn extract_video_id(url: &str) -> Result<String, ParseError> {
    VIDEO_ID_REGEX
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
        .ok_or_else(|| ParseError::NoVideoId(url.to_string()))
}

/// Build the permalink of a comment from the resolved video URL
///
/// # Examples
///
/// ```
/// use comment_finder::crawler::url::build_comment_link;
///
/// let link = build_comment_link("https://x.com/@u/video/123?foo=bar", "c1");
/// assert_eq!(link, "https://x.com/@u/video/123?cid=c1");
/// ```
pub fn build_comment_link(video_url: &str, cid: &str) -> String {
    format!("{}?cid={cid}", strip_query(video_url))
}

/// Expands shortened links by following redirects
///
/// The client carries the timeout, default headers and redirect policy; see
/// [`build_client`](crate::crawler::build_client).
#[derive(Debug, Clone)]
pub struct LinkResolver {
    client: Client,
}

impl LinkResolver {
    /// Create a resolver on top of an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Expand a link to its canonical form
    ///
    /// URLs already containing `/video/` are returned without any request.
    /// Otherwise a HEAD probe is tried, then a GET probe; the final URL of the
    /// first probe that gets a response wins. If neither gets one, the input
    /// is returned unchanged.
    pub async fn expand(&self, url: &str) -> String {
        if url.contains(VIDEO_MARKER) {
            return url.to_string();
        }

        match self.probe(Method::HEAD, url).await {
            Ok(resolved) => return resolved,
            Err(e) => {
                debug!(url = %url, error = %e, "HEAD expansion failed, trying GET");
            }
        }

        match self.probe(Method::GET, url).await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(url = %url, error = %e, "Link expansion failed, keeping original URL");
                url.to_string()
            }
        }
    }

    /// Send one request with redirects followed and report the final URL
    ///
    /// Any response counts, whatever its status: the interest is only in
    /// where the redirects ended.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Timeout` or `FetchError::Http` when no response
    /// arrives
    pub async fn probe(&self, method: Method, url: &str) -> Result<String, FetchError> {
        let response = self.client.request(method.clone(), url).send().await?;
        let resolved = response.url().to_string();

        debug!(
            method = %method,
            url = %url,
            resolved = %resolved,
            status = response.status().as_u16(),
            "Expanded link"
        );

        Ok(resolved)
    }
}
