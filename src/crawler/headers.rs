use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};

use crate::utils::error::FetchError;

/// Default `User-Agent` sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Default `Accept` sent with every request
pub const DEFAULT_ACCEPT: &str = "application/json";

/// Build the static header set shared by link expansion and comment requests
///
/// # Arguments
///
/// * `user_agent` - User agent string
/// * `accept` - Accept header value
///
/// # Errors
///
/// Returns `FetchError::InvalidHeader` if a value contains characters that
/// are not allowed in HTTP headers
///
/// # Examples
///
/// ```
/// use comment_finder::crawler::headers::build_default_headers;
///
/// let headers = build_default_headers("Mozilla/5.0", "application/json").unwrap();
/// assert_eq!(headers.len(), 2);
/// ```
pub fn build_default_headers(user_agent: &str, accept: &str) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();

    headers.insert(USER_AGENT, header_value("user-agent", user_agent)?);
    headers.insert(ACCEPT, header_value("accept", accept)?);

    Ok(headers)
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, FetchError> {
    HeaderValue::from_str(value).map_err(|_| FetchError::InvalidHeader {
        name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_default_headers() {
        let headers = build_default_headers(DEFAULT_USER_AGENT, DEFAULT_ACCEPT).unwrap();

        assert_eq!(
            headers.get(USER_AGENT).unwrap(),
            HeaderValue::from_static("Mozilla/5.0")
        );
        assert_eq!(
            headers.get(ACCEPT).unwrap(),
            HeaderValue::from_static("application/json")
        );
    }

    #[test]
    fn test_invalid_header_value_rejected() {
        let err = build_default_headers("bad\nagent", DEFAULT_ACCEPT).unwrap_err();
        assert!(matches!(
            err,
            FetchError::InvalidHeader {
                name: "user-agent",
                ..
            }
        ));
    }
}
