//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;
pub mod retry;

/// Drop the query string (everything from the first `?`) from a URL
pub fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

/// Truncate text to a maximum number of characters, for log previews
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_query() {
        assert_eq!(
            strip_query("https://x.com/@u/video/123?foo=bar&a=b"),
            "https://x.com/@u/video/123"
        );
        assert_eq!(strip_query("https://x.com/@u/video/123"), "https://x.com/@u/video/123");
        assert_eq!(strip_query("?only"), "");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("very long text here", 10), "very lo...");
        assert_eq!(truncate_text("ééééééééééé", 5), "éé...");
    }
}
