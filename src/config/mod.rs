//! Configuration management for the comment finder
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. Every field has a default, so a file only needs
//! the keys it changes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::crawler::comment::api;
use crate::crawler::headers::{DEFAULT_ACCEPT, DEFAULT_USER_AGENT};
use crate::finder::select::DEFAULT_SCAN_LIMIT;
use crate::matcher::{PhraseMatcher, DEFAULT_PHRASES};
use crate::utils::retry::RetryConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lookup configuration
    pub finder: FinderConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Lookup-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent string
    pub user_agent: String,

    /// Accept header value
    pub accept: String,

    /// Comment listing endpoint
    pub comment_api_url: String,

    /// Application id sent as `aid`
    pub app_id: u32,

    /// Maximum pages fetched per attempt
    pub max_pages: u32,

    /// Comments requested per page
    pub page_size: u32,

    /// Comments scanned per attempt
    pub scan_limit: usize,

    /// Extra attempts after the first
    pub retry_count: u32,

    /// Pause between attempts in seconds
    pub retry_delay_secs: u64,

    /// Target phrases (normalized when the matcher is built)
    pub phrases: Vec<String>,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 7,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            comment_api_url: api::COMMENT_API_URL.to_string(),
            app_id: api::APP_ID,
            max_pages: api::MAX_PAGES,
            page_size: api::PAGE_SIZE,
            scan_limit: DEFAULT_SCAN_LIMIT,
            retry_count: 2,
            retry_delay_secs: 4,
            phrases: DEFAULT_PHRASES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables over the defaults
    ///
    /// Recognized variables: `COMMENT_FINDER_REQUEST_TIMEOUT`,
    /// `COMMENT_FINDER_USER_AGENT`, `COMMENT_FINDER_ACCEPT`,
    /// `COMMENT_FINDER_API_URL`, `COMMENT_FINDER_APP_ID`,
    /// `COMMENT_FINDER_MAX_PAGES`, `COMMENT_FINDER_PAGE_SIZE`,
    /// `COMMENT_FINDER_SCAN_LIMIT`, `COMMENT_FINDER_RETRY_COUNT`,
    /// `COMMENT_FINDER_RETRY_DELAY`, `COMMENT_FINDER_PHRASES`
    /// (comma-separated), `COMMENT_FINDER_LOG_LEVEL`,
    /// `COMMENT_FINDER_LOG_FORMAT`. Unparseable values are ignored.
    pub fn from_env() -> Result<Self> {
        let defaults = FinderConfig::default();

        let phrases = std::env::var("COMMENT_FINDER_PHRASES")
            .ok()
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .filter(|p| !p.is_empty())
            .unwrap_or(defaults.phrases);

        let finder = FinderConfig {
            request_timeout_secs: env_parse("COMMENT_FINDER_REQUEST_TIMEOUT")
                .unwrap_or(defaults.request_timeout_secs),
            user_agent: std::env::var("COMMENT_FINDER_USER_AGENT")
                .unwrap_or(defaults.user_agent),
            accept: std::env::var("COMMENT_FINDER_ACCEPT").unwrap_or(defaults.accept),
            comment_api_url: std::env::var("COMMENT_FINDER_API_URL")
                .unwrap_or(defaults.comment_api_url),
            app_id: env_parse("COMMENT_FINDER_APP_ID").unwrap_or(defaults.app_id),
            max_pages: env_parse("COMMENT_FINDER_MAX_PAGES").unwrap_or(defaults.max_pages),
            page_size: env_parse("COMMENT_FINDER_PAGE_SIZE").unwrap_or(defaults.page_size),
            scan_limit: env_parse("COMMENT_FINDER_SCAN_LIMIT").unwrap_or(defaults.scan_limit),
            retry_count: env_parse("COMMENT_FINDER_RETRY_COUNT").unwrap_or(defaults.retry_count),
            retry_delay_secs: env_parse("COMMENT_FINDER_RETRY_DELAY")
                .unwrap_or(defaults.retry_delay_secs),
            phrases,
        };

        let logging = LoggingConfig {
            level: std::env::var("COMMENT_FINDER_LOG_LEVEL")
                .unwrap_or_else(|_| String::from("info")),
            format: std::env::var("COMMENT_FINDER_LOG_FORMAT")
                .unwrap_or_else(|_| String::from("text")),
        };

        Ok(Self { finder, logging })
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let finder = &self.finder;

        if finder.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if finder.max_pages == 0 {
            anyhow::bail!("max_pages must be greater than 0");
        }

        if finder.page_size == 0 {
            anyhow::bail!("page_size must be greater than 0");
        }

        if finder.scan_limit == 0 {
            anyhow::bail!("scan_limit must be greater than 0");
        }

        if finder.comment_api_url.trim().is_empty() {
            anyhow::bail!("comment_api_url must not be empty");
        }

        if self.matcher().is_empty() {
            anyhow::bail!("phrases must contain at least one non-empty phrase");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.finder.request_timeout()
    }

    /// Build the phrase matcher
    #[must_use]
    pub fn matcher(&self) -> PhraseMatcher {
        PhraseMatcher::new(&self.finder.phrases)
    }

    /// Get the outer retry configuration
    #[must_use]
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::fixed(
            self.finder.retry_count,
            Duration::from_secs(self.finder.retry_delay_secs),
        )
    }
}

impl FinderConfig {
    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
