//! Unified error handling for the comment_finder crate
//!
//! This module provides a unified error type that consolidates the
//! domain-specific errors into a single `Error` enum, while keeping the
//! domain errors available where a layer only produces one kind.
//!
//! # Architecture
//!
//! - [`FinderErrorTrait`] - Common interface implemented by the error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping the domain errors
//!
//! A lookup itself never fails; these errors surface while setting up the
//! finder (configuration, HTTP client) and inside the layers, where the
//! finder logs them with their category before falling back.

use thiserror::Error;

pub use crate::utils::error::{FetchError, ParseError};

/// Common trait for the crate's error types
pub trait FinderErrorTrait: std::error::Error {
    /// Check if this error is recoverable (a later attempt may succeed)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, status)
    Network,
    /// Parsing and data extraction errors
    Parsing,
    /// Configuration and validation errors
    Config,
}

impl ErrorCategory {
    /// Short lowercase name, used as a log field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Config => "config",
        }
    }
}

/// Unified error type for the comment_finder crate
#[derive(Error, Debug)]
pub enum Error {
    /// Fetch-specific errors (building the HTTP client)
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

impl FinderErrorTrait for FetchError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout => true,
            Self::ServerError(status) => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::Decode(_) | Self::InvalidHeader { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Decode(_) => ErrorCategory::Parsing,
            Self::InvalidHeader { .. } => ErrorCategory::Config,
            Self::Http(_) | Self::Timeout | Self::ServerError(_) => ErrorCategory::Network,
        }
    }
}

impl FinderErrorTrait for ParseError {
    fn is_recoverable(&self) -> bool {
        false
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Parsing
    }
}

impl FinderErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Config(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(e) => e.category(),
            Self::Config(_) => ErrorCategory::Config,
        }
    }
}

// Conversion from anyhow::Error (configuration layer)
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Config(format!("{err:#}"))
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
