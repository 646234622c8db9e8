//! Error types for design-extract
//!
//! This module provides the error hierarchy using `thiserror`. Only two kinds
//! of failure ever reach the caller as `success: false`: bad input and a
//! navigation that failed on every tier. Everything else is contained where it
//! happens (see [`crate::pipeline`]).

use crate::pipeline::ExtractionFailure;
use thiserror::Error;

/// The main error type for design-extract operations
#[derive(Error, Debug)]
pub enum Error {
    /// Browser-related errors
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Navigation errors
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Per-probe extraction errors
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Screenshot errors
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Client input errors (missing or malformed URL)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ChromiumOxide errors
    #[error("CDP error: {0}")]
    Cdp(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Browser lifecycle and control errors
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Failed to launch browser
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Browser configuration error
    #[error("Invalid browser configuration: {0}")]
    ConfigError(String),

    /// Failed to create new page/tab
    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    /// Timeout waiting for browser
    #[error("Browser operation timed out after {0}ms")]
    Timeout(u64),
}

/// Navigation errors
#[derive(Error, Debug)]
pub enum NavigationError {
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A single wait tier timed out
    #[error("Navigation timed out after {0}ms")]
    Timeout(u64),

    /// Page load failed
    #[error("Page load failed: {0}")]
    LoadFailed(String),

    /// Both the network-idle and the DOMContentLoaded tiers failed
    #[error("Navigation failed on every wait strategy: {primary}; fallback: {fallback}")]
    AllTiersFailed {
        /// Failure of the network-idle tier
        primary: String,
        /// Failure of the DOMContentLoaded tier
        fallback: String,
    },
}

/// Errors raised by a single in-page probe
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// JavaScript execution failed
    #[error("JavaScript execution failed: {0}")]
    JsExecutionFailed(String),

    /// Probe returned a shape we could not decode
    #[error("Unexpected probe result: {0}")]
    InvalidResult(String),

    /// Probe exceeded its time budget
    #[error("Probe '{probe}' timed out after {ms}ms")]
    Timeout {
        /// Probe name
        probe: &'static str,
        /// Budget in milliseconds
        ms: u64,
    },
}

/// Capture errors
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Screenshot failed
    #[error("Screenshot capture failed: {0}")]
    ScreenshotFailed(String),

    /// Capture timeout
    #[error("Capture timed out after {0}ms")]
    Timeout(u64),
}

/// Result type alias for design-extract operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }

    /// Create a CDP error from a string
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }

    /// Create an input error from a string
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// True for errors caused by the caller rather than the target site
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_) | Error::Navigation(NavigationError::InvalidUrl(_))
        )
    }

    /// Build the `success: false` response for this error
    pub fn into_failure(self, url: impl Into<String>) -> ExtractionFailure {
        ExtractionFailure::new(url, self.to_string())
    }
}

/// Convert chromiumoxide errors
impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Browser(BrowserError::LaunchFailed("no chrome".to_string()));
        assert!(err.to_string().contains("Failed to launch browser"));
        assert!(err.to_string().contains("no chrome"));
    }

    #[test]
    fn test_all_tiers_failed_mentions_both() {
        let err = NavigationError::AllTiersFailed {
            primary: "Navigation timed out after 45000ms".to_string(),
            fallback: "Page load failed: net::ERR_NAME_NOT_RESOLVED".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("45000ms"));
        assert!(msg.contains("ERR_NAME_NOT_RESOLVED"));
    }

    #[test]
    fn test_probe_timeout_display() {
        let err = ExtractionError::Timeout {
            probe: "colors",
            ms: 15000,
        };
        assert_eq!(err.to_string(), "Probe 'colors' timed out after 15000ms");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(Error::invalid_input("url is required").is_client_error());
        assert!(Error::Navigation(NavigationError::InvalidUrl("x".into())).is_client_error());
        assert!(!Error::Navigation(NavigationError::Timeout(1)).is_client_error());
    }

    #[test]
    fn test_into_failure() {
        let failure = Error::invalid_input("url is required").into_failure("");
        assert!(!failure.success);
        assert_eq!(failure.error, "Invalid input: url is required");
        assert_eq!(failure.url, "");
    }
}
