//! Error types for labdash
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for labdash operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, persistence, upstream fetches, and terminal
/// session handling.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bookmark store errors (persistence, conflicts)
    #[error("App store error: {0}")]
    Store(String),

    /// Settings document errors
    #[error("Settings error: {0}")]
    Settings(String),

    /// Liveness probe errors
    #[error("Probe error: {0}")]
    Probe(String),

    /// Widget fetch errors (upstream public APIs)
    #[error("Widget error: {0}")]
    Widget(String),

    /// Integration fetch errors (configured homelab services)
    #[error("Integration error: {0}")]
    Integration(String),

    /// Terminal session errors (spawn, relay, teardown)
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for labdash operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = DashboardError::Config("invalid port".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid port");
    }

    #[test]
    fn test_store_error_display() {
        let error = DashboardError::Store("name conflict".to_string());
        assert_eq!(error.to_string(), "App store error: name conflict");
    }

    #[test]
    fn test_terminal_error_display() {
        let error = DashboardError::Terminal("spawn failed".to_string());
        assert_eq!(error.to_string(), "Terminal error: spawn failed");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: DashboardError = io_error.into();
        assert!(matches!(error, DashboardError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let error: DashboardError = json_error.into();
        assert!(matches!(error, DashboardError::Serialization(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DashboardError>();
    }
}
