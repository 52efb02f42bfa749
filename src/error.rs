// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the CSP reporter
//!
//! None of these ever escape [`ViolationReporter::handle`](crate::ViolationReporter::handle);
//! they are produced inside the pipeline and routed to the diagnostic log.

use thiserror::Error;

/// Result type alias for reporter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the CSP reporter
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Reporter configuration could not be parsed or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Host document could not be read
    #[error("DOM error: {0}")]
    Dom(String),

    /// Report transmission failed without an underlying HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Collector answered with a non-success status
    #[error("Collector at {url} answered with status {status}")]
    Rejected { url: String, status: u16 },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a new DOM error
    pub fn dom<S: Into<String>>(msg: S) -> Self {
        Error::Dom(msg.into())
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Error::Network(msg.into())
    }

    /// Create a rejection error for a non-2xx collector answer
    pub fn rejected(url: impl Into<String>, status: u16) -> Self {
        Error::Rejected {
            url: url.into(),
            status,
        }
    }

    /// Check if this is a network error
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::Http(_) | Error::Rejected { .. }
        )
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Serialization(_))
    }

    /// Get HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Rejected { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add operation context to error
    fn context(self, msg: &str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            Error::Other(format!("{}: {}", msg, err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_error() {
        let err = Error::rejected("https://acme.uriports.com/reports/report", 503);

        assert!(err.is_network());
        assert!(!err.is_config());
        assert_eq!(err.status_code(), Some(503));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_config_error_from_json() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json");
        let err: Error = parse.unwrap_err().into();

        assert!(err.is_config());
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_context() {
        let res: std::result::Result<(), &str> = Err("boom");
        let err = res.context("sending report").unwrap_err();
        assert_eq!(err.to_string(), "sending report: boom");
    }
}
