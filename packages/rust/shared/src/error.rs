//! Error types for SheetWriter.
//!
//! Library crates use [`SheetWriterError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all SheetWriter operations.
#[derive(Debug, thiserror::Error)]
pub enum SheetWriterError {
    /// Configuration loading or precondition failure.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level failure (connection refused, timeout, DNS).
    #[error("network error: {0}")]
    Network(String),

    /// A remote service answered with a non-success status.
    #[error("{service} returned HTTP {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Spreadsheet read/write error that is not a transport failure.
    #[error("sheets error: {0}")]
    Sheets(String),

    /// Language-model error (malformed reply, unexpected payload).
    #[error("generation error: {0}")]
    Generation(String),

    /// Structured data could not be parsed.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SheetWriterError>;

impl SheetWriterError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build an API error, truncating very long bodies.
    pub fn api(service: &'static str, status: u16, body: impl Into<String>) -> Self {
        let mut body = body.into();
        if body.chars().count() > 500 {
            body = body.chars().take(500).collect::<String>() + "…";
        }
        Self::Api {
            service,
            status,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SheetWriterError::config("missing SPREADSHEET_ID");
        assert_eq!(err.to_string(), "config error: missing SPREADSHEET_ID");

        let err = SheetWriterError::api("anthropic", 529, "overloaded");
        assert_eq!(err.to_string(), "anthropic returned HTTP 529: overloaded");
    }

    #[test]
    fn api_error_truncates_body() {
        let err = SheetWriterError::api("sheets", 500, "x".repeat(2000));
        match err {
            SheetWriterError::Api { body, .. } => assert_eq!(body.chars().count(), 501),
            other => panic!("expected Api, got {other:?}"),
        }
    }
}
