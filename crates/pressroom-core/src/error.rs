//! Error types for the Pressroom core library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types for Pressroom.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration loading or parsing error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// An untrusted path resolved outside of its root.
    #[error("Path traversal rejected: {input:?}")]
    PathTraversal { input: String },

    /// A path that is not a page was given to a page operation.
    #[error("Not a page: {path:?}")]
    NotAPage { path: String },

    /// A draft or public file is absent where one is required.
    #[error("Not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// File system I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic configuration crate error.
    #[error("Config crate error: {0}")]
    ConfigCrate(#[from] config::ConfigError),
}

impl CoreError {
    /// Create a new configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new path traversal error for the rejected input.
    pub fn path_traversal(input: impl Into<String>) -> Self {
        Self::PathTraversal {
            input: input.into(),
        }
    }

    /// Create a new not-a-page error.
    pub fn not_a_page(path: impl Into<String>) -> Self {
        Self::NotAPage { path: path.into() }
    }

    /// Create a new not-found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Whether the error was caused by the caller's input rather than the server.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::PathTraversal { .. } | Self::NotAPage { .. } | Self::NotFound { .. }
        )
    }

    /// HTTP status code equivalent for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::PathTraversal { .. } | Self::NotAPage { .. } => 400,
            Self::NotFound { .. } => 404,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CoreError::config("missing field");
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("missing field"));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_path_traversal_is_client_error() {
        let err = CoreError::path_traversal("../../etc/passwd");
        assert!(err.is_client_error());
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("../../etc/passwd"));
    }

    #[test]
    fn test_not_a_page_is_client_error() {
        let err = CoreError::not_a_page("notes.txt");
        assert!(err.is_client_error());
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("notes.txt"));
    }

    #[test]
    fn test_not_found() {
        let err = CoreError::not_found("drafts/about.html");
        assert!(err.is_client_error());
        assert_eq!(err.status_code(), 404);
        assert!(err.to_string().contains("drafts/about.html"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CoreError = io_err.into();
        assert!(err.to_string().contains("IO error"));
        assert!(!err.is_client_error());
        assert_eq!(err.status_code(), 500);
    }
}
