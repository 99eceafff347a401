//! Error types for gs-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for gs-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for gs-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid path format
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Alias not found
    #[error("Alias not found: {0}")]
    AliasNotFound(String),

    /// Alias already exists
    #[error("Alias already exists: {0}")]
    AliasExists(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network or connection error (retryable)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The gateway rejected the request (bad filter, bad expression)
    #[error("Request rejected: {0}")]
    Server(String),

    /// A scanned row lacks the key attribute the caller required
    #[error("Row {row} is missing key attribute '{field}'")]
    MissingKeyField { field: String, row: usize },

    /// Some keys in a filtered delete could not be removed
    #[error("Delete failed for {} of the matched items", .failures.len())]
    PartialDelete { failures: Vec<DeleteFailure> },

    /// Conflict error
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Feature not supported by backend
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// General error
    #[error("{0}")]
    General(String),
}

/// One failed key from a filtered delete, with the cause preserved.
#[derive(Debug)]
pub struct DeleteFailure {
    pub key: String,
    pub error: Error,
}

impl std::fmt::Display for DeleteFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.key, self.error)
    }
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidPath(_) => 2,                        // UsageError
            Error::InvalidUrl(_) => 2,                         // UsageError
            Error::Config(_) => 2,                             // UsageError
            Error::Server(_) => 2,                             // UsageError
            Error::Transport(_) => 3,                          // TransportError
            Error::Auth(_) => 4,                               // AuthError
            Error::NotFound(_) | Error::AliasNotFound(_) => 5, // NotFound
            Error::Conflict(_) | Error::AliasExists(_) => 6,   // Conflict
            Error::UnsupportedFeature(_) => 7,                 // UnsupportedFeature
            _ => 1,                                            // GeneralError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::InvalidPath("test".into()).exit_code(), 2);
        let url_err = url::Url::parse("not a url").unwrap_err();
        assert_eq!(Error::InvalidUrl(url_err).exit_code(), 2);
        assert_eq!(Error::Config("test".into()).exit_code(), 2);
        assert_eq!(Error::Server("test".into()).exit_code(), 2);
        assert_eq!(Error::Transport("test".into()).exit_code(), 3);
        assert_eq!(Error::Auth("test".into()).exit_code(), 4);
        assert_eq!(Error::NotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::AliasNotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::Conflict("test".into()).exit_code(), 6);
        assert_eq!(Error::AliasExists("test".into()).exit_code(), 6);
        assert_eq!(Error::General("test".into()).exit_code(), 1);
        let partial = Error::PartialDelete { failures: vec![] };
        assert_eq!(partial.exit_code(), 1);
    }

    #[test]
    fn test_error_display() {
        let err = Error::AliasNotFound("mygrid".into());
        assert_eq!(err.to_string(), "Alias not found: mygrid");

        let err = Error::MissingKeyField {
            field: "__name".into(),
            row: 2,
        };
        assert_eq!(err.to_string(), "Row 2 is missing key attribute '__name'");
    }

    #[test]
    fn test_partial_delete_display() {
        let err = Error::PartialDelete {
            failures: vec![
                DeleteFailure {
                    key: "k3".into(),
                    error: Error::Server("bad".into()),
                },
                DeleteFailure {
                    key: "k7".into(),
                    error: Error::Transport("reset".into()),
                },
            ],
        };
        assert_eq!(err.to_string(), "Delete failed for 2 of the matched items");
    }
}
