//! Error types for docquery
//!
//! This module defines the error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for docquery operations
///
/// Covers configuration loading, agent transport, payload decoding,
/// document store calls, and the upload pipeline.
#[derive(Error, Debug)]
pub enum DocQueryError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Agent transport errors (connection failures, non-success status)
    #[error("Agent error: {0}")]
    Agent(String),

    /// Agent payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Document store errors (backend delete failures)
    #[error("Document store error: {0}")]
    DocumentStore(String),

    /// Upload errors (unreadable file, missing metadata)
    #[error("Upload error: {0}")]
    Upload(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for docquery operations
///
/// Uses `anyhow::Error` so callers can attach context while still
/// downcasting to [`DocQueryError`] where the variant matters.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = DocQueryError::Config("invalid endpoint".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid endpoint");
    }

    #[test]
    fn test_agent_error_display() {
        let error = DocQueryError::Agent("connection refused".to_string());
        assert_eq!(error.to_string(), "Agent error: connection refused");
    }

    #[test]
    fn test_decode_error_display() {
        let error = DocQueryError::Decode("expected object".to_string());
        assert_eq!(error.to_string(), "Decode error: expected object");
    }

    #[test]
    fn test_document_store_error_display() {
        let error = DocQueryError::DocumentStore("404 Not Found".to_string());
        assert_eq!(error.to_string(), "Document store error: 404 Not Found");
    }

    #[test]
    fn test_upload_error_display() {
        let error = DocQueryError::Upload("missing file name".to_string());
        assert_eq!(error.to_string(), "Upload error: missing file name");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: DocQueryError = io_error.into();
        assert!(matches!(error, DocQueryError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: DocQueryError = json_error.into();
        assert!(matches!(error, DocQueryError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: DocQueryError = yaml_error.into();
        assert!(matches!(error, DocQueryError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DocQueryError>();
    }
}
