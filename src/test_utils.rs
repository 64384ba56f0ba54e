//! Test utilities for docquery
//!
//! This module provides common test utilities including temporary files,
//! canned agent payloads, and assertion helpers.

use crate::config::Config;
use crate::documents::{UploadFile, PDF_MEDIA_TYPE};
use crate::error::Result;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Describe an in-memory PDF upload
pub fn pdf_upload(name: &str, size: u64) -> UploadFile {
    UploadFile::new(name, size, Some(PDF_MEDIA_TYPE))
}

/// Agent reply body for the refund-policy example
pub fn refund_policy_body() -> String {
    r#"{"success":true,"response":{"answer":"30 days","confidence":0.82,"citations":[{"document_name":"terms.pdf","page_number":4,"excerpt":"...","relevance_score":0.9}]}}"#
        .to_string()
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Create a test configuration with default values
pub fn test_config() -> Config {
    Config::default()
}

/// Create a test configuration YAML string
pub fn test_config_yaml() -> String {
    r#"
agent:
  endpoint: http://localhost:4000/api/agent
  agent_id: test-agent
  timeout_seconds: 10

upload:
  tick_interval_ms: 50
  max_increment: 20
  processing_time_ms: 500
  min_pages: 1
  max_pages: 10

chat:
  follow_up_limit: 2
  require_documents: false
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::wire::decode_reply;
    use crate::error::DocQueryError;
    use crate::render::SearchResponse;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.pdf", "content");
        assert!(path.exists());
        let upload = UploadFile::from_path(&path).unwrap();
        assert!(upload.is_pdf());
    }

    #[test]
    fn test_pdf_upload_is_pdf() {
        assert!(pdf_upload("a.pdf", 1).is_pdf());
    }

    #[test]
    fn test_refund_policy_body_decodes() {
        let response = SearchResponse::from_reply(decode_reply(&refund_policy_body()).unwrap());
        assert_eq!(response.answer, "30 days");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(DocQueryError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        let result: Result<()> = Ok(());
        assert_error_contains(result, "error");
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_error_contains_wrong_message() {
        let result: Result<()> = Err(DocQueryError::Config("different error".to_string()).into());
        assert_error_contains(result, "not present");
    }

    #[test]
    fn test_test_config() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_test_config_yaml() {
        let config: Config = serde_yaml::from_str(&test_config_yaml()).unwrap();
        assert_eq!(config.agent.agent_id, "test-agent");
        assert_eq!(config.chat.follow_up_limit, 2);
        assert!(!config.chat.require_documents);
        assert!(config.validate().is_ok());
    }
}
