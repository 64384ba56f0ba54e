use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Config pointing the agent at `endpoint`
#[allow(dead_code)]
pub fn agent_config_yaml(endpoint: &str) -> String {
    format!(
        "agent:\n  endpoint: {}\n  agent_id: test-agent\n  timeout_seconds: 5\n",
        endpoint
    )
}

/// Agent reply body for the refund-policy example
#[allow(dead_code)]
pub fn refund_policy_body() -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "response": {
            "answer": "30 days",
            "confidence": 0.82,
            "citations": [{
                "document_name": "terms.pdf",
                "page_number": 4,
                "excerpt": "...",
                "relevance_score": 0.9
            }]
        }
    })
}
