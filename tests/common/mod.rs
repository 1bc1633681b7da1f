use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use querygpt::config::{ApiConfig, Config};

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Configuration pointing at a mock backend.
#[allow(dead_code)]
pub fn config_for(base_url: &str) -> Config {
    Config {
        api: ApiConfig {
            base_url: base_url.to_string(),
            timeout_seconds: Some(5),
            ..ApiConfig::default()
        },
        ..Config::default()
    }
}

/// JSON body of one stored session as the backend serializes it.
#[allow(dead_code)]
pub fn session_json(id: i64, created_at: &str, is_successful: bool, ms: u64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "question": format!("Question {}", id),
        "answer": format!("Answer {}", id),
        "llm_provider": "openai",
        "response_time_ms": ms,
        "created_at": created_at,
        "is_successful": is_successful,
    })
}
