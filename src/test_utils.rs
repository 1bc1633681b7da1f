//! Test utilities for QueryGPT
//!
//! Temporary directories, config files on disk, and canned backend data
//! shared by the unit tests.

use crate::api::Session;
use crate::chat::{ChatContext, ConnectionStatus};
use chrono::{TimeZone, Utc};
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory that is removed when dropped
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

/// Build a stored session
///
/// `created_offset_secs` is added to a fixed base instant so that tests can
/// order sessions by age without depending on the clock.
pub fn session(
    id: i64,
    created_offset_secs: i64,
    is_successful: bool,
    response_time_ms: u64,
) -> Session {
    let base = Utc
        .with_ymd_and_hms(2024, 1, 15, 10, 0, 0)
        .single()
        .expect("valid base timestamp");
    Session {
        id,
        question: format!("Question {}", id),
        answer: format!("Answer {}", id),
        llm_provider: "openai".to_string(),
        response_time_ms,
        created_at: base + chrono::Duration::seconds(created_offset_secs),
        is_successful,
    }
}

/// A signed-in context with a reachable backend
pub fn connected_context() -> ChatContext {
    ChatContext {
        token: Some("test-token".to_string()),
        connection: ConnectionStatus::Connected,
    }
}
