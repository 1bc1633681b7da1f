//! Wire types exchanged with the Q&A backend

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A persisted question/answer record owned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Server-assigned identifier
    pub id: i64,
    /// Question as submitted by the user
    pub question: String,
    /// Answer produced by the backend
    pub answer: String,
    /// Provider tag the backend answered with
    #[serde(default)]
    pub llm_provider: String,
    /// Backend-measured latency in milliseconds; 0 when the backend stored none
    #[serde(default, deserialize_with = "deserialize_optional_ms")]
    pub response_time_ms: u64,
    /// Creation time of the record
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    /// Whether the backend produced a real answer
    pub is_successful: bool,
}

/// One page of history, newest session first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub sessions: Vec<Session>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

/// Body of `POST /api/v1/qa/ask`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskRequest {
    pub question: String,
    pub llm_provider: String,
}

/// Answer to a submitted question
///
/// Only `answer` is guaranteed; the remaining fields are filled in by
/// backends that persist the session.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub response_time_ms: Option<u64>,
    #[serde(default)]
    pub is_successful: Option<bool>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub session_id: Option<i64>,
}

/// Result of a history deletion
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
    #[serde(default)]
    pub deleted_count: Option<u64>,
}

/// Aggregate statistics computed by the backend over all sessions
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserStats {
    pub total_sessions: u64,
    pub successful_sessions: u64,
    pub success_rate: f64,
    pub average_response_time_ms: f64,
}

/// Accepts RFC 3339 timestamps as well as the offset-less ISO 8601 form the
/// backend writes, which is UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// A `null` latency counts as 0.
fn deserialize_optional_ms<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
}
