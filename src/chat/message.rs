//! Client-side display messages

use crate::api::Session;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    fn id_prefix(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id_prefix())
    }
}

/// User feedback on an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Like,
    Dislike,
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Like => write!(f, "like"),
            Self::Dislike => write!(f, "dislike"),
        }
    }
}

/// A single entry of the conversation as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// `user-…` or `assistant-…`
    pub id: String,
    pub content: String,
    pub role: Role,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_successful: Option<bool>,
    /// Answer latency in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    #[serde(default)]
    pub rating: Option<Rating>,
}

impl Message {
    /// Question typed by the user just now.
    pub fn user(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: live_id(Role::User, timestamp),
            content: content.into(),
            role: Role::User,
            timestamp,
            is_successful: None,
            response_time_ms: None,
            rating: None,
        }
    }

    /// Answer received just now.
    pub fn assistant(
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
        is_successful: bool,
        response_time_ms: Option<u64>,
    ) -> Self {
        Self {
            id: live_id(Role::Assistant, timestamp),
            content: content.into(),
            role: Role::Assistant,
            timestamp,
            is_successful: Some(is_successful),
            response_time_ms,
            rating: None,
        }
    }

    /// Expand a stored session into its question and answer, in that order.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use querygpt::api::Session;
    /// use querygpt::chat::message::{Message, Role};
    ///
    /// let session = Session {
    ///     id: 3,
    ///     question: "Why?".to_string(),
    ///     answer: "Because.".to_string(),
    ///     llm_provider: "openai".to_string(),
    ///     response_time_ms: 120,
    ///     created_at: Utc::now(),
    ///     is_successful: true,
    /// };
    /// let [question, answer] = Message::pair_from_session(&session);
    /// assert_eq!(question.id, "user-3");
    /// assert_eq!(answer.role, Role::Assistant);
    /// ```
    pub fn pair_from_session(session: &Session) -> [Message; 2] {
        [
            Message {
                id: format!("user-{}", session.id),
                content: session.question.clone(),
                role: Role::User,
                timestamp: session.created_at,
                is_successful: None,
                response_time_ms: None,
                rating: None,
            },
            Message {
                id: format!("assistant-{}", session.id),
                content: session.answer.clone(),
                role: Role::Assistant,
                timestamp: session.created_at,
                is_successful: Some(session.is_successful),
                response_time_ms: Some(session.response_time_ms),
                rating: None,
            },
        ]
    }

    /// Local `HH:MM` rendering of the timestamp.
    pub fn time_label(&self) -> String {
        self.timestamp
            .with_timezone(&chrono::Local)
            .format("%H:%M")
            .to_string()
    }
}

fn live_id(role: Role, timestamp: DateTime<Utc>) -> String {
    format!("{}-{}", role.id_prefix(), timestamp.timestamp_millis())
}

/// Expand a newest-first page into display order: oldest session first,
/// each as a question followed by its answer.
pub fn messages_from_sessions(sessions: &[Session]) -> Vec<Message> {
    sessions
        .iter()
        .rev()
        .flat_map(Message::pair_from_session)
        .collect()
}
