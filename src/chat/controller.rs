//! Chat view controller
//!
//! Owns the ordered list of messages shown to the user, merges history
//! loaded from the backend with messages created during the session, and
//! tracks whether a question is being answered.
//!
//! Submitting a question is a small state machine:
//!
//! ```text
//! Idle ──begin_submit──▶ Submitting ──finish_submit──▶ Settled | Errored
//!   ▲                                                       │
//!   └──────────────── (next begin_submit) ◀─────────────────┘
//! ```
//!
//! `begin_submit` applies every guard and appends the question
//! optimistically; `finish_submit` appends the answer (or the fallback error
//! text). [`ChatController::submit_question`] runs both around the network
//! call. The auth token and connection status are not owned here; they are
//! passed in through [`ChatContext`].

use crate::api::{AskRequest, AskResponse, QaBackend};
use crate::chat::connection::{self, ConnectionStatus};
use crate::chat::history::{fetch_page, FetchOutcome, HistoryPage, MergeMode};
use crate::chat::message::{Message, Rating, Role};
use crate::chat::stats::ChatStats;
use crate::error::{is_transport_error, Result};

use chrono::Utc;
use std::time::Instant;
use thiserror::Error;

/// Text of the assistant message appended when a question could not be answered
pub const ERROR_FALLBACK_TEXT: &str =
    "An error occurred. Please check your connection and try again.";

/// Text shown when the backend answered with an empty body
pub const EMPTY_ANSWER_TEXT: &str = "No response received";

/// State the controller reads but does not own
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatContext {
    /// Bearer token from the identity provider, `None` when signed out
    pub token: Option<String>,
    pub connection: ConnectionStatus,
}

impl ChatContext {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token,
            connection: ConnectionStatus::Checking,
        }
    }
}

/// Progress of the current (or last) question
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmitState {
    #[default]
    Idle,
    Submitting {
        question: String,
    },
    Settled,
    Errored,
}

/// What the main area of the chat shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    /// Greeting, stats cards and suggested questions
    #[default]
    Welcome,
    Conversation,
}

/// Why a submission was ignored
///
/// A rejected submission leaves the message list untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    #[error("Question is empty")]
    EmptyQuestion,

    #[error("Still waiting for the previous answer")]
    RequestInFlight,

    #[error("Backend is {0}; run /health to re-check")]
    NotConnected(ConnectionStatus),

    #[error("Not signed in; run `querygpt auth login <token>` or pass --token")]
    MissingToken,
}

/// A question accepted by [`ChatController::begin_submit`] and awaiting its answer
#[derive(Debug, Clone)]
pub struct PendingQuestion {
    pub question: String,
    pub token: String,
    started: Instant,
}

/// How an accepted submission ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The backend answered; `is_successful` mirrors its flag
    Answered { is_successful: bool },
    /// The request failed and the fallback message was appended
    Failed,
}

/// Result of a history load as seen by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryLoad {
    Loaded { sessions: usize, total: u64 },
    /// No token; nothing was requested
    Skipped,
    /// The backend answered 403; existing messages were kept
    Forbidden,
    /// Request or decoding failed; existing messages were kept
    Failed { error: String, unreachable: bool },
}

/// Conversation state for one chat session
#[derive(Debug, Clone)]
pub struct ChatController {
    messages: Vec<Message>,
    submit: SubmitState,
    view: ViewState,
    stats: ChatStats,
    loading_history: bool,
    llm_provider: String,
}

impl ChatController {
    /// Create an empty conversation that tags questions with `llm_provider`.
    ///
    /// # Examples
    ///
    /// ```
    /// use querygpt::chat::{ChatController, ViewState};
    ///
    /// let controller = ChatController::new("openai");
    /// assert!(controller.messages().is_empty());
    /// assert_eq!(controller.view(), ViewState::Welcome);
    /// assert!(!controller.is_loading());
    /// ```
    pub fn new(llm_provider: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            submit: SubmitState::Idle,
            view: ViewState::Welcome,
            stats: ChatStats::default(),
            loading_history: false,
            llm_provider: llm_provider.into(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn submit_state(&self) -> &SubmitState {
        &self.submit
    }

    /// True while a question is waiting for its answer.
    pub fn is_loading(&self) -> bool {
        matches!(self.submit, SubmitState::Submitting { .. })
    }

    pub fn is_loading_history(&self) -> bool {
        self.loading_history
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    /// The welcome screen is shown only while there is nothing to display.
    pub fn shows_welcome(&self) -> bool {
        self.view == ViewState::Welcome && self.messages.is_empty() && !self.loading_history
    }

    /// Stats of the last loaded history page.
    pub fn stats(&self) -> ChatStats {
        self.stats
    }

    /// Number of questions currently displayed.
    pub fn question_count(&self) -> usize {
        self.messages.iter().filter(|m| m.role == Role::User).count()
    }

    pub fn llm_provider(&self) -> &str {
        &self.llm_provider
    }

    /// Apply the submission guards and, if they pass, append the question.
    ///
    /// Guards are checked in order: empty text, request in flight, backend
    /// not connected, no token.
    ///
    /// # Errors
    ///
    /// Returns the first guard that failed; nothing is changed in that case.
    pub fn begin_submit(
        &mut self,
        text: &str,
        ctx: &ChatContext,
    ) -> std::result::Result<PendingQuestion, SubmitRejection> {
        let question = text.trim();
        if question.is_empty() {
            return Err(SubmitRejection::EmptyQuestion);
        }
        if self.is_loading() {
            return Err(SubmitRejection::RequestInFlight);
        }
        if !ctx.connection.is_connected() {
            return Err(SubmitRejection::NotConnected(ctx.connection));
        }
        let token = match ctx.token.as_deref() {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => return Err(SubmitRejection::MissingToken),
        };

        self.messages.push(Message::user(question, Utc::now()));
        self.view = ViewState::Conversation;
        self.submit = SubmitState::Submitting {
            question: question.to_string(),
        };

        Ok(PendingQuestion {
            question: question.to_string(),
            token,
            started: Instant::now(),
        })
    }

    /// Append the answer (or the fallback error text) for `pending`.
    ///
    /// Appends even if the conversation was cleared in the meantime; in-flight
    /// requests are never cancelled.
    pub fn finish_submit(
        &mut self,
        pending: PendingQuestion,
        result: Result<AskResponse>,
    ) -> SubmitOutcome {
        let measured_ms = pending.started.elapsed().as_millis() as u64;

        match result {
            Ok(response) => {
                let is_successful = response.is_successful.unwrap_or(true);
                let latency = response
                    .response_time_ms
                    .filter(|ms| *ms > 0)
                    .unwrap_or(measured_ms);
                let content = if response.answer.is_empty() {
                    EMPTY_ANSWER_TEXT.to_string()
                } else {
                    response.answer
                };

                self.messages.push(Message::assistant(
                    content,
                    Utc::now(),
                    is_successful,
                    Some(latency),
                ));
                self.submit = SubmitState::Settled;
                SubmitOutcome::Answered { is_successful }
            }
            Err(e) => {
                tracing::error!("Failed to get an answer: {}", e);
                self.messages.push(Message::assistant(
                    ERROR_FALLBACK_TEXT,
                    Utc::now(),
                    false,
                    None,
                ));
                self.submit = SubmitState::Errored;
                SubmitOutcome::Failed
            }
        }
    }

    /// Submit `text` to the backend and record the answer.
    ///
    /// On failure the connection is probed again, which moves
    /// `ctx.connection` through `Checking`.
    ///
    /// # Errors
    ///
    /// Returns a [`SubmitRejection`] when a guard rejects the submission; no
    /// request is made in that case.
    pub async fn submit_question<B: QaBackend + ?Sized>(
        &mut self,
        backend: &B,
        ctx: &mut ChatContext,
        text: &str,
    ) -> std::result::Result<SubmitOutcome, SubmitRejection> {
        let pending = self.begin_submit(text, ctx)?;
        let request = AskRequest {
            question: pending.question.clone(),
            llm_provider: self.llm_provider.clone(),
        };

        let result = backend.ask(&pending.token, &request).await;
        let outcome = self.finish_submit(pending, result);

        if outcome == SubmitOutcome::Failed {
            connection::probe(backend, &mut ctx.connection).await;
        }
        Ok(outcome)
    }

    /// Toggle the rating of the message with `message_id`.
    ///
    /// Selecting the rating a message already has clears it. Returns false
    /// when no message has that id.
    pub fn rate(&mut self, message_id: &str, rating: Rating) -> bool {
        let mut found = false;
        for message in self.messages.iter_mut().filter(|m| m.id == message_id) {
            message.rating = if message.rating == Some(rating) {
                None
            } else {
                Some(rating)
            };
            found = true;
        }
        found
    }

    /// Drop every message and return to the welcome screen.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.view = ViewState::Welcome;
    }

    /// Put a fetched page on screen.
    pub fn apply_history_page(&mut self, page: HistoryPage, mode: MergeMode) {
        match mode {
            MergeMode::Replace => self.messages = page.messages,
            MergeMode::Append => self.messages.extend(page.messages),
        }
        if !self.messages.is_empty() {
            self.view = ViewState::Conversation;
        }
        self.stats = page.stats;
    }

    /// Load a page of history and merge it into the conversation.
    ///
    /// Failures are logged and leave the current messages untouched; when
    /// the backend could not be reached the connection is probed again. The
    /// history-loading flag is cleared whatever the outcome.
    pub async fn load_history<B: QaBackend + ?Sized>(
        &mut self,
        backend: &B,
        ctx: &mut ChatContext,
        page: u32,
        size: u32,
        mode: MergeMode,
    ) -> HistoryLoad {
        let token = match ctx.token.as_deref() {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => return HistoryLoad::Skipped,
        };

        self.loading_history = true;
        let fetched = fetch_page(backend, Some(&token), page, size).await;

        let outcome = match fetched {
            Ok(FetchOutcome::Page(history)) => {
                let sessions = history.messages.len() / 2;
                let total = history.total;
                self.apply_history_page(history, mode);
                HistoryLoad::Loaded { sessions, total }
            }
            Ok(FetchOutcome::NoToken) => HistoryLoad::Skipped,
            Ok(FetchOutcome::Forbidden) => HistoryLoad::Forbidden,
            Err(e) => {
                tracing::error!("Error loading history: {}", e);
                let unreachable = is_transport_error(&e);
                if unreachable {
                    connection::probe(backend, &mut ctx.connection).await;
                }
                HistoryLoad::Failed {
                    error: e.to_string(),
                    unreachable,
                }
            }
        };

        self.loading_history = false;
        outcome
    }
}
