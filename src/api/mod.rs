//! Q&A backend abstraction
//!
//! The chat controller only talks to the backend through [`QaBackend`], so
//! it can be driven by [`QaClient`] in production and by a mock in tests.

pub mod client;
pub mod types;

pub use client::QaClient;
pub use types::{
    AskRequest, AskResponse, DeleteResponse, HistoryResponse, Session, UserStats,
};

use crate::error::Result;
use async_trait::async_trait;

/// Operations offered by the Q&A backend
///
/// Every method except [`QaBackend::health`] needs the bearer token issued
/// by the identity provider. Implementations report a non-2xx status as a
/// [`crate::error::QueryGptError`] built with `from_status`, and an
/// unreachable backend as `QueryGptError::Transport`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QaBackend: Send + Sync {
    /// Probe `GET /health`; `Ok` means the backend answered with a 2xx.
    async fn health(&self) -> Result<()>;

    /// Submit a question.
    async fn ask(&self, token: &str, request: &AskRequest) -> Result<AskResponse>;

    /// Fetch one page of the user's sessions, newest first.
    async fn history(&self, token: &str, page: u32, size: u32) -> Result<HistoryResponse>;

    /// Delete one session.
    async fn delete_session(&self, token: &str, id: i64) -> Result<DeleteResponse>;

    /// Delete every session of the user.
    async fn clear_history(&self, token: &str) -> Result<DeleteResponse>;

    /// Aggregate statistics computed by the backend.
    async fn stats(&self, token: &str) -> Result<UserStats>;
}
