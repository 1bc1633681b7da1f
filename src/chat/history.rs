//! Session history fetcher
//!
//! Pulls one page of sessions from the backend and projects it into display
//! messages plus aggregate stats. Applying the result to a conversation is
//! the controller's job (`ChatController::load_history`).

use crate::api::QaBackend;
use crate::chat::message::{messages_from_sessions, Message};
use crate::chat::stats::ChatStats;
use crate::error::{QueryGptError, Result};

/// How a loaded page is combined with the messages already shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// Discard current messages
    #[default]
    Replace,
    /// Keep current messages and add the page after them
    Append,
}

/// A page of history ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    /// Oldest session first, question before answer
    pub messages: Vec<Message>,
    pub stats: ChatStats,
    /// Session count on the server across all pages
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

/// What a fetch produced when it did not fail outright
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Page(HistoryPage),
    /// No token, nothing was requested
    NoToken,
    /// The backend answered 403
    Forbidden,
}

/// Fetch and project one page.
///
/// A missing or blank token short-circuits without a request and a 403 is logged and
/// reported as [`FetchOutcome::Forbidden`]. Every other failure (transport,
/// non-2xx, undecodable body) is returned as an error.
pub async fn fetch_page<B: QaBackend + ?Sized>(
    backend: &B,
    token: Option<&str>,
    page: u32,
    size: u32,
) -> Result<FetchOutcome> {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        tracing::debug!("Skipping history load: no token");
        return Ok(FetchOutcome::NoToken);
    };

    let response = match backend.history(token, page, size).await {
        Ok(response) => response,
        Err(e) => {
            if let Some(QueryGptError::Forbidden(message)) = e.downcast_ref::<QueryGptError>() {
                tracing::error!("Authentication failed while loading history: {}", message);
                return Ok(FetchOutcome::Forbidden);
            }
            return Err(e);
        }
    };

    tracing::info!(
        "Loaded {} sessions (page {}, total {})",
        response.sessions.len(),
        response.page,
        response.total
    );

    Ok(FetchOutcome::Page(HistoryPage {
        messages: messages_from_sessions(&response.sessions),
        stats: ChatStats::from_sessions(&response.sessions),
        total: response.total,
        page: response.page,
        size: response.size,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{HistoryResponse, MockQaBackend};
    use crate::test_utils::session;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_no_token_makes_no_request() {
        let mut backend = MockQaBackend::new();
        backend.expect_history().never();

        let outcome = fetch_page(&backend, None, 1, 50).await.unwrap();
        assert_eq!(outcome, FetchOutcome::NoToken);
    }

    #[tokio::test]
    async fn test_blank_token_makes_no_request() {
        let mut backend = MockQaBackend::new();
        backend.expect_history().never();

        let outcome = fetch_page(&backend, Some(""), 1, 50).await.unwrap();
        assert_eq!(outcome, FetchOutcome::NoToken);
    }

    #[tokio::test]
    async fn test_forbidden_is_not_an_error() {
        let mut backend = MockQaBackend::new();
        backend
            .expect_history()
            .returning(|_, _, _| Err(QueryGptError::from_status(403, "denied").into()));

        let outcome = fetch_page(&backend, Some("tok"), 1, 50).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Forbidden);
    }

    #[tokio::test]
    async fn test_other_status_is_raised() {
        let mut backend = MockQaBackend::new();
        backend
            .expect_history()
            .returning(|_, _, _| Err(QueryGptError::from_status(500, "boom").into()));

        let err = fetch_page(&backend, Some("tok"), 1, 50).await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_page_is_projected_oldest_first() {
        let mut backend = MockQaBackend::new();
        backend
            .expect_history()
            .with(eq("tok"), eq(2u32), eq(10u32))
            .returning(|_, page, size| {
                Ok(HistoryResponse {
                    sessions: vec![session(2, 20, true, 100), session(1, 10, false, 300)],
                    total: 12,
                    page,
                    size,
                })
            });

        let FetchOutcome::Page(page) = fetch_page(&backend, Some("tok"), 2, 10).await.unwrap()
        else {
            panic!("expected a page");
        };

        let ids: Vec<&str> = page.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["user-1", "assistant-1", "user-2", "assistant-2"]);
        assert_eq!(page.stats.total_chats, 2);
        assert_eq!(page.stats.success_rate, 50);
        assert_eq!(page.stats.avg_response_time_ms, 200);
        assert_eq!(page.total, 12);
        assert_eq!(page.page, 2);
    }
}
