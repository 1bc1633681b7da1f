//! Aggregate statistics over a page of sessions

use crate::api::Session;
use serde::Serialize;

/// Summary shown in the chat header and on the welcome screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChatStats {
    /// Number of sessions on the loaded page
    pub total_chats: usize,
    /// Percentage of successful sessions, rounded to the nearest integer
    pub success_rate: u32,
    /// Mean response time in milliseconds, rounded to the nearest integer
    pub avg_response_time_ms: u64,
}

impl ChatStats {
    /// Compute stats for `sessions`. An empty page yields all zeros.
    ///
    /// # Examples
    ///
    /// ```
    /// use querygpt::chat::stats::ChatStats;
    ///
    /// let stats = ChatStats::from_sessions(&[]);
    /// assert_eq!(stats.success_rate, 0);
    /// ```
    pub fn from_sessions(sessions: &[Session]) -> Self {
        let total = sessions.len();
        if total == 0 {
            return Self::default();
        }

        let successful = sessions.iter().filter(|s| s.is_successful).count();
        let latency_sum: u64 = sessions.iter().map(|s| s.response_time_ms).sum();

        Self {
            total_chats: total,
            success_rate: (successful as f64 / total as f64 * 100.0).round() as u32,
            avg_response_time_ms: (latency_sum as f64 / total as f64).round() as u64,
        }
    }
}
