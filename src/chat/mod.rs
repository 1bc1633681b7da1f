//! Conversation state shown in the terminal
//!
//! - `message`: display messages and their projection from stored sessions
//! - `connection`: reachability state machine driven by `GET /health`
//! - `history`: one-page history fetch
//! - `stats`: aggregate stats over a page
//! - `controller`: the chat view controller tying these together
//! - `suggestions`: starter questions for the welcome screen

pub mod connection;
pub mod controller;
pub mod history;
pub mod message;
pub mod stats;
pub mod suggestions;

pub use connection::ConnectionStatus;
pub use controller::{
    ChatContext, ChatController, HistoryLoad, PendingQuestion, SubmitOutcome, SubmitRejection,
    SubmitState, ViewState, EMPTY_ANSWER_TEXT, ERROR_FALLBACK_TEXT,
};
pub use history::{fetch_page, FetchOutcome, HistoryPage, MergeMode};
pub use message::{Message, Rating, Role};
pub use stats::ChatStats;
