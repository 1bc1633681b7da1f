//! QueryGPT - terminal client for the Query GPT question answering service
//!
//! This library provides the building blocks of the `querygpt` CLI: the
//! HTTP client for the Q&A backend, the chat view controller, token
//! handling, and configuration.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `api`: Backend trait, HTTP client, and wire types
//! - `chat`: Messages, connection status, history fetch, and the chat controller
//! - `auth`: Bearer token lookup and keyring storage
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//! - `commands`: Handlers behind each subcommand
//!
//! # Example
//!
//! ```no_run
//! use querygpt::api::QaClient;
//! use querygpt::chat::{ChatContext, ChatController, connection};
//! use querygpt::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let client = QaClient::new(&config.api)?;
//!     let mut ctx = ChatContext::new(Some("token".to_string()));
//!     connection::probe(&client, &mut ctx.connection).await;
//!
//!     let mut controller = ChatController::new(config.api.llm_provider.clone());
//!     controller.submit_question(&client, &mut ctx, "What is Rust?").await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use api::{QaBackend, QaClient};
pub use chat::{ChatContext, ChatController, ConnectionStatus};
pub use config::Config;
pub use error::{QueryGptError, Result};

#[cfg(test)]
pub mod test_utils;
