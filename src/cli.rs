//! Command-line interface definition for QueryGPT
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, one-shot questions, history
//! management, health checks, and token storage.

use clap::{Parser, Subcommand};

/// QueryGPT - chat with the Query GPT question answering service
#[derive(Parser, Debug, Clone)]
#[command(name = "querygpt")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Write log lines to stderr as JSON objects
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Override the backend base URL from config
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Bearer token issued by the identity provider
    ///
    /// Takes precedence over a token stored with `querygpt auth login`.
    #[arg(long, env = "QUERYGPT_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for QueryGPT
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Do not load conversation history on start
        #[arg(long)]
        no_history: bool,
    },

    /// Ask a single question and print the answer
    Ask {
        /// Question text
        question: String,
    },

    /// Inspect and manage conversation history on the server
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Check whether the backend is reachable
    Health,

    /// Manage the stored identity provider token
    Auth {
        /// Auth subcommand
        #[command(subcommand)]
        command: AuthCommand,
    },
}

/// History management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List a page of past sessions with success and latency stats
    List {
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Page size (defaults to history.page_size from config)
        #[arg(short, long)]
        size: Option<u32>,

        /// Print the raw page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete one session by id
    Delete {
        /// Session id
        id: i64,
    },

    /// Delete every session of the current user
    Clear,

    /// Show aggregate stats computed by the server
    Stats,
}

/// Token storage subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum AuthCommand {
    /// Store a token in the OS keyring
    Login {
        /// Token issued by the identity provider
        #[arg(value_name = "TOKEN")]
        secret: String,
    },

    /// Remove the stored token
    Logout,

    /// Report where the active token comes from
    Status,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            log_json: false,
            base_url: None,
            token: None,
            command: Commands::Health,
        }
    }
}
