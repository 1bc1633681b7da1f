//! Backend reachability as seen by the client

use crate::api::QaBackend;
use colored::Colorize;
use std::fmt;

/// Client's belief about whether the backend is reachable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// A health probe is in progress (also the state before the first probe)
    #[default]
    Checking,
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    /// Outcome of a finished probe.
    pub fn from_probe<E>(probe: &Result<(), E>) -> Self {
        if probe.is_ok() {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }

    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }

    /// True when a probe moved the backend from offline back to connected.
    pub fn recovered_from(self, before: Self) -> bool {
        before == Self::Disconnected && self == Self::Connected
    }

    /// Label with the same colors as the status badge of the chat header.
    pub fn colored_label(self) -> String {
        match self {
            Self::Checking => "Connecting...".yellow().to_string(),
            Self::Connected => "Connected".green().to_string(),
            Self::Disconnected => "Offline".red().to_string(),
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checking => write!(f, "checking"),
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// Run one `GET /health` probe, moving `status` through `Checking`.
///
/// Returns the new status.
pub async fn probe<B: QaBackend + ?Sized>(
    backend: &B,
    status: &mut ConnectionStatus,
) -> ConnectionStatus {
    *status = ConnectionStatus::Checking;
    let result = backend.health().await;
    if let Err(e) = &result {
        tracing::warn!("Health check failed: {}", e);
    }
    *status = ConnectionStatus::from_probe(&result);
    tracing::debug!("Connection status: {}", status);
    *status
}
