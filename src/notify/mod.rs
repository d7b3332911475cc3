//! Outbound chat notifications.

pub mod telegram;

pub use telegram::TelegramNotifier;

use async_trait::async_trait;
use thiserror::Error;

/// Delivery failures. These never leave a [`Notifier`]; they are logged and
/// reported to the caller as `false`.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The wrapped error has its URL removed; it would carry the bot token.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    #[error("chat API rejected the message (HTTP {status}): {description}")]
    Rejected { status: u16, description: String },
}

/// Sends a text message to the configured chat destination.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Make exactly one delivery attempt. Returns whether it was delivered.
    async fn send(&self, message: &str) -> bool;
}
