//! homework-bot -- polls the homework review status API and forwards status
//! changes to a Telegram chat.
//!
//! The crate is a single sequential loop: fetch with a cursor, validate the
//! payload, format the newest submission's verdict, notify, sleep.

pub mod config;
pub mod error;
pub mod logging;
pub mod notify;
pub mod poller;
pub mod practicum;
pub mod status;

use anyhow::{Context, Result};

use crate::config::{AppConfig, Secrets};
use crate::notify::TelegramNotifier;
use crate::poller::{Poller, SleepTicker};
use crate::practicum::PracticumClient;

/// Build the status client and notifier from configuration.
pub fn build_clients(config: &AppConfig, secrets: &Secrets) -> Result<(PracticumClient, TelegramNotifier)> {
    let source = PracticumClient::new(
        config.api.endpoint.clone(),
        secrets.practicum_token.clone(),
        config.api.timeout(),
    )
    .context("failed to build status API client")?;

    let notifier = TelegramNotifier::new(
        config.telegram.api_base.clone(),
        secrets.telegram_token.clone(),
        secrets.telegram_chat_id.clone(),
        config.telegram.timeout(),
    )
    .context("failed to build Telegram client")?;

    Ok((source, notifier))
}

/// Start the poll loop. Runs until the process is killed.
pub async fn run(config: AppConfig, secrets: Secrets) -> Result<()> {
    let (source, notifier) = build_clients(&config, &secrets)?;
    let cursor = chrono::Utc::now().timestamp();
    let mut ticker = SleepTicker::new(config.poll.retry_period());

    tracing::info!(
        endpoint = %source.endpoint(),
        period = ?ticker.period(),
        dedupe = config.poll.dedupe_failures,
        strict = config.poll.require_current_date,
        "Starting homework bot"
    );

    let mut poller = Poller::new(source, notifier, cursor, &config.poll);
    poller.run(&mut ticker).await;

    Ok(())
}
