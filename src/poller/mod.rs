//! The poll loop: fetch, validate, format, notify, sleep, repeat.
//!
//! The loop owns the cursor and the last delivered failure notice. Every
//! error raised inside a cycle is caught here, logged and turned into a
//! best-effort chat message; nothing inside a cycle stops the process.

pub mod ticker;

pub use ticker::{SleepTicker, Ticker};

use tracing::{debug, error, info, info_span, Instrument};

use crate::config::PollConfig;
use crate::error::PollError;
use crate::notify::Notifier;
use crate::practicum::{check_response, StatusSource};
use crate::status::parse_status;

/// What happened to the failure notice of a failed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureNotice {
    Delivered,
    Undelivered,
    /// Same text as the previous delivered notice; not sent again.
    Suppressed,
}

/// Result of one cycle, reported for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// `homeworks` was empty; nothing was formatted or sent.
    NoUpdates,
    /// A status change was formatted and a delivery attempted.
    Notified { delivered: bool },
    /// The cycle failed with an error of the given kind.
    Failed {
        kind: &'static str,
        notice: FailureNotice,
    },
}

/// Build the generic chat text for a failed cycle.
pub fn failure_message(error: &PollError) -> String {
    format!("Сбой в работе программы: {}", error)
}

pub struct Poller<S, N> {
    source: S,
    notifier: N,
    cursor: i64,
    dedupe_failures: bool,
    require_current_date: bool,
    last_failure: Option<String>,
}

impl<S: StatusSource, N: Notifier> Poller<S, N> {
    /// `cursor` is the initial `from_date`, normally the current Unix time.
    pub fn new(source: S, notifier: N, cursor: i64, settings: &PollConfig) -> Self {
        Self {
            source,
            notifier,
            cursor,
            dedupe_failures: settings.dedupe_failures,
            require_current_date: settings.require_current_date,
            last_failure: None,
        }
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Run cycles forever, pausing on `ticker` after each one.
    pub async fn run<T: Ticker>(&mut self, ticker: &mut T) {
        info!(cursor = self.cursor, "poll loop started");
        loop {
            self.run_cycle().await;
            ticker.tick().await;
        }
    }

    /// Run exactly `cycles` cycles, each followed by one tick.
    pub async fn run_cycles<T: Ticker>(&mut self, ticker: &mut T, cycles: usize) -> Vec<CycleOutcome> {
        let mut outcomes = Vec::with_capacity(cycles);
        for _ in 0..cycles {
            outcomes.push(self.run_cycle().await);
            ticker.tick().await;
        }
        outcomes
    }

    /// One full cycle, including failure handling. Never fails.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let span = info_span!("cycle", from_date = self.cursor);
        let cycle = async {
            match self.poll_once().await {
                Ok(outcome) => {
                    self.last_failure = None;
                    outcome
                }
                Err(e) => self.report_failure(e).await,
            }
        };
        cycle.instrument(span).await
    }

    /// The success path. The cursor only moves once a response was validated.
    async fn poll_once(&mut self) -> Result<CycleOutcome, PollError> {
        let payload = self.source.fetch(self.cursor).await?;
        let response = check_response(payload, self.require_current_date)?;

        let outcome = match response.latest() {
            None => {
                debug!("no updates");
                CycleOutcome::NoUpdates
            }
            Some(homework) => {
                let message = parse_status(homework)?;
                let delivered = self.notifier.send(&message).await;
                if !delivered {
                    error!(%message, "status change was not delivered to Telegram");
                }
                CycleOutcome::Notified { delivered }
            }
        };

        if let Some(current_date) = response.current_date {
            debug!(from = self.cursor, to = current_date, "cursor advanced");
            self.cursor = current_date;
        }

        Ok(outcome)
    }

    async fn report_failure(&mut self, err: PollError) -> CycleOutcome {
        let kind = err.kind();
        let message = failure_message(&err);
        error!(kind, error = %err, "poll cycle failed");

        if self.dedupe_failures && self.last_failure.as_deref() == Some(message.as_str()) {
            debug!(kind, "repeated failure, notice suppressed");
            return CycleOutcome::Failed {
                kind,
                notice: FailureNotice::Suppressed,
            };
        }

        let notice = if self.notifier.send(&message).await {
            if self.dedupe_failures {
                self.last_failure = Some(message);
            }
            FailureNotice::Delivered
        } else {
            FailureNotice::Undelivered
        };

        CycleOutcome::Failed { kind, notice }
    }
}
