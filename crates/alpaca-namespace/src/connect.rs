//! Connection retry policy

use std::time::Duration;

use backoff::ExponentialBackoffBuilder;

use crate::{Error, Result};

/// How to reach the coordination service and how hard to try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectSettings {
    /// Comma-separated `host:port` list.
    pub connect_string: String,

    /// First retry delay. Later delays grow exponentially.
    pub base_sleep: Duration,

    /// Retries after the first attempt.
    pub max_retries: u32,

    /// Cap on any single retry delay.
    pub max_sleep: Duration,

    /// How long one attempt waits for the session to be established.
    pub connect_wait: Duration,
}

impl Default for ConnectSettings {
    fn default() -> Self {
        Self {
            connect_string: "localhost:2181".to_string(),
            base_sleep: Duration::from_millis(50),
            max_retries: 10,
            max_sleep: Duration::from_millis(500),
            connect_wait: Duration::from_secs(10),
        }
    }
}

/// Run `connect` until it succeeds, fails permanently, or the retry budget
/// is spent.
///
/// Only errors for which [`Error::is_retryable`] holds are retried. The
/// error from the last attempt is returned once `max_retries` retries have
/// failed.
pub fn connect_with_retry<C, F>(settings: &ConnectSettings, mut connect: F) -> Result<C>
where
    F: FnMut(&ConnectSettings) -> Result<C>,
{
    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(settings.base_sleep)
        .with_max_interval(settings.max_sleep)
        .with_max_elapsed_time(None)
        .build();

    let mut attempts: u32 = 0;
    let operation = || {
        attempts += 1;
        tracing::debug!(
            connect_string = %settings.connect_string,
            attempt = attempts,
            "Connecting to coordination service"
        );
        match connect(settings) {
            Ok(client) => Ok(client),
            Err(e) if e.is_retryable() && attempts <= settings.max_retries => {
                Err(backoff::Error::transient(e))
            }
            Err(e) => Err(backoff::Error::permanent(e)),
        }
    };
    let notify = |e: Error, delay: Duration| {
        tracing::warn!(error = %e, delay_ms = delay.as_millis() as u64, "Connection attempt failed, retrying");
    };

    backoff::retry_notify(policy, operation, notify).map_err(|e| match e {
        backoff::Error::Permanent(e) => e,
        backoff::Error::Transient { err, .. } => err,
    })
}
