//! Alert delivery boundary.
//!
//! Delivery is fire-and-forget from the monitor's point of view: a failed
//! delivery is logged and never rolls back a lifecycle transition or an
//! alert record. Webhook/email transports live outside this system; the
//! provided sink writes structured log events.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use advisor_core::position::TriggeredAlert;

/// Outbound watchman event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertEvent {
    Trigger(TriggeredAlert),
    SystemOnline { timestamp: DateTime<Utc> },
}

#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, event: &AlertEvent) -> Result<()>;
}

/// Sink backed by structured logging. Never fails.
#[derive(Debug, Default, Clone)]
pub struct LogSink;

#[async_trait]
impl AlertSink for LogSink {
    async fn deliver(&self, event: &AlertEvent) -> Result<()> {
        match event {
            AlertEvent::Trigger(alert) => info!(
                position_id = %alert.position_id,
                ticker = %alert.ticker,
                trigger = %alert.trigger,
                "Alert"
            ),
            AlertEvent::SystemOnline { timestamp } => {
                info!(%timestamp, "Watchman system online");
            }
        }
        Ok(())
    }
}

/// Wraps a sink with a bounded retry. After the attempts are exhausted the
/// last error is returned; callers log it and move on.
pub struct BoundedRetrySink<S> {
    inner: S,
    max_attempts: u32,
    backoff: Duration,
}

impl<S> BoundedRetrySink<S> {
    #[must_use]
    pub fn new(inner: S, max_attempts: u32, backoff: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }
}

#[async_trait]
impl<S: AlertSink> AlertSink for BoundedRetrySink<S> {
    async fn deliver(&self, event: &AlertEvent) -> Result<()> {
        let mut attempt = 1;
        loop {
            match self.inner.deliver(event).await {
                Ok(()) => return Ok(()),
                Err(error) if attempt < self.max_attempts => {
                    warn!(attempt, %error, "Alert delivery failed, retrying");
                    tokio::time::sleep(self.backoff).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
