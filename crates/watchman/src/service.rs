//! Long-running watchman service loop.
//!
//! Cycles are strictly sequential: the next tick is not scheduled until the
//! current cycle finishes, so two cycles can never race on the same
//! position set. The poll cadence follows the market clock and a
//! SystemOnline heartbeat goes out on its own interval.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{error, info};

use advisor_core::config::WatchmanConfig;

use crate::market_hours::is_market_hours;
use crate::monitor::Watchman;
use crate::sink::{AlertEvent, AlertSink};

/// Drives [`Watchman::run_cycle`] on the configured cadence until told to
/// shut down.
pub struct WatchmanService {
    watchman: Arc<Watchman>,
    sink: Arc<dyn AlertSink>,
    config: WatchmanConfig,
}

impl WatchmanService {
    #[must_use]
    pub fn new(watchman: Arc<Watchman>, sink: Arc<dyn AlertSink>, config: WatchmanConfig) -> Self {
        Self {
            watchman,
            sink,
            config,
        }
    }

    /// Runs until `shutdown` flips to `true`. Cycle failures are logged
    /// and the next tick retries; they never kill the loop.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let heartbeat_interval = Duration::from_secs(self.config.heartbeat_interval_secs);
        let mut last_heartbeat: Option<Instant> = None;
        info!("Watchman service started");

        loop {
            if last_heartbeat.map_or(true, |at| at.elapsed() >= heartbeat_interval) {
                let event = AlertEvent::SystemOnline {
                    timestamp: Utc::now(),
                };
                if let Err(err) = self.sink.deliver(&event).await {
                    error!(%err, "Heartbeat delivery failed");
                }
                last_heartbeat = Some(Instant::now());
            }

            match self.watchman.run_cycle().await {
                Ok(alerts) if !alerts.is_empty() => {
                    info!(count = alerts.len(), "Watchman cycle triggered alerts");
                }
                Ok(_) => {}
                Err(err) => error!(%err, "Watchman cycle failed, retrying next tick"),
            }

            let interval = if is_market_hours(Utc::now()) {
                Duration::from_secs(self.config.poll_interval_market_secs)
            } else {
                Duration::from_secs(self.config.poll_interval_off_secs)
            };
            tokio::select! {
                () = tokio::time::sleep(interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Watchman service stopping");
                        return Ok(());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::LogSink;
    use advisor_core::config::ThresholdConfig;
    use advisor_core::error::ProviderError;
    use advisor_core::market::{MarketSnapshot, OptionChain, Quote};
    use advisor_core::traits::MarketDataProvider;
    use advisor_store::MemoryStore;
    use anyhow::Result;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    struct StaticQuotes;

    #[async_trait]
    impl MarketDataProvider for StaticQuotes {
        async fn daily_bars(&self, ticker: &str) -> Result<MarketSnapshot, ProviderError> {
            Err(ProviderError::NotImplemented(ticker.to_string()))
        }

        async fn option_chain(&self, ticker: &str) -> Result<OptionChain, ProviderError> {
            Err(ProviderError::NotImplemented(ticker.to_string()))
        }

        async fn quote(&self, _ticker: &str) -> Result<Quote, ProviderError> {
            Ok(Quote {
                underlying: dec!(175.50),
                option_mark: dec!(3.40),
                fetched_at: Utc::now(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<AlertEvent>>,
    }

    #[async_trait]
    impl AlertSink for RecordingSink {
        async fn deliver(&self, event: &AlertEvent) -> Result<()> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn heartbeats_flow_and_shutdown_stops_the_loop() {
        let sink = Arc::new(RecordingSink::default());
        let watchman = Arc::new(Watchman::new(
            Arc::new(StaticQuotes),
            Arc::new(MemoryStore::new()),
            Arc::new(LogSink),
            ThresholdConfig::default(),
            Duration::from_secs(1),
        ));
        let service = WatchmanService::new(
            watchman,
            sink.clone(),
            // First heartbeat is immediate; the long intervals keep the
            // loop parked in its sleep until shutdown flips.
            WatchmanConfig {
                poll_interval_market_secs: 60,
                poll_interval_off_secs: 60,
                heartbeat_interval_secs: 3600,
                fetch_timeout_secs: 1,
            },
        );

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { service.run(rx).await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();
        handle.await.unwrap().unwrap();

        let events = sink.events.lock().unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, AlertEvent::SystemOnline { .. })));
    }
}
