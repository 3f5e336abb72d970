//! Rate-limited batch runs of the decision pipeline.
//!
//! Tickers are processed strictly in input order; a sector's count slots
//! are claimed only once a recommendation is known tradeable, so the input
//! ordering decides who wins scarce slots. That is a policy choice, not an
//! accident of implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};

use advisor_core::config::OrchestratorConfig;
use advisor_core::report::TradeReport;
use advisor_pipeline::AdvisorPipeline;

use crate::rate_limit::SlidingWindowLimiter;
use crate::universe::load_universe;

/// Runs the pipeline across the configured universe under the call-rate
/// budget and the per-sector count cap.
pub struct BatchOrchestrator {
    pipeline: Arc<AdvisorPipeline>,
    limiter: SlidingWindowLimiter,
    config: OrchestratorConfig,
}

impl BatchOrchestrator {
    #[must_use]
    pub fn new(pipeline: Arc<AdvisorPipeline>, config: OrchestratorConfig) -> Self {
        let limiter = SlidingWindowLimiter::new(
            config.max_calls,
            Duration::from_millis(config.window_millis),
        );
        Self {
            pipeline,
            limiter,
            config,
        }
    }

    /// One batch pass. Returns the tradeable recommendations that also won
    /// a sector slot; no-trade outcomes and per-ticker failures are logged
    /// and skipped without aborting the batch.
    ///
    /// # Errors
    ///
    /// Only infrastructure-level failures surface here; a single ticker's
    /// pipeline failure never does.
    pub async fn run_batch(&self) -> Result<Vec<TradeReport>> {
        let tickers = load_universe(&self.config);
        info!(universe = tickers.len(), "Batch analysis starting");
        let mut results = Vec::new();
        let mut claimed_by_sector: HashMap<String, usize> = HashMap::new();

        for ticker in tickers {
            self.limiter.acquire().await;
            let report = match self.pipeline.analyze(&ticker).await {
                Ok(report) => report,
                Err(error) => {
                    warn!(ticker, %error, "Pipeline failed, skipping ticker");
                    continue;
                }
            };
            if report.no_trade || report.recommendation.is_none() {
                debug!(ticker, reason = ?report.reason, "No trade");
                continue;
            }
            let sector = report
                .analysis
                .sector
                .clone()
                .unwrap_or_else(|| "Unknown".to_string());
            let claimed = claimed_by_sector.entry(sector.clone()).or_insert(0);
            if *claimed >= self.config.max_per_sector {
                debug!(ticker, sector, "Sector slots exhausted, skipping");
                continue;
            }
            *claimed += 1;
            results.push(report);
        }

        info!(tradeable = results.len(), "Batch analysis finished");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::config::AppConfig;
    use advisor_core::error::ProviderError;
    use advisor_core::market::{MarketSnapshot, OptionChain, OptionQuote};
    use advisor_core::traits::MarketDataProvider;
    use advisor_providers::macro_calendar::MockMacroCalendarProvider;
    use advisor_providers::narrative::TemplateNarrativeGenerator;
    use advisor_store::MemoryStore;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, Utc};
    use rust_decimal_macros::dec;

    /// Tradeable fixture for every ticker except those in `failing`.
    struct BatchProvider {
        failing: Vec<&'static str>,
    }

    #[async_trait]
    impl MarketDataProvider for BatchProvider {
        async fn daily_bars(&self, ticker: &str) -> Result<MarketSnapshot, ProviderError> {
            if self.failing.contains(&ticker) {
                return Err(ProviderError::Fetch(format!("no bars for {ticker}")));
            }
            Ok(MarketSnapshot {
                ticker: ticker.to_uppercase(),
                date: Utc::now().date_naive(),
                close: dec!(175.50),
                sma_50: Some(dec!(172.00)),
                sma_200: Some(dec!(165.00)),
                atr_14: dec!(1.50),
                rsi_14: dec!(28.5),
                iv_30d: dec!(0.24),
                earnings_date: None,
                sector: Some("Information Technology".to_string()),
            })
        }

        async fn option_chain(&self, ticker: &str) -> Result<OptionChain, ProviderError> {
            let expiry = Utc::now().date_naive() + ChronoDuration::days(35);
            Ok(OptionChain {
                ticker: ticker.to_uppercase(),
                expirations: vec![expiry],
                puts: vec![OptionQuote {
                    strike: dec!(155),
                    expiry,
                    delta: dec!(-0.22),
                    bid: dec!(2.90),
                    ask: dec!(3.10),
                    iv: dec!(0.33),
                }],
                calls: None,
            })
        }
    }

    fn orchestrator(
        failing: Vec<&'static str>,
        universe: Vec<&str>,
        max_per_sector: usize,
    ) -> BatchOrchestrator {
        let pipeline = Arc::new(AdvisorPipeline::new(
            Arc::new(BatchProvider { failing }),
            Arc::new(MockMacroCalendarProvider),
            Arc::new(TemplateNarrativeGenerator),
            Arc::new(MemoryStore::new()),
            AppConfig::default(),
        ));
        let config = OrchestratorConfig {
            max_calls: 100,
            window_millis: 50,
            max_per_sector,
            max_tickers: None,
            universe: universe.iter().map(ToString::to_string).collect(),
        };
        BatchOrchestrator::new(pipeline, config)
    }

    #[tokio::test]
    async fn input_order_wins_scarce_sector_slots() {
        // All four land in the same sector; only the first two get slots.
        let orchestrator = orchestrator(vec![], vec!["AAPL", "MSFT", "NVDA", "GOOGL"], 2);
        let results = orchestrator.run_batch().await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].ticker, "AAPL");
        assert_eq!(results[1].ticker, "MSFT");
    }

    #[tokio::test]
    async fn one_failing_ticker_does_not_abort_the_batch() {
        let orchestrator = orchestrator(vec!["MSFT"], vec!["AAPL", "MSFT", "NVDA"], 10);
        let results = orchestrator.run_batch().await.unwrap();
        let tickers: Vec<&str> = results.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["AAPL", "NVDA"]);
    }

    #[tokio::test]
    async fn batch_respects_the_rate_budget() {
        let pipeline = Arc::new(AdvisorPipeline::new(
            Arc::new(BatchProvider { failing: vec![] }),
            Arc::new(MockMacroCalendarProvider),
            Arc::new(TemplateNarrativeGenerator),
            Arc::new(MemoryStore::new()),
            AppConfig::default(),
        ));
        let config = OrchestratorConfig {
            max_calls: 2,
            window_millis: 100,
            max_per_sector: 10,
            max_tickers: None,
            universe: ["A1", "A2", "A3", "A4"].iter().map(ToString::to_string).collect(),
        };
        let orchestrator = BatchOrchestrator::new(pipeline, config);
        let start = tokio::time::Instant::now();
        orchestrator.run_batch().await.unwrap();
        // Four acquisitions at two per 100ms: the second pair waits.
        assert!(start.elapsed() >= Duration::from_millis(90));
    }
}
