//! Market data provider implementations.
//!
//! The concrete provider is chosen once, from configuration, via
//! [`market_data_from_config`]; pipeline and watchman code only ever see
//! the `MarketDataProvider` port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal_macros::dec;
use tracing::info;

use advisor_core::config::{ProviderConfig, ProviderMode};
use advisor_core::error::ProviderError;
use advisor_core::market::{MarketSnapshot, OptionChain, OptionQuote, Quote};
use advisor_core::traits::MarketDataProvider;

/// Deterministic fixture provider for development and tests. No network.
#[derive(Debug, Default, Clone)]
pub struct MockMarketDataProvider;

#[async_trait]
impl MarketDataProvider for MockMarketDataProvider {
    async fn daily_bars(&self, ticker: &str) -> Result<MarketSnapshot, ProviderError> {
        Ok(MarketSnapshot {
            ticker: ticker.to_uppercase(),
            date: Utc::now().date_naive(),
            close: dec!(175.50),
            sma_50: Some(dec!(172.00)),
            sma_200: Some(dec!(165.00)),
            atr_14: dec!(4.20),
            rsi_14: dec!(28.5),
            iv_30d: dec!(0.24),
            earnings_date: None,
            sector: None,
        })
    }

    async fn option_chain(&self, ticker: &str) -> Result<OptionChain, ProviderError> {
        let expiry = Utc::now().date_naive() + Duration::days(35);
        Ok(OptionChain {
            ticker: ticker.to_uppercase(),
            expirations: vec![expiry],
            puts: vec![
                put(dec!(160.0), expiry, dec!(-0.30), dec!(3.80), dec!(4.00), dec!(0.34)),
                put(dec!(155.0), expiry, dec!(-0.22), dec!(2.90), dec!(3.10), dec!(0.33)),
                put(dec!(150.0), expiry, dec!(-0.18), dec!(2.10), dec!(2.30), dec!(0.32)),
            ],
            calls: None,
        })
    }

    async fn quote(&self, _ticker: &str) -> Result<Quote, ProviderError> {
        Ok(Quote {
            underlying: dec!(175.50),
            option_mark: dec!(3.40),
            fetched_at: Utc::now(),
        })
    }
}

fn put(
    strike: rust_decimal::Decimal,
    expiry: NaiveDate,
    delta: rust_decimal::Decimal,
    bid: rust_decimal::Decimal,
    ask: rust_decimal::Decimal,
    iv: rust_decimal::Decimal,
) -> OptionQuote {
    OptionQuote {
        strike,
        expiry,
        delta,
        bid,
        ask,
        iv,
    }
}

/// Live provider stub. Holds the API key but has no upstream integration
/// wired yet; every call reports `NotImplemented` so callers surface a fetch
/// failure instead of running on fabricated data.
#[derive(Debug, Clone)]
pub struct LiveMarketDataProvider {
    api_key: String,
}

impl LiveMarketDataProvider {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl MarketDataProvider for LiveMarketDataProvider {
    async fn daily_bars(&self, ticker: &str) -> Result<MarketSnapshot, ProviderError> {
        let _ = &self.api_key;
        Err(ProviderError::NotImplemented(format!(
            "live daily bars for {ticker}"
        )))
    }

    async fn option_chain(&self, ticker: &str) -> Result<OptionChain, ProviderError> {
        Err(ProviderError::NotImplemented(format!(
            "live option chain for {ticker}"
        )))
    }
}

/// Constructs the configured market data provider. Falls back to the mock
/// when live mode has no API key.
#[must_use]
pub fn market_data_from_config(config: &ProviderConfig) -> Arc<dyn MarketDataProvider> {
    match config.mode {
        ProviderMode::Live if !config.market_data_api_key.is_empty() => {
            info!("Using live market data provider");
            Arc::new(LiveMarketDataProvider::new(config.market_data_api_key.clone()))
        }
        _ => {
            info!("Using mock market data provider");
            Arc::new(MockMarketDataProvider)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_chain_is_within_the_expiry_window() {
        let chain = MockMarketDataProvider.option_chain("aapl").await.unwrap();
        assert_eq!(chain.ticker, "AAPL");
        assert_eq!(chain.puts.len(), 3);
        let dte = (chain.puts[0].expiry - Utc::now().date_naive()).num_days();
        assert!((30..=45).contains(&dte));
    }

    #[tokio::test]
    async fn live_stub_reports_not_implemented() {
        let provider = LiveMarketDataProvider::new("key");
        let err = provider.daily_bars("AAPL").await.unwrap_err();
        assert!(matches!(err, ProviderError::NotImplemented(_)));
    }

    #[tokio::test]
    async fn factory_defaults_to_mock_without_key() {
        let config = ProviderConfig {
            mode: ProviderMode::Live,
            ..ProviderConfig::default()
        };
        let provider = market_data_from_config(&config);
        // Mock serves quotes; the live stub would refuse.
        assert!(provider.quote("AAPL").await.is_ok());
    }
}
