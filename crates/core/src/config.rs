//! Application configuration.
//!
//! Every strategy, gate, and watchman threshold lives here; business logic
//! never hardcodes them and never branches on environment flags directly.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub thresholds: ThresholdConfig,
    pub watchman: WatchmanConfig,
    pub orchestrator: OrchestratorConfig,
}

/// Which concrete providers to construct at process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderMode {
    Mock,
    Live,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub mode: ProviderMode,
    pub market_data_api_key: String,
    pub macro_calendar_api_key: String,
    /// Benchmark instrument for the market-wide regime filter.
    pub benchmark_ticker: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            mode: ProviderMode::Mock,
            market_data_api_key: String::new(),
            macro_calendar_api_key: String::new(),
            benchmark_ticker: "SPY".to_string(),
        }
    }
}

/// Quantitative and gate thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Efficiency gate: IV/NATR ratio must exceed this for short puts.
    pub iv_natr_min_ratio: Decimal,
    /// Flag positions at or under this many days to expiry.
    pub dte_alert_threshold: i64,
    pub rsi_overbought: Decimal,
    pub rsi_oversold: Decimal,
    /// Contract expiry window in days.
    pub dte_min: i64,
    pub dte_max: i64,
    /// Absolute-delta band for strike selection.
    pub target_delta_low: Decimal,
    pub target_delta_high: Decimal,
    /// Liquidity gate: drop quotes with (ask-bid)/bid at or above this.
    pub max_spread_pct: Decimal,
    /// Stop loss at this multiple of entry credit.
    pub stop_loss_multiple: Decimal,
    /// Take profit at this fraction of entry credit.
    pub take_profit_multiple: Decimal,
    /// Roll when (underlying - strike)/strike reaches this...
    pub roll_itm_pct: Decimal,
    /// ...and DTE has fallen under this.
    pub roll_dte_trigger: i64,
    /// Block new entries when a high-impact event starts within this window.
    pub macro_lookahead_hours: i64,
    /// Max share of total open capital allowed in one sector.
    pub max_sector_allocation_pct: Decimal,
    /// Quotes older than this are stale.
    pub data_stale_minutes: i64,
    /// Synthetic-fallback economics when no chain quote matches.
    pub fallback_delta: Decimal,
    pub fallback_credit: Decimal,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            iv_natr_min_ratio: dec!(1.0),
            dte_alert_threshold: 21,
            rsi_overbought: dec!(70),
            rsi_oversold: dec!(30),
            dte_min: 30,
            dte_max: 45,
            target_delta_low: dec!(0.20),
            target_delta_high: dec!(0.30),
            max_spread_pct: dec!(0.10),
            stop_loss_multiple: dec!(3),
            take_profit_multiple: dec!(0.5),
            roll_itm_pct: dec!(0.03),
            roll_dte_trigger: 14,
            macro_lookahead_hours: 48,
            max_sector_allocation_pct: dec!(0.70),
            data_stale_minutes: 60,
            fallback_delta: dec!(-0.20),
            fallback_credit: dec!(3.50),
        }
    }
}

/// Watchman scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchmanConfig {
    /// Poll interval during market hours (seconds).
    pub poll_interval_market_secs: u64,
    /// Poll interval outside market hours (seconds).
    pub poll_interval_off_secs: u64,
    pub heartbeat_interval_secs: u64,
    /// Per-position quote fetch timeout (seconds).
    pub fetch_timeout_secs: u64,
}

impl Default for WatchmanConfig {
    fn default() -> Self {
        Self {
            poll_interval_market_secs: 15 * 60,
            poll_interval_off_secs: 3600,
            heartbeat_interval_secs: 4 * 3600,
            fetch_timeout_secs: 10,
        }
    }
}

/// Batch orchestrator budget and universe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Sliding-window rate budget: at most `max_calls` per `window_millis`.
    pub max_calls: u32,
    pub window_millis: u64,
    /// Count cap on tradeable recommendations per sector per batch.
    pub max_per_sector: usize,
    /// Truncate the universe to this many tickers, if set.
    pub max_tickers: Option<usize>,
    pub universe: Vec<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_calls: 5,
            window_millis: 2000,
            max_per_sector: 2,
            max_tickers: Some(20),
            universe: [
                "AAPL", "MSFT", "NVDA", "GOOGL", "AMZN", "META", "SPY", "TSLA", "JPM", "V",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
        }
    }
}
