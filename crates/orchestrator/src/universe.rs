//! Ticker universe and the liquidity pre-filter.

use std::collections::HashMap;

use advisor_core::config::OrchestratorConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Liquidity metrics for one ticker, when the data source supplies them.
#[derive(Debug, Clone, Copy)]
pub struct LiquidityMetrics {
    /// Average daily volume, shares.
    pub adv: Decimal,
    /// Representative bid/ask spread, percent.
    pub spread_pct: Decimal,
}

/// Universe for one batch run: the configured list, truncated to
/// `max_tickers` when set.
#[must_use]
pub fn load_universe(config: &OrchestratorConfig) -> Vec<String> {
    let mut tickers = config.universe.clone();
    if let Some(max) = config.max_tickers {
        tickers.truncate(max);
    }
    tickers
}

/// Keeps tickers with ADV over 5M shares and spread under 1.5%. Without
/// metrics the filter passes everything through; absence of data is not a
/// liquidity signal.
#[must_use]
pub fn liquidity_filter(
    tickers: Vec<String>,
    metrics: Option<&HashMap<String, LiquidityMetrics>>,
) -> Vec<String> {
    let Some(metrics) = metrics else {
        return tickers;
    };
    tickers
        .into_iter()
        .filter(|ticker| {
            metrics.get(ticker).is_some_and(|m| {
                m.adv > Decimal::from(5_000_000) && m.spread_pct < dec!(1.5)
            })
        })
        .collect()
}
