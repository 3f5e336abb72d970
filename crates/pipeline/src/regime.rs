//! Market-wide regime filter read off the benchmark instrument.

use anyhow::Result;
use tracing::warn;

use advisor_core::report::Regime;
use advisor_core::traits::MarketDataProvider;

/// Outcome of the benchmark regime read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegimeRead {
    /// Whether new short-put entries are permitted under this regime.
    pub allows_short_put: bool,
    pub regime: Regime,
}

/// Reads the benchmark snapshot and classifies the market regime.
///
/// A benchmark without a 200-day average fails open: short puts stay
/// allowed and the regime is reported as `Unknown` so downstream consumers
/// can see the filter did not bind.
///
/// # Errors
///
/// Propagates the provider fetch failure for the benchmark ticker.
pub async fn market_regime(
    provider: &dyn MarketDataProvider,
    benchmark: &str,
) -> Result<RegimeRead> {
    let snapshot = provider.daily_bars(benchmark).await?;
    let Some(sma_200) = snapshot.sma_200 else {
        warn!(
            benchmark,
            "Benchmark has no 200-day average, regime filter fails open"
        );
        return Ok(RegimeRead {
            allows_short_put: true,
            regime: Regime::Unknown,
        });
    };
    if snapshot.close >= sma_200 {
        Ok(RegimeRead {
            allows_short_put: true,
            regime: Regime::Bullish,
        })
    } else {
        Ok(RegimeRead {
            allows_short_put: false,
            regime: Regime::Bearish,
        })
    }
}
