//! Strategy decision table and the ticker-level trend override.

use rust_decimal::Decimal;

use advisor_core::report::{RsiState, Trend, Verdict};

/// First-match-wins decision table over trend, momentum, and the market
/// regime.
///
/// The neutral+oversold row is shadowed by the broader oversold row below
/// it. The overlap is part of the published rule set and is preserved as-is
/// so the table reads row-for-row against its source.
#[must_use]
pub fn select_strategy(trend: Trend, rsi: RsiState, regime_allows: bool) -> Verdict {
    if trend == Trend::Bearish {
        return Verdict::ShortCall;
    }
    if trend == Trend::Bullish && rsi != RsiState::Overbought && regime_allows {
        return Verdict::ShortPut;
    }
    if trend == Trend::Neutral && rsi == RsiState::Oversold && regime_allows {
        return Verdict::ShortPut;
    }
    if rsi == RsiState::Oversold && regime_allows {
        return Verdict::ShortPut;
    }
    Verdict::None
}

/// Ticker-level trend override: a short put on a ticker trading below its
/// own 50-day average is withdrawn, never substituted with another
/// strategy.
#[must_use]
pub fn apply_trend_override(verdict: Verdict, price: Decimal, sma_50: Option<Decimal>) -> Verdict {
    if verdict == Verdict::ShortPut {
        if let Some(sma_50) = sma_50 {
            if price < sma_50 {
                return Verdict::None;
            }
        }
    }
    verdict
}
