//! Discrete trend/momentum classification from price and technicals.

use advisor_core::report::{RsiState, Trend};
use rust_decimal::Decimal;

/// Classifies price against its moving averages.
///
/// Bullish only when both averages are present and price clears both. The
/// bearish check needs only the 50-day average; a ticker with no 200-day
/// history can still be bearish.
#[must_use]
pub fn trend_state(price: Decimal, sma_50: Option<Decimal>, sma_200: Option<Decimal>) -> Trend {
    if let (Some(sma_50), Some(sma_200)) = (sma_50, sma_200) {
        if price > sma_50 && price > sma_200 {
            return Trend::Bullish;
        }
    }
    match sma_50 {
        Some(sma_50) if price < sma_50 => Trend::Bearish,
        _ => Trend::Neutral,
    }
}

/// Classifies RSI against the configured bands (defaults 70/30).
#[must_use]
pub fn rsi_state(rsi_14: Decimal, overbought: Decimal, oversold: Decimal) -> RsiState {
    if rsi_14 > overbought {
        RsiState::Overbought
    } else if rsi_14 < oversold {
        RsiState::Oversold
    } else {
        RsiState::Neutral
    }
}
