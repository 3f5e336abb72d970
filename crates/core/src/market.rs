//! Market data types handed across the provider boundary.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Latest daily bar plus derived technicals for one ticker.
///
/// Immutable once fetched; superseded by the next daily fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub ticker: String,
    pub date: NaiveDate,
    pub close: Decimal,
    pub sma_50: Option<Decimal>,
    pub sma_200: Option<Decimal>,
    pub atr_14: Decimal,
    pub rsi_14: Decimal,
    /// 30-day implied volatility as a decimal fraction (0.24 = 24%).
    pub iv_30d: Decimal,
    pub earnings_date: Option<NaiveDate>,
    /// GICS sector when the provider knows it.
    pub sector: Option<String>,
}

/// Single option quote from a chain. Delta is signed (puts negative).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionQuote {
    pub strike: Decimal,
    pub expiry: NaiveDate,
    pub delta: Decimal,
    pub bid: Decimal,
    pub ask: Decimal,
    pub iv: Decimal,
}

impl OptionQuote {
    /// Mid price, the credit estimate for a short position.
    #[must_use]
    pub fn mid(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::from(2)
    }
}

/// Option chain for one ticker. Ephemeral, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionChain {
    pub ticker: String,
    pub expirations: Vec<NaiveDate>,
    pub puts: Vec<OptionQuote>,
    /// Call-side quotes, only needed for the skew refinement.
    pub calls: Option<Vec<OptionQuote>>,
}

/// Spot quote for a monitored position: option mark plus underlying price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub underlying: Decimal,
    pub option_mark: Decimal,
    pub fetched_at: DateTime<Utc>,
}

/// Upcoming macro-economic event from the calendar provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroEvent {
    pub start_time: DateTime<Utc>,
    pub name: String,
    pub importance: String,
}
