//! Ports to the external collaborators: market data, macro calendar,
//! narrative generation, and persistence.
//!
//! Concrete implementations are constructed once at process start from
//! configuration and injected; business logic never selects a provider by
//! branching on an environment flag.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::ProviderError;
use crate::market::{MacroEvent, MarketSnapshot, OptionChain, Quote};
use crate::position::{Position, TriggerKind};
use crate::report::{Analysis, Recommendation, TradeRecord, Verdict};

/// Daily bars, option chains, and (optionally) live quotes for a ticker.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn daily_bars(&self, ticker: &str) -> Result<MarketSnapshot, ProviderError>;

    async fn option_chain(&self, ticker: &str) -> Result<OptionChain, ProviderError>;

    /// Live underlying price and option mark for a monitored position.
    ///
    /// Providers without quote support must return
    /// `ProviderError::NotImplemented` so callers can treat it as a fetch
    /// failure instead of silently fabricating a value.
    async fn quote(&self, ticker: &str) -> Result<Quote, ProviderError> {
        Err(ProviderError::NotImplemented(format!(
            "quote not available for {ticker}"
        )))
    }
}

/// Upcoming high-impact macro-economic events.
#[async_trait]
pub trait MacroCalendarProvider: Send + Sync {
    async fn high_impact_events(
        &self,
        within_hours: i64,
    ) -> Result<Vec<MacroEvent>, ProviderError>;
}

/// Turns the numeric analysis into human-readable prose. The generator must
/// only restate numbers it is given, never invent them. Callers fall back
/// to a deterministic template when the generator is unavailable.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn synthesize(
        &self,
        ticker: &str,
        analysis: &Analysis,
        recommendation: &Recommendation,
    ) -> Result<String>;
}

/// Persistence boundary for recommendations, positions, and alert history.
///
/// Only read/upsert semantics are required; the engine behind it is not this
/// system's concern. `ensure_alert_sent` must be atomic with respect to
/// concurrent cycles touching the same position.
#[async_trait]
pub trait Store: Send + Sync {
    async fn upsert_recommendation(&self, record: TradeRecord) -> Result<()>;

    async fn recommendation(&self, id: Uuid) -> Result<Option<TradeRecord>>;

    /// Existing PENDING record for (ticker, strategy, expiry), if any.
    async fn find_pending(
        &self,
        ticker: &str,
        strategy: Verdict,
        expiry: NaiveDate,
    ) -> Result<Option<TradeRecord>>;

    async fn insert_position(&self, position: Position) -> Result<()>;

    async fn position(&self, id: Uuid) -> Result<Option<Position>>;

    /// All positions not yet CLOSED, newest first.
    async fn open_positions(&self) -> Result<Vec<Position>>;

    async fn update_position(&self, position: Position) -> Result<()>;

    /// Records that an alert fired for `(position, trigger)` and returns
    /// `true` the first time; `false` on every subsequent call.
    async fn ensure_alert_sent(&self, position_id: Uuid, trigger: TriggerKind) -> Result<bool>;
}
