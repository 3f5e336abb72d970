//! Recommendation pipeline output types.
//!
//! `TradeReport` is the complete, schema-conformant payload every pipeline
//! run returns, including blocked and no-trade outcomes. There is no
//! partial or unknown state exposed to callers.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Price-versus-moving-average trend state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

/// RSI momentum state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsiState {
    Overbought,
    Oversold,
    Neutral,
}

/// Market-wide regime read off the benchmark instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Bullish,
    Bearish,
    /// Benchmark has no 200-day average yet; fail open.
    Unknown,
}

/// Strategy verdict from the decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    ShortPut,
    ShortCall,
    None,
}

impl Verdict {
    /// Option-type flag used in the contract symbol.
    #[must_use]
    pub fn right(self) -> char {
        match self {
            Self::ShortCall => 'C',
            // NONE still synthesizes a put-shaped candidate for audit.
            _ => 'P',
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ShortPut => write!(f, "SHORT_PUT"),
            Self::ShortCall => write!(f, "SHORT_CALL"),
            Self::None => write!(f, "NONE"),
        }
    }
}

/// Derived per-run analysis snapshot. Produced once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub price: Decimal,
    pub rsi_14: Decimal,
    pub trend: Trend,
    pub iv_natr_ratio: Decimal,
    pub expected_move_1sd: Decimal,
    pub earnings_date: Option<NaiveDate>,
    pub sector: Option<String>,
}

/// Where the selected contract came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractSource {
    /// Backed by a real chain quote.
    Chain,
    /// Synthesized from the expected move; treat as lower confidence.
    Synthetic,
}

/// Fully-populated trade recommendation. A non-NONE verdict always carries
/// contract, strike, expiry, delta, and credit together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub strategy: Verdict,
    pub contract: String,
    pub strike: Decimal,
    pub expiry: NaiveDate,
    pub delta: Decimal,
    pub credit_est: Decimal,
    pub source: ContractSource,
    pub safety_check: String,
    pub narrative: String,
}

/// One gate's audited result. All gates are computed every run, even after
/// an earlier gate has already blocked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateOutcome {
    pub gate: String,
    pub blocked: bool,
    pub reason: Option<String>,
}

/// Complete pipeline output for one ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeReport {
    pub ticker: String,
    pub timestamp: DateTime<Utc>,
    pub regime: Regime,
    pub analysis: Analysis,
    pub recommendation: Option<Recommendation>,
    pub no_trade: bool,
    pub reason: Option<String>,
    pub gates: Vec<GateOutcome>,
}

/// Lifecycle of a persisted recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Pending,
    Approved,
    Rejected,
}

/// Persisted recommendation awaiting human action.
///
/// Transitions exactly once out of `Pending`; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: Uuid,
    pub ticker: String,
    pub strategy: Verdict,
    pub strike: Decimal,
    pub expiry: NaiveDate,
    pub status: RecordStatus,
    pub report: TradeReport,
    pub created_at: DateTime<Utc>,
}

impl TradeRecord {
    /// Wraps a tradeable report into a new `Pending` record.
    ///
    /// # Panics
    ///
    /// Panics if the report carries no recommendation; callers only persist
    /// tradeable outcomes.
    #[must_use]
    pub fn pending(report: TradeReport) -> Self {
        let rec = report
            .recommendation
            .as_ref()
            .expect("only tradeable reports are persisted");
        Self {
            id: Uuid::new_v4(),
            ticker: report.ticker.clone(),
            strategy: rec.strategy,
            strike: rec.strike,
            expiry: rec.expiry,
            status: RecordStatus::Pending,
            created_at: Utc::now(),
            report,
        }
    }

    /// Marks the record approved. Errors unless the record is still pending.
    pub fn approve(&mut self) -> anyhow::Result<()> {
        self.transition(RecordStatus::Approved)
    }

    /// Marks the record rejected. Errors unless the record is still pending.
    pub fn reject(&mut self) -> anyhow::Result<()> {
        self.transition(RecordStatus::Rejected)
    }

    fn transition(&mut self, to: RecordStatus) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.status == RecordStatus::Pending,
            "record {} is {:?}, not PENDING",
            self.id,
            self.status
        );
        self.status = to;
        Ok(())
    }
}
