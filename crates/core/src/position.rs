//! Open positions and the alert types the watchman emits for them.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::report::Verdict;

/// Watchman lifecycle. `Closed` is terminal and only ever set externally;
/// the monitor escalates to `ClosingUrgent` but never closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleStage {
    Monitoring,
    ClosingUrgent,
    Closed,
}

/// Risk thresholds frozen at approval time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskRules {
    pub stop_loss_price: Decimal,
    pub take_profit_price: Decimal,
    pub max_dte_hold: i64,
    pub force_close_date: NaiveDate,
}

/// Freshness of the last observed quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Freshness {
    Ok,
    Stale,
}

/// Last mark/underlying observation written each monitor cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastObserved {
    pub timestamp: DateTime<Utc>,
    pub mark_price: Decimal,
    pub underlying_price: Decimal,
    pub freshness: Freshness,
}

/// An open premium-selling position under watchman supervision.
///
/// Created only from an APPROVED trade record. Rolls produce a successor
/// position linked through the lineage fields; the parent stays open until
/// closed externally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: Uuid,
    pub ticker: String,
    pub strategy: Verdict,
    pub short_strike: Decimal,
    pub expiry: NaiveDate,
    pub entry_credit: Decimal,
    pub contracts: u32,
    pub capital_deployed: Decimal,
    pub sector: String,
    pub risk_rules: RiskRules,
    pub lifecycle_stage: LifecycleStage,
    pub last_observed: Option<LastObserved>,
    pub parent_position_id: Option<Uuid>,
    pub root_position_id: Option<Uuid>,
    pub roll_count: u32,
    pub realized_pnl_pre_roll: Option<Decimal>,
    pub opened_at: DateTime<Utc>,
}

impl Position {
    /// Days until expiration, relative to `today`.
    #[must_use]
    pub fn days_to_expiry(&self, today: NaiveDate) -> i64 {
        (self.expiry - today).num_days()
    }

    /// Builds the successor position for a roll.
    ///
    /// The new position keeps the ticker, strategy, sector, and risk-rule
    /// shape but moves to the rolled strike/expiry/credit, records the P&L
    /// realized on the closed leg, and links back through
    /// `parent_position_id`/`root_position_id`. The parent itself is not
    /// closed here; closing is an external action.
    #[must_use]
    pub fn roll_into(
        &self,
        new_strike: Decimal,
        new_expiry: NaiveDate,
        new_credit: Decimal,
        realized_pnl: Decimal,
        risk_rules: RiskRules,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticker: self.ticker.clone(),
            strategy: self.strategy,
            short_strike: new_strike,
            expiry: new_expiry,
            entry_credit: new_credit,
            contracts: self.contracts,
            capital_deployed: new_strike * Decimal::from(100) * Decimal::from(self.contracts),
            sector: self.sector.clone(),
            risk_rules,
            lifecycle_stage: LifecycleStage::Monitoring,
            last_observed: None,
            parent_position_id: Some(self.id),
            root_position_id: Some(self.root_position_id.unwrap_or(self.id)),
            roll_count: self.roll_count + 1,
            realized_pnl_pre_roll: Some(realized_pnl),
            opened_at: Utc::now(),
        }
    }
}

/// Trigger kinds the watchman can fire. Each fires at most once per
/// position lifetime (enforced by `AlertRecord`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerKind {
    StrikeTouch,
    DteAlert,
    StopLoss,
    TakeProfit,
    RollNeeded,
    DataStale,
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrikeTouch => write!(f, "STRIKE_TOUCH"),
            Self::DteAlert => write!(f, "DTE_ALERT"),
            Self::StopLoss => write!(f, "STOP_LOSS"),
            Self::TakeProfit => write!(f, "TAKE_PROFIT"),
            Self::RollNeeded => write!(f, "ROLL_NEEDED"),
            Self::DataStale => write!(f, "DATA_STALE"),
        }
    }
}

/// At-most-once delivery marker for one `(position, trigger)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: Uuid,
    pub position_id: Uuid,
    pub trigger: TriggerKind,
    pub sent_at: DateTime<Utc>,
}

/// Structured trigger event returned by a watchman cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggeredAlert {
    pub position_id: Uuid,
    pub ticker: String,
    pub trigger: TriggerKind,
}
