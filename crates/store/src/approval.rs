//! Human approval flow: the single PENDING → APPROVED | REJECTED transition
//! and the opening of a monitored position from an approved record.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;
use uuid::Uuid;

use advisor_core::config::ThresholdConfig;
use advisor_core::position::{LifecycleStage, Position, RiskRules};
use advisor_core::traits::Store;

/// Approves a pending recommendation and opens the position the watchman
/// will supervise. Risk thresholds are frozen here: stop loss at
/// `stop_loss_multiple` x credit, take profit at `take_profit_multiple` x
/// credit, forced close `max_dte_hold` days before expiry (never in the
/// past).
///
/// # Errors
///
/// Fails if the record does not exist or is no longer PENDING.
pub async fn approve_recommendation(
    store: &dyn Store,
    thresholds: &ThresholdConfig,
    recommendation_id: Uuid,
    contracts: u32,
    today: NaiveDate,
) -> Result<Position> {
    let mut record = store
        .recommendation(recommendation_id)
        .await?
        .with_context(|| format!("recommendation {recommendation_id} not found"))?;
    record.approve()?;

    let rec = record
        .report
        .recommendation
        .clone()
        .context("approved record carries no recommendation payload")?;

    let mut force_close = record.expiry - Duration::days(thresholds.dte_alert_threshold);
    if force_close < today {
        force_close = today;
    }
    let risk_rules = RiskRules {
        stop_loss_price: rec.credit_est * thresholds.stop_loss_multiple,
        take_profit_price: rec.credit_est * thresholds.take_profit_multiple,
        max_dte_hold: thresholds.dte_alert_threshold,
        force_close_date: force_close,
    };

    let sector = record
        .report
        .analysis
        .sector
        .clone()
        .unwrap_or_else(|| "Unknown".to_string());
    let position = Position {
        id: Uuid::new_v4(),
        ticker: record.ticker.clone(),
        strategy: record.strategy,
        short_strike: rec.strike,
        expiry: record.expiry,
        entry_credit: rec.credit_est,
        contracts,
        capital_deployed: rec.strike * Decimal::from(100) * Decimal::from(contracts),
        sector,
        risk_rules,
        lifecycle_stage: LifecycleStage::Monitoring,
        last_observed: None,
        parent_position_id: None,
        root_position_id: None,
        roll_count: 0,
        realized_pnl_pre_roll: None,
        opened_at: Utc::now(),
    };

    store.upsert_recommendation(record).await?;
    store.insert_position(position.clone()).await?;
    info!(
        ticker = %position.ticker,
        position_id = %position.id,
        strike = %position.short_strike,
        "Recommendation approved, position opened"
    );
    Ok(position)
}

/// Rejects a pending recommendation.
///
/// # Errors
///
/// Fails if the record does not exist or is no longer PENDING.
pub async fn reject_recommendation(store: &dyn Store, recommendation_id: Uuid) -> Result<()> {
    let mut record = store
        .recommendation(recommendation_id)
        .await?
        .with_context(|| format!("recommendation {recommendation_id} not found"))?;
    record.reject()?;
    store.upsert_recommendation(record).await?;
    Ok(())
}

/// Rolls an open position into a successor contract and registers the new
/// position. The parent stays open; closing it is an external action.
///
/// # Errors
///
/// Fails if the parent position does not exist.
pub async fn roll_position(
    store: &dyn Store,
    thresholds: &ThresholdConfig,
    position_id: Uuid,
    new_strike: Decimal,
    new_expiry: NaiveDate,
    new_credit: Decimal,
    realized_pnl: Decimal,
    today: NaiveDate,
) -> Result<Position> {
    let parent = store
        .position(position_id)
        .await?
        .with_context(|| format!("position {position_id} not found"))?;

    let mut force_close = new_expiry - Duration::days(thresholds.dte_alert_threshold);
    if force_close < today {
        force_close = today;
    }
    let risk_rules = RiskRules {
        stop_loss_price: new_credit * thresholds.stop_loss_multiple,
        take_profit_price: new_credit * thresholds.take_profit_multiple,
        max_dte_hold: thresholds.dte_alert_threshold,
        force_close_date: force_close,
    };

    let rolled = parent.roll_into(new_strike, new_expiry, new_credit, realized_pnl, risk_rules);
    store.insert_position(rolled.clone()).await?;
    info!(
        ticker = %rolled.ticker,
        parent_id = %position_id,
        position_id = %rolled.id,
        roll_count = rolled.roll_count,
        "Position rolled"
    );
    Ok(rolled)
}

/// A recommendation's thesis is stale once the live market has moved away
/// from it: live price under 95% of the recommended price, or live credit
/// under 90% of the recommended credit.
#[must_use]
pub fn thesis_stale(
    live_price: Decimal,
    rec_price: Decimal,
    live_credit: Decimal,
    rec_credit: Decimal,
) -> bool {
    if rec_price <= Decimal::ZERO && rec_credit <= Decimal::ZERO {
        return false;
    }
    if rec_price > Decimal::ZERO && live_price < rec_price * dec!(0.95) {
        return true;
    }
    rec_credit > Decimal::ZERO && live_credit < rec_credit * dec!(0.90)
}
