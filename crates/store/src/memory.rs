//! In-memory reference implementation of the `Store` port.
//!
//! Everything lives behind one `RwLock`, so the existence-check-then-insert
//! in `ensure_alert_sent` is atomic with respect to concurrent cycles; the
//! at-most-once alert guarantee holds even if two cycles race on the same
//! position.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use advisor_core::position::{AlertRecord, LifecycleStage, Position, TriggerKind};
use advisor_core::report::{RecordStatus, TradeRecord, Verdict};
use advisor_core::traits::Store;

#[derive(Default)]
struct Inner {
    recommendations: HashMap<Uuid, TradeRecord>,
    positions: HashMap<Uuid, Position>,
    alerts: Vec<AlertRecord>,
    alert_keys: HashSet<(Uuid, TriggerKind)>,
}

/// Shared in-memory store. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All alert records, for inspection and tests.
    pub async fn alert_log(&self) -> Vec<AlertRecord> {
        self.inner.read().await.alerts.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_recommendation(&self, record: TradeRecord) -> Result<()> {
        self.inner
            .write()
            .await
            .recommendations
            .insert(record.id, record);
        Ok(())
    }

    async fn recommendation(&self, id: Uuid) -> Result<Option<TradeRecord>> {
        Ok(self.inner.read().await.recommendations.get(&id).cloned())
    }

    async fn find_pending(
        &self,
        ticker: &str,
        strategy: Verdict,
        expiry: NaiveDate,
    ) -> Result<Option<TradeRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .recommendations
            .values()
            .find(|r| {
                r.status == RecordStatus::Pending
                    && r.ticker == ticker
                    && r.strategy == strategy
                    && r.expiry == expiry
            })
            .cloned())
    }

    async fn insert_position(&self, position: Position) -> Result<()> {
        self.inner
            .write()
            .await
            .positions
            .insert(position.id, position);
        Ok(())
    }

    async fn position(&self, id: Uuid) -> Result<Option<Position>> {
        Ok(self.inner.read().await.positions.get(&id).cloned())
    }

    async fn open_positions(&self) -> Result<Vec<Position>> {
        let inner = self.inner.read().await;
        let mut open: Vec<Position> = inner
            .positions
            .values()
            .filter(|p| p.lifecycle_stage != LifecycleStage::Closed)
            .cloned()
            .collect();
        open.sort_by(|a, b| b.opened_at.cmp(&a.opened_at));
        Ok(open)
    }

    async fn update_position(&self, position: Position) -> Result<()> {
        let mut inner = self.inner.write().await;
        anyhow::ensure!(
            inner.positions.contains_key(&position.id),
            "position {} not found",
            position.id
        );
        inner.positions.insert(position.id, position);
        Ok(())
    }

    async fn ensure_alert_sent(&self, position_id: Uuid, trigger: TriggerKind) -> Result<bool> {
        let mut inner = self.inner.write().await;
        if !inner.alert_keys.insert((position_id, trigger)) {
            return Ok(false);
        }
        inner.alerts.push(AlertRecord {
            id: Uuid::new_v4(),
            position_id,
            trigger,
            sent_at: Utc::now(),
        });
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::position::RiskRules;
    use rust_decimal_macros::dec;

    fn position(stage: LifecycleStage) -> Position {
        Position {
            id: Uuid::new_v4(),
            ticker: "AAPL".to_string(),
            strategy: Verdict::ShortPut,
            short_strike: dec!(155),
            expiry: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            entry_credit: dec!(3.00),
            contracts: 1,
            capital_deployed: dec!(15500),
            sector: "Unknown".to_string(),
            risk_rules: RiskRules {
                stop_loss_price: dec!(9.00),
                take_profit_price: dec!(1.50),
                max_dte_hold: 21,
                force_close_date: NaiveDate::from_ymd_opt(2026, 9, 25).unwrap(),
            },
            lifecycle_stage: stage,
            last_observed: None,
            parent_position_id: None,
            root_position_id: None,
            roll_count: 0,
            realized_pnl_pre_roll: None,
            opened_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn alerts_are_at_most_once_per_position_and_trigger() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        assert!(store.ensure_alert_sent(id, TriggerKind::StopLoss).await.unwrap());
        assert!(!store.ensure_alert_sent(id, TriggerKind::StopLoss).await.unwrap());
        // Different trigger, same position: fires.
        assert!(store.ensure_alert_sent(id, TriggerKind::DteAlert).await.unwrap());
        assert_eq!(store.alert_log().await.len(), 2);
    }

    #[tokio::test]
    async fn open_positions_excludes_closed() {
        let store = MemoryStore::new();
        store.insert_position(position(LifecycleStage::Monitoring)).await.unwrap();
        store.insert_position(position(LifecycleStage::ClosingUrgent)).await.unwrap();
        store.insert_position(position(LifecycleStage::Closed)).await.unwrap();
        assert_eq!(store.open_positions().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_requires_existing_position() {
        let store = MemoryStore::new();
        let pos = position(LifecycleStage::Monitoring);
        assert!(store.update_position(pos).await.is_err());
    }
}
