//! One watchman cycle: poll quotes for every open position, evaluate the
//! trigger rules, record idempotent alerts, and advance lifecycle stages.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::time::timeout;
use tracing::{debug, warn};

use advisor_core::config::ThresholdConfig;
use advisor_core::position::{
    Freshness, LastObserved, LifecycleStage, Position, TriggerKind, TriggeredAlert,
};
use advisor_core::report::Verdict;
use advisor_core::traits::{MarketDataProvider, Store};
use advisor_quant::engine::{dte_alert, DteStatus};

use crate::sink::{AlertEvent, AlertSink};

/// Position monitor. Never sets `Closed`; escalates `Monitoring` to
/// `ClosingUrgent` when a trigger warrants it.
pub struct Watchman {
    provider: Arc<dyn MarketDataProvider>,
    store: Arc<dyn Store>,
    sink: Arc<dyn AlertSink>,
    thresholds: ThresholdConfig,
    fetch_timeout: Duration,
}

impl Watchman {
    #[must_use]
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        store: Arc<dyn Store>,
        sink: Arc<dyn AlertSink>,
        thresholds: ThresholdConfig,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            store,
            sink,
            thresholds,
            fetch_timeout,
        }
    }

    /// Runs one monitoring cycle over every non-closed position.
    ///
    /// A quote fetch failure (explicit error or timeout) skips only the
    /// affected position; no value is ever fabricated in its place. Each
    /// trigger fires at most once per position lifetime, but lifecycle
    /// escalation re-applies whenever its condition still holds.
    ///
    /// # Errors
    ///
    /// Fails on store errors; provider failures are per-position and
    /// logged instead.
    pub async fn run_cycle(&self) -> Result<Vec<TriggeredAlert>> {
        let positions = self.store.open_positions().await?;
        let today = Utc::now().date_naive();
        let mut triggered = Vec::new();

        for mut position in positions {
            let quote = match timeout(self.fetch_timeout, self.provider.quote(&position.ticker))
                .await
            {
                Ok(Ok(quote)) => quote,
                Ok(Err(error)) => {
                    warn!(ticker = %position.ticker, position_id = %position.id, %error,
                        "Quote fetch failed, skipping position this cycle");
                    continue;
                }
                Err(_) => {
                    warn!(ticker = %position.ticker, position_id = %position.id,
                        "Quote fetch timed out, skipping position this cycle");
                    continue;
                }
            };

            let age_minutes = (Utc::now() - quote.fetched_at).num_minutes();
            let freshness = if age_minutes > self.thresholds.data_stale_minutes {
                Freshness::Stale
            } else {
                Freshness::Ok
            };

            let mut fired = Vec::new();
            let mut escalate = false;
            for (kind, escalates) in self.evaluate_triggers(&position, &quote, today) {
                escalate |= escalates;
                fired.push(kind);
            }
            if freshness == Freshness::Stale {
                fired.push(TriggerKind::DataStale);
            }

            for kind in fired {
                if self.store.ensure_alert_sent(position.id, kind).await? {
                    let alert = TriggeredAlert {
                        position_id: position.id,
                        ticker: position.ticker.clone(),
                        trigger: kind,
                    };
                    if let Err(error) =
                        self.sink.deliver(&AlertEvent::Trigger(alert.clone())).await
                    {
                        warn!(position_id = %position.id, trigger = %kind, %error,
                            "Alert delivery failed");
                    }
                    triggered.push(alert);
                } else {
                    debug!(position_id = %position.id, trigger = %kind, "Alert already sent");
                }
            }

            if escalate && position.lifecycle_stage == LifecycleStage::Monitoring {
                position.lifecycle_stage = LifecycleStage::ClosingUrgent;
            }
            position.last_observed = Some(LastObserved {
                timestamp: Utc::now(),
                mark_price: quote.option_mark,
                underlying_price: quote.underlying,
                freshness,
            });
            self.store.update_position(position).await?;
        }

        Ok(triggered)
    }

    /// Trigger conditions for one position against one quote. Returns
    /// `(kind, escalates)` pairs; take-profit is the one non-escalating
    /// trigger.
    fn evaluate_triggers(
        &self,
        position: &Position,
        quote: &advisor_core::market::Quote,
        today: chrono::NaiveDate,
    ) -> Vec<(TriggerKind, bool)> {
        let mut fired = Vec::new();
        let rules = &position.risk_rules;
        let strike = position.short_strike;
        let dte = position.days_to_expiry(today);

        let touched = match position.strategy {
            Verdict::ShortPut => quote.underlying <= strike,
            Verdict::ShortCall => quote.underlying >= strike,
            Verdict::None => false,
        };
        if touched {
            fired.push((TriggerKind::StrikeTouch, true));
        }

        if dte_alert(dte, self.thresholds.dte_alert_threshold) == DteStatus::Alert {
            fired.push((TriggerKind::DteAlert, true));
        }

        if rules.stop_loss_price > Decimal::ZERO && quote.option_mark >= rules.stop_loss_price {
            fired.push((TriggerKind::StopLoss, true));
        }

        if rules.take_profit_price > Decimal::ZERO
            && quote.option_mark <= rules.take_profit_price
        {
            fired.push((TriggerKind::TakeProfit, false));
        }

        if position.strategy == Verdict::ShortPut
            && strike > Decimal::ZERO
            && quote.underlying > strike
        {
            let itm_ratio = (quote.underlying - strike) / strike;
            if itm_ratio >= self.thresholds.roll_itm_pct && dte < self.thresholds.roll_dte_trigger
            {
                fired.push((TriggerKind::RollNeeded, true));
            }
        }

        fired
    }
}
