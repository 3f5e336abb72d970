//! Recommendation assembler: one ticker in, one complete `TradeReport` out.
//!
//! The pipeline is stateless and re-entrant; duplicate protection for the
//! same ticker lives at the persistence boundary (the PENDING idempotency
//! check), not in any in-process locking.

use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info};

use advisor_core::config::AppConfig;
use advisor_core::narrative::template_narrative;
use advisor_core::report::{Analysis, Recommendation, TradeRecord, TradeReport, Verdict};
use advisor_core::traits::{MacroCalendarProvider, MarketDataProvider, NarrativeGenerator, Store};
use advisor_quant::classifier::{rsi_state, trend_state};
use advisor_quant::engine::{efficiency_ratio, expected_move};

use crate::contracts::select_contract;
use crate::gates::{evaluate_gates, GateContext};
use crate::regime::market_regime;
use crate::strategy::{apply_trend_override, select_strategy};

/// Wires the quant engine, classifiers, regime filter, contract selector,
/// and gate chain behind one `analyze` call.
pub struct AdvisorPipeline {
    provider: Arc<dyn MarketDataProvider>,
    macro_calendar: Arc<dyn MacroCalendarProvider>,
    narrative: Arc<dyn NarrativeGenerator>,
    store: Arc<dyn Store>,
    config: AppConfig,
}

impl AdvisorPipeline {
    #[must_use]
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        macro_calendar: Arc<dyn MacroCalendarProvider>,
        narrative: Arc<dyn NarrativeGenerator>,
        store: Arc<dyn Store>,
        config: AppConfig,
    ) -> Self {
        Self {
            provider,
            macro_calendar,
            narrative,
            store,
            config,
        }
    }

    /// Runs the full decision pipeline for one ticker.
    ///
    /// Always returns a complete report: tradeable outcomes carry a
    /// recommendation and are persisted as `PENDING`; blocked and NONE
    /// outcomes carry `no_trade` plus a reason and are returned without
    /// persisting anything.
    ///
    /// # Errors
    ///
    /// Fails on an empty ticker or when a provider fetch fails; gate-forced
    /// no-trades are ordinary outcomes, never errors.
    pub async fn analyze(&self, ticker: &str) -> Result<TradeReport> {
        let ticker = ticker.trim().to_uppercase();
        ensure!(!ticker.is_empty(), "ticker must not be empty");
        let thresholds = &self.config.thresholds;

        let snapshot = self
            .provider
            .daily_bars(&ticker)
            .await
            .with_context(|| format!("daily bars for {ticker}"))?;
        let regime_read =
            market_regime(self.provider.as_ref(), &self.config.provider.benchmark_ticker)
                .await
                .context("benchmark regime read")?;

        let trend = trend_state(snapshot.close, snapshot.sma_50, snapshot.sma_200);
        let rsi = rsi_state(
            snapshot.rsi_14,
            thresholds.rsi_overbought,
            thresholds.rsi_oversold,
        );

        let target_dte = (thresholds.dte_min + thresholds.dte_max) / 2;
        let em = expected_move(snapshot.close, snapshot.iv_30d, target_dte);
        let efficiency = efficiency_ratio(
            snapshot.iv_30d,
            snapshot.atr_14,
            snapshot.close,
            thresholds.iv_natr_min_ratio,
        );

        let verdict = select_strategy(trend, rsi, regime_read.allows_short_put);
        let verdict = apply_trend_override(verdict, snapshot.close, snapshot.sma_50);

        let chain = self
            .provider
            .option_chain(&ticker)
            .await
            .with_context(|| format!("option chain for {ticker}"))?;
        let today = Utc::now().date_naive();
        let contract = select_contract(
            &ticker,
            &chain,
            snapshot.close,
            em,
            snapshot.iv_30d,
            verdict.right(),
            today,
            thresholds,
        );
        debug!(
            ticker,
            contract = %contract.contract,
            source = ?contract.source,
            iv_at_expiry = %contract.iv_at_expiry,
            skew_25d = %contract.skew_25d,
            "Contract selected"
        );

        let macro_events = self
            .macro_calendar
            .high_impact_events(thresholds.macro_lookahead_hours)
            .await
            .context("macro calendar fetch")?;
        let open_positions = self.store.open_positions().await?;

        let analysis = Analysis {
            price: snapshot.close,
            rsi_14: snapshot.rsi_14,
            trend,
            iv_natr_ratio: efficiency.ratio,
            expected_move_1sd: em,
            earnings_date: snapshot.earnings_date,
            sector: snapshot.sector.clone(),
        };

        let candidate_sector = snapshot.sector.as_deref().unwrap_or("Unknown");
        let gate_report = evaluate_gates(&GateContext {
            verdict,
            efficiency,
            earnings_date: snapshot.earnings_date,
            today,
            expiry: contract.expiry,
            now: Utc::now(),
            macro_lookahead_hours: thresholds.macro_lookahead_hours,
            macro_events: &macro_events,
            open_positions: &open_positions,
            candidate_sector,
            candidate_capital: contract.strike * Decimal::from(100),
            max_sector_allocation_pct: thresholds.max_sector_allocation_pct,
        });

        if let Some(reason) = gate_report.block_reason {
            info!(ticker, reason, "Pipeline blocked");
            return Ok(no_trade(
                &ticker,
                regime_read.regime,
                analysis,
                reason,
                gate_report.outcomes,
            ));
        }
        if gate_report.verdict == Verdict::None {
            return Ok(no_trade(
                &ticker,
                regime_read.regime,
                analysis,
                "no strategy matches current technical state".to_string(),
                gate_report.outcomes,
            ));
        }

        // Idempotency short-circuit at the persistence boundary: a PENDING
        // record for the same ticker/strategy/expiry is returned as-is.
        if let Some(existing) = self
            .store
            .find_pending(&ticker, gate_report.verdict, contract.expiry)
            .await?
        {
            debug!(ticker, record_id = %existing.id, "Returning existing pending record");
            return Ok(existing.report);
        }

        let safety_check = if contract.strike < snapshot.close - em {
            "outside 1-SD".to_string()
        } else {
            "within 1-SD, review manually".to_string()
        };
        let mut recommendation = Recommendation {
            strategy: gate_report.verdict,
            contract: contract.contract,
            strike: contract.strike,
            expiry: contract.expiry,
            delta: contract.delta,
            credit_est: contract.credit_est,
            source: contract.source,
            safety_check,
            narrative: String::new(),
        };
        recommendation.narrative = match self
            .narrative
            .synthesize(&ticker, &analysis, &recommendation)
            .await
        {
            Ok(text) => text,
            Err(error) => {
                debug!(ticker, %error, "Narrative generator failed, using template");
                template_narrative(&ticker, &analysis, &recommendation)
            }
        };

        let report = TradeReport {
            ticker: ticker.clone(),
            timestamp: Utc::now(),
            regime: regime_read.regime,
            analysis,
            recommendation: Some(recommendation),
            no_trade: false,
            reason: None,
            gates: gate_report.outcomes,
        };
        let record = TradeRecord::pending(report.clone());
        info!(
            ticker,
            record_id = %record.id,
            strategy = %record.strategy,
            strike = %record.strike,
            "Recommendation persisted as PENDING"
        );
        self.store.upsert_recommendation(record).await?;
        Ok(report)
    }
}

fn no_trade(
    ticker: &str,
    regime: advisor_core::report::Regime,
    analysis: Analysis,
    reason: String,
    gates: Vec<advisor_core::report::GateOutcome>,
) -> TradeReport {
    TradeReport {
        ticker: ticker.to_string(),
        timestamp: Utc::now(),
        regime,
        analysis,
        recommendation: None,
        no_trade: true,
        reason: Some(reason),
        gates,
    }
}
