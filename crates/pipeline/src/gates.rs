//! Risk gates between a strategy verdict and a published recommendation.
//!
//! Every gate is evaluated on every run so the report carries a full audit
//! trail; the first blocking gate decides the outcome and later gates can
//! only add outcomes, never un-block.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;

use advisor_core::market::MacroEvent;
use advisor_core::position::Position;
use advisor_core::report::{GateOutcome, Verdict};
use advisor_quant::engine::EfficiencyCheck;

/// Inputs the gate chain needs; all already computed upstream.
pub struct GateContext<'a> {
    pub verdict: Verdict,
    pub efficiency: EfficiencyCheck,
    pub earnings_date: Option<NaiveDate>,
    pub today: NaiveDate,
    pub expiry: NaiveDate,
    pub now: DateTime<Utc>,
    pub macro_lookahead_hours: i64,
    pub macro_events: &'a [MacroEvent],
    pub open_positions: &'a [Position],
    pub candidate_sector: &'a str,
    /// `strike * 100 * contracts` for the candidate position.
    pub candidate_capital: Decimal,
    pub max_sector_allocation_pct: Decimal,
}

/// Gate chain result: the possibly-downgraded verdict, the first blocking
/// reason, and one audited outcome per gate.
pub struct GateReport {
    pub verdict: Verdict,
    pub block_reason: Option<String>,
    pub outcomes: Vec<GateOutcome>,
}

/// Runs the four gates in their fixed order.
#[must_use]
pub fn evaluate_gates(ctx: &GateContext<'_>) -> GateReport {
    let mut verdict = ctx.verdict;
    let mut block_reason: Option<String> = None;
    let mut outcomes = Vec::with_capacity(4);

    let mut record = |outcomes: &mut Vec<GateOutcome>,
                      block_reason: &mut Option<String>,
                      gate: &str,
                      blocked: bool,
                      reason: String| {
        if blocked && block_reason.is_none() {
            *block_reason = Some(reason.clone());
        }
        outcomes.push(GateOutcome {
            gate: gate.to_string(),
            blocked,
            reason: blocked.then_some(reason),
        });
    };

    // Efficiency binds short puts only; it withdraws the verdict rather
    // than blocking the whole run, and never substitutes a short call.
    let efficiency_blocked = verdict == Verdict::ShortPut && !ctx.efficiency.passes;
    if efficiency_blocked {
        verdict = Verdict::None;
    }
    record(
        &mut outcomes,
        &mut block_reason,
        "efficiency",
        efficiency_blocked,
        "efficiency gate failed".to_string(),
    );

    let earnings_blocked = ctx
        .earnings_date
        .is_some_and(|date| date >= ctx.today && date <= ctx.expiry);
    record(
        &mut outcomes,
        &mut block_reason,
        "earnings",
        earnings_blocked,
        "earnings event between today and expiry".to_string(),
    );

    let cutoff = ctx.now + Duration::hours(ctx.macro_lookahead_hours);
    let macro_hit = ctx
        .macro_events
        .iter()
        .find(|event| event.start_time >= ctx.now && event.start_time <= cutoff);
    record(
        &mut outcomes,
        &mut block_reason,
        "macro",
        macro_hit.is_some(),
        match macro_hit {
            Some(event) => format!(
                "high-impact macro event within {}h: {}",
                ctx.macro_lookahead_hours, event.name
            ),
            None => String::new(),
        },
    );

    let sector_blocked = sector_over_cap(ctx);
    record(
        &mut outcomes,
        &mut block_reason,
        "sector",
        sector_blocked,
        "sector exposure cap exceeded".to_string(),
    );

    GateReport {
        verdict,
        block_reason,
        outcomes,
    }
}

/// Projected sector share including the candidate:
/// `(sector + new) / (total + new)` against the configured cap.
///
/// An empty book is always allowed; the first position is trivially 100%
/// of its sector and the gate only binds once capital is deployed.
fn sector_over_cap(ctx: &GateContext<'_>) -> bool {
    let total: Decimal = ctx
        .open_positions
        .iter()
        .map(|p| p.capital_deployed)
        .sum();
    if total <= Decimal::ZERO {
        return false;
    }
    let sector: Decimal = ctx
        .open_positions
        .iter()
        .filter(|p| p.sector == ctx.candidate_sector)
        .map(|p| p.capital_deployed)
        .sum();
    let denominator = total + ctx.candidate_capital;
    if denominator <= Decimal::ZERO {
        return false;
    }
    (sector + ctx.candidate_capital) / denominator > ctx.max_sector_allocation_pct
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::position::{LifecycleStage, RiskRules};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn passing_check() -> EfficiencyCheck {
        EfficiencyCheck {
            ratio: dec!(1.20),
            passes: true,
        }
    }

    fn open_position(sector: &str, capital: Decimal) -> Position {
        Position {
            id: Uuid::new_v4(),
            ticker: "XYZ".to_string(),
            strategy: Verdict::ShortPut,
            short_strike: dec!(100),
            expiry: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            entry_credit: dec!(2.00),
            contracts: 1,
            capital_deployed: capital,
            sector: sector.to_string(),
            risk_rules: RiskRules {
                stop_loss_price: dec!(6.00),
                take_profit_price: dec!(1.00),
                max_dte_hold: 21,
                force_close_date: NaiveDate::from_ymd_opt(2026, 9, 25).unwrap(),
            },
            lifecycle_stage: LifecycleStage::Monitoring,
            last_observed: None,
            parent_position_id: None,
            root_position_id: None,
            roll_count: 0,
            realized_pnl_pre_roll: None,
            opened_at: Utc::now(),
        }
    }

    /// Open book spread across other sectors so the exposure gate clears.
    fn diversified_book() -> Vec<Position> {
        vec![
            open_position("Financials", dec!(40000)),
            open_position("Energy", dec!(40000)),
        ]
    }

    fn base_ctx<'a>(
        positions: &'a [Position],
        events: &'a [MacroEvent],
    ) -> GateContext<'a> {
        GateContext {
            verdict: Verdict::ShortPut,
            efficiency: passing_check(),
            earnings_date: None,
            today: NaiveDate::from_ymd_opt(2026, 8, 28).unwrap(),
            expiry: NaiveDate::from_ymd_opt(2026, 10, 2).unwrap(),
            now: Utc::now(),
            macro_lookahead_hours: 48,
            macro_events: events,
            open_positions: positions,
            candidate_sector: "Information Technology",
            candidate_capital: dec!(15500),
            max_sector_allocation_pct: dec!(0.70),
        }
    }

    #[test]
    fn all_clear_keeps_the_verdict() {
        let book = diversified_book();
        let report = evaluate_gates(&base_ctx(&book, &[]));
        assert_eq!(report.verdict, Verdict::ShortPut);
        assert!(report.block_reason.is_none());
        assert_eq!(report.outcomes.len(), 4);
        assert!(report.outcomes.iter().all(|o| !o.blocked));
    }

    #[test]
    fn efficiency_failure_withdraws_short_puts_only() {
        let book = diversified_book();
        let mut ctx = base_ctx(&book, &[]);
        ctx.efficiency = EfficiencyCheck {
            ratio: dec!(0.63),
            passes: false,
        };
        let report = evaluate_gates(&ctx);
        assert_eq!(report.verdict, Verdict::None);
        assert_eq!(report.block_reason.as_deref(), Some("efficiency gate failed"));

        ctx.verdict = Verdict::ShortCall;
        let report = evaluate_gates(&ctx);
        assert_eq!(report.verdict, Verdict::ShortCall);
        assert!(report.block_reason.is_none());
    }

    #[test]
    fn earnings_inside_the_window_block_inclusively() {
        let book = diversified_book();
        let mut ctx = base_ctx(&book, &[]);
        ctx.earnings_date = ctx.expiry.into();
        let report = evaluate_gates(&ctx);
        assert!(report.block_reason.is_some());

        ctx.earnings_date = Some(ctx.today);
        assert!(evaluate_gates(&ctx).block_reason.is_some());

        // One day past expiry: clear.
        ctx.earnings_date = Some(ctx.expiry + Duration::days(1));
        assert!(evaluate_gates(&ctx).block_reason.is_none());

        // Yesterday: already behind us.
        ctx.earnings_date = Some(ctx.today - Duration::days(1));
        assert!(evaluate_gates(&ctx).block_reason.is_none());
    }

    #[test]
    fn macro_gate_blocks_inside_the_lookahead_window() {
        let book = diversified_book();
        let events = [MacroEvent {
            start_time: Utc::now() + Duration::hours(24),
            name: "FOMC Rate Decision".to_string(),
            importance: "high".to_string(),
        }];
        let ctx = base_ctx(&book, &events);
        let report = evaluate_gates(&ctx);
        assert!(report
            .block_reason
            .as_deref()
            .unwrap()
            .contains("FOMC Rate Decision"));

        let past = [MacroEvent {
            start_time: Utc::now() - Duration::hours(1),
            name: "CPI Release".to_string(),
            importance: "high".to_string(),
        }];
        assert!(evaluate_gates(&base_ctx(&book, &past)).block_reason.is_none());

        let far = [MacroEvent {
            start_time: Utc::now() + Duration::hours(72),
            name: "NFP".to_string(),
            importance: "high".to_string(),
        }];
        assert!(evaluate_gates(&base_ctx(&book, &far)).block_reason.is_none());
    }

    #[test]
    fn sector_cap_counts_the_candidate_itself() {
        // 40k tech + 15.5k candidate over 60k + 15.5k total = 73.5% > 70%.
        let positions = [
            open_position("Information Technology", dec!(40000)),
            open_position("Financials", dec!(20000)),
        ];
        let report = evaluate_gates(&base_ctx(&positions, &[]));
        assert_eq!(
            report.block_reason.as_deref(),
            Some("sector exposure cap exceeded")
        );

        // More diversification and the same candidate clears.
        let positions = [
            open_position("Information Technology", dec!(20000)),
            open_position("Financials", dec!(40000)),
        ];
        assert!(evaluate_gates(&base_ctx(&positions, &[])).block_reason.is_none());
    }

    #[test]
    fn empty_book_is_always_allowed() {
        let report = evaluate_gates(&base_ctx(&[], &[]));
        assert!(!report.outcomes[3].blocked);
        assert!(report.block_reason.is_none());
    }

    #[test]
    fn first_blocking_gate_owns_the_reason() {
        let events = [MacroEvent {
            start_time: Utc::now() + Duration::hours(24),
            name: "FOMC Rate Decision".to_string(),
            importance: "high".to_string(),
        }];
        let mut ctx = base_ctx(&[], &events);
        ctx.efficiency = EfficiencyCheck {
            ratio: dec!(0.63),
            passes: false,
        };
        let report = evaluate_gates(&ctx);
        assert_eq!(report.block_reason.as_deref(), Some("efficiency gate failed"));
        // Later gates still audited.
        assert!(report.outcomes[2].blocked);
    }
}
