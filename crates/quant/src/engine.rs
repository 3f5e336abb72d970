//! Deterministic math for options analytics.
//!
//! All prices, vols, and ratios are `Decimal` end to end: the outputs feed
//! strike arithmetic and gate comparisons against monetary thresholds, and
//! binary floating error could flip a gate. Degenerate inputs (zero or
//! negative price, vol, or DTE) are domain edge cases, not faults; they
//! yield neutral values instead of errors.

use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use serde::{Deserialize, Serialize};

const DAYS_PER_YEAR: u32 = 365;
const TRADING_DAYS_PER_YEAR: u32 = 252;

/// Expected 1-standard-deviation move for the given DTE.
///
/// `EM = price * iv_30d * sqrt(dte / 365)`, quantized to 4 decimal places
/// with half-up rounding so the strike arithmetic downstream round-trips
/// exactly. `iv_30d` is a decimal fraction (0.25 = 25%).
#[must_use]
pub fn expected_move(price: Decimal, iv_30d: Decimal, dte: i64) -> Decimal {
    if price <= Decimal::ZERO || iv_30d < Decimal::ZERO || dte <= 0 {
        return Decimal::ZERO;
    }
    let dte_over_year = Decimal::from(dte) / Decimal::from(DAYS_PER_YEAR);
    let Some(sqrt_dte) = dte_over_year.sqrt() else {
        return Decimal::ZERO;
    };
    (price * iv_30d * sqrt_dte)
        .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

/// Result of the IV/NATR efficiency rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EfficiencyCheck {
    pub ratio: Decimal,
    pub passes: bool,
}

/// Implied-vol versus realized-vol efficiency ratio.
///
/// `ratio = (iv_30d * 100) / ((atr_14 / close * 100) * sqrt(252))`, rounded
/// to 2 decimal places half-up. Passes only when the ratio exceeds
/// `min_ratio`. Degenerate inputs give `(0, false)`.
#[must_use]
pub fn efficiency_ratio(
    iv_30d: Decimal,
    atr_14: Decimal,
    close: Decimal,
    min_ratio: Decimal,
) -> EfficiencyCheck {
    let failed = EfficiencyCheck {
        ratio: Decimal::ZERO,
        passes: false,
    };
    if close <= Decimal::ZERO || atr_14 < Decimal::ZERO {
        return failed;
    }
    let natr_pct = atr_14 / close * Decimal::from(100);
    if natr_pct <= Decimal::ZERO {
        return failed;
    }
    let Some(sqrt_trading_days) = Decimal::from(TRADING_DAYS_PER_YEAR).sqrt() else {
        return failed;
    };
    let denominator = natr_pct * sqrt_trading_days;
    let ratio = (iv_30d * Decimal::from(100) / denominator)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    EfficiencyCheck {
        ratio,
        passes: ratio > min_ratio,
    }
}

/// Days-to-expiry status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DteStatus {
    Ok,
    Alert,
}

/// Flags any position at or under `threshold` days to expiration.
#[must_use]
pub fn dte_alert(dte: i64, threshold: i64) -> DteStatus {
    if dte <= threshold {
        DteStatus::Alert
    } else {
        DteStatus::Ok
    }
}
