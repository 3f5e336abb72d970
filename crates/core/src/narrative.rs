//! Deterministic narrative template.
//!
//! Built only from already-computed numbers; used directly by the template
//! generator and as the fallback whenever an AI-backed generator fails.

use crate::report::{Analysis, Recommendation, Trend};

/// Renders the templated one-paragraph thesis for a recommendation.
#[must_use]
pub fn template_narrative(
    ticker: &str,
    analysis: &Analysis,
    recommendation: &Recommendation,
) -> String {
    let trend = match analysis.trend {
        Trend::Bullish => "bullish",
        Trend::Bearish => "bearish",
        Trend::Neutral => "neutral",
    };
    let mut parts = vec![format!(
        "{ticker} price {}, RSI {}, trend {trend}.",
        analysis.price, analysis.rsi_14
    )];
    parts.push(format!("IV/NATR ratio {}.", analysis.iv_natr_ratio));
    parts.push(format!(
        "Expected move (1-SD) {}.",
        analysis.expected_move_1sd
    ));
    parts.push(format!(
        "Strike {} at delta {}; {}.",
        recommendation.strike, recommendation.delta, recommendation.safety_check
    ));
    parts.join(" ")
}
