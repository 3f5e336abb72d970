//! Contract selection: expiry window, liquidity gate, delta-band strike
//! pick, and the synthetic fallback when the chain offers nothing usable.

use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::debug;

use advisor_core::config::ThresholdConfig;
use advisor_core::market::{OptionChain, OptionQuote};
use advisor_core::report::ContractSource;

/// Strike, economics, and provenance of the selected contract, plus the
/// non-blocking volatility refinements.
#[derive(Debug, Clone)]
pub struct SelectedContract {
    pub contract: String,
    pub strike: Decimal,
    pub expiry: NaiveDate,
    pub delta: Decimal,
    pub credit_est: Decimal,
    pub source: ContractSource,
    /// Implied vol at the selected expiry, `iv_30d` when unavailable.
    pub iv_at_expiry: Decimal,
    /// 25-delta put-minus-call skew in vol points, zero without call quotes.
    pub skew_25d: Decimal,
}

/// Picks the short contract for `ticker`.
///
/// Chain path: puts within the DTE window, liquid quotes only, the one
/// whose absolute delta sits closest to the middle of the target band (the
/// first such quote wins a tie). When nothing survives, a synthetic
/// candidate is built from the expected move so the report still carries a
/// concrete strike, marked `Synthetic` for the reader to discount.
#[must_use]
pub fn select_contract(
    ticker: &str,
    chain: &OptionChain,
    price: Decimal,
    expected_move: Decimal,
    iv_30d: Decimal,
    right: char,
    today: NaiveDate,
    thresholds: &ThresholdConfig,
) -> SelectedContract {
    let window_start = today + Duration::days(thresholds.dte_min);
    let window_end = today + Duration::days(thresholds.dte_max);
    let band_mid = (thresholds.target_delta_low + thresholds.target_delta_high) / dec!(2);

    let picked = chain
        .puts
        .iter()
        .filter(|q| q.expiry >= window_start && q.expiry <= window_end)
        .filter(|q| is_liquid(q, thresholds.max_spread_pct))
        .filter(|q| {
            let abs_delta = q.delta.abs();
            abs_delta >= thresholds.target_delta_low && abs_delta <= thresholds.target_delta_high
        })
        .min_by_key(|q| (q.delta.abs() - band_mid).abs());

    if let Some(quote) = picked {
        let credit = quote
            .mid()
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        return SelectedContract {
            contract: contract_symbol(ticker, quote.expiry, right, quote.strike),
            strike: quote.strike,
            expiry: quote.expiry,
            delta: quote.delta,
            credit_est: credit,
            source: ContractSource::Chain,
            iv_at_expiry: iv_at_expiry(chain, quote.expiry, iv_30d),
            skew_25d: skew_25d(chain, quote.expiry),
        };
    }

    debug!(ticker, "No liquid chain quote in the delta band, synthesizing");
    let mut strike = (price - expected_move)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if strike <= Decimal::ZERO {
        strike = (price * dec!(0.90))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    }
    let expiry = today + Duration::days((thresholds.dte_min + thresholds.dte_max) / 2);
    SelectedContract {
        contract: contract_symbol(ticker, expiry, right, strike),
        strike,
        expiry,
        delta: thresholds.fallback_delta,
        credit_est: thresholds.fallback_credit,
        source: ContractSource::Synthetic,
        iv_at_expiry: iv_at_expiry(chain, expiry, iv_30d),
        skew_25d: skew_25d(chain, expiry),
    }
}

fn is_liquid(quote: &OptionQuote, max_spread_pct: Decimal) -> bool {
    if quote.bid <= Decimal::ZERO {
        return false;
    }
    (quote.ask - quote.bid) / quote.bid < max_spread_pct
}

/// OCC-style symbol: ticker, `%y%m%d` expiry, right, strike x 1000 padded
/// to 8 digits.
#[must_use]
pub fn contract_symbol(ticker: &str, expiry: NaiveDate, right: char, strike: Decimal) -> String {
    let millis = (strike * dec!(1000))
        .round()
        .to_i64()
        .unwrap_or_default();
    format!(
        "{}{}{}{:08}",
        ticker.to_uppercase(),
        expiry.format("%y%m%d"),
        right,
        millis
    )
}

/// Implied vol from the first put at the target expiry, `fallback` when the
/// chain has none.
fn iv_at_expiry(chain: &OptionChain, expiry: NaiveDate, fallback: Decimal) -> Decimal {
    chain
        .puts
        .iter()
        .find(|q| q.expiry == expiry)
        .map_or(fallback, |q| q.iv)
}

/// 25-delta put-minus-call skew at the target expiry, in vol points. Zero
/// whenever either side is missing; never blocks selection.
fn skew_25d(chain: &OptionChain, expiry: NaiveDate) -> Decimal {
    let target = dec!(0.25);
    let closest = |quotes: &[OptionQuote]| {
        quotes
            .iter()
            .filter(|q| q.expiry == expiry)
            .min_by_key(|q| (q.delta.abs() - target).abs())
            .map(|q| q.iv)
    };
    let Some(put_iv) = closest(&chain.puts) else {
        return Decimal::ZERO;
    };
    let Some(call_iv) = chain.calls.as_deref().and_then(closest) else {
        return Decimal::ZERO;
    };
    ((put_iv - call_iv) * dec!(100))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(strike: Decimal, expiry: NaiveDate, delta: Decimal, bid: Decimal, ask: Decimal) -> OptionQuote {
        OptionQuote {
            strike,
            expiry,
            delta,
            bid,
            ask,
            iv: dec!(0.33),
        }
    }

    fn chain(puts: Vec<OptionQuote>) -> OptionChain {
        OptionChain {
            ticker: "AAPL".to_string(),
            expirations: puts.iter().map(|q| q.expiry).collect(),
            puts,
            calls: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 28).unwrap()
    }

    #[test]
    fn picks_the_delta_closest_to_the_band_midpoint() {
        let expiry = today() + Duration::days(35);
        let chain = chain(vec![
            put(dec!(160), expiry, dec!(-0.30), dec!(3.80), dec!(4.00)),
            put(dec!(155), expiry, dec!(-0.22), dec!(2.90), dec!(3.10)),
            put(dec!(150), expiry, dec!(-0.18), dec!(2.10), dec!(2.30)),
        ]);
        let selected = select_contract(
            "AAPL",
            &chain,
            dec!(175.50),
            dec!(13.4104),
            dec!(0.24),
            'P',
            today(),
            &ThresholdConfig::default(),
        );
        // |−0.22| is 0.03 from the 0.25 midpoint; |−0.30| is 0.05; −0.18 is
        // outside the band entirely.
        assert_eq!(selected.strike, dec!(155));
        assert_eq!(selected.credit_est, dec!(3.00));
        assert_eq!(selected.source, ContractSource::Chain);
        assert_eq!(selected.contract, "AAPL261002P00155000");
        assert_eq!(selected.iv_at_expiry, dec!(0.33));
    }

    #[test]
    fn tie_breaks_to_the_first_quote_encountered() {
        let expiry = today() + Duration::days(35);
        let chain = chain(vec![
            put(dec!(158), expiry, dec!(-0.27), dec!(3.40), dec!(3.60)),
            put(dec!(152), expiry, dec!(-0.23), dec!(2.50), dec!(2.70)),
        ]);
        let selected = select_contract(
            "AAPL",
            &chain,
            dec!(175.50),
            dec!(13.4104),
            dec!(0.24),
            'P',
            today(),
            &ThresholdConfig::default(),
        );
        assert_eq!(selected.strike, dec!(158));
    }

    #[test]
    fn illiquid_and_out_of_window_quotes_are_dropped() {
        let in_window = today() + Duration::days(35);
        let out_of_window = today() + Duration::days(60);
        let chain = chain(vec![
            // Spread 2.90 -> 3.30 is over 10% of bid.
            put(dec!(155), in_window, dec!(-0.25), dec!(2.90), dec!(3.30)),
            // Zero bid.
            put(dec!(154), in_window, dec!(-0.24), dec!(0), dec!(0.40)),
            // Fine quote, wrong expiry.
            put(dec!(153), out_of_window, dec!(-0.25), dec!(2.90), dec!(3.10)),
        ]);
        let selected = select_contract(
            "AAPL",
            &chain,
            dec!(175.50),
            dec!(13.4104),
            dec!(0.24),
            'P',
            today(),
            &ThresholdConfig::default(),
        );
        assert_eq!(selected.source, ContractSource::Synthetic);
    }

    #[test]
    fn synthetic_fallback_uses_the_expected_move() {
        let selected = select_contract(
            "AAPL",
            &chain(vec![]),
            dec!(175.50),
            dec!(13.4104),
            dec!(0.24),
            'P',
            today(),
            &ThresholdConfig::default(),
        );
        assert_eq!(selected.strike, dec!(162.09));
        assert_eq!(selected.expiry, today() + Duration::days(37));
        assert_eq!(selected.delta, dec!(-0.20));
        assert_eq!(selected.credit_est, dec!(3.50));
        assert_eq!(selected.source, ContractSource::Synthetic);
        // No chain quote at the synthetic expiry: iv falls back to iv_30d.
        assert_eq!(selected.iv_at_expiry, dec!(0.24));
        assert_eq!(selected.contract, "AAPL261004P00162090");
    }

    #[test]
    fn synthetic_strike_floors_at_ninety_percent_of_price() {
        // Expected move larger than the price would put the strike negative.
        let selected = select_contract(
            "PENNY",
            &chain(vec![]),
            dec!(4.00),
            dec!(5.00),
            dec!(1.80),
            'P',
            today(),
            &ThresholdConfig::default(),
        );
        assert_eq!(selected.strike, dec!(3.60));
    }

    #[test]
    fn skew_needs_both_sides_at_the_expiry() {
        let expiry = today() + Duration::days(35);
        let mut with_calls = chain(vec![put(
            dec!(155),
            expiry,
            dec!(-0.25),
            dec!(2.90),
            dec!(3.10),
        )]);
        with_calls.calls = Some(vec![OptionQuote {
            strike: dec!(190),
            expiry,
            delta: dec!(0.24),
            bid: dec!(1.10),
            ask: dec!(1.20),
            iv: dec!(0.29),
        }]);
        let selected = select_contract(
            "AAPL",
            &with_calls,
            dec!(175.50),
            dec!(13.4104),
            dec!(0.24),
            'P',
            today(),
            &ThresholdConfig::default(),
        );
        // 0.33 put vol minus 0.29 call vol, in points.
        assert_eq!(selected.skew_25d, dec!(4.00));

        with_calls.calls = None;
        let selected = select_contract(
            "AAPL",
            &with_calls,
            dec!(175.50),
            dec!(13.4104),
            dec!(0.24),
            'P',
            today(),
            &ThresholdConfig::default(),
        );
        assert_eq!(selected.skew_25d, Decimal::ZERO);
    }

    #[test]
    fn symbol_format_pads_strike_millis() {
        let expiry = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(
            contract_symbol("aapl", expiry, 'P', dec!(155)),
            "AAPL261016P00155000"
        );
        assert_eq!(
            contract_symbol("BRK", expiry, 'C', dec!(162.09)),
            "BRK261016C00162090"
        );
    }
}
