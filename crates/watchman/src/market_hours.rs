//! US equity/options session clock: 09:30-16:00 Eastern, weekdays.

use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use chrono_tz::US::Eastern;

/// Whether `now` falls inside regular US market hours. Both session
/// boundaries are inclusive. Exchange holidays are not modeled; a holiday
/// weekday polls at the market-hours cadence, which is harmless.
#[must_use]
pub fn is_market_hours(now: DateTime<Utc>) -> bool {
    let eastern = now.with_timezone(&Eastern);
    if matches!(eastern.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    let open = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
    let close = NaiveTime::from_hms_opt(16, 0, 0).unwrap();
    let t = eastern.time();
    t >= open && t <= close
}
