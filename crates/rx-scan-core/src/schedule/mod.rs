//! Frequency, duration, refill and reminder scheduling.
//!
//! Everything here is a pure function of the extracted entities and a start
//! date. The only clock read is [`today`], which callers use when no start
//! date was supplied.

pub mod duration;
pub mod frequency;
pub mod refill;
pub mod reminders;

pub use duration::{
    estimate_duration_days, parse_duration_token, MAX_DURATION_DAYS, MISSING_DURATION_DAYS,
    UNPARSED_DURATION_DAYS, UNTIL_FINISHED_DAYS,
};
pub use frequency::{estimate_frequency, split_dose_slots, FrequencyKeyword};
pub use refill::{calculate_refill, calculate_refills};
pub use reminders::{
    resolve_slots, ReminderScheduler, DEFAULT_FOOD_OFFSET_MINUTES, MAX_FOOD_OFFSET_MINUTES,
};

use chrono::NaiveDate;
use tracing::debug;

use crate::models::DATE_FORMAT;

/// Local calendar date.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parse a caller-supplied start date, falling back to `fallback`.
///
/// A blank or malformed date is not an error.
pub fn resolve_start_date(requested: Option<&str>, fallback: NaiveDate) -> NaiveDate {
    match requested.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            Ok(date) => date,
            Err(e) => {
                debug!(start_date = raw, error = %e, "unparseable start date, using fallback");
                fallback
            }
        },
        None => fallback,
    }
}
