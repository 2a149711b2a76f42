//! UTC time helpers
//!
//! Single source of truth for "now", "today", and "tomorrow". Prediction
//! dates are UTC calendar dates; nothing in the workflow may derive a date
//! from a local timezone.

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Current UTC instant
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Today's UTC calendar date
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Tomorrow's UTC calendar date — the default prediction date
pub fn tomorrow_utc() -> NaiveDate {
    today_utc() + Duration::days(1)
}
