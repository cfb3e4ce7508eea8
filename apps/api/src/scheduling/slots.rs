//! Greedy interview slot allocation.
//!
//! One anchor per request, then fixed 30-minute slots back to back in input
//! order. Existing calendar events are not consulted, and slots may run past
//! the end of the business day.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Timelike, Utc, Weekday};
use serde::Serialize;

pub const SLOT_MINUTES: i64 = 30;
pub const DAY_START_HOUR: i64 = 9;
/// From this UTC hour on, the first slot moves to the next day.
pub const DAY_END_HOUR: u32 = 17;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterviewSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub candidate_name: String,
}

/// First interview start for a request made at `now`.
///
/// 1. today 09:00 UTC
/// 2. +1 day if `now` is 17:00 or later
/// 3. a Saturday or Sunday anchor (after step 2) moves to Monday 09:00
pub fn compute_anchor(now: DateTime<Utc>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::default()).and_utc();
    let mut anchor = midnight + Duration::hours(DAY_START_HOUR);

    if now.hour() >= DAY_END_HOUR {
        anchor += Duration::days(1);
    }

    match anchor.weekday() {
        Weekday::Sat => anchor + Duration::days(2),
        Weekday::Sun => anchor + Duration::days(1),
        _ => anchor,
    }
}

/// One consecutive slot per name, starting at `anchor`.
pub fn allocate_slots<S: AsRef<str>>(names: &[S], anchor: DateTime<Utc>) -> Vec<InterviewSlot> {
    let slot = Duration::minutes(SLOT_MINUTES);
    let mut start = anchor;
    names
        .iter()
        .map(|name| {
            let end = start + slot;
            let allocated = InterviewSlot {
                start,
                end,
                candidate_name: name.as_ref().to_string(),
            };
            start = end;
            allocated
        })
        .collect()
}
