use chrono::{DateTime, NaiveTime, Utc};
use serde::Serialize;

use crate::calendar::{CalendarError, CalendarEvent, CalendarService, EventQuery};
use crate::scheduling::booking::INTERVIEW_SUMMARY_PREFIX;

pub const MAX_LISTED_EVENTS: u32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleEntry {
    pub summary: String,
    /// RFC 3339 timestamp for timed events, `YYYY-MM-DD` for all-day events.
    pub start_time: String,
}

impl From<CalendarEvent> for ScheduleEntry {
    fn from(event: CalendarEvent) -> Self {
        let start_time = event
            .start
            .date_time
            .or(event.start.date)
            .unwrap_or_default();
        Self {
            summary: event.summary,
            start_time,
        }
    }
}

pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::default()).and_utc()
}

/// Interview events from the start of today (UTC), earliest first.
pub async fn list_upcoming_interviews(
    calendar: &dyn CalendarService,
    now: DateTime<Utc>,
) -> Result<Vec<ScheduleEntry>, CalendarError> {
    let query = EventQuery {
        time_min: start_of_day(now),
        max_results: MAX_LISTED_EVENTS,
        text: INTERVIEW_SUMMARY_PREFIX.to_string(),
    };
    let events = calendar.list_events(&query).await?;
    Ok(events.into_iter().map(ScheduleEntry::from).collect())
}
