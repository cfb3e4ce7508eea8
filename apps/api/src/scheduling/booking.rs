//! Interview booking: allocate slots and write one calendar event per candidate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calendar::{Attendee, CalendarService, EventDateTime, NewEvent};
use crate::scheduling::slots::{allocate_slots, compute_anchor, InterviewSlot};

pub const INTERVIEW_SUMMARY_PREFIX: &str = "Interview with";
pub const INTERVIEW_DESCRIPTION: &str = "Initial screening interview.";

/// Scheduling input. Extra fields from an assessment (score, summary) are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Candidate {
    pub name: String,
    /// Invitee address when the caller has one; otherwise the placeholder is used.
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingFailure {
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingReport {
    pub scheduled: Vec<InterviewSlot>,
    pub failures: Vec<BookingFailure>,
}

pub fn interview_event(slot: &InterviewSlot, attendee_email: &str) -> NewEvent {
    NewEvent {
        summary: format!("{INTERVIEW_SUMMARY_PREFIX} {}", slot.candidate_name),
        description: INTERVIEW_DESCRIPTION.to_string(),
        start: EventDateTime::utc(slot.start),
        end: EventDateTime::utc(slot.end),
        attendees: vec![Attendee {
            email: attendee_email.to_string(),
        }],
    }
}

/// Books one slot per candidate, in order, from the anchor for `now`.
///
/// A failed write is recorded and the remaining candidates are still booked.
/// The failed candidate's slot is left unused.
pub async fn book_interviews(
    calendar: &dyn CalendarService,
    candidates: &[Candidate],
    now: DateTime<Utc>,
    placeholder_email: &str,
) -> BookingReport {
    let anchor = compute_anchor(now);
    let names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
    let slots = allocate_slots(&names, anchor);

    let mut report = BookingReport {
        scheduled: Vec::with_capacity(slots.len()),
        failures: Vec::new(),
    };

    for (candidate, slot) in candidates.iter().zip(slots) {
        let email = candidate
            .email
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or(placeholder_email);
        let event = interview_event(&slot, email);

        match calendar.insert_event(&event).await {
            Ok(_) => {
                info!(candidate = %candidate.name, start = %slot.start, "Interview scheduled");
                report.scheduled.push(slot);
            }
            Err(e) => {
                warn!(candidate = %candidate.name, "Failed to schedule interview: {e}");
                report.failures.push(BookingFailure {
                    name: candidate.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    report
}
