//! Axum route handlers for interview scheduling.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::scheduling::booking::{book_interviews, BookingFailure, Candidate};
use crate::scheduling::listing::{list_upcoming_interviews, ScheduleEntry};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    /// `null` and a missing key are both treated as "no candidates".
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub message: String,
    pub failures: Vec<BookingFailure>,
}

/// POST /api/schedule/
///
/// Books back-to-back 30-minute interviews for the given candidates.
/// Per-candidate calendar failures are reported, not fatal.
pub async fn handle_schedule_interviews(
    State(state): State<AppState>,
    payload: Result<Json<ScheduleRequest>, JsonRejection>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let Json(request) = payload?;
    let candidates = match request.candidates {
        Some(candidates) if !candidates.is_empty() => candidates,
        _ => return Err(AppError::Validation("No candidates provided".to_string())),
    };

    let report = book_interviews(
        state.calendar.as_ref(),
        &candidates,
        Utc::now(),
        &state.config.placeholder_email,
    )
    .await;

    Ok(Json(ScheduleResponse {
        message: format!(
            "Successfully scheduled {} interviews.",
            report.scheduled.len()
        ),
        failures: report.failures,
    }))
}

/// GET /api/schedules/
///
/// Interview events from the start of today, earliest first. Empty list when none.
pub async fn handle_list_schedules(
    State(state): State<AppState>,
) -> Result<Json<Vec<ScheduleEntry>>, AppError> {
    let entries = list_upcoming_interviews(state.calendar.as_ref(), Utc::now()).await?;
    Ok(Json(entries))
}
