//! Calendar backend — the single point of entry for all calendar provider calls.
//!
//! `AppState` holds an `Arc<dyn CalendarService>`; the default backend is
//! `google::GoogleCalendarClient`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::auth::AuthError;

pub mod auth;
pub mod google;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("authorization failed: {0}")]
    Auth(#[from] AuthError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid calendar base URL '{0}'")]
    InvalidBaseUrl(String),
}

/// Start or end of an event. Timed events carry `date_time`; all-day events carry `date`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDateTime {
    /// A UTC instant, written as `YYYY-MM-DDTHH:MM:SSZ` with `timeZone: UTC`.
    pub fn utc(at: DateTime<Utc>) -> Self {
        Self {
            date_time: Some(at.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
            date: None,
            time_zone: Some("UTC".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub email: String,
}

/// Body of an event insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEvent {
    pub summary: String,
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub attendees: Vec<Attendee>,
}

/// An event as returned by the provider. Only the fields this service reads.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub start: EventDateTime,
}

/// Time-bounded, text-filtered event listing. Results are ordered by start
/// time with recurring events expanded into single occurrences.
#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    pub time_min: DateTime<Utc>,
    pub max_results: u32,
    pub text: String,
}

#[async_trait]
pub trait CalendarService: Send + Sync {
    async fn insert_event(&self, event: &NewEvent) -> Result<CalendarEvent, CalendarError>;

    async fn list_events(&self, query: &EventQuery) -> Result<Vec<CalendarEvent>, CalendarError>;
}
