//! Google Calendar v3 backend.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::calendar::auth::TokenAuthorizer;
use crate::calendar::{CalendarError, CalendarEvent, CalendarService, EventQuery, NewEvent};

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<CalendarEvent>,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    message: String,
}

pub struct GoogleCalendarClient {
    http: Client,
    base_url: String,
    calendar_id: String,
    authorizer: TokenAuthorizer,
}

impl GoogleCalendarClient {
    pub fn new(
        http: Client,
        base_url: String,
        calendar_id: String,
        credentials_file: PathBuf,
        token_file: PathBuf,
    ) -> Self {
        let authorizer = TokenAuthorizer::new(http.clone(), credentials_file, token_file);
        Self {
            http,
            base_url,
            calendar_id,
            authorizer,
        }
    }

    /// `{base}/calendars/{calendar_id}/events`, with the id percent-encoded.
    fn events_url(&self) -> Result<Url, CalendarError> {
        let invalid = || CalendarError::InvalidBaseUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events"]);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, CalendarError> {
        let access_token = self.authorizer.access_token().await?;
        let response = request.bearer_auth(access_token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GoogleError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(CalendarError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl CalendarService for GoogleCalendarClient {
    async fn insert_event(&self, event: &NewEvent) -> Result<CalendarEvent, CalendarError> {
        let url = self.events_url()?;
        let response = self.send(self.http.post(url).json(event)).await?;
        let created: CalendarEvent = response.json().await?;
        debug!(event_id = ?created.id, summary = %created.summary, "Calendar event created");
        Ok(created)
    }

    async fn list_events(&self, query: &EventQuery) -> Result<Vec<CalendarEvent>, CalendarError> {
        let url = self.events_url()?;
        let time_min = query.time_min.to_rfc3339_opts(SecondsFormat::Secs, true);
        let max_results = query.max_results.to_string();
        let request = self.http.get(url).query(&[
            ("timeMin", time_min.as_str()),
            ("maxResults", max_results.as_str()),
            ("singleEvents", "true"),
            ("orderBy", "startTime"),
            ("q", query.text.as_str()),
        ]);
        let list: EventList = self.send(request).await?.json().await?;
        debug!(count = list.items.len(), "Calendar events listed");
        Ok(list.items)
    }
}
