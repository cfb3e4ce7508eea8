//! In-memory collaborators for handler and pipeline tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::calendar::{CalendarError, CalendarEvent, CalendarService, EventQuery, NewEvent};
use crate::llm_client::LlmError;
use crate::screening::assess::{CandidateAssessment, ResumeScorer};

/// Scores a resume by its first non-blank line, which is taken as the candidate name.
#[derive(Default)]
pub struct FakeScorer {
    scores: HashMap<String, Option<u32>>,
    failing: HashSet<String>,
    requests: Mutex<Vec<(String, String)>>,
}

impl FakeScorer {
    pub fn with(mut self, name: &str, score: Option<u32>) -> Self {
        self.scores.insert(name.to_string(), score);
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<(String, String)> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ResumeScorer for FakeScorer {
    async fn assess(
        &self,
        job_description: &str,
        resume_text: &str,
    ) -> Result<CandidateAssessment, LlmError> {
        self.requests
            .lock()
            .unwrap()
            .push((job_description.to_string(), resume_text.to_string()));

        let name = resume_text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string();
        if self.failing.contains(&name) {
            return Err(LlmError::EmptyContent);
        }
        let score = self.scores.get(&name).copied().flatten();
        Ok(CandidateAssessment {
            summary: format!("{name} looks like a fit."),
            name,
            score,
        })
    }
}

#[derive(Default)]
pub struct FakeCalendar {
    listed: Vec<CalendarEvent>,
    failing_summaries: HashSet<String>,
    inserted: Mutex<Vec<NewEvent>>,
    queries: Mutex<Vec<EventQuery>>,
}

impl FakeCalendar {
    pub fn with_listed(mut self, events: Vec<CalendarEvent>) -> Self {
        self.listed = events;
        self
    }

    pub fn failing_for(mut self, summary: &str) -> Self {
        self.failing_summaries.insert(summary.to_string());
        self
    }

    pub fn inserted(&self) -> Vec<NewEvent> {
        self.inserted.lock().unwrap().clone()
    }

    pub fn last_query(&self) -> Option<EventQuery> {
        self.queries.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CalendarService for FakeCalendar {
    async fn insert_event(&self, event: &NewEvent) -> Result<CalendarEvent, CalendarError> {
        if self.failing_summaries.contains(&event.summary) {
            return Err(CalendarError::Api {
                status: 400,
                message: "Invalid attendee".to_string(),
            });
        }
        self.inserted.lock().unwrap().push(event.clone());
        Ok(CalendarEvent {
            id: Some(format!("evt-{}", self.inserted.lock().unwrap().len())),
            summary: event.summary.clone(),
            start: event.start.clone(),
        })
    }

    async fn list_events(&self, query: &EventQuery) -> Result<Vec<CalendarEvent>, CalendarError> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.listed.clone())
    }
}
