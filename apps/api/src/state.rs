use std::sync::Arc;

use crate::calendar::CalendarService;
use crate::config::Config;
use crate::screening::assess::ResumeScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Scores one resume against a job description. Default: Gemini.
    pub scorer: Arc<dyn ResumeScorer>,
    /// Calendar backend used for booking and listing interviews. Default: Google Calendar.
    pub calendar: Arc<dyn CalendarService>,
}
