pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::scheduling::handlers::{handle_list_schedules, handle_schedule_interviews};
use crate::screening::handlers::handle_process_resumes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Resume screening
        .route("/api/process/", post(handle_process_resumes))
        // Interview scheduling
        .route("/api/schedule/", post(handle_schedule_interviews))
        .route("/api/schedules/", get(handle_list_schedules))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
