//! Axum route handler for resume screening.

use axum::extract::{Multipart, State};
use axum::Json;

use crate::errors::AppError;
use crate::screening::assess::CandidateAssessment;
use crate::screening::extract::ResumeDocument;
use crate::screening::pipeline::screen_resumes;
use crate::state::AppState;

const JOB_DESCRIPTION_FIELD: &str = "job_description";
const RESUMES_FIELD: &str = "resumes";

/// POST /api/process/
///
/// Multipart form: `job_description` (text) and one or more `resumes` files.
/// Returns assessments sorted by score, highest first.
pub async fn handle_process_resumes(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Vec<CandidateAssessment>>, AppError> {
    let mut job_description: Option<String> = None;
    let mut documents: Vec<ResumeDocument> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(JOB_DESCRIPTION_FIELD) => {
                job_description = Some(field.text().await.map_err(malformed)?);
            }
            Some(RESUMES_FIELD) => {
                // Parts without a filename are not file uploads.
                let Some(filename) = field.file_name().map(str::to_owned) else {
                    continue;
                };
                let data = field.bytes().await.map_err(malformed)?;
                documents.push(ResumeDocument { filename, data });
            }
            _ => {}
        }
    }

    let job_description = job_description.filter(|jd| !jd.trim().is_empty());
    let Some(job_description) = job_description else {
        return Err(missing_fields());
    };
    if documents.is_empty() {
        return Err(missing_fields());
    }

    let ranked = screen_resumes(
        state.scorer.as_ref(),
        &job_description,
        &documents,
        state.config.max_resume_bytes,
    )
    .await;

    Ok(Json(ranked))
}

fn missing_fields() -> AppError {
    AppError::Validation("Job description and resumes are required.".to_string())
}

fn malformed(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Malformed multipart body: {e}"))
}
