//! Resume screening pipeline: extract → assess → rank.
//!
//! Documents are processed one at a time. A failure on one document is
//! logged and skipped; it never fails the batch.

use tracing::{debug, info, warn};

use crate::screening::aggregate::rank_assessments;
use crate::screening::assess::{CandidateAssessment, ResumeScorer};
use crate::screening::extract::{extract_text, ResumeDocument};

pub async fn screen_resumes(
    scorer: &dyn ResumeScorer,
    job_description: &str,
    documents: &[ResumeDocument],
    max_resume_bytes: usize,
) -> Vec<CandidateAssessment> {
    let mut assessments = Vec::with_capacity(documents.len());

    for doc in documents {
        if doc.data.len() > max_resume_bytes {
            warn!(
                file = %doc.filename,
                size = doc.data.len(),
                limit = max_resume_bytes,
                "Resume exceeds size limit, skipping"
            );
            continue;
        }

        let text = match extract_text(doc).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!(file = %doc.filename, "Unsupported resume format, skipping");
                continue;
            }
            Err(e) => {
                warn!(file = %doc.filename, "Error extracting resume: {e}");
                continue;
            }
        };

        if text.trim().is_empty() {
            debug!(file = %doc.filename, "Resume has no extractable text, skipping");
            continue;
        }

        match scorer.assess(job_description, &text).await {
            Ok(assessment) => assessments.push(assessment),
            Err(e) => warn!(file = %doc.filename, "Error scoring resume: {e}"),
        }
    }

    info!(
        received = documents.len(),
        scored = assessments.len(),
        "Resume screening complete"
    );

    rank_assessments(assessments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeScorer;
    use bytes::Bytes;

    fn txt(filename: &str, body: &str) -> ResumeDocument {
        ResumeDocument {
            filename: filename.to_string(),
            data: Bytes::from(body.to_string()),
        }
    }

    #[tokio::test]
    async fn test_results_ranked_and_failures_skipped() {
        let scorer = FakeScorer::default()
            .with("Alice", Some(60))
            .with("Bob", Some(95))
            .failing("Mallory");

        let docs = vec![
            txt("alice.txt", "Alice\nPython"),
            txt("bob.txt", "Bob\nRust"),
            txt("mallory.txt", "Mallory\nGo"),
            txt("sheet.csv", "Carol,90"),
            txt("blank.txt", "   \n"),
        ];

        let ranked = screen_resumes(&scorer, "Rust developer", &docs, 1024).await;
        let names: Vec<_> = ranked.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Alice"]);
        assert_eq!(scorer.calls(), 3);
    }

    #[tokio::test]
    async fn test_pdf_upload_is_scored() {
        let scorer = FakeScorer::default().with("Alice", Some(81));
        let docs = vec![ResumeDocument {
            filename: "alice.pdf".to_string(),
            data: Bytes::from_static(include_bytes!("testdata/two_page_resume.pdf")),
        }];

        let ranked = screen_resumes(&scorer, "Rust developer", &docs, 64 * 1024).await;
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].name, "Alice");
        assert_eq!(ranked[0].score, Some(81));

        let (_, resume_text) = scorer.last_request().unwrap();
        assert!(resume_text.contains("Rustacean"));
    }

    #[tokio::test]
    async fn test_oversized_resume_skipped() {
        let scorer = FakeScorer::default().with("Alice", Some(60));
        let docs = vec![txt("alice.txt", "Alice has a very long resume")];
        let ranked = screen_resumes(&scorer, "JD", &docs, 4).await;
        assert!(ranked.is_empty());
        assert_eq!(scorer.calls(), 0);
    }

    #[tokio::test]
    async fn test_scorer_receives_job_description_and_text() {
        let scorer = FakeScorer::default().with("Alice", Some(60));
        let docs = vec![txt("alice.txt", "Alice\nPython")];
        screen_resumes(&scorer, "Data engineer", &docs, 1024).await;
        assert_eq!(
            scorer.last_request(),
            Some(("Data engineer".to_string(), "Alice\nPython".to_string()))
        );
    }
}
