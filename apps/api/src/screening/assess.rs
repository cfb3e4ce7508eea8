//! Resume assessment — pluggable, trait-based scorer that rates one resume against a JD.
//!
//! Default: `GeminiResumeScorer`. `AppState` holds an `Arc<dyn ResumeScorer>`.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::llm_client::prompts::resume_assessment_prompt;
use crate::llm_client::{GeminiClient, LlmError};

pub const MIN_SCORE: u32 = 1;
pub const MAX_SCORE: u32 = 100;

/// AI-produced name/score/summary triple for one resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateAssessment {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub score: Option<u32>,
    pub summary: String,
}

impl CandidateAssessment {
    /// Clamps a present score into 1–100.
    pub fn normalized(mut self) -> Self {
        if let Some(score) = self.score {
            let clamped = score.clamp(MIN_SCORE, MAX_SCORE);
            if clamped != score {
                warn!(name = %self.name, score, "Model score out of range, clamping");
            }
            self.score = Some(clamped);
        }
        self
    }

    /// Sort key: an absent score ranks as 0.
    pub fn rank_score(&self) -> u32 {
        self.score.unwrap_or(0)
    }
}

/// Accepts integer, float, or numeric-string scores; anything else is absent.
fn deserialize_score<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let score = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(score.filter(|s| s.is_finite()).map(|s| s.round().max(0.0) as u32))
}

/// The resume scorer trait. Implement this to swap AI backends without
/// touching the handler or pipeline.
#[async_trait]
pub trait ResumeScorer: Send + Sync {
    async fn assess(
        &self,
        job_description: &str,
        resume_text: &str,
    ) -> Result<CandidateAssessment, LlmError>;
}

/// Gemini-backed scorer: one fixed prompt, one call, JSON reply.
pub struct GeminiResumeScorer(pub GeminiClient);

#[async_trait]
impl ResumeScorer for GeminiResumeScorer {
    async fn assess(
        &self,
        job_description: &str,
        resume_text: &str,
    ) -> Result<CandidateAssessment, LlmError> {
        let prompt = resume_assessment_prompt(job_description, resume_text);
        let assessment: CandidateAssessment = self.0.call_json(&prompt).await?;
        Ok(assessment.normalized())
    }
}
