// Resume screening: text extraction, AI assessment, ranking.
// All model calls go through llm_client via the ResumeScorer trait.

pub mod aggregate;
pub mod assess;
pub mod extract;
pub mod handlers;
pub mod pipeline;
