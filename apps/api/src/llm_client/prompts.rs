// Prompt templates for LLM calls.
// Placeholders in `{braces}` are filled with `str::replace` by the caller.

/// Resume assessment prompt. Fills `{job_description}` and `{resume_text}`.
pub const RESUME_ASSESSMENT_PROMPT: &str = r#"You are an expert HR analyst. Based on the following job description and resume, perform these actions:
1. Score the candidate's suitability for the role on a scale of 1 to 100.
2. Provide a 3-sentence summary highlighting the candidate's key skills and experience relevant to this job.
3. Extract the candidate's name.

Return this information in a strict JSON format with keys: "name", "score", and "summary". Do not include any other text or markdown formatting like ```json.

---
Job Description:
{job_description}
---
Resume Text:
{resume_text}
---
"#;

pub fn resume_assessment_prompt(job_description: &str, resume_text: &str) -> String {
    RESUME_ASSESSMENT_PROMPT
        .replace("{job_description}", job_description)
        .replace("{resume_text}", resume_text)
}
