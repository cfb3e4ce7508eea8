use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::GeminiConfig;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_CALENDAR_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub llm_timeout_secs: u64,
    pub credentials_file: PathBuf,
    pub token_file: PathBuf,
    pub calendar_id: String,
    pub calendar_base_url: String,
    pub placeholder_email: String,
    pub max_resume_bytes: usize,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            google_api_key: require_env("GOOGLE_API_KEY")?,
            gemini_model: env_or("GEMINI_MODEL", "gemini-1.5-flash"),
            gemini_base_url: env_or("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            credentials_file: env_or("GOOGLE_CREDENTIALS_FILE", "credentials.json").into(),
            token_file: env_or("GOOGLE_TOKEN_FILE", "token.json").into(),
            calendar_id: env_or("CALENDAR_ID", "primary"),
            calendar_base_url: env_or("CALENDAR_BASE_URL", DEFAULT_CALENDAR_BASE_URL),
            placeholder_email: env_or(
                "INTERVIEW_PLACEHOLDER_EMAIL",
                "candidate.placeholder@example.com",
            ),
            max_resume_bytes: parse_env("MAX_RESUME_BYTES", 5 * 1024 * 1024)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 50 * 1024 * 1024)?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// Gemini client settings, built once at startup and handed to the scorer.
    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.google_api_key.clone(),
            model: self.gemini_model.clone(),
            base_url: self.gemini_base_url.clone(),
            timeout: Duration::from_secs(self.llm_timeout_secs),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Defaults for handler tests; no environment access.
    pub fn for_tests() -> Self {
        Config {
            google_api_key: "test-key".to_string(),
            gemini_model: "gemini-1.5-flash".to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            llm_timeout_secs: 5,
            credentials_file: "credentials.json".into(),
            token_file: "token.json".into(),
            calendar_id: "primary".to_string(),
            calendar_base_url: DEFAULT_CALENDAR_BASE_URL.to_string(),
            placeholder_email: "candidate.placeholder@example.com".to_string(),
            max_resume_bytes: 5 * 1024 * 1024,
            max_upload_bytes: 50 * 1024 * 1024,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
