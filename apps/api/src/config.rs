use anyhow::{Context, Result};

/// Where users can create a Gemini API key. Surfaced when the key is missing.
pub const API_KEY_HELP_URL: &str = "https://makersuite.google.com/app/apikey";

/// Application configuration loaded from environment variables.
/// Startup fails if `GEMINI_API_KEY` is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub llm_timeout_secs: u64,
    pub llm_max_attempts: u32,
    pub max_upload_bytes: usize,
    pub session_ttl_secs: u64,
    pub session_sweep_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .with_context(|| {
                format!(
                    "Please set GEMINI_API_KEY in the environment or a .env file. \
                     You can get one from {API_KEY_HELP_URL}"
                )
            })?;

        Ok(Config {
            gemini_api_key,
            gemini_model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-pro".to_string()),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            llm_max_attempts: parse_env::<u32>("LLM_MAX_ATTEMPTS", 1)?.max(1),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            session_ttl_secs: parse_env("SESSION_TTL_SECS", 3600)?,
            session_sweep_secs: parse_env("SESSION_SWEEP_SECS", 300)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by router tests; never reads the environment.
    pub fn for_tests() -> Self {
        Config {
            gemini_api_key: "test-key".to_string(),
            gemini_model: "gemini-pro".to_string(),
            llm_timeout_secs: 5,
            llm_max_attempts: 1,
            max_upload_bytes: 1024 * 1024,
            session_ttl_secs: 3600,
            session_sweep_secs: 300,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
