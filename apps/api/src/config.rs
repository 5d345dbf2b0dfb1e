use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if a required variable is missing or a numeric one is malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: String,
    pub llm_api_url: String,
    pub llm_model: String,
    pub llm_timeout: Duration,
    pub stt_api_url: String,
    pub stt_api_key: String,
    pub stt_model: String,
    pub ffmpeg_path: String,
    pub tts_command: String,
    pub tts_voice: Option<String>,
    /// Scratch directory for uploaded and converted recordings.
    pub work_dir: PathBuf,
    /// Directory holding synthesized replies served by `/api/v1/audio/:id`.
    pub audio_dir: PathBuf,
    pub public_base_url: String,
    pub temp_max_age: Duration,
    pub janitor_interval: Duration,
    pub session_idle: Duration,
    /// Number of log messages resent to the model on each turn.
    pub history_window: usize,
    pub linkedin_li_at: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_api_key = require_env("LLM_API_KEY")?;

        Ok(Config {
            stt_api_key: optional_env("STT_API_KEY").unwrap_or_else(|| llm_api_key.clone()),
            llm_api_key,
            llm_api_url: env_or("LLM_API_URL", "https://api.mistral.ai/v1/chat/completions"),
            llm_model: env_or("LLM_MODEL", "mistral-large-latest"),
            llm_timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 120)?),
            stt_api_url: env_or(
                "STT_API_URL",
                "https://api.openai.com/v1/audio/transcriptions",
            ),
            stt_model: env_or("STT_MODEL", "whisper-1"),
            ffmpeg_path: env_or("FFMPEG_PATH", "ffmpeg"),
            tts_command: env_or("TTS_COMMAND", "edge-tts"),
            tts_voice: optional_env("TTS_VOICE"),
            work_dir: PathBuf::from(env_or("WORK_DIR", ".")),
            audio_dir: PathBuf::from(env_or("AUDIO_DIR", "static")),
            public_base_url: env_or("PUBLIC_BASE_URL", "http://localhost:8000")
                .trim_end_matches('/')
                .to_string(),
            temp_max_age: Duration::from_secs(parse_env("TEMP_MAX_AGE_SECS", 600)?),
            janitor_interval: Duration::from_secs(parse_env("JANITOR_INTERVAL_SECS", 60)?),
            session_idle: Duration::from_secs(parse_env("SESSION_IDLE_SECS", 3600)?),
            history_window: parse_env("HISTORY_WINDOW", 20)?,
            linkedin_li_at: optional_env("LINKEDIN_LI_AT"),
            port: parse_env("PORT", 8000)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

#[cfg(test)]
impl Config {
    /// Defaults rooted at `root`, with no real credentials.
    pub fn for_tests(root: &std::path::Path) -> Self {
        Config {
            llm_api_key: "test-key".to_string(),
            llm_api_url: "http://127.0.0.1:9/chat".to_string(),
            llm_model: "test-model".to_string(),
            llm_timeout: Duration::from_secs(1),
            stt_api_url: "http://127.0.0.1:9/stt".to_string(),
            stt_api_key: "test-key".to_string(),
            stt_model: "whisper-1".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            tts_command: "edge-tts".to_string(),
            tts_voice: None,
            work_dir: root.join("work"),
            audio_dir: root.join("static"),
            public_base_url: "http://localhost:8000".to_string(),
            temp_max_age: Duration::from_secs(600),
            janitor_interval: Duration::from_secs(60),
            session_idle: Duration::from_secs(3600),
            history_window: 20,
            linkedin_li_at: None,
            port: 8000,
            rust_log: "info".to_string(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
