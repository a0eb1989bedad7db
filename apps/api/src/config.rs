use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Which similarity backend a deployment runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerKind {
    Embedding,
    TfIdf,
}

impl FromStr for ScorerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "embedding" | "embeddings" => Ok(ScorerKind::Embedding),
            "tfidf" | "tf-idf" => Ok(ScorerKind::TfIdf),
            other => bail!("SCORER must be 'embedding' or 'tfidf', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub scorer: ScorerKind,
    pub model_dir: PathBuf,
    pub model_auto_download: bool,
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup so parsing can be tested
    /// without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            port: var("PORT", "8000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG", "info"),
            scorer: var("SCORER", "embedding").parse()?,
            model_dir: PathBuf::from(var("MODEL_DIR", "models/all-MiniLM-L6-v2")),
            model_auto_download: parse_bool(&var("MODEL_AUTO_DOWNLOAD", "true"))
                .context("MODEL_AUTO_DOWNLOAD must be a boolean")?,
            cors_allowed_origins: parse_origins(&var("CORS_ALLOWED_ORIGINS", DEFAULT_CORS_ORIGINS)),
            max_upload_bytes: match lookup("MAX_UPLOAD_BYTES") {
                Some(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
        })
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected true/false, got '{other}'"),
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}
