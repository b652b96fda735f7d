use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::assessment::sampler::SampleRange;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub question_bank_path: Option<PathBuf>,
    pub recommendations_url: Option<String>,
    pub recommendations_timeout: Duration,
    pub sample_range: SampleRange,
    pub session_ttl: Duration,
    pub webhook_secret: Option<String>,
    /// Empty means permissive CORS.
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let sample_min: usize = parse_or(&get, "SAMPLE_MIN", 10)?;
        let sample_max: usize = parse_or(&get, "SAMPLE_MAX", 20)?;
        let Some(sample_range) = SampleRange::new(sample_min, sample_max) else {
            bail!("SAMPLE_MIN ({sample_min}) must be >= 1 and <= SAMPLE_MAX ({sample_max})");
        };

        let cors_origins = get("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty() && o != "*")
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            database_url: get("DATABASE_URL")
                .context("Required environment variable 'DATABASE_URL' is not set")?,
            redis_url: get("REDIS_URL"),
            port: parse_or(&get, "PORT", 8080)?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            question_bank_path: get("QUESTION_BANK_PATH").map(PathBuf::from),
            recommendations_url: get("RECOMMENDATIONS_URL"),
            recommendations_timeout: Duration::from_secs(parse_or(
                &get,
                "RECOMMENDATIONS_TIMEOUT_SECS",
                5,
            )?),
            sample_range,
            session_ttl: Duration::from_secs(parse_or(&get, "SESSION_TTL_SECS", 3600)?),
            webhook_secret: get("WEBHOOK_SECRET"),
            cors_origins,
        })
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
