use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub slack_bot_token: String,
    pub slack_signing_secret: String,
    pub linear_webhook_secret: Option<String>,
    pub anthropic_api_key: String,
    pub anthropic_model: String,
    /// IANA name used for the schedule command's start date and slots
    pub schedule_timezone: String,
    pub event_cache_capacity: u64,
    pub event_cache_ttl: Duration,
    pub draft_cache_capacity: u64,
    pub draft_cache_ttl: Duration,
    pub external_call_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: parse_or("PORT", 3000)?,
            slack_bot_token: env::var("SLACK_BOT_TOKEN").context("SLACK_BOT_TOKEN must be set")?,
            slack_signing_secret: env::var("SLACK_SIGNING_SECRET")
                .context("SLACK_SIGNING_SECRET must be set")?,
            linear_webhook_secret: env::var("LINEAR_WEBHOOK_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            anthropic_api_key: env::var("ANTHROPIC_API_KEY")
                .context("ANTHROPIC_API_KEY must be set")?,
            anthropic_model: env::var("ANTHROPIC_MODEL")
                .unwrap_or_else(|_| DEFAULT_ANTHROPIC_MODEL.to_string()),
            schedule_timezone: env::var("SCHEDULE_TIMEZONE").unwrap_or_else(|_| "UTC".to_string()),
            event_cache_capacity: parse_or("EVENT_CACHE_CAPACITY", 10_000)?,
            event_cache_ttl: Duration::from_secs(parse_or("EVENT_CACHE_TTL_SECS", 86_400)?),
            draft_cache_capacity: parse_or("DRAFT_CACHE_CAPACITY", 5_000)?,
            draft_cache_ttl: Duration::from_secs(parse_or("DRAFT_CACHE_TTL_SECS", 604_800)?),
            external_call_timeout: Duration::from_secs(parse_or(
                "EXTERNAL_CALL_TIMEOUT_SECS",
                10,
            )?),
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}
