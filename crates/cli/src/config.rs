//! Process configuration read from the environment (and `.env`).

use reel_core::application::{RunConfig, DEFAULT_PROFILES_TABLE, DEFAULT_REELS_TABLE};
use reel_core::error::ConfigError;
use reel_core::fetcher::FetchSettings;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const AIRTABLE_TOKEN_VAR: &str = "AIRTABLE_API_KEY";
pub const BASE_ID_VAR: &str = "BASE_ID";
pub const SCRAPECREATORS_KEY_VAR: &str = "SCRAPECREATORS_API_KEY";

#[derive(Clone)]
pub struct AppConfig {
    pub airtable_token: String,
    pub base_id: String,
    pub scrapecreators_api_key: String,
    pub profiles_table: String,
    pub reels_table: String,
    pub scrapecreators_base_url: String,
    pub airtable_api_url: String,
    pub request_delay: Duration,
    pub rate_limit_cooldown: Duration,
    pub reels_amount: u32,
}

// Keeps secrets out of logs
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("airtable_token", &"<redacted>")
            .field("base_id", &self.base_id)
            .field("scrapecreators_api_key", &"<redacted>")
            .field("profiles_table", &self.profiles_table)
            .field("reels_table", &self.reels_table)
            .field("scrapecreators_base_url", &self.scrapecreators_base_url)
            .field("airtable_api_url", &self.airtable_api_url)
            .field("request_delay", &self.request_delay)
            .field("rate_limit_cooldown", &self.rate_limit_cooldown)
            .field("reels_amount", &self.reels_amount)
            .finish()
    }
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = FetchSettings::default();
        Ok(Self {
            airtable_token: required(&lookup, AIRTABLE_TOKEN_VAR)?,
            base_id: required(&lookup, BASE_ID_VAR)?,
            scrapecreators_api_key: required(&lookup, SCRAPECREATORS_KEY_VAR)?,
            profiles_table: optional(&lookup, "PROFILES_TABLE")
                .unwrap_or_else(|| DEFAULT_PROFILES_TABLE.to_string()),
            reels_table: optional(&lookup, "REELS_TABLE")
                .unwrap_or_else(|| DEFAULT_REELS_TABLE.to_string()),
            scrapecreators_base_url: optional(&lookup, "SCRAPECREATORS_BASE_URL")
                .unwrap_or_else(|| http_adapter::DEFAULT_BASE_URL.to_string()),
            airtable_api_url: optional(&lookup, "AIRTABLE_BASE_URL")
                .unwrap_or_else(|| airtable_adapter::DEFAULT_API_URL.to_string()),
            request_delay: Duration::from_secs(parsed(
                &lookup,
                "REQUEST_DELAY_SECS",
                RunConfig::default().request_delay.as_secs(),
            )?),
            rate_limit_cooldown: Duration::from_secs(parsed(
                &lookup,
                "RATE_LIMIT_COOLDOWN_SECS",
                defaults.rate_limit_cooldown.as_secs(),
            )?),
            reels_amount: parsed(&lookup, "REELS_AMOUNT", defaults.reels_amount)?,
        })
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            profiles_table: self.profiles_table.clone(),
            reels_table: self.reels_table.clone(),
            request_delay: self.request_delay,
            ..RunConfig::default()
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            rate_limit_cooldown: self.rate_limit_cooldown,
            reels_amount: self.reels_amount,
            ..FetchSettings::default()
        }
    }
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key).ok_or_else(|| ConfigError::Missing(key.to_string()))
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match optional(lookup, key) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}
