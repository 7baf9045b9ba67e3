use crate::error::FetchError;
use crate::extract::{is_truthy, lookup};
use crate::ports::{HttpTransport, Sleeper};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

pub const PROFILE_PATH: &str = "/profile";
pub const REELS_PATH: &str = "/user/reels/simple";

/// Request tuning for the scraping API
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSettings {
    pub profile_timeout: Duration,
    pub reels_timeout: Duration,
    pub rate_limit_cooldown: Duration,
    pub reels_amount: u32,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            profile_timeout: Duration::from_secs(30),
            // reel listings are heavier
            reels_timeout: Duration::from_secs(60),
            rate_limit_cooldown: Duration::from_secs(60),
            reels_amount: 20,
        }
    }
}

/// What an HTTP status means for a scraping API call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    BadRequest,
    Unauthorized,
    QuotaExceeded,
    NotFound,
    RateLimited,
    Unexpected,
}

pub fn classify_status(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Success,
        400 => StatusClass::BadRequest,
        401 => StatusClass::Unauthorized,
        402 => StatusClass::QuotaExceeded,
        404 => StatusClass::NotFound,
        429 => StatusClass::RateLimited,
        _ => StatusClass::Unexpected,
    }
}

/// Rejects 2xx profile bodies that carry an API-level error or no user
pub fn validate_profile(body: Value) -> Result<Value, FetchError> {
    let success = body.get("success").map_or(false, is_truthy);
    if success && body.get("error").map_or(false, is_truthy) {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error");
        return Err(FetchError::Shape(format!("API error: {}", message)));
    }
    if !success || !lookup(&body, &["data", "user"]).map_or(false, is_truthy) {
        return Err(FetchError::Shape("no valid user data".to_string()));
    }
    Ok(body)
}

/// Reels bodies must be a JSON list
pub fn validate_reels(body: Value) -> Result<Vec<Value>, FetchError> {
    match body {
        Value::Array(items) => Ok(items),
        other => Err(FetchError::Shape(format!(
            "expected list, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Client for the two scraping API endpoints. Every failure ends up as
/// `None` with a log line; nothing here returns an error to the caller.
pub struct Fetcher {
    transport: Box<dyn HttpTransport>,
    sleeper: Box<dyn Sleeper>,
    settings: FetchSettings,
}

impl Fetcher {
    pub fn new(
        transport: Box<dyn HttpTransport>,
        sleeper: Box<dyn Sleeper>,
        settings: FetchSettings,
    ) -> Self {
        Self {
            transport,
            sleeper,
            settings,
        }
    }

    pub fn fetch_profile(&self, handle: &str) -> Option<Value> {
        let query = [("handle", handle.to_string())];
        let result = self
            .get_json("profile", handle, PROFILE_PATH, &query, self.settings.profile_timeout)
            .and_then(|body| body.map(validate_profile).transpose());
        settle("profile", handle, result)
    }

    pub fn fetch_reels(&self, handle: &str) -> Option<Vec<Value>> {
        let query = [
            ("handle", handle.to_string()),
            ("amount", self.settings.reels_amount.to_string()),
            ("trim", "false".to_string()),
        ];
        let result = self
            .get_json("reels", handle, REELS_PATH, &query, self.settings.reels_timeout)
            .and_then(|body| body.map(validate_reels).transpose());
        settle("reels", handle, result)
    }

    /// Ok(None) means the API signalled a failure that has already been logged
    fn get_json(
        &self,
        kind: &str,
        handle: &str,
        path: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Option<Value>, FetchError> {
        debug!(kind, handle, path, ?timeout, "requesting");
        let response = self.transport.get(path, query, timeout)?;

        match classify_status(response.status) {
            StatusClass::Success => Ok(Some(serde_json::from_str(&response.body)?)),
            StatusClass::QuotaExceeded => {
                warn!(kind, handle, "payment required, API quota exceeded");
                Ok(None)
            }
            StatusClass::NotFound => {
                warn!(kind, handle, "not found");
                Ok(None)
            }
            StatusClass::RateLimited => {
                warn!(
                    kind,
                    handle,
                    cooldown_secs = self.settings.rate_limit_cooldown.as_secs(),
                    "rate limited, cooling down"
                );
                self.sleeper.sleep(self.settings.rate_limit_cooldown);
                Ok(None)
            }
            StatusClass::BadRequest => {
                warn!(kind, handle, body = %response.body, "bad request");
                Ok(None)
            }
            StatusClass::Unauthorized => {
                warn!(kind, handle, "unauthorized, check API key");
                Ok(None)
            }
            StatusClass::Unexpected => Err(FetchError::Status {
                status: response.status,
                body: response.body,
            }),
        }
    }
}

fn settle<T>(kind: &str, handle: &str, result: Result<Option<T>, FetchError>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(kind, handle, error = %e, "fetch failed");
            None
        }
    }
}
