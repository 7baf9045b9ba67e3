use thiserror::Error;

/// Failures below the HTTP status line: nothing usable came back
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request failed: {0}")]
    Other(String),
}

/// Reasons a scraping API call yields nothing. Never escapes the fetcher.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed JSON body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected response shape: {0}")]
    Shape(String),
}

/// Failures talking to the table service
#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("table service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode table response: {0}")]
    Decode(String),
    #[error("could not encode record fields: {0}")]
    Encode(String),
}

/// Startup configuration problems; always fatal
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(String),
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: String, value: String },
    #[error("could not read roster file {path}: {reason}")]
    Roster { path: String, reason: String },
}
