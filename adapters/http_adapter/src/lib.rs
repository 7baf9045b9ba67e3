use reel_core::domain::RawResponse;
use reel_core::error::TransportError;
use reel_core::ports::HttpTransport;
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.scrapecreators.com/v1/instagram";
pub const API_KEY_HEADER: &str = "x-api-key";

/// Blocking HTTP implementation of the HttpTransport port for the
/// ScrapeCreators API
pub struct ScrapeCreatorsTransport {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ScrapeCreatorsTransport {
    /// Creates a new transport; per-request timeouts are supplied by the caller
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("reel-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(map_reqwest_error)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Full URL for an endpoint path such as "/profile"
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl HttpTransport for ScrapeCreatorsTransport {
    fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        let url = self.endpoint(path);
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .timeout(timeout)
            .send()
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response.text().map_err(map_reqwest_error)?;
        Ok(RawResponse { status, body })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}
