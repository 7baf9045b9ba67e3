use reel_core::domain::TableRow;
use reel_core::error::{TableError, TransportError};
use reel_core::ports::{TableResult, TableStore};
use reel_core::utils::equals_formula;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_API_URL: &str = "https://api.airtable.com/v0";

/// Rows requested per lookup; later pages are never fetched
const PAGE_SIZE: u32 = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    records: Vec<TableRow>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Debug, Serialize)]
struct WriteRequest<'a> {
    fields: &'a Map<String, Value>,
}

/// Airtable REST implementation of the TableStore port for one base
pub struct AirtableStore {
    client: Client,
    api_url: String,
    base_id: String,
    token: String,
}

impl AirtableStore {
    /// Creates a new AirtableStore for `base_id`, authenticating with `token`
    pub fn new(api_url: &str, base_id: &str, token: &str) -> Result<Self, TableError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TableError::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            base_id: base_id.to_string(),
            token: token.to_string(),
        })
    }

    /// URL of a table; table names may contain spaces
    pub fn table_url(&self, table: &str) -> String {
        format!(
            "{}/{}/{}",
            self.api_url,
            self.base_id,
            urlencoding::encode(table)
        )
    }

    pub fn record_url(&self, table: &str, row_id: &str) -> String {
        format!("{}/{}", self.table_url(table), urlencoding::encode(row_id))
    }

    fn send(&self, request: RequestBuilder) -> TableResult<Response> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| TableError::Transport(map_reqwest_error(e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(TableError::Status {
            status: status.as_u16(),
            body,
        })
    }

    fn write(&self, request: RequestBuilder, fields: &Map<String, Value>) -> TableResult<TableRow> {
        let response = self.send(request.json(&WriteRequest { fields }))?;
        let text = response
            .text()
            .map_err(|e| TableError::Transport(map_reqwest_error(e)))?;
        parse_row(&text)
    }
}

impl TableStore for AirtableStore {
    fn find_by_field(&self, table: &str, field: &str, value: &str) -> TableResult<Vec<TableRow>> {
        let formula = equals_formula(field, value);
        debug!(table, formula = %formula, "querying rows");

        let request = self.client.get(self.table_url(table)).query(&[
            ("filterByFormula", formula),
            ("pageSize", PAGE_SIZE.to_string()),
        ]);
        let text = self
            .send(request)?
            .text()
            .map_err(|e| TableError::Transport(map_reqwest_error(e)))?;

        let listing = parse_listing(&text)?;
        if listing.offset.is_some() {
            warn!(table, field, value, "more matches than one page; using the first page only");
        }
        Ok(listing.records)
    }

    fn create(&self, table: &str, fields: Map<String, Value>) -> TableResult<TableRow> {
        self.write(self.client.post(self.table_url(table)), &fields)
    }

    fn update(
        &self,
        table: &str,
        row_id: &str,
        fields: Map<String, Value>,
    ) -> TableResult<TableRow> {
        // PATCH leaves columns we do not send untouched
        self.write(self.client.patch(self.record_url(table, row_id)), &fields)
    }
}

fn parse_listing(text: &str) -> TableResult<ListResponse> {
    serde_json::from_str(text).map_err(|e| TableError::Decode(e.to_string()))
}

fn parse_row(text: &str) -> TableResult<TableRow> {
    serde_json::from_str(text).map_err(|e| TableError::Decode(e.to_string()))
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
