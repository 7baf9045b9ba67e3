use crate::domain::{RawResponse, TableRow};
use crate::error::{TableError, TransportError};
use serde_json::{Map, Value};
use std::time::Duration;

pub type TableResult<T> = std::result::Result<T, TableError>;

/// Outbound HTTP GET against the scraping API.
/// Implementations attach credentials and resolve `path` against their base URL.
pub trait HttpTransport {
    fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> std::result::Result<RawResponse, TransportError>;
}

/// Row-level access to one spreadsheet base
pub trait TableStore {
    /// Rows of `table` whose `field` equals `value` exactly
    fn find_by_field(&self, table: &str, field: &str, value: &str) -> TableResult<Vec<TableRow>>;

    fn create(&self, table: &str, fields: Map<String, Value>) -> TableResult<TableRow>;

    fn update(&self, table: &str, row_id: &str, fields: Map<String, Value>)
        -> TableResult<TableRow>;
}

/// Every pause the pipeline takes goes through here
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Blocks the current thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}
