//! In-memory stand-ins for the ports, shared by the unit tests.

use crate::domain::{RawResponse, TableRow};
use crate::error::{TableError, TransportError};
use crate::ports::{HttpTransport, Sleeper, TableResult, TableStore};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub timeout: Duration,
}

/// Replays scripted responses per path, in order
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    scripts: Rc<RefCell<BTreeMap<String, VecDeque<Result<RawResponse, TransportError>>>>>,
    requests: Rc<RefCell<Vec<RecordedRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, path: &str, status: u16, body: &str) -> &Self {
        self.push(
            path,
            Ok(RawResponse {
                status,
                body: body.to_string(),
            }),
        )
    }

    pub fn fail(&self, path: &str, error: TransportError) -> &Self {
        self.push(path, Err(error))
    }

    fn push(&self, path: &str, answer: Result<RawResponse, TransportError>) -> &Self {
        self.scripts
            .borrow_mut()
            .entry(path.to_string())
            .or_default()
            .push_back(answer);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }
}

impl HttpTransport for ScriptedTransport {
    fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        self.requests.borrow_mut().push(RecordedRequest {
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            timeout,
        });
        self.scripts
            .borrow_mut()
            .get_mut(path)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(TransportError::Other(format!("no script for {}", path))))
    }
}

/// Remembers requested pauses instead of sleeping
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    pauses: Rc<RefCell<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.borrow().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.pauses.borrow_mut().push(duration);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableCall {
    Find { table: String, field: String, value: String },
    Create { table: String },
    Update { table: String, row_id: String },
}

#[derive(Default)]
struct TableState {
    tables: BTreeMap<String, Vec<TableRow>>,
    calls: Vec<TableCall>,
    next_id: usize,
    failing_writes: Vec<String>,
}

/// Table service kept in memory; rows are matched on exact field equality
#[derive(Clone, Default)]
pub struct MemoryTableStore {
    state: Rc<RefCell<TableState>>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, table: &str, id: &str, fields: Value) {
        let fields = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.state
            .borrow_mut()
            .tables
            .entry(table.to_string())
            .or_default()
            .push(TableRow {
                id: id.to_string(),
                fields,
            });
    }

    /// Makes every create/update whose key field holds `key` fail
    pub fn fail_writes_for(&self, key: &str) {
        self.state.borrow_mut().failing_writes.push(key.to_string());
    }

    pub fn rows(&self, table: &str) -> Vec<TableRow> {
        self.state
            .borrow()
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<TableCall> {
        self.state.borrow().calls.clone()
    }

    fn check_write(&self, fields: &Map<String, Value>) -> TableResult<()> {
        let state = self.state.borrow();
        let hit = fields
            .values()
            .filter_map(Value::as_str)
            .any(|v| state.failing_writes.iter().any(|k| k == v));
        if hit {
            return Err(TableError::Status {
                status: 422,
                body: "INVALID_VALUE_FOR_COLUMN".to_string(),
            });
        }
        Ok(())
    }
}

impl TableStore for MemoryTableStore {
    fn find_by_field(&self, table: &str, field: &str, value: &str) -> TableResult<Vec<TableRow>> {
        let mut state = self.state.borrow_mut();
        state.calls.push(TableCall::Find {
            table: table.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        });
        Ok(state
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row.fields.get(field).and_then(Value::as_str) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn create(&self, table: &str, fields: Map<String, Value>) -> TableResult<TableRow> {
        self.check_write(&fields)?;
        let mut state = self.state.borrow_mut();
        state.calls.push(TableCall::Create {
            table: table.to_string(),
        });
        state.next_id += 1;
        let row = TableRow {
            id: format!("rec{:03}", state.next_id),
            fields,
        };
        state
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    fn update(
        &self,
        table: &str,
        row_id: &str,
        fields: Map<String, Value>,
    ) -> TableResult<TableRow> {
        self.check_write(&fields)?;
        let mut state = self.state.borrow_mut();
        state.calls.push(TableCall::Update {
            table: table.to_string(),
            row_id: row_id.to_string(),
        });
        let row = state
            .tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|row| row.id == row_id))
            .ok_or_else(|| TableError::Status {
                status: 404,
                body: format!("no row {}", row_id),
            })?;
        row.fields.extend(fields);
        Ok(row.clone())
    }
}
