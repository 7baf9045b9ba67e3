use crate::domain::{TableRecord, UpsertOutcome};
use crate::ports::{TableResult, TableStore};
use serde_json::{Map, Value};
use tracing::debug;

/// Insert-or-update by natural key against a `TableStore`.
///
/// There is no locking: two overlapping runs can both miss the lookup and
/// insert the same key twice.
pub struct Upserter {
    store: Box<dyn TableStore>,
}

impl Upserter {
    pub fn new(store: Box<dyn TableStore>) -> Self {
        Self { store }
    }

    /// Updates the first row whose `key_field` equals `key_value`, or creates
    /// a row when none does. One write per call.
    pub fn upsert(
        &self,
        table: &str,
        key_field: &str,
        key_value: &str,
        fields: Map<String, Value>,
    ) -> TableResult<UpsertOutcome> {
        let existing = self.store.find_by_field(table, key_field, key_value)?;

        match existing.first() {
            Some(row) => {
                debug!(table, key = key_value, row_id = %row.id, "updating row");
                self.store.update(table, &row.id, fields)?;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                debug!(table, key = key_value, "creating row");
                self.store.create(table, fields)?;
                Ok(UpsertOutcome::Created)
            }
        }
    }

    pub fn upsert_record<R: TableRecord>(
        &self,
        table: &str,
        key_field: &str,
        record: &R,
    ) -> TableResult<UpsertOutcome> {
        let fields = record.to_fields()?;
        self.upsert(table, key_field, record.natural_key(), fields)
    }
}
