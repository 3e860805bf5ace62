//! In-process record store.
//!
//! Keeps rows per table and records every call it receives, in order. Used by
//! tests as a substitute for the remote store and by the CLI when no remote
//! store is configured.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use crate::error::{PersistenceError, PersistenceOperation};
use crate::services::persistence::{PersistenceRequest, RecordStore, RemoteTable};

type Rows = HashMap<String, Map<String, Value>>;

/// Record store backed by in-memory maps.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    /// Rows indexed by table, then id.
    tables: RwLock<HashMap<RemoteTable, Rows>>,
    /// Every call received, failed ones included.
    calls: Mutex<Vec<PersistenceRequest>>,
    /// When set, every call fails.
    failing: AtomicBool,
}

impl MemoryRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that fails every call.
    #[must_use]
    pub fn failing() -> Self {
        let store = Self::new();
        store.set_failing(true);
        store
    }

    /// Switches failure mode on or off.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Inserts a row directly, bypassing call recording.
    pub fn seed(&self, table: RemoteTable, id: impl Into<String>, columns: Map<String, Value>) {
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(table)
            .or_default()
            .insert(id.into(), columns);
    }

    /// Current row for `id` in `table`.
    #[must_use]
    pub fn row(&self, table: RemoteTable, id: &str) -> Option<Map<String, Value>> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&table)
            .and_then(|rows| rows.get(id))
            .cloned()
    }

    /// Calls received so far, in arrival order.
    #[must_use]
    pub fn calls(&self) -> Vec<PersistenceRequest> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, request: PersistenceRequest) -> Result<(), PersistenceError> {
        let operation = match request {
            PersistenceRequest::Update { .. } => PersistenceOperation::Update,
            PersistenceRequest::Delete { .. } => PersistenceOperation::Delete,
        };
        let (table, id) = (request.table(), request.id().to_string());
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistenceError::new(
                table.name(),
                id,
                operation,
                "record store unavailable",
            ));
        }
        Ok(())
    }
}

impl RecordStore for MemoryRecordStore {
    fn update(
        &self,
        table: RemoteTable,
        id: &str,
        columns: &Map<String, Value>,
    ) -> Result<(), PersistenceError> {
        self.record(PersistenceRequest::update(table, id, columns.clone()))?;

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let row = tables
            .entry(table)
            .or_default()
            .entry(id.to_string())
            .or_default();
        for (column, value) in columns {
            row.insert(column.clone(), value.clone());
        }
        Ok(())
    }

    fn delete(&self, table: RemoteTable, id: &str) -> Result<(), PersistenceError> {
        self.record(PersistenceRequest::delete(table, id))?;

        if let Some(rows) = self
            .tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&table)
        {
            rows.remove(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn columns(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_update_merges_columns() {
        let store = MemoryRecordStore::new();
        store.seed(RemoteTable::Rooms, "r1", columns(json!({"name": "Lab", "number": "1"})));

        store
            .update(RemoteTable::Rooms, "r1", &columns(json!({"number": "12/3"})))
            .unwrap();

        let row = store.row(RemoteTable::Rooms, "r1").unwrap();
        assert_eq!(row["name"], json!("Lab"));
        assert_eq!(row["number"], json!("12/3"));
        assert_eq!(store.calls().len(), 1);
    }

    #[test]
    fn test_delete_removes_row() {
        let store = MemoryRecordStore::new();
        store.seed(RemoteTable::Features, "w1", Map::new());
        store.delete(RemoteTable::Features, "w1").unwrap();
        assert!(store.row(RemoteTable::Features, "w1").is_none());
        assert_eq!(
            store.calls(),
            vec![PersistenceRequest::delete(RemoteTable::Features, "w1")]
        );
    }

    #[test]
    fn test_failing_store_records_but_does_not_apply() {
        let store = MemoryRecordStore::failing();
        store.seed(RemoteTable::Rooms, "r1", Map::new());

        let err = store.delete(RemoteTable::Rooms, "r1").unwrap_err();
        assert_eq!(err.operation, PersistenceOperation::Delete);
        assert_eq!(err.table, "rooms");
        assert!(store.row(RemoteTable::Rooms, "r1").is_some());
        assert_eq!(store.calls().len(), 1);

        store.set_failing(false);
        assert!(store.delete(RemoteTable::Rooms, "r1").is_ok());
    }
}
