//! Persistence collaborator boundary.
//!
//! Local edits are applied first; the matching remote write is then handed to
//! a [`Dispatch`] implementation and forgotten. The default dispatcher is a
//! background [`PersistenceWorker`] that feeds requests to a [`RecordStore`].
//!
//! ## Design
//!
//! - Requests are fire-and-forget: callers never wait on or hear back from them
//! - One worker thread drains requests in submission order
//! - Remote failures are logged and recorded in the worker history; local state
//!   is never rolled back
//! - Stores are injected, so tests can substitute [`MemoryRecordStore`]

pub mod memory;
#[cfg(feature = "rest")]
pub mod rest;
pub mod worker;

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::config::{StoreBackend, StoreConfig};
use crate::constants::{FEATURES_TABLE, ROOMS_TABLE};
use crate::error::PersistenceError;
use crate::models::FeatureKind;

pub use memory::MemoryRecordStore;
#[cfg(feature = "rest")]
pub use rest::RestRecordStore;
pub use worker::{DispatchRecord, DispatchStatus, PersistenceWorker, DEFAULT_HISTORY_LIMIT};

/// Remote table a feature kind is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteTable {
    /// Room records
    Rooms,
    /// Wall and furniture records
    Features,
}

impl RemoteTable {
    /// Table holding features of `kind`.
    #[must_use]
    pub const fn for_kind(kind: FeatureKind) -> Self {
        match kind {
            FeatureKind::Room => Self::Rooms,
            FeatureKind::Wall | FeatureKind::Furniture => Self::Features,
        }
    }

    /// Remote table name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rooms => ROOMS_TABLE,
            Self::Features => FEATURES_TABLE,
        }
    }
}

impl fmt::Display for RemoteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A remote write issued after a local edit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum PersistenceRequest {
    /// Update the given columns of a record
    Update {
        /// Target table
        table: RemoteTable,
        /// Record id
        id: String,
        /// Column values to write
        columns: Map<String, Value>,
    },
    /// Delete a record
    Delete {
        /// Target table
        table: RemoteTable,
        /// Record id
        id: String,
    },
}

impl PersistenceRequest {
    /// Update request.
    pub fn update(table: RemoteTable, id: impl Into<String>, columns: Map<String, Value>) -> Self {
        Self::Update {
            table,
            id: id.into(),
            columns,
        }
    }

    /// Delete request.
    pub fn delete(table: RemoteTable, id: impl Into<String>) -> Self {
        Self::Delete {
            table,
            id: id.into(),
        }
    }

    /// Target table.
    #[must_use]
    pub const fn table(&self) -> RemoteTable {
        match self {
            Self::Update { table, .. } | Self::Delete { table, .. } => *table,
        }
    }

    /// Target record id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Update { id, .. } | Self::Delete { id, .. } => id,
        }
    }

    /// Sends this request to a store.
    ///
    /// # Errors
    ///
    /// Returns whatever error the store reports.
    pub fn execute(&self, store: &dyn RecordStore) -> Result<(), PersistenceError> {
        match self {
            Self::Update { table, id, columns } => store.update(*table, id, columns),
            Self::Delete { table, id } => store.delete(*table, id),
        }
    }
}

impl fmt::Display for PersistenceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update { table, id, columns } => {
                let names: Vec<&str> = columns.keys().map(String::as_str).collect();
                write!(f, "update {table}/{id} [{}]", names.join(", "))
            }
            Self::Delete { table, id } => write!(f, "delete {table}/{id}"),
        }
    }
}

/// Keyed record store the editor persists to.
pub trait RecordStore: Send + Sync {
    /// Writes `columns` onto the record `id` in `table`.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the store rejects or cannot perform the write.
    fn update(
        &self,
        table: RemoteTable,
        id: &str,
        columns: &Map<String, Value>,
    ) -> Result<(), PersistenceError>;

    /// Deletes the record `id` from `table`.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the store rejects or cannot perform the delete.
    fn delete(&self, table: RemoteTable, id: &str) -> Result<(), PersistenceError>;
}

/// Fire-and-forget sink for remote writes.
///
/// Implementations must return immediately and must not report the outcome
/// back to the caller.
pub trait Dispatch: Send + Sync {
    /// Queues a request.
    fn dispatch(&self, request: PersistenceRequest);
}

/// Builds the record store selected in the configuration.
///
/// # Errors
///
/// Returns an error if the REST backend is selected without a URL, or if the
/// crate was built without REST support.
pub fn build_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryRecordStore::new())),
        #[cfg(feature = "rest")]
        StoreBackend::Rest => {
            let store = RestRecordStore::from_config(config)?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "rest"))]
        StoreBackend::Rest => {
            anyhow::bail!("REST store requested but this build has no REST support")
        }
    }
}
