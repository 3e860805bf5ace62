//! Background persistence worker.
//!
//! Requests are sent over an mpsc channel to a single worker thread that
//! executes them against the injected [`RecordStore`] in submission order.
//! Every request gets a uuid and a [`DispatchRecord`] tracking its outcome:
//!
//! `pending -> succeeded | failed`
//!
//! There is no timeout, retry or cancellation. A request the store never
//! answers stays pending. Failures are logged and kept in the history; the
//! edit that caused the request is not undone.
//!
//! ## History Cleanup Policy
//!
//! Every keystroke can dispatch a request, so the history is bounded:
//! - At most `history_limit` completed records are kept (default 50)
//! - When the limit is exceeded, the oldest completed records are removed first
//! - Pending records are never removed
//!
//! The worker thread logs through the `tracing` dispatcher that was current
//! when the worker was created.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{mpsc, Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, trace, warn};
use uuid::Uuid;

use crate::services::persistence::{Dispatch, PersistenceRequest, RecordStore};

/// Completed records kept in the history unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Remote outcome of a dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    /// Queued or in flight.
    Pending,
    /// Store accepted the write.
    Succeeded,
    /// Store reported an error.
    Failed,
}

impl fmt::Display for DispatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// History entry for one dispatched request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchRecord {
    /// Unique request identifier.
    pub id: String,
    /// Submission order, starting at 0.
    pub sequence: u64,
    /// The request itself.
    pub request: PersistenceRequest,
    /// Current status.
    pub status: DispatchStatus,
    /// Error message if the store rejected the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Time the request was queued (RFC 3339).
    pub queued_at: String,
    /// Time the store answered (RFC 3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl DispatchRecord {
    fn new(sequence: u64, request: PersistenceRequest) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sequence,
            request,
            status: DispatchStatus::Pending,
            error: None,
            queued_at: chrono::Utc::now().to_rfc3339(),
            completed_at: None,
        }
    }
}

/// Request handed to the worker thread.
struct QueuedRequest {
    record_id: String,
    request: PersistenceRequest,
}

/// Shared history of dispatched requests.
struct History {
    records: HashMap<String, DispatchRecord>,
    next_sequence: u64,
    limit: usize,
}

impl History {
    fn new(limit: usize) -> Self {
        Self {
            records: HashMap::new(),
            next_sequence: 0,
            limit: limit.max(1),
        }
    }

    /// Marks a record as answered and drops the oldest completed records
    /// beyond the limit.
    fn complete(&mut self, record_id: &str, error: Option<String>) {
        if let Some(record) = self.records.get_mut(record_id) {
            record.completed_at = Some(chrono::Utc::now().to_rfc3339());
            record.status = if error.is_some() {
                DispatchStatus::Failed
            } else {
                DispatchStatus::Succeeded
            };
            record.error = error;
        }
        self.cleanup();
    }

    fn cleanup(&mut self) {
        let mut completed: Vec<(u64, String)> = self
            .records
            .values()
            .filter(|record| record.status != DispatchStatus::Pending)
            .map(|record| (record.sequence, record.id.clone()))
            .collect();
        if completed.len() <= self.limit {
            return;
        }

        completed.sort_unstable();
        let excess = completed.len() - self.limit;
        for (_, id) in completed.into_iter().take(excess) {
            self.records.remove(&id);
        }
        trace!(removed = excess, "Pruned dispatch history");
    }
}

/// Out-of-band executor for remote writes.
pub struct PersistenceWorker {
    /// Record store requests are executed against.
    store: Arc<dyn RecordStore>,
    /// Retained dispatch records indexed by id.
    history: Arc<RwLock<History>>,
    /// Channel sender for queued requests; `None` after shutdown.
    command_tx: Mutex<Option<mpsc::Sender<QueuedRequest>>>,
    /// Worker thread handle; `None` after shutdown.
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PersistenceWorker {
    /// Creates a worker with the default history limit and starts its thread.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_history_limit(store, DEFAULT_HISTORY_LIMIT)
    }

    /// Creates a worker keeping at most `limit` completed records (minimum 1).
    #[must_use]
    pub fn with_history_limit(store: Arc<dyn RecordStore>, limit: usize) -> Self {
        let worker = Self {
            store,
            history: Arc::new(RwLock::new(History::new(limit))),
            command_tx: Mutex::new(None),
            handle: Mutex::new(None),
        };
        worker.start();
        worker
    }

    /// Starts the background worker thread.
    fn start(&self) {
        let (tx, rx) = mpsc::channel::<QueuedRequest>();
        *self.command_tx.lock().unwrap_or_else(PoisonError::into_inner) = Some(tx);

        let store = Arc::clone(&self.store);
        let history = Arc::clone(&self.history);
        let dispatcher = tracing::dispatcher::get_default(tracing::Dispatch::clone);

        let handle = thread::spawn(move || {
            tracing::dispatcher::with_default(&dispatcher, || {
                for queued in rx {
                    Self::process(store.as_ref(), &history, queued);
                }
            });
        });
        *self.handle.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// Executes one request and records its outcome.
    fn process(store: &dyn RecordStore, history: &RwLock<History>, queued: QueuedRequest) {
        let result = queued.request.execute(store);

        match &result {
            Ok(()) => debug!(request = %queued.request, "Remote write succeeded"),
            Err(err) => error!(
                table = %err.table,
                id = %err.id,
                operation = %err.operation,
                "{err}"
            ),
        }

        history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .complete(&queued.record_id, result.err().map(|err| err.to_string()));
    }

    /// Dispatched requests still in the history, in submission order.
    #[must_use]
    pub fn history(&self) -> Vec<DispatchRecord> {
        let history = self.history.read().unwrap_or_else(PoisonError::into_inner);
        let mut records: Vec<DispatchRecord> = history.records.values().cloned().collect();
        records.sort_by_key(|record| record.sequence);
        records
    }

    /// Requests the store rejected, in submission order.
    #[must_use]
    pub fn failed(&self) -> Vec<DispatchRecord> {
        self.history()
            .into_iter()
            .filter(|record| record.status == DispatchStatus::Failed)
            .collect()
    }

    /// Number of requests not yet answered by the store.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .values()
            .filter(|record| record.status == DispatchStatus::Pending)
            .count()
    }

    /// Stops accepting requests, drains the queue and joins the worker thread.
    ///
    /// Safe to call more than once.
    pub fn shutdown(&self) {
        let sender = self
            .command_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(sender);

        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("Persistence worker thread panicked");
            }
        }
    }
}

impl Dispatch for PersistenceWorker {
    fn dispatch(&self, request: PersistenceRequest) {
        let record_id = {
            let mut history = self.history.write().unwrap_or_else(PoisonError::into_inner);
            let sequence = history.next_sequence;
            history.next_sequence += 1;
            let record = DispatchRecord::new(sequence, request.clone());
            let record_id = record.id.clone();
            history.records.insert(record_id.clone(), record);
            record_id
        };

        trace!(request = %request, id = %record_id, "Queueing remote write");

        let tx = self.command_tx.lock().unwrap_or_else(PoisonError::into_inner);
        let sent = match tx.as_ref() {
            Some(sender) => sender
                .send(QueuedRequest {
                    record_id: record_id.clone(),
                    request,
                })
                .is_ok(),
            None => false,
        };
        drop(tx);

        if !sent {
            warn!(id = %record_id, "Persistence worker is stopped; request dropped");
            self.history
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .complete(&record_id, Some("persistence worker stopped".to_string()));
        }
    }
}

impl Drop for PersistenceWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
