//! Service layer for editing logic.
//!
//! This module contains the coordinators that mutate the floor plan and the
//! collaborators they hand work to (persistence and export).

pub mod deletion;
pub mod export;
pub mod mutations;
pub mod persistence;
pub mod transform;

// Re-export commonly used types
pub use deletion::DeleteCoordinator;
pub use export::{ExportReport, Exporter, GeoJsonExporter};
pub use mutations::MutationCoordinator;
pub use persistence::{
    Dispatch, MemoryRecordStore, PersistenceRequest, PersistenceWorker, RecordStore, RemoteTable,
};
pub use transform::TransformBuffer;
