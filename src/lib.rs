//! Floor Plan Editor Library
//!
//! This library provides the editing core of a floor plan properties panel:
//! resolving the selected room, wall or piece of furniture, applying edits
//! to the local feature collections, and persisting those edits to a remote
//! record store without waiting on it.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod panel;
pub mod services;
