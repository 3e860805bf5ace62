//! Line-oriented front end for the properties panel.
//!
//! This module stands in for a graphical editor: it reads one command per
//! line, turns it into a panel interaction and prints what the panel shows.

pub mod command;
pub mod session;

// Re-export types used by main.rs and tests
pub use command::{Command, FieldName, HELP};
pub use session::{Flow, Session};
