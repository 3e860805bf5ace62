//! Application-wide constants.
//!
//! This module defines constants used throughout the application,
//! including the application name and the remote table names.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "Floorplan Editor";

/// The binary name of the application (used in command examples, lowercase with hyphens).
pub const APP_BINARY_NAME: &str = "floorplan-editor";

/// Directory name used under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "FloorplanEditor";

/// Remote table holding room records (attributes and geometry).
pub const ROOMS_TABLE: &str = "rooms";

/// Remote table shared by wall and furniture records.
pub const FEATURES_TABLE: &str = "features";

/// Color shown for a room that has none stored.
pub const DEFAULT_ROOM_COLOR: &str = "#ff0000";

/// Prompt rendered when nothing is selected.
pub const EMPTY_SELECTION_PROMPT: &str = "Select a layer to edit its properties.";
