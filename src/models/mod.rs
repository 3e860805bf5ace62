//! Data models for floor plan features, selection and edits.
//!
//! This module contains the core data structures used throughout the application.
//! Models are independent of persistence and of any user interface.

pub mod color;
pub mod feature;
pub mod floor_plan;
pub mod geometry;
pub mod patch;
pub mod selection;

// Re-export all model types
pub use color::RoomColor;
pub use feature::{
    Feature, FeatureCollection, FeatureKind, FeatureProperties, FurnitureFeature,
    FurnitureProperties, RoomFeature, RoomProperties, WallFeature, WallProperties,
};
pub use floor_plan::FloorPlan;
pub use geometry::Geometry;
pub use patch::{AttributePatch, FurniturePatch, RoomField, RoomPatch};
pub use selection::{resolve, ResolvedFeature, Selection};
