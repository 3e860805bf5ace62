//! Selection state and selection resolution.
//!
//! A single `Selection` value replaces the two loosely coupled channels an
//! editor usually keeps (an id for rooms/walls, a snapshot for furniture), so
//! at most one feature is ever selected.

use crate::models::{
    FeatureCollection, FeatureKind, FurnitureFeature, RoomFeature, RoomProperties, WallFeature,
    WallProperties,
};

/// What the panel currently has selected.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection {
    /// Nothing selected
    #[default]
    None,
    /// A room or wall, by id, resolved against rooms then walls
    Feature(String),
    /// A piece of furniture, held as a snapshot.
    ///
    /// The snapshot is refreshed by every furniture edit made through the
    /// panel. Changes made to the furniture collection elsewhere are not
    /// reflected until the furniture is selected again.
    Furniture(FurnitureFeature),
}

impl Selection {
    /// Returns true if nothing is selected.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Id held by the room/wall channel.
    #[must_use]
    pub fn feature_id(&self) -> Option<&str> {
        match self {
            Self::Feature(id) => Some(id),
            _ => None,
        }
    }

    /// Furniture snapshot, if furniture is selected.
    #[must_use]
    pub const fn furniture(&self) -> Option<&FurnitureFeature> {
        match self {
            Self::Furniture(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// Returns true if the selection refers to `id` through either channel.
    #[must_use]
    pub fn references(&self, id: &str) -> bool {
        match self {
            Self::None => false,
            Self::Feature(selected) => selected == id,
            Self::Furniture(snapshot) => snapshot.id == id,
        }
    }
}

/// Feature a room/wall selection id resolves to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedFeature<'a> {
    /// Matched in the rooms collection
    Room(&'a RoomFeature),
    /// Matched in the walls collection
    Wall(&'a WallFeature),
}

impl ResolvedFeature<'_> {
    /// Kind of the resolved feature.
    #[must_use]
    pub const fn kind(&self) -> FeatureKind {
        match self {
            Self::Room(_) => FeatureKind::Room,
            Self::Wall(_) => FeatureKind::Wall,
        }
    }

    /// Id of the resolved feature.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Room(room) => &room.id,
            Self::Wall(wall) => &wall.id,
        }
    }
}

/// Resolves a selection id against rooms first, then walls.
///
/// Rooms win when an id appears in both collections. Furniture is never
/// consulted. Pure lookup, cheap enough to call on every render.
///
/// # Examples
///
/// ```
/// use floorplan_editor::models::{resolve, FeatureCollection};
///
/// let rooms = FeatureCollection::new();
/// let walls = FeatureCollection::new();
/// assert!(resolve("r1", &rooms, &walls).is_none());
/// ```
#[must_use]
pub fn resolve<'a>(
    id: &str,
    rooms: &'a FeatureCollection<RoomProperties>,
    walls: &'a FeatureCollection<WallProperties>,
) -> Option<ResolvedFeature<'a>> {
    rooms
        .get(id)
        .map(ResolvedFeature::Room)
        .or_else(|| walls.get(id).map(ResolvedFeature::Wall))
}
