//! Feature and feature collection data structures.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::models::{Geometry, RoomColor};

/// Kind of spatial feature, one per collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Room polygon with bookable attributes
    Room,
    /// Wall segment
    Wall,
    /// Piece of furniture
    Furniture,
}

impl FeatureKind {
    /// All kinds, in collection order.
    pub const ALL: [Self; 3] = [Self::Room, Self::Wall, Self::Furniture];

    /// Plural name used for file names and listings.
    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Room => "rooms",
            Self::Wall => "walls",
            Self::Furniture => "furniture",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Room => write!(f, "room"),
            Self::Wall => write!(f, "wall"),
            Self::Furniture => write!(f, "furniture"),
        }
    }
}

/// Properties bag of a particular feature kind.
pub trait FeatureProperties:
    fmt::Debug + Clone + PartialEq + Default + Serialize + for<'de> Deserialize<'de>
{
    /// Kind of feature these properties belong to.
    const KIND: FeatureKind;
}

/// Editable attributes of a room.
///
/// Every attribute is optional in stored data; the panel shows defaults for
/// missing values without writing them back.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoomProperties {
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Room number, digits and `/` only (e.g. "12/3")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Fill color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<RoomColor>,
    /// Whether the room can be booked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookable: Option<bool>,
    /// Seat capacity; NaN when the entered text was not a number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<f64>,
    /// Free-text purpose
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    /// Properties this editor does not touch (kept for export)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeatureProperties for RoomProperties {
    const KIND: FeatureKind = FeatureKind::Room;
}

/// Wall properties; nothing on a wall is editable besides deletion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WallProperties {
    /// Stored properties, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeatureProperties for WallProperties {
    const KIND: FeatureKind = FeatureKind::Wall;
}

/// Editable attributes of a piece of furniture.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FurnitureProperties {
    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Committed rotation in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Properties this editor does not touch (kept for export)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FurnitureProperties {
    /// Committed rotation, 0 when none is stored.
    #[must_use]
    pub fn rotation_or_default(&self) -> f64 {
        self.rotation.unwrap_or(0.0)
    }
}

impl FeatureProperties for FurnitureProperties {
    const KIND: FeatureKind = FeatureKind::Furniture;
}

/// A single spatial feature.
///
/// Identifiers are unique across rooms, walls and furniture combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "P: Deserialize<'de> + Default"))]
pub struct Feature<P> {
    /// Unique identifier
    pub id: String,
    /// Opaque geometry payload
    #[serde(default)]
    pub geometry: Geometry,
    /// Kind-specific attributes
    #[serde(default)]
    pub properties: P,
}

impl<P: FeatureProperties> Feature<P> {
    /// Creates a new feature.
    pub fn new(id: impl Into<String>, geometry: Geometry, properties: P) -> Self {
        Self {
            id: id.into(),
            geometry,
            properties,
        }
    }

    /// Kind of this feature.
    #[must_use]
    pub const fn kind(&self) -> FeatureKind {
        P::KIND
    }
}

/// Room feature.
pub type RoomFeature = Feature<RoomProperties>;
/// Wall feature.
pub type WallFeature = Feature<WallProperties>;
/// Furniture feature.
pub type FurnitureFeature = Feature<FurnitureProperties>;

/// Owning set of features of one kind, keyed by identifier.
///
/// Insertion order is kept so exports are stable; lookups are by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "P: Deserialize<'de> + Default"))]
pub struct FeatureCollection<P> {
    /// Features in insertion order
    pub features: Vec<Feature<P>>,
}

impl<P> Default for FeatureCollection<P> {
    fn default() -> Self {
        Self {
            features: Vec::new(),
        }
    }
}

impl<P: FeatureProperties> FeatureCollection<P> {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection from features.
    #[must_use]
    pub fn from_features(features: Vec<Feature<P>>) -> Self {
        Self { features }
    }

    /// Looks up a feature by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Feature<P>> {
        self.features.iter().find(|f| f.id == id)
    }

    /// Looks up a feature by id for mutation.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Feature<P>> {
        self.features.iter_mut().find(|f| f.id == id)
    }

    /// Returns true if a feature with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Appends a feature.
    pub fn push(&mut self, feature: Feature<P>) {
        self.features.push(feature);
    }

    /// Removes every feature with this id, returning the first one removed.
    pub fn remove(&mut self, id: &str) -> Option<Feature<P>> {
        let index = self.features.iter().position(|f| f.id == id)?;
        let removed = self.features.remove(index);
        self.features.retain(|f| f.id != id);
        Some(removed)
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns true if the collection has no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Iterates over features in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Feature<P>> {
        self.features.iter()
    }

    /// Iterates over feature ids.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.id.as_str())
    }
}
