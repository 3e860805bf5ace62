//! The three feature collections the editor works on.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::models::{
    FeatureCollection, FeatureKind, FeatureProperties, FurnitureProperties, RoomProperties,
    WallProperties,
};

/// Rooms, walls and furniture of one floor.
///
/// The surrounding application owns this; the editor only mutates attributes
/// and geometry or removes features, it never adds any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloorPlan {
    /// Room features
    pub rooms: FeatureCollection<RoomProperties>,
    /// Wall features
    pub walls: FeatureCollection<WallProperties>,
    /// Furniture features
    pub furniture: FeatureCollection<FurnitureProperties>,
}

impl FloorPlan {
    /// Creates a floor plan from its collections.
    ///
    /// # Errors
    ///
    /// Returns an error if an id appears more than once across the collections.
    pub fn new(
        rooms: FeatureCollection<RoomProperties>,
        walls: FeatureCollection<WallProperties>,
        furniture: FeatureCollection<FurnitureProperties>,
    ) -> Result<Self> {
        let plan = Self {
            rooms,
            walls,
            furniture,
        };
        plan.check_unique_ids()?;
        Ok(plan)
    }

    /// Loads `rooms.geojson`, `walls.geojson` and `furniture.geojson` from a directory.
    ///
    /// A missing file yields an empty collection.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed, or if ids collide
    /// across collections.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let rooms = load_collection(&dir.join(file_name(FeatureKind::Room)))?;
        let walls = load_collection(&dir.join(file_name(FeatureKind::Wall)))?;
        let furniture = load_collection(&dir.join(file_name(FeatureKind::Furniture)))?;
        Self::new(rooms, walls, furniture)
            .with_context(|| format!("Invalid floor plan in {}", dir.display()))
    }

    /// Finds which collection holds `id`, checking rooms, walls, then furniture.
    #[must_use]
    pub fn kind_of(&self, id: &str) -> Option<FeatureKind> {
        if self.rooms.contains(id) {
            Some(FeatureKind::Room)
        } else if self.walls.contains(id) {
            Some(FeatureKind::Wall)
        } else if self.furniture.contains(id) {
            Some(FeatureKind::Furniture)
        } else {
            None
        }
    }

    /// Total number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len() + self.walls.len() + self.furniture.len()
    }

    /// Returns true if all collections are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_unique_ids(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let ids = self
            .rooms
            .ids()
            .chain(self.walls.ids())
            .chain(self.furniture.ids());
        for id in ids {
            if !seen.insert(id) {
                anyhow::bail!("Feature id '{id}' is used more than once");
            }
        }
        Ok(())
    }
}

/// File name a collection of `kind` is stored under.
#[must_use]
pub fn file_name(kind: FeatureKind) -> String {
    format!("{}.geojson", kind.plural())
}

fn load_collection<P: FeatureProperties>(path: &Path) -> Result<FeatureCollection<P>> {
    if !path.exists() {
        return Ok(FeatureCollection::new());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} as a GeoJSON FeatureCollection", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Feature, Geometry};
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_load_dir_with_missing_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("rooms.geojson"),
            json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "id": "r1",
                    "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]},
                    "properties": {"type": "room", "name": "Lab", "number": "2/10"}
                }]
            })
            .to_string(),
        )
        .unwrap();

        let plan = FloorPlan::load_dir(temp_dir.path()).unwrap();
        assert_eq!(plan.rooms.len(), 1);
        assert!(plan.walls.is_empty());
        assert!(plan.furniture.is_empty());
        assert_eq!(plan.kind_of("r1"), Some(FeatureKind::Room));
        assert_eq!(
            plan.rooms.get("r1").unwrap().properties.number.as_deref(),
            Some("2/10")
        );
    }

    #[test]
    fn test_load_dir_rejects_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("walls.geojson"), "{ not json").unwrap();
        let err = FloorPlan::load_dir(temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("walls.geojson"));
    }

    #[test]
    fn test_duplicate_ids_across_collections() {
        let rooms = FeatureCollection::from_features(vec![Feature::new(
            "x",
            Geometry::default(),
            RoomProperties::default(),
        )]);
        let furniture = FeatureCollection::from_features(vec![Feature::new(
            "x",
            Geometry::default(),
            FurnitureProperties::default(),
        )]);
        let result = FloorPlan::new(rooms, FeatureCollection::new(), furniture);
        assert!(result.is_err());
    }

    #[test]
    fn test_kind_of() {
        let plan = FloorPlan::new(
            FeatureCollection::new(),
            FeatureCollection::from_features(vec![Feature::new(
                "w1",
                Geometry::new(json!({"type": "LineString", "coordinates": [[0, 0], [5, 0]]})),
                WallProperties::default(),
            )]),
            FeatureCollection::new(),
        )
        .unwrap();
        assert_eq!(plan.kind_of("w1"), Some(FeatureKind::Wall));
        assert_eq!(plan.kind_of("nope"), None);
        assert_eq!(plan.len(), 1);
    }
}
