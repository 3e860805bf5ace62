//! Shared test fixtures for floor plan editing tests.
#![allow(dead_code)] // Not every test file uses every fixture

use floorplan_editor::models::{
    Feature, FeatureCollection, FloorPlan, FurnitureProperties, Geometry, RoomProperties,
    WallProperties,
};
use floorplan_editor::panel::PropertiesPanel;
use floorplan_editor::services::{GeoJsonExporter, MemoryRecordStore, PersistenceWorker};
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Room `r1` with an empty number, wall `w1`, furniture `f2` at the origin.
pub fn sample_plan() -> FloorPlan {
    let rooms = FeatureCollection::from_features(vec![Feature::new(
        "r1",
        Geometry::new(json!({
            "type": "Polygon",
            "coordinates": [[[0, 0], [4, 0], [4, 3], [0, 3], [0, 0]]]
        })),
        RoomProperties {
            name: Some("Meeting Room".to_string()),
            ..RoomProperties::default()
        },
    )]);
    let walls = FeatureCollection::from_features(vec![Feature::new(
        "w1",
        Geometry::new(json!({"type": "LineString", "coordinates": [[0, 0], [4, 0]]})),
        WallProperties::default(),
    )]);
    let furniture = FeatureCollection::from_features(vec![Feature::new(
        "f2",
        Geometry::new(json!({"type": "Point", "coordinates": [0, 0]})),
        FurnitureProperties {
            label: Some("Chair".to_string()),
            ..FurnitureProperties::default()
        },
    )]);

    FloorPlan::new(rooms, walls, furniture).expect("sample plan ids are unique")
}

/// A panel wired to a worker over `store`, exporting into `export_dir`.
pub fn panel_over(
    store: &Arc<MemoryRecordStore>,
    export_dir: &Path,
) -> (PropertiesPanel, Arc<PersistenceWorker>) {
    let worker = Arc::new(PersistenceWorker::new(store.clone()));
    let exporter = Arc::new(GeoJsonExporter::new(export_dir, "floorplan"));
    (PropertiesPanel::new(worker.clone(), exporter), worker)
}

/// Writes the three GeoJSON files of `sample_plan` into a temp directory.
pub fn sample_plan_dir() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let rooms = json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "id": "r1",
            "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [4, 0], [4, 3], [0, 3], [0, 0]]]},
            "properties": {"type": "room", "name": "Meeting Room"}
        }]
    });
    let walls = json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "id": "w1",
            "geometry": {"type": "LineString", "coordinates": [[0, 0], [4, 0]]},
            "properties": {"type": "wall"}
        }]
    });
    let furniture = json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "id": "f2",
            "geometry": {"type": "Point", "coordinates": [0, 0]},
            "properties": {"label": "Chair"}
        }]
    });

    for (name, document) in [
        ("rooms.geojson", rooms),
        ("walls.geojson", walls),
        ("furniture.geojson", furniture),
    ] {
        fs::write(temp_dir.path().join(name), document.to_string())
            .expect("Failed to write fixture");
    }
    temp_dir
}
