//! GeoJSON export of the floor plan.
//!
//! Each collection is written as its own GeoJSON `FeatureCollection` document.
//! Files are written with a temp file + rename so a partial export never
//! leaves a truncated document behind.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ExportConfig;
use crate::models::{FeatureCollection, FeatureKind, FeatureProperties, FloorPlan, Geometry};

/// Writes the floor plan somewhere.
pub trait Exporter: Send + Sync {
    /// Exports all three collections.
    ///
    /// # Errors
    ///
    /// Returns an error if any document cannot be serialized or written.
    fn export(&self, plan: &FloorPlan) -> Result<ExportReport>;
}

/// What an export produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    /// Written files, rooms then walls then furniture
    pub files: Vec<PathBuf>,
    /// Total number of features written
    pub feature_count: usize,
    /// Export time (RFC 3339)
    pub exported_at: String,
}

#[derive(Serialize)]
struct GeoJsonFeature<'a, P> {
    #[serde(rename = "type")]
    kind: &'static str,
    id: &'a str,
    geometry: &'a Geometry,
    properties: &'a P,
}

#[derive(Serialize)]
struct GeoJsonFeatureCollection<'a, P> {
    #[serde(rename = "type")]
    kind: &'static str,
    features: Vec<GeoJsonFeature<'a, P>>,
}

/// Renders a collection as a GeoJSON `FeatureCollection` document.
///
/// # Errors
///
/// Returns an error if a property value cannot be serialized.
pub fn to_geojson<P: FeatureProperties>(collection: &FeatureCollection<P>) -> Result<String> {
    let document = GeoJsonFeatureCollection {
        kind: "FeatureCollection",
        features: collection
            .iter()
            .map(|feature| GeoJsonFeature {
                kind: "Feature",
                id: &feature.id,
                geometry: &feature.geometry,
                properties: &feature.properties,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&document)
        .with_context(|| format!("Failed to serialize {} collection", P::KIND))
}

/// Exports to `<prefix>_<kind>_<timestamp>.geojson` files in a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoJsonExporter {
    output_dir: PathBuf,
    file_prefix: String,
}

impl GeoJsonExporter {
    /// Creates an exporter writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>, file_prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_prefix: file_prefix.into(),
        }
    }

    /// Creates an exporter from the `[export]` configuration section.
    #[must_use]
    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(config.output_dir.clone(), config.file_prefix.clone())
    }

    /// Directory files are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn file_path(&self, kind: FeatureKind, timestamp: &str) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{}_{}.geojson",
            self.file_prefix,
            kind.plural(),
            timestamp
        ))
    }

    fn write_collection<P: FeatureProperties>(
        &self,
        collection: &FeatureCollection<P>,
        timestamp: &str,
    ) -> Result<PathBuf> {
        let path = self.file_path(P::KIND, timestamp);
        let content = to_geojson(collection)?;
        let temp_path = path.with_extension("geojson.tmp");

        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

        Ok(path)
    }
}

impl Exporter for GeoJsonExporter {
    fn export(&self, plan: &FloorPlan) -> Result<ExportReport> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create export directory: {}",
                self.output_dir.display()
            )
        })?;

        let now = chrono::Utc::now();
        let timestamp = now.format("%Y%m%dT%H%M%SZ").to_string();

        let files = vec![
            self.write_collection(&plan.rooms, &timestamp)?,
            self.write_collection(&plan.walls, &timestamp)?,
            self.write_collection(&plan.furniture, &timestamp)?,
        ];

        Ok(ExportReport {
            files,
            feature_count: plan.len(),
            exported_at: now.to_rfc3339(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Feature, RoomProperties};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    #[test]
    fn test_to_geojson_adds_type_members() {
        let rooms = FeatureCollection::from_features(vec![Feature::new(
            "r1",
            Geometry::new(json!({"type": "Point", "coordinates": [0, 0]})),
            RoomProperties {
                number: Some("1/2".to_string()),
                ..RoomProperties::default()
            },
        )]);

        let value: Value = serde_json::from_str(&to_geojson(&rooms).unwrap()).unwrap();
        assert_eq!(value["type"], json!("FeatureCollection"));
        assert_eq!(value["features"][0]["type"], json!("Feature"));
        assert_eq!(value["features"][0]["id"], json!("r1"));
        assert_eq!(value["features"][0]["properties"]["number"], json!("1/2"));
    }

    #[test]
    fn test_export_writes_three_files() {
        let temp_dir = TempDir::new().unwrap();
        let exporter = GeoJsonExporter::new(temp_dir.path().join("out"), "plan");

        let report = exporter.export(&FloorPlan::default()).unwrap();

        assert_eq!(report.files.len(), 3);
        assert_eq!(report.feature_count, 0);
        for (file, kind) in report.files.iter().zip(FeatureKind::ALL) {
            assert!(file.exists());
            let name = file.file_name().unwrap().to_string_lossy().to_string();
            assert!(name.starts_with(&format!("plan_{}_", kind.plural())));
            assert!(name.ends_with(".geojson"));
        }
    }
}
