//! Tests for what the editor reports through `tracing`.
//!
//! Each test installs a subscriber that writes into a shared buffer. The
//! persistence worker is created inside the subscriber scope so its thread
//! logs into the same buffer.

use floorplan_editor::models::RoomField;
use floorplan_editor::services::MemoryRecordStore;
use std::io;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

mod fixtures;
use fixtures::*;

/// Log output captured by a test subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    /// Lines logged at `level` that contain `needle`.
    fn count(&self, level: &str, needle: &str) -> usize {
        let output = String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned();
        output
            .lines()
            .filter(|line| line.contains(level) && line.contains(needle))
            .count()
    }
}

fn with_captured_logs(test: impl FnOnce()) -> CapturedLogs {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    tracing::subscriber::with_default(subscriber, test);
    logs
}

#[test]
fn test_invalid_geometry_logs_one_warning() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(MemoryRecordStore::new());

    let logs = with_captured_logs(|| {
        let (mut panel, worker) = panel_over(&store, temp_dir.path());
        let mut plan = sample_plan();

        panel.select_furniture(&plan, "f2").unwrap();
        panel
            .edit_geometry(&mut plan, r#"{"type":"Point","coordinates":[1,1]}"#)
            .unwrap();
        assert!(panel
            .edit_geometry(&mut plan, r#"{"type":"Point","coordinates":[2,2]"#)
            .is_err());
        worker.shutdown();
    });

    assert_eq!(logs.count("WARN", "Invalid JSON for geometry"), 1);
    assert_eq!(logs.count("WARN", ""), 1);
    assert_eq!(logs.count("ERROR", ""), 0);
}

#[test]
fn test_each_failed_remote_write_logs_one_error() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(MemoryRecordStore::failing());

    let logs = with_captured_logs(|| {
        let (mut panel, worker) = panel_over(&store, temp_dir.path());
        let mut plan = sample_plan();

        panel.select_feature("r1");
        panel
            .set_room_field(&mut plan, RoomField::Name, "Lab")
            .unwrap();
        panel
            .set_room_field(&mut plan, RoomField::Purpose, "Standups")
            .unwrap();
        panel.select_feature("w1");
        panel.delete_selected(&mut plan).unwrap();
        worker.shutdown();
    });

    assert_eq!(logs.count("ERROR", "Error during update of rooms/r1"), 2);
    assert_eq!(logs.count("ERROR", "Error during delete of features/w1"), 1);
    assert_eq!(logs.count("ERROR", ""), 3);
}

#[test]
fn test_rejected_room_number_is_not_a_warning() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(MemoryRecordStore::new());

    let logs = with_captured_logs(|| {
        let (mut panel, worker) = panel_over(&store, temp_dir.path());
        let mut plan = sample_plan();

        panel.select_feature("r1");
        assert!(panel
            .set_room_field(&mut plan, RoomField::Number, "ab")
            .is_err());
        worker.shutdown();
    });

    assert_eq!(logs.count("WARN", ""), 0);
    assert_eq!(logs.count("ERROR", ""), 0);
}
