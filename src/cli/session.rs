//! Interactive session: reads commands, drives the panel, prints views.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::sync::Arc;

use crate::cli::command::{Command, FieldName, HELP};
use crate::models::{FeatureKind, FloorPlan};
use crate::panel::{PanelView, PropertiesPanel};
use crate::services::PersistenceWorker;

/// Whether the read loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command
    Continue,
    /// Stop reading
    Quit,
}

/// A floor plan, the panel editing it and the worker persisting its edits.
pub struct Session {
    plan: FloorPlan,
    panel: PropertiesPanel,
    worker: Arc<PersistenceWorker>,
}

impl Session {
    /// Creates a session.
    ///
    /// `panel` is expected to dispatch to `worker`.
    pub fn new(plan: FloorPlan, panel: PropertiesPanel, worker: Arc<PersistenceWorker>) -> Self {
        Self {
            plan,
            panel,
            worker,
        }
    }

    /// The floor plan as edited so far.
    #[must_use]
    pub const fn plan(&self) -> &FloorPlan {
        &self.plan
    }

    /// The panel.
    #[must_use]
    pub const fn panel(&self) -> &PropertiesPanel {
        &self.panel
    }

    /// Reads commands until `quit` or end of input, then drains the worker.
    ///
    /// Lines that do not parse are reported on `out` and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> Result<()> {
        for line in input.lines() {
            let line = line.context("Failed to read command")?;
            if line.trim().is_empty() {
                continue;
            }

            match line.parse::<Command>() {
                Ok(command) => {
                    if self.execute(command, &mut out)? == Flow::Quit {
                        break;
                    }
                }
                Err(message) => writeln!(out, "{message}")?,
            }
        }

        self.worker.shutdown();
        let failed = self.worker.failed().len();
        if failed > 0 {
            writeln!(out, "{failed} remote write(s) failed; see 'history'")?;
        }
        out.flush()?;
        Ok(())
    }

    /// Runs one command.
    ///
    /// Rejected edits print nothing; they are only logged.
    ///
    /// # Errors
    ///
    /// Returns an error if writing output fails.
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<Flow> {
        match command {
            Command::Rooms => self.list(FeatureKind::Room, out)?,
            Command::Walls => self.list(FeatureKind::Wall, out)?,
            Command::Furniture => self.list(FeatureKind::Furniture, out)?,
            Command::Select(id) => {
                self.panel.select_feature(id);
                self.show(out)?;
            }
            Command::SelectFurniture(id) => {
                if self.panel.select_furniture(&self.plan, &id).is_ok() {
                    self.show(out)?;
                }
            }
            Command::Clear => {
                self.panel.clear_selection();
                self.show(out)?;
            }
            Command::Show => self.show(out)?,
            Command::Set { field, value } => {
                let _ = match field {
                    FieldName::Room(field) => self.panel.set_room_field(&mut self.plan, field, &value),
                    FieldName::Label => self.panel.set_furniture_label(&mut self.plan, &value),
                };
            }
            Command::Geometry(text) => {
                let _ = self.panel.edit_geometry(&mut self.plan, &text);
            }
            Command::Rotate(degrees) => {
                let _ = self.panel.rotation_input(degrees);
            }
            Command::Blur => {
                let _ = self.panel.commit_rotation(&mut self.plan);
            }
            Command::Delete => {
                if let Ok(kind) = self.panel.delete_selected(&mut self.plan) {
                    writeln!(out, "Deleted {kind}")?;
                }
            }
            Command::Export => {
                if let Some(report) = self.panel.export(&self.plan) {
                    for file in &report.files {
                        writeln!(out, "Wrote {}", file.display())?;
                    }
                }
            }
            Command::History => self.history(out)?,
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn list<W: Write>(&self, kind: FeatureKind, out: &mut W) -> Result<()> {
        let ids: Vec<&str> = match kind {
            FeatureKind::Room => self.plan.rooms.ids().collect(),
            FeatureKind::Wall => self.plan.walls.ids().collect(),
            FeatureKind::Furniture => self.plan.furniture.ids().collect(),
        };
        if ids.is_empty() {
            writeln!(out, "(no {})", kind.plural())?;
        }
        for id in ids {
            writeln!(out, "{id}")?;
        }
        Ok(())
    }

    fn show<W: Write>(&self, out: &mut W) -> Result<()> {
        match self.panel.view(&self.plan) {
            PanelView::Empty { prompt } => writeln!(out, "{prompt}")?,
            PanelView::Room(form) => {
                writeln!(out, "Room {}", form.id)?;
                writeln!(out, "  Name:        {}", form.name)?;
                writeln!(out, "  Room number: {}", form.number)?;
                writeln!(out, "  Color:       {}", form.color.to_hex())?;
                writeln!(out, "  Bookable:    {}", form.bookable)?;
                writeln!(out, "  Capacity:    {}", form.capacity)?;
                writeln!(out, "  Purpose:     {}", form.purpose)?;
                writeln!(out, "  Geometry:\n{}", form.geometry)?;
                writeln!(out, "  [delete room]")?;
            }
            PanelView::Wall { id } => {
                writeln!(out, "Wall {id}")?;
                writeln!(out, "  [delete wall]")?;
            }
            PanelView::Furniture(form) => {
                writeln!(out, "Furniture {}", form.id)?;
                writeln!(out, "  Label:              {}", form.label)?;
                writeln!(out, "  Rotation (degrees): {}", form.rotation)?;
                writeln!(out, "  Geometry:\n{}", form.geometry)?;
                writeln!(out, "  [delete furniture]")?;
            }
        }
        Ok(())
    }

    fn history<W: Write>(&self, out: &mut W) -> Result<()> {
        let records = self.worker.history();
        if records.is_empty() {
            writeln!(out, "(no remote writes)")?;
        }
        for record in records {
            write!(out, "#{} {} {}", record.sequence, record.status, record.request)?;
            if let Some(error) = &record.error {
                write!(out, " - {error}")?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Feature, FeatureCollection, Geometry, RoomProperties};
    use crate::services::{ExportReport, Exporter, MemoryRecordStore};

    struct NoExport;

    impl Exporter for NoExport {
        fn export(&self, _plan: &FloorPlan) -> Result<ExportReport> {
            anyhow::bail!("export disabled")
        }
    }

    fn session() -> (Session, Arc<MemoryRecordStore>) {
        let store = Arc::new(MemoryRecordStore::new());
        let worker = Arc::new(PersistenceWorker::new(store.clone()));
        let panel = PropertiesPanel::new(worker.clone(), Arc::new(NoExport));
        let plan = FloorPlan::new(
            FeatureCollection::from_features(vec![Feature::new(
                "r1",
                Geometry::default(),
                RoomProperties::default(),
            )]),
            FeatureCollection::new(),
            FeatureCollection::new(),
        )
        .unwrap();
        (Session::new(plan, panel, worker), store)
    }

    #[test]
    fn test_run_script() {
        let (mut session, store) = session();
        let script = "select r1\nset number 12/3\nset number ab\nbogus\nquit\nset name ignored\n";
        let mut out = Vec::new();

        session.run(script.as_bytes(), &mut out).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Room r1"));
        assert!(out.contains("Unknown command 'bogus'"));
        assert_eq!(
            session.plan().rooms.get("r1").unwrap().properties.number.as_deref(),
            Some("12/3")
        );
        assert_eq!(session.plan().rooms.get("r1").unwrap().properties.name, None);
        assert_eq!(store.calls().len(), 1);
    }

    #[test]
    fn test_run_keeps_name_spacing() {
        let (mut session, store) = session();
        let mut out = Vec::new();

        session
            .run("select r1\nset name   Lab \n".as_bytes(), &mut out)
            .unwrap();

        assert_eq!(
            session.plan().rooms.get("r1").unwrap().properties.name.as_deref(),
            Some("  Lab ")
        );
        assert_eq!(
            store.row(crate::services::RemoteTable::Rooms, "r1").unwrap()["name"],
            "  Lab "
        );
    }

    #[test]
    fn test_history_lists_writes() {
        let (mut session, _store) = session();
        let mut out = Vec::new();
        session.execute(Command::Select("r1".to_string()), &mut out).unwrap();
        session.execute(Command::Delete, &mut out).unwrap();
        session.worker.shutdown();

        let mut out = Vec::new();
        session.execute(Command::History, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("#0 succeeded delete rooms/r1"));
    }

    #[test]
    fn test_list_empty_collection() {
        let (mut session, _store) = session();
        let mut out = Vec::new();
        session.execute(Command::Walls, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "(no walls)\n");
    }
}
