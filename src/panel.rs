//! Properties panel session.
//!
//! The panel owns the selection and the rotation buffer; the floor plan is
//! owned by the caller and passed into each interaction. Every interaction
//! runs synchronously against the local collections. Remote writes are queued
//! and never waited on.
//!
//! Rejected input is logged here and returned, but leaves the panel usable:
//! no error changes how later interactions behave.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::constants::EMPTY_SELECTION_PROMPT;
use crate::error::{EditError, ValidationError};
use crate::models::geometry;
use crate::models::{
    resolve, FeatureKind, FloorPlan, FurnitureFeature, FurniturePatch, ResolvedFeature, RoomColor,
    RoomFeature, RoomField, Selection,
};
use crate::services::mutations::missing;
use crate::services::{
    DeleteCoordinator, Dispatch, ExportReport, Exporter, MutationCoordinator, TransformBuffer,
};

/// Room attributes as the form shows them, with defaults filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomForm {
    /// Room id
    pub id: String,
    /// Name, empty when unset
    pub name: String,
    /// Room number, empty when unset
    pub number: String,
    /// Color, the configured default when unset
    pub color: RoomColor,
    /// Bookable flag, false when unset
    pub bookable: bool,
    /// Capacity, 0 when unset or not a number
    pub capacity: f64,
    /// Purpose, empty when unset
    pub purpose: String,
    /// Editable geometry text
    pub geometry: String,
}

/// Furniture attributes as the form shows them.
#[derive(Debug, Clone, PartialEq)]
pub struct FurnitureForm {
    /// Furniture id
    pub id: String,
    /// Label, empty when unset
    pub label: String,
    /// Buffered (not necessarily committed) rotation
    pub rotation: f64,
    /// Editable geometry text of the snapshot
    pub geometry: String,
}

/// What the panel shows for the current selection.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelView {
    /// Nothing selected, or the selected id no longer resolves
    Empty {
        /// Prompt shown instead of a form
        prompt: &'static str,
    },
    /// Room form
    Room(RoomForm),
    /// Wall: only a delete action
    Wall {
        /// Wall id
        id: String,
    },
    /// Furniture form
    Furniture(FurnitureForm),
}

/// Interactive editing session over one floor plan.
pub struct PropertiesPanel {
    selection: Selection,
    buffer: Option<TransformBuffer>,
    mutations: MutationCoordinator,
    deletions: DeleteCoordinator,
    exporter: Arc<dyn Exporter>,
    default_room_color: RoomColor,
}

impl PropertiesPanel {
    /// Creates a panel with nothing selected.
    ///
    /// Remote writes go to `dispatch`; the export trigger uses `exporter`.
    pub fn new(dispatch: Arc<dyn Dispatch>, exporter: Arc<dyn Exporter>) -> Self {
        Self {
            selection: Selection::None,
            buffer: None,
            mutations: MutationCoordinator::new(Arc::clone(&dispatch)),
            deletions: DeleteCoordinator::new(dispatch),
            exporter,
            default_room_color: RoomColor::new(255, 0, 0),
        }
    }

    /// Sets the color shown for rooms without one.
    #[must_use]
    pub fn with_default_room_color(mut self, color: RoomColor) -> Self {
        self.default_room_color = color;
        self
    }

    /// Current selection.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Rotation buffer of the selected furniture, if any.
    #[must_use]
    pub const fn rotation_buffer(&self) -> Option<&TransformBuffer> {
        self.buffer.as_ref()
    }

    /// Selects a room or wall by id.
    ///
    /// The id is not checked; an id that resolves to nothing shows the empty view.
    pub fn select_feature(&mut self, id: impl Into<String>) {
        let id = id.into();
        debug!("Selected feature {id}");
        self.selection = Selection::Feature(id);
        self.buffer = None;
    }

    /// Selects a piece of furniture, snapshotting it and starting a rotation buffer.
    ///
    /// # Errors
    ///
    /// Returns a `NoMatchingSelection` error, leaving the selection unchanged,
    /// if there is no furniture `id`.
    pub fn select_furniture(&mut self, plan: &FloorPlan, id: &str) -> Result<(), ValidationError> {
        let Some(furniture) = plan.furniture.get(id) else {
            let err = missing(FeatureKind::Furniture, id);
            debug!("Furniture selection rejected: {err}");
            return Err(err);
        };

        debug!("Selected furniture {id}");
        self.buffer = Some(TransformBuffer::new(furniture));
        self.selection = Selection::Furniture(furniture.clone());
        Ok(())
    }

    /// Clears the selection and drops the rotation buffer.
    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
        self.buffer = None;
    }

    /// Computes what to show for the current selection.
    #[must_use]
    pub fn view(&self, plan: &FloorPlan) -> PanelView {
        match &self.selection {
            Selection::None => empty_view(),
            Selection::Feature(id) => match resolve(id, &plan.rooms, &plan.walls) {
                Some(ResolvedFeature::Room(room)) => PanelView::Room(self.room_form(room)),
                Some(ResolvedFeature::Wall(wall)) => PanelView::Wall {
                    id: wall.id.clone(),
                },
                None => empty_view(),
            },
            Selection::Furniture(snapshot) => PanelView::Furniture(FurnitureForm {
                id: snapshot.id.clone(),
                label: snapshot.properties.label.clone().unwrap_or_default(),
                rotation: self
                    .buffer
                    .as_ref()
                    .map_or_else(|| snapshot.properties.rotation_or_default(), TransformBuffer::value),
                geometry: geometry::decode(&snapshot.geometry),
            }),
        }
    }

    fn room_form(&self, room: &RoomFeature) -> RoomForm {
        let props = &room.properties;
        RoomForm {
            id: room.id.clone(),
            name: props.name.clone().unwrap_or_default(),
            number: props.number.clone().unwrap_or_default(),
            color: props.color.unwrap_or(self.default_room_color),
            bookable: props.bookable.unwrap_or(false),
            capacity: props.capacity.filter(|c| !c.is_nan()).unwrap_or(0.0),
            purpose: props.purpose.clone().unwrap_or_default(),
            geometry: geometry::decode(&room.geometry),
        }
    }

    /// Id of the selected room, if the selection resolves to one.
    fn selected_room_id(&self, plan: &FloorPlan) -> Result<String, ValidationError> {
        let Some(id) = self.selection.feature_id() else {
            return Err(missing(FeatureKind::Room, ""));
        };
        match resolve(id, &plan.rooms, &plan.walls) {
            Some(ResolvedFeature::Room(room)) => Ok(room.id.clone()),
            _ => Err(missing(FeatureKind::Room, id)),
        }
    }

    /// Id of the selected furniture.
    fn selected_furniture_id(&self) -> Result<String, ValidationError> {
        self.selection
            .furniture()
            .map(|snapshot| snapshot.id.clone())
            .ok_or_else(|| missing(FeatureKind::Furniture, ""))
    }

    /// Replaces the furniture snapshot with the current collection entry.
    fn refresh_snapshot(&mut self, furniture: Option<&FurnitureFeature>) {
        if let (Some(feature), Selection::Furniture(snapshot)) = (furniture, &mut self.selection) {
            if snapshot.id == feature.id {
                *snapshot = feature.clone();
            }
        }
    }

    /// Edits one field of the selected room.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Validation`] if no room is selected or the input
    /// is rejected by the field check. Nothing is mutated or dispatched then.
    pub fn set_room_field(
        &mut self,
        plan: &mut FloorPlan,
        field: RoomField,
        input: &str,
    ) -> Result<(), EditError> {
        let result = self.selected_room_id(plan).and_then(|id| {
            let patch = field.patch_from_input(input)?;
            self.mutations.apply_patch(plan, &id, &patch.into())
        });
        result.map_err(|err| log_rejected(EditError::Validation(err)))
    }

    /// Edits the label of the selected furniture.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Validation`] if no furniture is selected or the
    /// furniture is no longer in the collection.
    pub fn set_furniture_label(&mut self, plan: &mut FloorPlan, label: &str) -> Result<(), EditError> {
        let result = self.selected_furniture_id().and_then(|id| {
            self.mutations
                .apply_patch(plan, &id, &FurniturePatch::label(label).into())?;
            Ok(id)
        });

        match result {
            Ok(id) => {
                self.refresh_snapshot(plan.furniture.get(&id));
                Ok(())
            }
            Err(err) => Err(log_rejected(EditError::Validation(err))),
        }
    }

    /// Replaces the geometry of the selected feature with parsed `text`.
    ///
    /// # Errors
    ///
    /// - [`EditError::Parse`] if the text is not well-formed JSON
    /// - [`EditError::Validation`] if nothing editable is selected
    ///
    /// The previous geometry is kept and nothing is dispatched on error.
    pub fn edit_geometry(&mut self, plan: &mut FloorPlan, text: &str) -> Result<(), EditError> {
        let target = match &self.selection {
            Selection::Feature(id) => resolve(id, &plan.rooms, &plan.walls)
                .map(|resolved| (resolved.kind(), resolved.id().to_string()))
                .ok_or_else(|| missing(FeatureKind::Room, id)),
            Selection::Furniture(snapshot) => Ok((FeatureKind::Furniture, snapshot.id.clone())),
            Selection::None => Err(missing(FeatureKind::Room, "")),
        };
        let (kind, id) = target.map_err(|err| log_rejected(EditError::Validation(err)))?;

        self.mutations
            .apply_geometry(plan, kind, &id, text)
            .map_err(log_rejected)?;

        if kind == FeatureKind::Furniture {
            self.refresh_snapshot(plan.furniture.get(&id));
        }
        Ok(())
    }

    /// Buffers a rotation keystroke without touching the collection.
    ///
    /// # Errors
    ///
    /// Returns a `NoMatchingSelection` error if no furniture is selected.
    pub fn rotation_input(&mut self, degrees: f64) -> Result<(), ValidationError> {
        match self.buffer.as_mut() {
            Some(buffer) => {
                buffer.on_input(degrees);
                Ok(())
            }
            None => {
                let err = missing(FeatureKind::Furniture, "");
                debug!("Rotation input ignored: {err}");
                Err(err)
            }
        }
    }

    /// Commits the buffered rotation to the local furniture feature.
    ///
    /// Rotation is kept locally only; no remote write is issued.
    ///
    /// # Errors
    ///
    /// Returns a `NoMatchingSelection` error if no furniture is selected or it
    /// has been removed from the collection.
    pub fn commit_rotation(&mut self, plan: &mut FloorPlan) -> Result<(), ValidationError> {
        let Some(buffer) = self.buffer.as_ref() else {
            let err = missing(FeatureKind::Furniture, "");
            debug!("Rotation commit ignored: {err}");
            return Err(err);
        };

        let furniture_id = buffer.furniture_id().to_string();
        if buffer.on_commit(&mut plan.furniture).is_none() {
            let err = missing(FeatureKind::Furniture, &furniture_id);
            debug!("Rotation commit ignored: {err}");
            return Err(err);
        }

        debug!("Committed rotation {} for {furniture_id}", buffer.value());
        self.refresh_snapshot(plan.furniture.get(&furniture_id));
        Ok(())
    }

    /// Deletes the selected feature locally and queues the remote delete.
    ///
    /// Returns the kind of feature that was targeted.
    ///
    /// # Errors
    ///
    /// Returns a `NoMatchingSelection` error if the selection does not resolve
    /// to a feature.
    pub fn delete_selected(&mut self, plan: &mut FloorPlan) -> Result<FeatureKind, ValidationError> {
        let target = match &self.selection {
            Selection::Feature(id) => resolve(id, &plan.rooms, &plan.walls)
                .map(|resolved| (resolved.kind(), resolved.id().to_string())),
            Selection::Furniture(snapshot) => Some((FeatureKind::Furniture, snapshot.id.clone())),
            Selection::None => None,
        };
        let Some((kind, id)) = target else {
            let err = missing(FeatureKind::Room, self.selection.feature_id().unwrap_or_default());
            debug!("Delete ignored: {err}");
            return Err(err);
        };

        info!("Deleting {kind} {id}");
        self.deletions
            .delete_feature(plan, &mut self.selection, kind, &id);
        if self.selection.is_none() {
            self.buffer = None;
        }
        Ok(kind)
    }

    /// Export trigger.
    ///
    /// Failures are logged and reported as `None`.
    pub fn export(&self, plan: &FloorPlan) -> Option<ExportReport> {
        match self.exporter.export(plan) {
            Ok(report) => {
                info!(
                    "Exported {} features to {} files",
                    report.feature_count,
                    report.files.len()
                );
                Some(report)
            }
            Err(err) => {
                error!("GeoJSON export failed: {err:#}");
                None
            }
        }
    }
}

const fn empty_view() -> PanelView {
    PanelView::Empty {
        prompt: EMPTY_SELECTION_PROMPT,
    }
}

/// Logs a rejected edit at the level its kind calls for.
fn log_rejected(err: EditError) -> EditError {
    match &err {
        EditError::Validation(validation) => debug!("Edit rejected: {validation}"),
        EditError::Parse(parse) => warn!(line = parse.line, column = parse.column, "{parse}"),
    }
    err
}
