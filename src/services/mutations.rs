//! Optimistic attribute and geometry edits.
//!
//! Every edit runs the same two steps: merge into the owning local collection,
//! then hand an update request to the dispatcher. The dispatcher's outcome is
//! never observed here, so a failed remote write leaves the local edit in place.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::{EditError, ValidationError, ValidationErrorKind};
use crate::models::geometry;
use crate::models::{AttributePatch, FeatureKind, FloorPlan, Geometry};
use crate::services::persistence::{Dispatch, PersistenceRequest, RemoteTable};

/// Remote column holding a feature's geometry.
pub const GEOMETRY_COLUMN: &str = "geometry";

/// Applies validated edits locally and queues the matching remote update.
#[derive(Clone)]
pub struct MutationCoordinator {
    dispatch: Arc<dyn Dispatch>,
}

impl MutationCoordinator {
    /// Creates a coordinator that sends remote writes to `dispatch`.
    #[must_use]
    pub fn new(dispatch: Arc<dyn Dispatch>) -> Self {
        Self { dispatch }
    }

    /// Merges `patch` into the feature `id` and queues a remote update.
    ///
    /// The kind of collection is taken from the patch. An empty patch changes
    /// nothing and dispatches nothing.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] of kind `NoMatchingSelection` if the
    /// collection has no feature `id`. Nothing is mutated or dispatched then.
    pub fn apply_patch(
        &self,
        plan: &mut FloorPlan,
        id: &str,
        patch: &AttributePatch,
    ) -> Result<(), ValidationError> {
        let kind = patch.kind();
        match patch {
            AttributePatch::Room(room_patch) => {
                let room = plan.rooms.get_mut(id).ok_or_else(|| missing(kind, id))?;
                room_patch.apply_to(&mut room.properties);
            }
            AttributePatch::Furniture(furniture_patch) => {
                let furniture = plan.furniture.get_mut(id).ok_or_else(|| missing(kind, id))?;
                furniture_patch.apply_to(&mut furniture.properties);
            }
        }

        let columns = patch.columns();
        if columns.is_empty() {
            return Ok(());
        }

        self.dispatch.dispatch(PersistenceRequest::update(
            RemoteTable::for_kind(kind),
            id,
            columns,
        ));
        Ok(())
    }

    /// Parses geometry text and, if it parses, replaces the geometry of the
    /// feature `id` in the collection of `kind` and queues a remote update.
    ///
    /// Returns the new geometry.
    ///
    /// # Errors
    ///
    /// - [`EditError::Parse`] if the text is not well-formed JSON
    /// - [`EditError::Validation`] if the collection has no feature `id`
    ///
    /// In both cases the previous geometry is kept and nothing is dispatched.
    pub fn apply_geometry(
        &self,
        plan: &mut FloorPlan,
        kind: FeatureKind,
        id: &str,
        text: &str,
    ) -> Result<Geometry, EditError> {
        let new_geometry = geometry::encode(text)?;

        let slot = match kind {
            FeatureKind::Room => plan.rooms.get_mut(id).map(|f| &mut f.geometry),
            FeatureKind::Wall => plan.walls.get_mut(id).map(|f| &mut f.geometry),
            FeatureKind::Furniture => plan.furniture.get_mut(id).map(|f| &mut f.geometry),
        };
        let slot = slot.ok_or_else(|| missing(kind, id))?;
        *slot = new_geometry.clone();

        self.dispatch.dispatch(PersistenceRequest::update(
            RemoteTable::for_kind(kind),
            id,
            geometry_columns(&new_geometry),
        ));
        Ok(new_geometry)
    }
}

pub(crate) fn missing(kind: FeatureKind, id: &str) -> ValidationError {
    ValidationError::new(
        ValidationErrorKind::NoMatchingSelection,
        "selection",
        format!("no {kind} with id '{id}'"),
    )
}

/// Columns of a geometry update, for callers that inspect dispatched requests.
#[must_use]
pub fn geometry_columns(geometry: &Geometry) -> Map<String, Value> {
    let mut columns = Map::new();
    columns.insert(GEOMETRY_COLUMN.to_string(), geometry.as_value().clone());
    columns
}
