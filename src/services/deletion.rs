//! Cascading feature deletes.
//!
//! A delete removes the feature locally, clears any selection pointing at it
//! and queues the remote delete, in that order. There is no confirmation and
//! no way back: a failed remote delete is only logged by the worker.

use std::sync::Arc;

use crate::models::{FeatureKind, FloorPlan, Selection};
use crate::services::persistence::{Dispatch, PersistenceRequest, RemoteTable};

/// Removes features locally and queues the matching remote delete.
#[derive(Clone)]
pub struct DeleteCoordinator {
    dispatch: Arc<dyn Dispatch>,
}

impl DeleteCoordinator {
    /// Creates a coordinator that sends remote deletes to `dispatch`.
    #[must_use]
    pub fn new(dispatch: Arc<dyn Dispatch>) -> Self {
        Self { dispatch }
    }

    /// Deletes the feature `id` from the collection of `kind`.
    ///
    /// The remote delete is queued even when the feature was already gone
    /// locally. Returns true if a local feature was removed.
    pub fn delete_feature(
        &self,
        plan: &mut FloorPlan,
        selection: &mut Selection,
        kind: FeatureKind,
        id: &str,
    ) -> bool {
        let removed = match kind {
            FeatureKind::Room => plan.rooms.remove(id).is_some(),
            FeatureKind::Wall => plan.walls.remove(id).is_some(),
            FeatureKind::Furniture => plan.furniture.remove(id).is_some(),
        };

        if selection.references(id) {
            *selection = Selection::None;
        }

        self.dispatch
            .dispatch(PersistenceRequest::delete(RemoteTable::for_kind(kind), id));
        removed
    }
}
