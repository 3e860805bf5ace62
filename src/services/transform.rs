//! Rotation commit buffer.
//!
//! Keystrokes only touch the buffer. A commit copies the buffered value into
//! the local furniture feature and stops there: rotation has no remote write.

use crate::models::{FeatureCollection, FurnitureFeature, FurnitureProperties};

/// Transient rotation edit for the selected piece of furniture.
///
/// Created on furniture selection from the committed rotation and dropped when
/// the selection changes.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformBuffer {
    furniture_id: String,
    value: f64,
}

impl TransformBuffer {
    /// Starts a buffer holding the committed rotation of `furniture`.
    #[must_use]
    pub fn new(furniture: &FurnitureFeature) -> Self {
        Self {
            furniture_id: furniture.id.clone(),
            value: furniture.properties.rotation_or_default(),
        }
    }

    /// Id of the furniture this buffer edits.
    #[must_use]
    pub fn furniture_id(&self) -> &str {
        &self.furniture_id
    }

    /// Buffered rotation in degrees.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Replaces the buffered value.
    pub fn on_input(&mut self, value: f64) {
        self.value = value;
    }

    /// Writes the buffered value into the furniture's rotation.
    ///
    /// Returns the updated feature, or `None` if the furniture is no longer in
    /// the collection.
    pub fn on_commit<'a>(
        &self,
        furniture: &'a mut FeatureCollection<FurnitureProperties>,
    ) -> Option<&'a FurnitureFeature> {
        let feature = furniture.get_mut(&self.furniture_id)?;
        feature.properties.rotation = Some(self.value);
        Some(&*feature)
    }
}
