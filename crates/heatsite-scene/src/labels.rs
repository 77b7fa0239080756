//! UI label colors mirroring highlight state

use bevy::prelude::*;
use heatsite_core::{GroupId, HighlightError, LabelSink};
use std::collections::BTreeMap;

use crate::types::ActiveProfile;

/// Registered labels and their current CSS colors.
///
/// Front ends read this resource when it changes and copy the colors to
/// their own widgets (DOM elements, egui buttons).
#[derive(Debug, Clone, Resource, Default)]
pub struct LabelBoard {
    colors: BTreeMap<String, String>,
}

impl LabelBoard {
    pub fn register(&mut self, id: impl Into<String>, color: impl Into<String>) {
        self.colors.insert(id.into(), color.into());
    }

    /// Drop a label whose widget does not exist; toggles using it are refused
    pub fn unregister(&mut self, id: &str) -> bool {
        self.colors.remove(id).is_some()
    }

    pub fn color(&self, id: &str) -> Option<&str> {
        self.colors.get(id).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.colors.iter().map(|(id, color)| (id.as_str(), color.as_str()))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl LabelSink for LabelBoard {
    fn has_label(&self, id: &str) -> bool {
        self.colors.contains_key(id)
    }

    fn set_label_color(&mut self, id: &str, color: &str) -> Result<(), HighlightError> {
        let entry = self
            .colors
            .get_mut(id)
            .ok_or_else(|| HighlightError::UnknownLabel(id.to_string()))?;
        *entry = color.to_string();
        Ok(())
    }
}

/// Register one label per group in the profile's default color
pub fn register_group_labels(profile: Res<ActiveProfile>, mut board: ResMut<LabelBoard>) {
    for group in GroupId::ALL {
        board.register(group.label_id(), profile.0.default_label_color.clone());
    }
}
