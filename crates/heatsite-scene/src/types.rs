//! Shared resources, components, and messages

use bevy::prelude::*;
use heatsite_core::{GroupId, Profile};

/// Profile the viewer was started with
#[derive(Debug, Clone, Resource, Default)]
pub struct ActiveProfile(pub Profile);

/// Progress of the site model from request to assembled registry
#[derive(Debug, Clone, PartialEq, Eq, Resource, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    /// glTF requested, waiting on the asset server
    Loading,
    /// Scene spawned, waiting for the instance to be ready
    Spawning,
    /// Registry attached; `problems` lists groups or nodes that are unusable
    Ready { problems: Vec<String> },
    Failed(String),
}

impl LoadStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadStatus::Ready { .. })
    }

    pub fn summary(&self) -> String {
        match self {
            LoadStatus::Idle => "Idle".to_string(),
            LoadStatus::Loading => "Loading model...".to_string(),
            LoadStatus::Spawning => "Preparing scene...".to_string(),
            LoadStatus::Ready { problems } if problems.is_empty() => "Ready".to_string(),
            LoadStatus::Ready { problems } => format!("Ready ({} problems)", problems.len()),
            LoadStatus::Failed(reason) => format!("Failed: {}", reason),
        }
    }
}

/// Whether the egui panel shows group buttons (front ends without DOM controls)
#[derive(Debug, Clone, Copy, Resource, PartialEq, Eq)]
pub struct ControlPanel {
    pub show_buttons: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self { show_buttons: true }
    }
}

/// Marker for the root entity of the spawned site model
#[derive(Component)]
pub struct SiteModel;

/// Tags a scene node bound into a semantic group
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupMember(pub GroupId);

/// Empty organizational container spawned per assembled group
#[derive(Component, Debug, Clone, Copy)]
pub struct SemanticGroupRoot(pub GroupId);

/// Request to toggle the highlight of one group
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightRequest(pub GroupId);
