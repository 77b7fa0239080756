//! Highlight controller - single-focus emphasis of one semantic group
//!
//! The controller owns the only piece of highlight state, the active group.
//! A group is "on" when it is the active group; the scene is "focused" when
//! any group is active. Toggling a second group while one is active is a
//! no-op until the first is toggled off.
//!
//! Scene and label mutations go through [`SceneSurface`] and [`LabelSink`]
//! so the state machine can run against an engine or an in-memory scene.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::color::Rgb;
use crate::group::GroupId;
use crate::profile::default_intensity;
use crate::registry::SceneRegistry;
use crate::slot::Slot;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HighlightError {
    #[error("Scene is not ready: the site model has not finished loading")]
    NotReady,
    #[error("Group '{group}' is unavailable, missing nodes: {}", slot_names(.missing))]
    GroupUnavailable { group: GroupId, missing: Vec<Slot> },
    #[error("Label '{0}' is not registered")]
    UnknownLabel(String),
    #[error("Scene node {0} no longer exists")]
    NodeMissing(String),
}

fn slot_names(slots: &[Slot]) -> String {
    let names: Vec<&str> = slots.iter().map(|s| s.name()).collect();
    names.join(", ")
}

/// Mutable view of the rendered scene
pub trait SceneSurface {
    type Node: Copy;

    /// Set the opacity of every material in the scene
    fn set_scene_opacity(&mut self, opacity: f32) -> Result<(), HighlightError>;

    fn set_visible(&mut self, node: Self::Node, visible: bool) -> Result<(), HighlightError>;

    /// Set emissive color and intensity on every renderable in the node's subtree
    fn set_emissive(
        &mut self,
        node: Self::Node,
        color: Rgb,
        intensity: f32,
    ) -> Result<(), HighlightError>;
}

/// UI labels that mirror highlight state, addressed by id
pub trait LabelSink {
    fn has_label(&self, id: &str) -> bool;

    fn set_label_color(&mut self, id: &str, color: &str) -> Result<(), HighlightError>;
}

/// How one group is emphasized
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightStyle {
    /// Emissive strength, positive
    pub intensity: f32,
    pub color: Rgb,
    pub label_id: String,
}

impl HighlightStyle {
    pub fn default_for(group: GroupId) -> Self {
        Self {
            intensity: default_intensity(group),
            color: Rgb::from_u8(0, 128, 0),
            label_id: group.label_id().to_string(),
        }
    }
}

/// Styling shared by all groups plus per-group styles
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightSettings {
    pub dim_opacity: f32,
    pub active_label_color: String,
    pub default_label_color: String,
    pub styles: BTreeMap<GroupId, HighlightStyle>,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            dim_opacity: 0.2,
            active_label_color: "#11ff11".to_string(),
            default_label_color: "black".to_string(),
            styles: GroupId::ALL
                .into_iter()
                .map(|g| (g, HighlightStyle::default_for(g)))
                .collect(),
        }
    }
}

impl HighlightSettings {
    pub fn style(&self, group: GroupId) -> HighlightStyle {
        self.styles
            .get(&group)
            .cloned()
            .unwrap_or_else(|| HighlightStyle::default_for(group))
    }
}

/// What a toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The group is now highlighted
    Activated(GroupId),
    /// The group was highlighted and has been restored
    Deactivated(GroupId),
    /// Another group holds focus; nothing changed
    Blocked { requested: GroupId, active: GroupId },
}

impl ToggleOutcome {
    /// The requested group's flag after the toggle
    pub fn is_on(&self) -> bool {
        matches!(self, ToggleOutcome::Activated(_))
    }
}

/// Single-focus highlight controller
#[derive(Debug, Clone)]
pub struct Highlighter<N> {
    settings: HighlightSettings,
    registry: Option<SceneRegistry<N>>,
    active: Option<GroupId>,
}

impl<N: Copy> Default for Highlighter<N> {
    fn default() -> Self {
        Self::new(HighlightSettings::default())
    }
}

impl<N: Copy> Highlighter<N> {
    pub fn new(settings: HighlightSettings) -> Self {
        Self {
            settings,
            registry: None,
            active: None,
        }
    }

    /// Hand over an assembled registry; toggles are accepted from now on
    pub fn attach(&mut self, registry: SceneRegistry<N>) {
        self.registry = Some(registry);
        self.active = None;
    }

    pub fn registry(&self) -> Option<&SceneRegistry<N>> {
        self.registry.as_ref()
    }

    pub fn settings(&self) -> &HighlightSettings {
        &self.settings
    }

    pub fn is_ready(&self) -> bool {
        self.registry.is_some()
    }

    pub fn active(&self) -> Option<GroupId> {
        self.active
    }

    pub fn is_highlighted(&self, group: GroupId) -> bool {
        self.active == Some(group)
    }

    /// Whether a toggle on this group can run
    pub fn is_available(&self, group: GroupId) -> bool {
        self.registry
            .as_ref()
            .is_some_and(|r| r.group(group).is_some())
    }

    pub fn available_groups(&self) -> Vec<GroupId> {
        GroupId::ALL
            .into_iter()
            .filter(|g| self.is_available(*g))
            .collect()
    }

    /// Toggle a group using its style from the settings
    pub fn toggle<S, L>(
        &mut self,
        group: GroupId,
        surface: &mut S,
        labels: &mut L,
    ) -> Result<ToggleOutcome, HighlightError>
    where
        S: SceneSurface<Node = N>,
        L: LabelSink,
    {
        let style = self.settings.style(group);
        self.toggle_with(group, &style, surface, labels)
    }

    /// Toggle a group with an explicit style.
    ///
    /// Preconditions are checked before anything is mutated. If a mutation
    /// fails while focusing, the scene is restored on a best-effort basis and
    /// the group stays off. Turning a group off always releases focus; a
    /// failed restore step is returned after the remaining steps have run.
    pub fn toggle_with<S, L>(
        &mut self,
        group: GroupId,
        style: &HighlightStyle,
        surface: &mut S,
        labels: &mut L,
    ) -> Result<ToggleOutcome, HighlightError>
    where
        S: SceneSurface<Node = N>,
        L: LabelSink,
    {
        let registry = self.registry.as_ref().ok_or(HighlightError::NotReady)?;
        let members: Vec<N> = registry
            .group(group)
            .ok_or_else(|| HighlightError::GroupUnavailable {
                group,
                missing: registry.missing_for(group).to_vec(),
            })?
            .nodes()
            .collect();
        let enclosure = registry.enclosure();

        if !labels.has_label(&style.label_id) {
            return Err(HighlightError::UnknownLabel(style.label_id.clone()));
        }

        match self.active {
            Some(active) if active == group => {
                // Focus is released even if part of the restore failed
                let restored = self.restore(&members, enclosure, style, surface, labels);
                self.active = None;
                match restored {
                    Ok(()) => {
                        tracing::info!("Highlight off: {}", group);
                        Ok(ToggleOutcome::Deactivated(group))
                    }
                    Err(e) => {
                        tracing::warn!("Highlight off: {} (partial restore: {})", group, e);
                        Err(e)
                    }
                }
            }
            Some(active) => {
                tracing::debug!("Highlight of {} blocked, {} is active", group, active);
                Ok(ToggleOutcome::Blocked {
                    requested: group,
                    active,
                })
            }
            None => {
                if let Err(e) = self.focus(&members, enclosure, style, surface, labels) {
                    if let Err(restore_err) = self.restore(&members, enclosure, style, surface, labels) {
                        tracing::warn!("Restore after failed highlight also failed: {}", restore_err);
                    }
                    return Err(e);
                }
                self.active = Some(group);
                tracing::info!("Highlight on: {}", group);
                Ok(ToggleOutcome::Activated(group))
            }
        }
    }

    fn focus<S, L>(
        &self,
        members: &[N],
        enclosure: Option<N>,
        style: &HighlightStyle,
        surface: &mut S,
        labels: &mut L,
    ) -> Result<(), HighlightError>
    where
        S: SceneSurface<Node = N>,
        L: LabelSink,
    {
        surface.set_scene_opacity(self.settings.dim_opacity)?;
        if let Some(enclosure) = enclosure {
            surface.set_visible(enclosure, false)?;
        }
        for node in members {
            surface.set_emissive(*node, style.color, style.intensity)?;
        }
        labels.set_label_color(&style.label_id, &self.settings.active_label_color)
    }

    fn restore<S, L>(
        &self,
        members: &[N],
        enclosure: Option<N>,
        style: &HighlightStyle,
        surface: &mut S,
        labels: &mut L,
    ) -> Result<(), HighlightError>
    where
        S: SceneSurface<Node = N>,
        L: LabelSink,
    {
        // Every step runs even after a failure; the first error is returned
        let mut first_err = surface.set_scene_opacity(1.0).err();
        if let Some(enclosure) = enclosure {
            if let Err(e) = surface.set_visible(enclosure, true) {
                first_err.get_or_insert(e);
            }
        }
        for node in members {
            if let Err(e) = surface.set_emissive(*node, Rgb::BLACK, 1.0) {
                first_err.get_or_insert(e);
            }
        }
        if let Err(e) = labels.set_label_color(&style.label_id, &self.settings.default_label_color) {
            first_err.get_or_insert(e);
        }
        first_err.map_or(Ok(()), Err)
    }
}
