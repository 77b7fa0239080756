//! Highlight systems - runs the controller against the ECS world

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use heatsite_core::{HighlightError, Highlighter, Rgb, SceneSurface, ToggleOutcome};

use crate::labels::LabelBoard;
use crate::models::IsolatedMaterial;
use crate::types::{ActiveProfile, HighlightRequest};

pub struct HighlightPlugin;

impl Plugin for HighlightPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<HighlightRequest>()
            .init_resource::<SiteHighlighter>()
            .add_systems(Update, apply_highlight_requests);
    }
}

/// Highlight controller over scene entities
#[derive(Resource, Deref, DerefMut)]
pub struct SiteHighlighter(pub Highlighter<Entity>);

impl FromWorld for SiteHighlighter {
    fn from_world(world: &mut World) -> Self {
        let settings = world
            .get_resource::<ActiveProfile>()
            .map(|profile| profile.0.highlight_settings())
            .transpose()
            .unwrap_or_else(|e| {
                tracing::error!("Invalid highlight profile, using defaults: {}", e);
                None
            })
            .unwrap_or_default();
        Self(Highlighter::new(settings))
    }
}

/// ECS-backed [`SceneSurface`]: site model materials and node visibility
#[derive(SystemParam)]
pub struct SceneAccess<'w, 's> {
    names: Query<'w, 's, &'static Name>,
    children: Query<'w, 's, &'static Children>,
    mesh_materials: Query<'w, 's, &'static MeshMaterial3d<StandardMaterial>>,
    isolated: Query<'w, 's, (&'static MeshMaterial3d<StandardMaterial>, &'static IsolatedMaterial)>,
    visibility: Query<'w, 's, &'static mut Visibility>,
    materials: ResMut<'w, Assets<StandardMaterial>>,
}

impl SceneAccess<'_, '_> {
    fn require(&self, node: Entity) -> Result<(), HighlightError> {
        self.names
            .get(node)
            .map(|_| ())
            .map_err(|_| HighlightError::NodeMissing(format!("{:?}", node)))
    }

    /// Materials of every renderable in the node's subtree
    fn subtree_materials(&self, node: Entity) -> Vec<AssetId<StandardMaterial>> {
        let mut found = Vec::new();
        let mut stack = vec![node];
        while let Some(entity) = stack.pop() {
            if let Ok(material) = self.mesh_materials.get(entity) {
                found.push(material.0.id());
            }
            if let Ok(children) = self.children.get(entity) {
                stack.extend_from_slice(children);
            }
        }
        found
    }
}

impl SceneSurface for SceneAccess<'_, '_> {
    type Node = Entity;

    /// Opacity 1.0 restores each material's authored alpha and blend mode
    fn set_scene_opacity(&mut self, opacity: f32) -> Result<(), HighlightError> {
        for (handle, original) in self.isolated.iter() {
            let Some(material) = self.materials.get_mut(&handle.0) else {
                continue;
            };
            // Blend is only forced while dimmed
            if opacity >= 1.0 {
                material.base_color.set_alpha(original.base_alpha);
                material.alpha_mode = original.alpha_mode;
            } else {
                material.base_color.set_alpha(opacity);
                material.alpha_mode = AlphaMode::Blend;
            }
        }
        Ok(())
    }

    fn set_visible(&mut self, node: Entity, visible: bool) -> Result<(), HighlightError> {
        let mut visibility = self
            .visibility
            .get_mut(node)
            .map_err(|_| HighlightError::NodeMissing(format!("{:?}", node)))?;
        // Inherited rather than Visible so a hidden ancestor still wins
        *visibility = if visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        Ok(())
    }

    fn set_emissive(&mut self, node: Entity, color: Rgb, intensity: f32) -> Result<(), HighlightError> {
        self.require(node)?;
        // Intensity scales the linear color, as the glTF emissive strength does
        let emissive = Color::srgb(color.r, color.g, color.b).to_linear() * intensity;
        for id in self.subtree_materials(node) {
            if let Some(material) = self.materials.get_mut(id) {
                material.emissive = emissive;
            }
        }
        Ok(())
    }
}

/// Apply queued highlight requests. Failures are logged; the frame goes on.
pub fn apply_highlight_requests(
    mut requests: MessageReader<HighlightRequest>,
    mut highlighter: ResMut<SiteHighlighter>,
    mut labels: ResMut<LabelBoard>,
    mut scene: SceneAccess,
) {
    for HighlightRequest(group) in requests.read().copied() {
        match highlighter.toggle(group, &mut scene, &mut *labels) {
            Ok(ToggleOutcome::Blocked { requested, active }) => {
                tracing::info!("{} is highlighted; toggle it off before {}", active, requested);
            }
            Ok(_) => {}
            Err(e) => tracing::error!("Highlight {} failed: {}", group, e),
        }
    }
}
