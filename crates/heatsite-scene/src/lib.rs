//! Heatsite Scene - Bevy front end shared by the web and desktop viewers
//!
//! Loads the site model and assembles the scene registry once the glTF scene
//! is spawned. Highlight requests run through the core controller.

pub mod camera;
pub mod highlight;
pub mod labels;
pub mod models;
pub mod scene;
pub mod types;
pub mod ui;

use bevy::prelude::*;
use heatsite_core::Profile;

/// Plugin that sets up the shared 3D scene components.
///
/// Hosts add `DefaultPlugins` and `EguiPlugin` before this one.
pub struct HeatsiteScenePlugin {
    pub profile: Profile,
    pub show_buttons: bool,
}

impl HeatsiteScenePlugin {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            show_buttons: true,
        }
    }
}

impl Plugin for HeatsiteScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ActiveProfile(self.profile.clone()))
            .insert_resource(ControlPanel {
                show_buttons: self.show_buttons,
            })
            .init_resource::<LoadStatus>()
            .init_resource::<labels::LabelBoard>()
            .add_systems(Startup, labels::register_group_labels)
            .add_plugins(camera::CameraPlugin)
            .add_plugins(scene::SceneSetupPlugin)
            .add_plugins(highlight::HighlightPlugin)
            .add_plugins(models::ModelsPlugin)
            .add_plugins(ui::UiPlugin);
    }
}

// Re-export commonly used types
pub use camera::{CameraSettings, MainCamera};
pub use highlight::SiteHighlighter;
pub use labels::LabelBoard;
pub use types::*;
