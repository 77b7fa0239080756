//! Bevy application setup

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::{prelude::MeshPickingPlugin, DefaultPickingPlugins};
use heatsite_core::Profile;
use heatsite_scene::HeatsiteScenePlugin;

use crate::dom::DomLabelsPlugin;

const EMBEDDED_PROFILE: &str = include_str!("../assets/profile.toml");

/// Profile compiled into the bundle; invalid content falls back to defaults
pub fn embedded_profile() -> Profile {
    let profile = Profile::parse(EMBEDDED_PROFILE).and_then(|p| p.validate().map(|_| p));
    match profile {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!("Embedded profile rejected, using defaults: {}", e);
            Profile::default()
        }
    }
}

/// `?model=` query parameter of the page, if any
fn model_override() -> Option<String> {
    let href = web_sys::window()?.location().href().ok()?;
    let url = web_sys::Url::new(&href).ok()?;
    url.search_params().get("model").filter(|m| !m.is_empty())
}

pub fn run() {
    let mut profile = embedded_profile();
    if let Some(model) = model_override() {
        tracing::info!("Loading model from URL parameter: {}", model);
        profile.model_path = model;
    }

    App::new()
        .insert_resource(ClearColor(Color::srgb(0.92, 0.93, 0.95)))
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Heatsite Viewer".to_string(),
                        canvas: Some("#viewer-canvas".to_string()),
                        fit_canvas_to_parent: true,
                        prevent_default_event_handling: false,
                        ..default()
                    }),
                    ..default()
                })
                .set(AssetPlugin {
                    // Models are served next to index.html
                    file_path: "".to_string(),
                    meta_check: bevy::asset::AssetMetaCheck::Never,
                    ..default()
                }),
        )
        // Picking must be registered before EguiPlugin so it is detected
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(MeshPickingPlugin)
        .add_plugins(EguiPlugin::default())
        .add_plugins(HeatsiteScenePlugin {
            profile,
            show_buttons: false,
        })
        .add_plugins(DomLabelsPlugin)
        .run();
}
