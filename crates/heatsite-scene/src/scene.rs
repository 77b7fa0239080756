//! Scene setup - camera and lights

use bevy::prelude::*;

use crate::camera::{CameraSettings, MainCamera};

/// Marker component for the main directional light
#[derive(Component)]
pub struct MainDirectionalLight;

/// Plugin for scene setup
pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_scene);
    }
}

fn setup_scene(mut commands: Commands, camera: Res<CameraSettings>) {
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            near: 0.1,
            far: 1000.0,
            ..default()
        }),
        Transform::from_translation(camera.eye()).looking_at(camera.target, Vec3::Y),
        MainCamera,
    ));

    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.9, 0.95, 1.0),
        brightness: 400.0,
        ..default()
    });

    // Sun from above the site
    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(30.0, 60.0, 20.0).looking_at(Vec3::ZERO, Vec3::Y),
        MainDirectionalLight,
    ));

    // Warm fill on the camera side
    commands.spawn((
        PointLight {
            intensity: 4_000_000.0,
            range: 200.0,
            shadows_enabled: false,
            color: Color::srgb(1.0, 0.95, 0.9),
            ..default()
        },
        Transform::from_xyz(-40.0, 30.0, -10.0),
    ));
}
