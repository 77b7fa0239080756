//! Camera controls and orbit navigation

use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use heatsite_core::CameraConfig;

use crate::types::ActiveProfile;

/// Orbit state around a focus point (Y is up)
#[derive(Debug, Clone, Resource)]
pub struct CameraSettings {
    pub distance: f32,
    pub target_distance: f32,
    pub azimuth: f32,
    pub elevation: f32,
    pub target: Vec3,
    pub target_focus: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub smooth_factor: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl CameraSettings {
    /// Derive the orbit from a start position looking at the configured target
    pub fn from_config(config: &CameraConfig) -> Self {
        let target = Vec3::from_array(config.target);
        let offset = Vec3::from_array(config.position) - target;
        let distance = offset.length().max(config.min_distance);
        let elevation = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let azimuth = offset.z.atan2(offset.x);

        Self {
            distance,
            target_distance: distance,
            azimuth,
            elevation,
            target,
            target_focus: target,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            sensitivity: 0.005,
            zoom_speed: 0.1,
            smooth_factor: config.damping,
        }
    }

    pub fn eye(&self) -> Vec3 {
        let horizontal = self.distance * self.elevation.cos();
        self.target
            + Vec3::new(
                horizontal * self.azimuth.cos(),
                self.distance * self.elevation.sin(),
                horizontal * self.azimuth.sin(),
            )
    }

    pub fn zoom(&mut self, factor: f32) {
        self.target_distance =
            (self.target_distance * factor).clamp(self.min_distance, self.max_distance);
    }

    /// Ease distance and focus towards their targets
    pub fn step(&mut self, dt: f32) {
        let lerp_factor = 1.0 - (-self.smooth_factor * 60.0 * dt).exp();
        self.distance += (self.target_distance - self.distance) * lerp_factor;
        self.target += (self.target_focus - self.target) * lerp_factor;
    }
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Plugin for camera controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        let settings = app
            .world()
            .get_resource::<ActiveProfile>()
            .and_then(|profile| match profile.0.camera.validate() {
                Ok(()) => Some(CameraSettings::from_config(&profile.0.camera)),
                Err(e) => {
                    tracing::warn!("{}, using default camera", e);
                    None
                }
            })
            .unwrap_or_default();
        app.insert_resource(settings)
            .add_systems(Update, update_camera);
    }
}

fn update_camera(
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
    mut settings: ResMut<CameraSettings>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut mouse_wheel: MessageReader<MouseWheel>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    time: Res<Time>,
    mut contexts: bevy_egui::EguiContexts,
) {
    // Leave the pointer to egui while it is over a panel
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);

    // Accumulate every mouse delta for this frame
    let mut total_motion = Vec2::ZERO;
    for motion in mouse_motion.read() {
        total_motion += motion.delta;
    }

    // Orbit with left drag, elevation stops short of the poles
    if mouse_button.pressed(MouseButton::Left) && !egui_wants_pointer {
        settings.azimuth += total_motion.x * settings.sensitivity;
        settings.elevation =
            (settings.elevation + total_motion.y * settings.sensitivity).clamp(-1.5, 1.5);
    }

    // Pan in the view plane
    if mouse_button.pressed(MouseButton::Right) && !egui_wants_pointer {
        let right = Vec3::new(-settings.azimuth.sin(), 0.0, settings.azimuth.cos());
        let pan_speed = settings.distance * 0.002;
        settings.target_focus -= right * total_motion.x * pan_speed;
        settings.target_focus += Vec3::Y * total_motion.y * pan_speed;
    }

    // Scroll up zooms in
    if !egui_wants_pointer {
        for scroll in mouse_wheel.read() {
            let factor = 1.0 - scroll.y * settings.zoom_speed * 0.3;
            settings.zoom(factor);
        }
    } else {
        // Drain so a scroll over a panel doesn't zoom later
        for _ in mouse_wheel.read() {}
    }

    // Single finger orbits like a left drag
    if touch_input.iter().count() == 1 && !egui_wants_pointer {
        for touch in touch_input.iter() {
            let delta = touch.delta();
            if delta != Vec2::ZERO {
                settings.azimuth += delta.x * settings.sensitivity;
                settings.elevation =
                    (settings.elevation + delta.y * settings.sensitivity).clamp(-1.5, 1.5);
            }
        }
    }

    // Pinch to zoom
    if touch_input.iter().count() == 2 {
        let touches: Vec<_> = touch_input.iter().collect();
        if let (Some(t1), Some(t2)) = (touches.first(), touches.get(1)) {
            let curr_dist = t1.position().distance(t2.position());
            let prev_dist = (t1.position() - t1.delta()).distance(t2.position() - t2.delta());
            settings.zoom(prev_dist / curr_dist.max(1.0));
        }
    }

    // Smoothing applies to wheel and pinch zoom and to panning
    settings.step(time.delta_secs());

    if let Ok(mut transform) = camera_query.single_mut() {
        transform.translation = settings.eye();
        transform.look_at(settings.target, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_reproduces_position() {
        let config = CameraConfig::default();
        let settings = CameraSettings::from_config(&config);

        let eye = settings.eye();
        let expected = Vec3::from_array(config.position);
        assert!(eye.distance(expected) < 1e-3, "eye {:?} vs {:?}", eye, expected);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut settings = CameraSettings::default();
        settings.zoom(100.0);
        assert_eq!(settings.target_distance, settings.max_distance);
        settings.zoom(0.0);
        assert_eq!(settings.target_distance, settings.min_distance);
    }

    #[test]
    fn test_invalid_profile_camera_falls_back() {
        let mut profile = heatsite_core::Profile::default();
        profile.camera.min_distance = 100.0;
        profile.camera.max_distance = 80.0;

        let mut app = App::new();
        app.insert_resource(ActiveProfile(profile));
        app.add_plugins(CameraPlugin);

        let settings = app.world().resource::<CameraSettings>();
        assert_eq!(settings.min_distance, CameraConfig::default().min_distance);
        assert_eq!(settings.max_distance, CameraConfig::default().max_distance);

        let mut settings = settings.clone();
        settings.zoom(100.0);
        assert_eq!(settings.target_distance, settings.max_distance);
    }

    #[test]
    fn test_step_eases_towards_target() {
        let mut settings = CameraSettings::default();
        settings.target_distance = settings.distance - 10.0;
        let before = settings.distance;
        settings.step(1.0 / 60.0);
        assert!(settings.distance < before);
        assert!(settings.distance > settings.target_distance);
    }
}
