//! Deployment profile - model path, highlight styling, and camera tunables
//!
//! Profiles are TOML by default. Content that starts with `{` is read as JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::color::{ColorError, Rgb};
use crate::group::GroupId;
use crate::highlight::{HighlightSettings, HighlightStyle};
use crate::slot::Slot;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Failed to read profile: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse profile: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to parse JSON profile: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid color for {field}: {source}")]
    InvalidColor {
        field: String,
        #[source]
        source: ColorError,
    },
    #[error("Dim opacity {0} is outside (0, 1]")]
    InvalidOpacity(f32),
    #[error("Emissive intensity for group '{group}' must be positive, got {value}")]
    InvalidIntensity { group: GroupId, value: f32 },
    #[error("Unknown group '{0}' in profile")]
    UnknownGroup(String),
    #[error("Unknown enclosure node '{0}'")]
    UnknownEnclosure(String),
    #[error("Invalid camera setting: {0}")]
    InvalidCamera(String),
}

/// Per-group overrides; unset fields fall back to the group defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupStyleConfig {
    #[serde(default)]
    pub intensity: Option<f32>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Orbit camera tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Initial camera position (Y up)
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    /// Point the camera orbits around
    #[serde(default)]
    pub target: [f32; 3],
    #[serde(default = "default_min_distance")]
    pub min_distance: f32,
    #[serde(default = "default_max_distance")]
    pub max_distance: f32,
    /// Smoothing factor applied per 60Hz frame
    #[serde(default = "default_damping")]
    pub damping: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            target: [0.0; 3],
            min_distance: default_min_distance(),
            max_distance: default_max_distance(),
            damping: default_damping(),
        }
    }
}

impl CameraConfig {
    /// Reject bounds the orbit controls cannot clamp to
    pub fn validate(&self) -> Result<(), ProfileError> {
        let finite = self
            .position
            .iter()
            .chain(self.target.iter())
            .chain([self.min_distance, self.max_distance, self.damping].iter())
            .all(|v| v.is_finite());
        if !finite {
            return Err(ProfileError::InvalidCamera(
                "values must be finite".to_string(),
            ));
        }
        if self.min_distance <= 0.0 {
            return Err(ProfileError::InvalidCamera(format!(
                "min_distance {} must be positive",
                self.min_distance
            )));
        }
        if self.min_distance > self.max_distance {
            return Err(ProfileError::InvalidCamera(format!(
                "min_distance {} exceeds max_distance {}",
                self.min_distance, self.max_distance
            )));
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(ProfileError::InvalidCamera(format!(
                "damping {} is outside (0, 1]",
                self.damping
            )));
        }
        Ok(())
    }
}

fn default_camera_position() -> [f32; 3] {
    [-50.0, 40.0, 0.0]
}

fn default_min_distance() -> f32 {
    5.0
}

fn default_max_distance() -> f32 {
    80.0
}

fn default_damping() -> f32 {
    0.15
}

/// Viewer profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// glTF asset path, relative to the asset root
    #[serde(default = "default_model_path")]
    pub model_path: String,
    /// Opacity applied to the whole scene while a group is highlighted
    #[serde(default = "default_dim_opacity")]
    pub dim_opacity: f32,
    #[serde(default = "default_active_label_color")]
    pub active_label_color: String,
    #[serde(default = "default_label_color")]
    pub default_label_color: String,
    /// Node hidden while a group is highlighted; empty disables
    #[serde(default = "default_enclosure")]
    pub enclosure: String,
    /// Per-group style overrides keyed by group id
    #[serde(default)]
    pub groups: BTreeMap<String, GroupStyleConfig>,
    #[serde(default)]
    pub camera: CameraConfig,
}

fn default_model_path() -> String {
    "models/main.glb".to_string()
}

fn default_dim_opacity() -> f32 {
    0.2
}

fn default_active_label_color() -> String {
    "#11ff11".to_string()
}

fn default_label_color() -> String {
    "black".to_string()
}

fn default_enclosure() -> String {
    Slot::ContainerGreen.name().to_string()
}

/// Emissive intensity a group uses when the profile does not override it
pub fn default_intensity(group: GroupId) -> f32 {
    match group {
        GroupId::Sensor => 50.0,
        _ => 20.0,
    }
}

const DEFAULT_HIGHLIGHT_COLOR: &str = "green";

impl Default for Profile {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            dim_opacity: default_dim_opacity(),
            active_label_color: default_active_label_color(),
            default_label_color: default_label_color(),
            enclosure: default_enclosure(),
            groups: BTreeMap::new(),
            camera: CameraConfig::default(),
        }
    }
}

impl Profile {
    /// Load a profile from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ProfileError> {
        let profile: Profile = toml::from_str(content)?;
        Ok(profile)
    }

    /// Load a profile from a JSON string
    pub fn from_json(content: &str) -> Result<Self, ProfileError> {
        let profile: Profile = serde_json::from_str(content)?;
        Ok(profile)
    }

    /// Parse TOML or JSON, chosen by the first non-whitespace character
    pub fn parse(content: &str) -> Result<Self, ProfileError> {
        if content.trim_start().starts_with('{') {
            Self::from_json(content)
        } else {
            Self::from_toml(content)
        }
    }

    /// Load and validate a profile file
    pub fn from_file(path: &Path) -> Result<Self, ProfileError> {
        let content = std::fs::read_to_string(path)?;
        let profile = Self::parse(&content)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        self.enclosure_slot()?;
        self.camera.validate()?;
        self.highlight_settings().map(|_| ())
    }

    /// Slot of the enclosure node, `None` when disabled
    pub fn enclosure_slot(&self) -> Result<Option<Slot>, ProfileError> {
        if self.enclosure.is_empty() {
            return Ok(None);
        }
        Slot::from_name(&self.enclosure)
            .map(Some)
            .ok_or_else(|| ProfileError::UnknownEnclosure(self.enclosure.clone()))
    }

    /// Resolve every group's style and the shared highlight settings
    pub fn highlight_settings(&self) -> Result<HighlightSettings, ProfileError> {
        if !(self.dim_opacity > 0.0 && self.dim_opacity <= 1.0) {
            return Err(ProfileError::InvalidOpacity(self.dim_opacity));
        }

        for key in self.groups.keys() {
            if GroupId::from_id(key).is_none() {
                return Err(ProfileError::UnknownGroup(key.clone()));
            }
        }

        parse_color("active_label_color", &self.active_label_color)?;
        parse_color("default_label_color", &self.default_label_color)?;

        let mut styles = BTreeMap::new();
        for group in GroupId::ALL {
            let overrides = self.groups.get(group.id());
            let intensity = overrides
                .and_then(|o| o.intensity)
                .unwrap_or_else(|| default_intensity(group));
            if !(intensity > 0.0 && intensity.is_finite()) {
                return Err(ProfileError::InvalidIntensity {
                    group,
                    value: intensity,
                });
            }
            let color_str = overrides
                .and_then(|o| o.color.as_deref())
                .unwrap_or(DEFAULT_HIGHLIGHT_COLOR);
            let color = parse_color(&format!("groups.{}.color", group), color_str)?;

            styles.insert(
                group,
                HighlightStyle {
                    intensity,
                    color,
                    label_id: group.label_id().to_string(),
                },
            );
        }

        Ok(HighlightSettings {
            dim_opacity: self.dim_opacity,
            active_label_color: self.active_label_color.clone(),
            default_label_color: self.default_label_color.clone(),
            styles,
        })
    }
}

fn parse_color(field: &str, value: &str) -> Result<Rgb, ProfileError> {
    Rgb::parse(value).map_err(|source| ProfileError::InvalidColor {
        field: field.to_string(),
        source,
    })
}
