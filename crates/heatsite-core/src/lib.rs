//! Heatsite Core - Scene registry and highlight state machine
//!
//! This crate provides the engine-independent parts of the Heatsite viewer:
//! - Typed slots for every named object expected in the site model
//! - Semantic group assembly from a scene traversal
//! - The single-focus highlight controller
//! - Viewer profiles (TOML/JSON) and color parsing

pub mod color;
pub mod group;
pub mod highlight;
pub mod profile;
pub mod registry;
pub mod slot;

pub use color::{ColorError, Rgb};
pub use group::{GroupId, SemanticGroup, UnknownGroupError};
pub use highlight::{
    HighlightError, HighlightSettings, HighlightStyle, Highlighter, LabelSink, SceneSurface,
    ToggleOutcome,
};
pub use profile::{CameraConfig, GroupStyleConfig, Profile, ProfileError};
pub use registry::{AssemblyError, AssemblyReport, BindOutcome, SceneRegistry, SlotBindings};
pub use slot::Slot;
