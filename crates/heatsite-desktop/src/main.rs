//! Heatsite Desktop - native viewer entry point

mod input;

use anyhow::{Context, Result};
use bevy::app::PluginGroupBuilder;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::{prelude::MeshPickingPlugin, DefaultPickingPlugins};
use clap::Parser;
use heatsite_core::Profile;
use heatsite_scene::HeatsiteScenePlugin;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "heatsite")]
#[command(about = "Interactive viewer for the Heatsite infrastructure model")]
#[command(version)]
struct Args {
    /// Viewer profile (TOML or JSON); built-in defaults when omitted
    #[arg(short, long)]
    profile: Option<PathBuf>,

    /// glTF model path relative to the asset directory
    #[arg(short, long)]
    model: Option<String>,

    /// Directory assets are loaded from
    #[arg(short, long, default_value = "assets")]
    assets: PathBuf,

    /// Hide the egui group buttons
    #[arg(long)]
    no_buttons: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn load_profile(path: Option<&Path>, model: Option<String>) -> Result<Profile> {
    let mut profile = match path {
        Some(path) => Profile::from_file(path)
            .with_context(|| format!("Failed to load profile {}", path.display()))?,
        None => Profile::default(),
    };
    if let Some(model) = model {
        profile.model_path = model;
    }
    Ok(profile)
}

/// Engine plugins for the native window. Logging goes through the
/// subscriber installed in `main`, so bevy's own `LogPlugin` is left out.
fn viewer_plugins(assets: &Path) -> PluginGroupBuilder {
    DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(Window {
                title: "Heatsite Viewer".to_string(),
                ..default()
            }),
            ..default()
        })
        .set(AssetPlugin {
            file_path: assets.to_string_lossy().into_owned(),
            ..default()
        })
        .disable::<LogPlugin>()
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&args.log_level))
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Heatsite v{}", env!("CARGO_PKG_VERSION"));

    let profile = load_profile(args.profile.as_deref(), args.model)?;
    info!(model = %profile.model_path, "Profile loaded");

    App::new()
        .insert_resource(ClearColor(Color::srgb(0.92, 0.93, 0.95)))
        .add_plugins(viewer_plugins(&args.assets))
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(MeshPickingPlugin)
        .add_plugins(EguiPlugin::default())
        .add_plugins(HeatsiteScenePlugin {
            profile,
            show_buttons: !args.no_buttons,
        })
        .add_plugins(input::ShortcutsPlugin)
        .run();

    Ok(())
}
