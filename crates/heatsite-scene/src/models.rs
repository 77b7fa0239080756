//! Site model loading and registry assembly

use bevy::asset::LoadState;
use bevy::gltf::Gltf;
use bevy::prelude::*;
use bevy::scene::{SceneInstance, SceneSpawner};
use heatsite_core::SceneRegistry;

use crate::highlight::{apply_highlight_requests, SiteHighlighter};
use crate::types::{ActiveProfile, GroupMember, LoadStatus, SemanticGroupRoot, SiteModel};

/// Plugin for model loading
pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SiteModelHandle>()
            .add_systems(Startup, request_site_model)
            .add_systems(
                Update,
                (spawn_loaded_model, mark_scene_ready, assemble_site_registry)
                    .chain()
                    .before(apply_highlight_requests),
            );
    }
}

/// glTF handle of the site model while it loads
#[derive(Resource, Default)]
pub struct SiteModelHandle(pub Option<Handle<Gltf>>);

/// Set on the model root once every scene entity has been spawned
#[derive(Component)]
pub struct SceneReady;

/// Authored material values, kept for restoring after a dim
#[derive(Component, Debug, Clone, Copy)]
pub struct IsolatedMaterial {
    pub alpha_mode: AlphaMode,
    pub base_alpha: f32,
}

fn request_site_model(
    asset_server: Res<AssetServer>,
    profile: Res<ActiveProfile>,
    mut handle: ResMut<SiteModelHandle>,
    mut status: ResMut<LoadStatus>,
) {
    let path = profile.0.model_path.clone();
    tracing::info!("Loading site model: {}", path);
    handle.0 = Some(asset_server.load(path));
    *status = LoadStatus::Loading;
}

/// Status text for a failed load. Draco-compressed meshes are not decoded by
/// the glTF loader, so that case names the extension.
pub fn load_failure_reason(err: &str) -> String {
    if err.to_ascii_lowercase().contains("draco") {
        format!(
            "model uses {DRACO_EXTENSION}, which is not supported; re-export it without Draco compression ({err})"
        )
    } else {
        err.to_string()
    }
}

const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

fn spawn_loaded_model(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
    mut handle: ResMut<SiteModelHandle>,
    mut status: ResMut<LoadStatus>,
) {
    let Some(gltf_handle) = handle.0.as_ref() else {
        return;
    };

    // Still loading until the server reports either outcome
    match asset_server.get_load_state(gltf_handle.id()) {
        Some(LoadState::Loaded) => {
            let Some(gltf) = gltf_assets.get(gltf_handle) else {
                return;
            };
            // Use first scene if no default
            let scene = gltf
                .default_scene
                .clone()
                .or_else(|| gltf.scenes.first().cloned());
            match scene {
                Some(scene) => {
                    tracing::info!("Site model loaded, spawning scene");
                    commands.spawn((SceneRoot(scene), SiteModel, Name::new("SiteModel")));
                    *status = LoadStatus::Spawning;
                }
                None => {
                    tracing::error!("Site model contains no scenes");
                    *status = LoadStatus::Failed("model contains no scenes".to_string());
                }
            }
            // One attempt per load; the handle is not polled again
            handle.0 = None;
        }
        Some(LoadState::Failed(err)) => {
            let reason = load_failure_reason(&err.to_string());
            tracing::error!("Failed to load site model: {}", reason);
            *status = LoadStatus::Failed(reason);
            handle.0 = None;
        }
        _ => {}
    }
}

fn mark_scene_ready(
    mut commands: Commands,
    spawner: Res<SceneSpawner>,
    roots: Query<(Entity, &SceneInstance), (With<SiteModel>, Without<SceneReady>)>,
) {
    // Scene entities are spawned a frame or more after SceneRoot is inserted
    for (entity, instance) in roots.iter() {
        if spawner.instance_is_ready(**instance) {
            commands.entity(entity).insert(SceneReady);
        }
    }
}

/// Named nodes under `root` in depth-first order, parents before children
pub fn collect_named_nodes(
    root: Entity,
    children: &Query<&Children>,
    names: &Query<&Name>,
) -> Vec<(Entity, String)> {
    let mut nodes = Vec::new();
    let mut stack = vec![root];
    while let Some(entity) = stack.pop() {
        if let Ok(name) = names.get(entity) {
            nodes.push((entity, name.as_str().to_string()));
        }
        if let Ok(kids) = children.get(entity) {
            let kids: &[Entity] = kids;
            stack.extend(kids.iter().rev().copied());
        }
    }
    nodes
}

/// Build the registry from the ready scene and hand it to the highlighter
fn assemble_site_registry(
    mut commands: Commands,
    mut status: ResMut<LoadStatus>,
    mut highlighter: ResMut<SiteHighlighter>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    profile: Res<ActiveProfile>,
    roots: Query<Entity, (With<SiteModel>, Added<SceneReady>)>,
    children: Query<&Children>,
    names: Query<&Name>,
    mesh_materials: Query<&MeshMaterial3d<StandardMaterial>>,
    foreign_meshes: Query<(), (With<Mesh3d>, Without<MeshMaterial3d<StandardMaterial>>)>,
) {
    for root in roots.iter() {
        let nodes = collect_named_nodes(root, &children, &names);
        // A bad enclosure name only disables hiding, groups still assemble
        let enclosure = profile.0.enclosure_slot().unwrap_or_else(|e| {
            tracing::warn!("{}; enclosure hiding disabled", e);
            None
        });
        let registry =
            SceneRegistry::assemble(nodes.iter().map(|(e, n)| (*e, n.as_str())), enclosure);

        let isolated = isolate_materials(
            &mut commands,
            root,
            &children,
            &mesh_materials,
            &foreign_meshes,
            &mut materials,
        );

        // Tag members and give each group an empty root under the model
        for group in registry.groups() {
            for (_, node) in group.members() {
                commands.entity(*node).insert(GroupMember(group.id()));
            }
            commands.spawn((
                SemanticGroupRoot(group.id()),
                Name::new(format!("group:{}", group.id())),
                Transform::default(),
                Visibility::default(),
                ChildOf(root),
            ));
        }

        let report = registry.report();
        let problems = report.problems();
        for problem in &problems {
            tracing::error!("Site model: {}", problem);
        }
        tracing::info!(
            "Site model assembled: {} nodes visited, {} groups, {} materials isolated",
            report.visited,
            registry.groups().count(),
            isolated
        );

        highlighter.attach(registry);
        *status = LoadStatus::Ready { problems };
    }
}

/// Give every mesh under `root` its own material so emissive changes on one
/// node never bleed into others sharing the glTF material
fn isolate_materials(
    commands: &mut Commands,
    root: Entity,
    children: &Query<&Children>,
    mesh_materials: &Query<&MeshMaterial3d<StandardMaterial>>,
    foreign_meshes: &Query<(), (With<Mesh3d>, Without<MeshMaterial3d<StandardMaterial>>)>,
    materials: &mut Assets<StandardMaterial>,
) -> usize {
    let mut isolated = 0;
    let mut skipped = 0;
    let mut stack = vec![root];
    while let Some(entity) = stack.pop() {
        if let Ok(handle) = mesh_materials.get(entity) {
            // Handles to unloaded materials are left shared
            if let Some(original) = materials.get(&handle.0).cloned() {
                let props = IsolatedMaterial {
                    alpha_mode: original.alpha_mode,
                    base_alpha: original.base_color.alpha(),
                };
                let own = materials.add(original);
                commands.entity(entity).insert((MeshMaterial3d(own), props));
                isolated += 1;
            }
        } else if foreign_meshes.contains(entity) {
            skipped += 1;
        }
        if let Ok(kids) = children.get(entity) {
            stack.extend_from_slice(kids);
        }
    }
    if skipped > 0 {
        tracing::warn!(
            "{} meshes have no StandardMaterial and will not be dimmed or highlighted",
            skipped
        );
    }
    isolated
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::labels::LabelBoard;
    use heatsite_core::{GroupId, Slot};
    use std::collections::HashSet;
    use std::time::Duration;

    /// App with the resources assembly needs, minus asset loading
    pub(crate) fn site_app() -> App {
        let mut app = App::new();
        app.init_resource::<ActiveProfile>()
            .init_resource::<LoadStatus>()
            .init_resource::<LabelBoard>()
            .init_resource::<Assets<StandardMaterial>>()
            .init_resource::<SiteHighlighter>()
            .add_systems(Update, assemble_site_registry);
        app
    }

    /// Spawn a ready site hierarchy: one node per slot, each with a mesh
    /// child sharing a single material. Names in `skip` are left out.
    pub(crate) fn spawn_site(app: &mut App, skip: &[Slot]) -> Entity {
        let shared = app
            .world_mut()
            .resource_mut::<Assets<StandardMaterial>>()
            .add(StandardMaterial::default());

        *app.world_mut().resource_mut::<LoadStatus>() = LoadStatus::Spawning;
        let world = app.world_mut();
        let root = world
            .spawn((SiteModel, SceneReady, Name::new("Scene"), Transform::default(), Visibility::default()))
            .id();
        world.spawn((Name::new("Ground"), Transform::default(), Visibility::default(), ChildOf(root)));

        for slot in Slot::all().filter(|s| !skip.contains(s)) {
            let node = world
                .spawn((Name::new(slot.name()), Transform::default(), Visibility::default(), ChildOf(root)))
                .id();
            world.spawn((
                Name::new(format!("{}.mesh", slot.name())),
                MeshMaterial3d(shared.clone()),
                Transform::default(),
                Visibility::default(),
                ChildOf(node),
            ));
        }
        root
    }

    #[test]
    fn test_assembles_full_site() {
        let mut app = site_app();
        spawn_site(&mut app, &[]);
        app.update();

        assert_eq!(
            *app.world().resource::<LoadStatus>(),
            LoadStatus::Ready { problems: vec![] }
        );
        let highlighter = app.world().resource::<SiteHighlighter>();
        assert!(highlighter.is_ready());
        assert_eq!(highlighter.available_groups(), GroupId::ALL.to_vec());

        let world = app.world_mut();
        let mut roots = world.query::<&SemanticGroupRoot>();
        assert_eq!(roots.iter(world).count(), GroupId::ALL.len());

        let mut members = world.query::<(&Name, &GroupMember)>();
        let loop_members: Vec<String> = members
            .iter(world)
            .filter(|(_, m)| m.0 == GroupId::Loop)
            .map(|(n, _)| n.as_str().to_string())
            .collect();
        assert_eq!(loop_members.len(), 3);
        assert!(loop_members.contains(&"Loop_Pipe_Cold".to_string()));
    }

    #[test]
    fn test_missing_node_disables_only_its_group() {
        let mut app = site_app();
        spawn_site(&mut app, &[Slot::LoopPipeCold]);
        app.update();

        let status = app.world().resource::<LoadStatus>().clone();
        let LoadStatus::Ready { problems } = status else {
            panic!("expected ready status, got {:?}", status);
        };
        assert_eq!(problems, vec!["group 'loop' missing Loop_Pipe_Cold".to_string()]);

        let highlighter = app.world().resource::<SiteHighlighter>();
        assert!(!highlighter.is_available(GroupId::Loop));
        assert!(highlighter.is_available(GroupId::Starlink));
    }

    #[test]
    fn test_materials_are_isolated() {
        let mut app = site_app();
        spawn_site(&mut app, &[]);
        app.update();

        let world = app.world_mut();
        let mut query = world.query::<(&MeshMaterial3d<StandardMaterial>, &IsolatedMaterial)>();
        let handles: Vec<AssetId<StandardMaterial>> =
            query.iter(world).map(|(m, _)| m.0.id()).collect();
        assert_eq!(handles.len(), Slot::COUNT);

        let unique: HashSet<_> = handles.iter().collect();
        assert_eq!(unique.len(), handles.len());
    }

    #[test]
    fn test_missing_model_fails_load() {
        let mut app = App::new();
        app.add_plugins((
            MinimalPlugins,
            AssetPlugin::default(),
            bevy::scene::ScenePlugin,
            bevy::gltf::GltfPlugin::default(),
        ));
        let mut profile = heatsite_core::Profile::default();
        profile.model_path = "models/not_there.glb".to_string();
        app.insert_resource(ActiveProfile(profile))
            .init_resource::<LoadStatus>()
            .init_resource::<SiteModelHandle>()
            .add_systems(Startup, request_site_model)
            .add_systems(Update, spawn_loaded_model);
        // Registers the glTF loader, which the runner would otherwise do
        app.finish();
        app.cleanup();

        // Reads happen on the IO task pool
        app.update();
        for _ in 0..500 {
            if matches!(*app.world().resource::<LoadStatus>(), LoadStatus::Failed(_)) {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
            app.update();
        }

        let status = app.world().resource::<LoadStatus>().clone();
        assert!(matches!(status, LoadStatus::Failed(_)), "got {:?}", status);
        assert!(app.world().resource::<SiteModelHandle>().0.is_none());

        let world = app.world_mut();
        let mut models = world.query_filtered::<Entity, With<SiteModel>>();
        assert_eq!(models.iter(world).count(), 0);
    }

    #[test]
    fn test_load_failure_reason_names_draco() {
        let reason = load_failure_reason("unsupported extension KHR_draco_mesh_compression");
        assert!(reason.contains("KHR_draco_mesh_compression"));
        assert!(reason.contains("without Draco compression"));

        assert_eq!(load_failure_reason("Path not found: x.glb"), "Path not found: x.glb");
    }

    #[test]
    fn test_collect_named_nodes_parent_first() {
        let mut app = App::new();
        let world = app.world_mut();
        let root = world.spawn(Name::new("root")).id();
        let a = world.spawn((Name::new("a"), ChildOf(root))).id();
        world.spawn((Name::new("a1"), ChildOf(a)));
        world.spawn(ChildOf(root));
        world.spawn((Name::new("b"), ChildOf(root)));

        fn collect(
            In(root): In<Entity>,
            children: Query<&Children>,
            names: Query<&Name>,
        ) -> Vec<String> {
            collect_named_nodes(root, &children, &names)
                .into_iter()
                .map(|(_, name)| name)
                .collect()
        }

        let order = app
            .world_mut()
            .run_system_cached_with(collect, root)
            .expect("system runs");
        assert_eq!(order, vec!["root", "a", "a1", "b"]);
    }
}
