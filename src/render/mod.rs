pub mod draw;
pub mod resources;
pub mod systems;

use draw::*;
pub use resources::*;
use systems::*;

use bevy::prelude::*;

/// Draws the [`ActiveVisualization`] resource and feeds window input back
/// into it. The app must insert that resource before startup.
#[derive(Default)]
pub struct VizRenderPlugin;

impl Plugin for VizRenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (setup_global_scene, setup_unit_meshes))
            .add_systems(
                Update,
                (
                    sync_container_size,
                    handle_pointer,
                    handle_keyboard,
                    draw_dirty_scene,
                )
                    .chain(),
            );
    }
}

#[derive(Component)]
pub struct SceneRoot;

pub(crate) fn spawn_root(commands: &mut Commands) -> Entity {
    commands
        .spawn((SceneRoot, Transform::default(), Visibility::default()))
        .id()
}

pub(crate) fn redraw(
    commands: &mut Commands,
    active: &ActiveVisualization,
    unit: &UnitMeshes,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ColorMaterial>,
    asset_server: &AssetServer,
) {
    let root = spawn_root(commands);
    let scene = active.mounted.scene();
    let mut painter = Painter {
        commands,
        root,
        size: scene.size,
        unit,
        meshes,
        materials,
        asset_server,
        palette: Default::default(),
    };
    painter.scene(&scene);
    painter.overlay(&active.mounted.sliders(), &active.mounted.readouts(), active.focus);
}
