use crate::viz::MountedVisualization;
use bevy::prelude::*;

/// The visualization shown in the window, plus which generation of its
/// scene is currently spawned.
#[derive(Resource)]
pub struct ActiveVisualization {
    pub mounted: Box<dyn MountedVisualization>,
    pub drawn: Option<u64>,
    /// Slider driven by the arrow keys.
    pub focus: usize,
}

impl ActiveVisualization {
    pub fn new(mounted: Box<dyn MountedVisualization>) -> Self {
        Self {
            mounted,
            drawn: None,
            focus: 0,
        }
    }

    pub fn needs_draw(&self) -> bool {
        self.drawn != Some(self.mounted.generation())
    }

    /// Force a respawn on the next frame, e.g. after the focus moved.
    pub fn invalidate(&mut self) {
        self.drawn = None;
    }
}

#[derive(Resource)]
pub struct UnitMeshes {
    pub quad: Handle<Mesh>,
    pub circle: Handle<Mesh>,
}

pub fn setup_global_scene(mut commands: Commands) {
    commands.insert_resource(ClearColor(Color::WHITE));
    commands.spawn(Camera2d);
}

pub fn setup_unit_meshes(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    let quad = meshes.add(Mesh::from(Rectangle::new(1.0, 1.0)));
    let circle = meshes.add(Mesh::from(Circle::new(0.5)));
    commands.insert_resource(UnitMeshes { quad, circle });
}
