use bevy::prelude::*;

use crate::Result;
use crate::config::{VisualizationConfig, mount_config};
use crate::render::{ActiveVisualization, VizRenderPlugin};
use crate::scene::Container;

// The first frame resizes the container to the window.
const INITIAL_WIDTH: f64 = 800.0;

fn mount(config: &VisualizationConfig) -> Result<ActiveVisualization> {
    let mounted = mount_config(config, Container::new(INITIAL_WIDTH, INITIAL_WIDTH))?;
    let height = mounted.height_for(INITIAL_WIDTH);
    mounted.resize(glam::DVec2::new(INITIAL_WIDTH, height));
    Ok(ActiveVisualization::new(mounted))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn run_visualization(config: VisualizationConfig) -> Result<()> {
    let active = mount(&config)?;
    App::new()
        .insert_resource(active)
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: format!("diffusion-viz: {}", config.kind()),
                    ..default()
                }),
                ..default()
            }),
            VizRenderPlugin,
        ))
        .run();
    Ok(())
}

#[cfg(target_arch = "wasm32")]
pub fn run_visualization(config: VisualizationConfig, canvas_id: &str) -> Result<()> {
    let active = mount(&config)?;
    App::new()
        .insert_resource(active)
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    canvas: Some(format!("#{}", canvas_id)),
                    fit_canvas_to_parent: true,
                    ..default()
                }),
                ..default()
            }),
            VizRenderPlugin,
        ))
        .run();
    Ok(())
}
