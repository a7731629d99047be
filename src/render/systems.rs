use super::*;
use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use glam::DVec2;

fn cursor_px(window: &Window) -> Option<DVec2> {
    // Window cursor coordinates are already top-left origin, y down.
    window
        .cursor_position()
        .map(|p| DVec2::new(p.x as f64, p.y as f64))
}

/// Keep the container the size of the window.
pub fn sync_container_size(
    windows: Query<&Window, With<PrimaryWindow>>,
    active: Res<ActiveVisualization>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let size = DVec2::new(window.width() as f64, window.height() as f64);
    if active.mounted.size() != size {
        debug!(width = size.x, height = size.y, "window resized");
        active.mounted.resize(size);
    }
}

pub fn handle_pointer(
    windows: Query<&Window, With<PrimaryWindow>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut motion: MessageReader<MouseMotion>,
    active: Res<ActiveVisualization>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    // Read every frame so stale motion never piles up.
    let moved = motion.read().count() > 0;
    let Some(px) = cursor_px(window) else {
        if mouse.just_released(MouseButton::Left) {
            active.mounted.pointer_up();
        }
        return;
    };

    if mouse.just_pressed(MouseButton::Left) {
        active.mounted.pointer_down(px);
    }
    if mouse.pressed(MouseButton::Left) && moved {
        active.mounted.pointer_move(px);
    }
    if mouse.just_released(MouseButton::Left) {
        active.mounted.pointer_up();
    }
}

/// Tab cycles the focused slider, Left/Right step it.
pub fn handle_keyboard(keys: Res<ButtonInput<KeyCode>>, mut active: ResMut<ActiveVisualization>) {
    let sliders = active.mounted.sliders();
    if sliders.is_empty() {
        return;
    }
    if keys.just_pressed(KeyCode::Tab) {
        active.focus = (active.focus + 1) % sliders.len();
        active.invalidate();
    }
    let Some((key, view)) = sliders.get(active.focus) else {
        active.focus = 0;
        return;
    };

    let delta = if keys.just_pressed(KeyCode::ArrowRight) {
        view.step
    } else if keys.just_pressed(KeyCode::ArrowLeft) {
        -view.step
    } else {
        return;
    };
    match active.mounted.set_parameter(key, view.value + delta) {
        Ok(value) => debug!(slider = *key, value, "slider stepped"),
        Err(err) => warn!(?err, "slider step rejected"),
    }
}

/// Respawn the scene whenever the visualization redrew since the last frame.
pub fn draw_dirty_scene(
    mut commands: Commands,
    mut active: ResMut<ActiveVisualization>,
    roots: Query<Entity, With<SceneRoot>>,
    unit: Res<UnitMeshes>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    asset_server: Res<AssetServer>,
) {
    if !active.needs_draw() {
        return;
    }

    // Despawning a root removes its descendants too.
    for root in roots.iter() {
        commands.entity(root).try_despawn();
    }

    redraw(
        &mut commands,
        &active,
        &unit,
        &mut meshes,
        &mut materials,
        &asset_server,
    );
    let generation = active.mounted.generation();
    active.drawn = Some(generation);
    trace!(generation, "scene respawned");
}
