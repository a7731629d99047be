//! Scene nodes → Bevy entities under one render root.
//!
//! Scene coordinates are container pixels with y down; the 2D camera sits at
//! the window centre, so a pixel `p` lands at `(p.x - w/2, h/2 - p.y)`.

use crate::core;
use crate::param::SliderView;
use crate::render::UnitMeshes;
use crate::scene::{self, Anchor, Node, Scene, Stroke};
use crate::viz::Readout;
use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};
use glam::DVec2;
use std::collections::HashMap;

const Z_STEP: f32 = 0.001;
// Rough advance of a glyph relative to its font size.
const GLYPH_WIDTH: f32 = 0.6;

pub struct Painter<'a, 'w, 's> {
    pub commands: &'a mut Commands<'w, 's>,
    pub root: Entity,
    pub size: DVec2,
    pub unit: &'a UnitMeshes,
    pub meshes: &'a mut Assets<Mesh>,
    pub materials: &'a mut Assets<ColorMaterial>,
    pub asset_server: &'a AssetServer,
    pub palette: Palette,
}

/// One material per distinct color for the duration of a redraw.
#[derive(Default)]
pub struct Palette {
    handles: HashMap<[u32; 4], Handle<ColorMaterial>>,
}

impl Palette {
    pub fn material(&mut self, color: core::Color, materials: &mut Assets<ColorMaterial>) -> Handle<ColorMaterial> {
        let key = [color.r, color.g, color.b, color.a].map(f32::to_bits);
        self.handles
            .entry(key)
            .or_insert_with(|| materials.add(ColorMaterial::from(Color::from(color))))
            .clone()
    }
}

impl Painter<'_, '_, '_> {
    /// Spawn every node in paint order; later nodes sit above earlier ones.
    pub fn scene(&mut self, scene: &Scene) {
        for (i, node) in scene.nodes.iter().enumerate() {
            self.node(node, i as f32 * Z_STEP);
        }
    }

    fn world(&self, p: DVec2) -> Vec2 {
        Vec2::new(
            (p.x - self.size.x * 0.5) as f32,
            (self.size.y * 0.5 - p.y) as f32,
        )
    }

    fn material(&mut self, color: core::Color) -> Handle<ColorMaterial> {
        self.palette.material(color, self.materials)
    }

    fn node(&mut self, node: &Node, z: f32) {
        match node {
            Node::Rect {
                origin,
                size,
                fill,
                stroke,
            } => {
                if !fill.is_transparent() {
                    let mat = self.material(*fill);
                    let center = self.world(*origin + *size * 0.5);
                    let quad = self.unit.quad.clone();
                    self.commands.entity(self.root).with_children(|parent| {
                        parent.spawn((
                            Mesh2d(quad),
                            MeshMaterial2d(mat),
                            Transform {
                                translation: center.extend(z),
                                scale: Vec3::new(size.x as f32, size.y as f32, 1.0),
                                ..default()
                            },
                        ));
                    });
                }
                if let Some(stroke) = stroke {
                    let corners = [
                        *origin,
                        *origin + DVec2::new(size.x, 0.0),
                        *origin + *size,
                        *origin + DVec2::new(0.0, size.y),
                    ];
                    self.outline(&corners, stroke, z);
                }
            }
            Node::Area {
                points,
                fill,
                stroke,
            } => {
                if !fill.is_transparent() {
                    self.fill_area(points, *fill, z);
                }
                if let Some(stroke) = stroke {
                    self.outline(points, stroke, z);
                }
            }
            Node::Circle {
                center,
                radius,
                fill,
            } => {
                if fill.is_transparent() {
                    return;
                }
                let mat = self.material(*fill);
                let pos = self.world(*center);
                let circle = self.unit.circle.clone();
                let d = (*radius * 2.0) as f32;
                self.commands.entity(self.root).with_children(|parent| {
                    parent.spawn((
                        Mesh2d(circle),
                        MeshMaterial2d(mat),
                        Transform {
                            translation: pos.extend(z),
                            scale: Vec3::new(d, d, 1.0),
                            ..default()
                        },
                    ));
                });
            }
            Node::Line {
                from,
                to,
                stroke,
                arrow,
            } => {
                match arrow {
                    Some(len) => {
                        // stop the shaft at the arrowhead base so the tip stays sharp
                        let dir = (*to - *from).normalize_or_zero();
                        self.segment(*from, *to - dir * *len, stroke, z);
                        let tri = scene::arrowhead(*from, *to, *len);
                        self.triangles(&tri, &[0, 1, 2], stroke.color, z);
                    }
                    None => self.segment(*from, *to, stroke, z),
                }
            }
            Node::Text {
                position,
                text,
                size,
                anchor,
                color,
            } => self.text(*position, text, *size as f32, *anchor, *color, z),
            Node::Image { origin, size, href } => {
                let center = self.world(*origin + *size * 0.5);
                let image: Handle<Image> = self.asset_server.load(href.clone());
                self.commands.entity(self.root).with_children(|parent| {
                    parent.spawn((
                        Sprite {
                            image,
                            custom_size: Some(Vec2::new(size.x as f32, size.y as f32)),
                            ..default()
                        },
                        Transform::from_translation(center.extend(z)),
                    ));
                });
            }
        }
    }

    /// A stroked segment as a rotated unit quad.
    fn segment(&mut self, a: DVec2, b: DVec2, stroke: &Stroke, z: f32) {
        let a = self.world(a);
        let b = self.world(b);
        let length = a.distance(b);
        if length <= f32::EPSILON {
            return;
        }
        let angle = (b.y - a.y).atan2(b.x - a.x);
        let mat = self.material(stroke.color);
        let quad = self.unit.quad.clone();
        self.commands.entity(self.root).with_children(|parent| {
            parent.spawn((
                Mesh2d(quad),
                MeshMaterial2d(mat),
                Transform {
                    translation: ((a + b) * 0.5).extend(z + Z_STEP * 0.5),
                    rotation: Quat::from_rotation_z(angle),
                    scale: Vec3::new(length, stroke.width as f32, 1.0),
                },
            ));
        });
    }

    fn outline(&mut self, points: &[DVec2], stroke: &Stroke, z: f32) {
        if points.len() < 2 {
            return;
        }
        for i in 0..points.len() {
            let next = (i + 1) % points.len();
            self.segment(points[i], points[next], stroke, z);
        }
    }

    /// Areas are closed along a horizontal baseline: the last point carries
    /// its y. Each pair of top points becomes a quad down to that baseline.
    fn fill_area(&mut self, points: &[DVec2], fill: core::Color, z: f32) {
        if points.len() < 4 {
            return;
        }
        let baseline = points[points.len() - 1].y;
        let top = &points[..points.len() - 2];

        let mut positions: Vec<DVec2> = Vec::with_capacity(top.len() * 2);
        let mut indices: Vec<u32> = Vec::with_capacity((top.len() - 1) * 6);
        for (i, p) in top.iter().enumerate() {
            positions.push(*p);
            positions.push(DVec2::new(p.x, baseline));
            if i + 1 < top.len() {
                let t0 = (i * 2) as u32;
                let b0 = t0 + 1;
                let t1 = t0 + 2;
                let b1 = t0 + 3;
                indices.extend_from_slice(&[t0, b0, t1, t1, b0, b1]);
            }
        }
        self.triangles(&positions, &indices, fill, z);
    }

    fn triangles(&mut self, points: &[DVec2], indices: &[u32], color: core::Color, z: f32) {
        let positions: Vec<[f32; 3]> = points
            .iter()
            .map(|p| {
                let w = self.world(*p);
                [w.x, w.y, 0.0]
            })
            .collect();
        let vertex_count = positions.len();
        let normals: Vec<[f32; 3]> = vec![[0.0, 0.0, 1.0]; vertex_count];
        let uvs: Vec<[f32; 2]> = vec![[0.0, 0.0]; vertex_count];

        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::RENDER_WORLD);
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
        mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
        mesh.insert_indices(Indices::U32(indices.to_vec()));

        let handle = self.meshes.add(mesh);
        let mat = self.material(color);
        self.commands.entity(self.root).with_children(|parent| {
            parent.spawn((
                Mesh2d(handle),
                MeshMaterial2d(mat),
                Transform::from_translation(Vec3::new(0.0, 0.0, z)),
            ));
        });
    }

    /// `position` is the text baseline anchor, SVG style.
    fn text(&mut self, position: DVec2, text: &str, size: f32, anchor: Anchor, color: core::Color, z: f32) {
        let width = text.chars().count() as f32 * size * GLYPH_WIDTH;
        let dx = match anchor {
            Anchor::Start => width * 0.5,
            Anchor::Middle => 0.0,
            Anchor::End => -width * 0.5,
        };
        let mut pos = self.world(position);
        pos.x += dx;
        pos.y += size * 0.35;
        self.commands.entity(self.root).with_children(|parent| {
            parent.spawn((
                Text2d::new(text.to_string()),
                TextFont {
                    font_size: size,
                    ..default()
                },
                TextColor(Color::from(color)),
                Transform::from_translation(pos.extend(z + 1.0)),
            ));
        });
    }

    /// Slider values and readouts, top-left. The focused slider is marked.
    pub fn overlay(&mut self, sliders: &[(&'static str, SliderView)], readouts: &[Readout], focus: usize) {
        let mut y = 16.0;
        for (i, (_, view)) in sliders.iter().enumerate() {
            let marker = if i == focus { "> " } else { "  " };
            let line = format!("{marker}{} = {}", view.label, view.value);
            self.text(DVec2::new(8.0, y), &line, 14.0, Anchor::Start, core::Color::BLACK, 5.0);
            y += 18.0;
        }
        for readout in readouts {
            let line = format!("{} = {}", readout.label, readout.latex);
            self.text(DVec2::new(8.0, y), &line, 14.0, Anchor::Start, core::Color::BLACK, 5.0);
            y += 18.0;
        }
    }
}
