//! Retained scene graph produced by a chart render.
//!
//! Coordinates are container pixels: origin top-left, y pointing down. The
//! scene is backend-neutral; [`Scene::to_svg`] serializes it for the browser
//! and `render::draw` turns it into Bevy entities.

use crate::core::{Color, DragHandle};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

impl Stroke {
    pub const fn new(color: Color, width: f64) -> Self {
        Self { color, width }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Rect {
        origin: DVec2,
        size: DVec2,
        fill: Color,
        stroke: Option<Stroke>,
    },
    /// Closed polygon, e.g. a density curve closed along its baseline.
    Area {
        points: Vec<DVec2>,
        fill: Color,
        stroke: Option<Stroke>,
    },
    Circle {
        center: DVec2,
        radius: f64,
        fill: Color,
    },
    Line {
        from: DVec2,
        to: DVec2,
        stroke: Stroke,
        /// Arrowhead length in pixels at `to`, if any.
        arrow: Option<f64>,
    },
    Text {
        position: DVec2,
        text: String,
        size: f64,
        anchor: Anchor,
        color: Color,
    },
    Image {
        origin: DVec2,
        size: DVec2,
        href: String,
    },
}

/// Invisible pointer target around a draggable handle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HitTarget {
    pub handle: DragHandle,
    pub center: DVec2,
    pub radius: f64,
}

impl HitTarget {
    pub fn contains(&self, p: DVec2) -> bool {
        self.center.distance(p) <= self.radius
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub size: DVec2,
    pub nodes: Vec<Node>,
    /// In paint order; later targets sit on top.
    pub hit_targets: Vec<HitTarget>,
}

impl Scene {
    pub fn new(size: DVec2) -> Self {
        Self {
            size,
            nodes: vec![],
            hit_targets: vec![],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Topmost handle under `p`.
    pub fn hit_test(&self, p: DVec2) -> Option<DragHandle> {
        self.hit_targets
            .iter()
            .rev()
            .find(|t| t.contains(p))
            .map(|t| t.handle)
    }

    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = fmt_num(self.size.x),
            h = fmt_num(self.size.y),
        );
        for node in &self.nodes {
            write_node(&mut svg, node);
        }
        for target in &self.hit_targets {
            let _ = write!(
                svg,
                r#"<circle class="handle" data-handle="{:?}" cx="{}" cy="{}" r="{}" fill="transparent"/>"#,
                target.handle,
                fmt_num(target.center.x),
                fmt_num(target.center.y),
                fmt_num(target.radius),
            );
        }
        svg.push_str("</svg>");
        svg
    }
}

fn write_node(svg: &mut String, node: &Node) {
    match node {
        Node::Rect {
            origin,
            size,
            fill,
            stroke,
        } => {
            let _ = write!(
                svg,
                r#"<rect x="{}" y="{}" width="{}" height="{}"{}{}/>"#,
                fmt_num(origin.x),
                fmt_num(origin.y),
                fmt_num(size.x),
                fmt_num(size.y),
                fill_attrs(fill),
                stroke_attrs(stroke.as_ref()),
            );
        }
        Node::Area {
            points,
            fill,
            stroke,
        } => {
            if points.is_empty() {
                return;
            }
            let mut d = String::with_capacity(points.len() * 16);
            for (i, p) in points.iter().enumerate() {
                let cmd = if i == 0 { 'M' } else { 'L' };
                let _ = write!(d, "{cmd}{},{}", fmt_num(p.x), fmt_num(p.y));
            }
            d.push('Z');
            let _ = write!(
                svg,
                r#"<path d="{d}"{}{}/>"#,
                fill_attrs(fill),
                stroke_attrs(stroke.as_ref()),
            );
        }
        Node::Circle {
            center,
            radius,
            fill,
        } => {
            let _ = write!(
                svg,
                r#"<circle cx="{}" cy="{}" r="{}"{}/>"#,
                fmt_num(center.x),
                fmt_num(center.y),
                fmt_num(*radius),
                fill_attrs(fill),
            );
        }
        Node::Line {
            from,
            to,
            stroke,
            arrow,
        } => {
            let _ = write!(
                svg,
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}"{}/>"#,
                fmt_num(from.x),
                fmt_num(from.y),
                fmt_num(to.x),
                fmt_num(to.y),
                stroke_attrs(Some(stroke)),
            );
            if let Some(len) = arrow {
                let [tip, left, right] = arrowhead(*from, *to, *len);
                let _ = write!(
                    svg,
                    r#"<path d="M{},{}L{},{}L{},{}Z"{}/>"#,
                    fmt_num(tip.x),
                    fmt_num(tip.y),
                    fmt_num(left.x),
                    fmt_num(left.y),
                    fmt_num(right.x),
                    fmt_num(right.y),
                    fill_attrs(&stroke.color),
                );
            }
        }
        Node::Text {
            position,
            text,
            size,
            anchor,
            color,
        } => {
            let anchor = match anchor {
                Anchor::Start => "start",
                Anchor::Middle => "middle",
                Anchor::End => "end",
            };
            let _ = write!(
                svg,
                r#"<text x="{}" y="{}" font-size="{}" font-family="Fira Code" text-anchor="{anchor}"{}>{}</text>"#,
                fmt_num(position.x),
                fmt_num(position.y),
                fmt_num(*size),
                fill_attrs(color),
                escape(text),
            );
        }
        Node::Image { origin, size, href } => {
            let _ = write!(
                svg,
                r#"<image x="{}" y="{}" width="{}" height="{}" href="{}"/>"#,
                fmt_num(origin.x),
                fmt_num(origin.y),
                fmt_num(size.x),
                fmt_num(size.y),
                escape(href),
            );
        }
    }
}

/// Triangle `[tip, left, right]` for an arrow ending at `to`.
pub fn arrowhead(from: DVec2, to: DVec2, len: f64) -> [DVec2; 3] {
    let dir = (to - from).normalize_or_zero();
    let normal = dir.perp();
    let base = to - dir * len;
    let half = len * 0.5;
    [to, base + normal * half, base - normal * half]
}

fn fill_attrs(c: &Color) -> String {
    if c.is_transparent() {
        return r#" fill="none""#.to_string();
    }
    if c.a >= 1.0 {
        format!(r#" fill="{}""#, c.to_hex())
    } else {
        format!(r#" fill="{}" fill-opacity="{}""#, c.to_hex(), fmt_num(c.a as f64))
    }
}

fn stroke_attrs(stroke: Option<&Stroke>) -> String {
    match stroke {
        Some(s) => format!(
            r#" stroke="{}" stroke-width="{}""#,
            s.color.to_hex(),
            fmt_num(s.width)
        ),
        None => String::new(),
    }
}

/// Two decimals, trailing zeros trimmed.
fn fmt_num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// The element a visualization draws into. It owns the current scene and
/// nothing else reads or writes it.
#[derive(Clone, Debug, Default)]
pub struct Container {
    size: DVec2,
    scene: Scene,
}

impl Container {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: DVec2::new(width, height),
            scene: Scene::new(DVec2::new(width, height)),
        }
    }

    pub fn size(&self) -> DVec2 {
        self.size
    }

    pub fn set_size(&mut self, size: DVec2) {
        self.size = size;
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn replace(&mut self, scene: Scene) {
        self.scene = scene;
    }

    pub fn clear(&mut self) {
        self.scene = Scene::new(self.size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_test_prefers_topmost_target() {
        let mut scene = Scene::new(DVec2::splat(100.0));
        scene.hit_targets.push(HitTarget {
            handle: DragHandle::Eigen1,
            center: DVec2::new(50.0, 50.0),
            radius: 20.0,
        });
        scene.hit_targets.push(HitTarget {
            handle: DragHandle::Mean,
            center: DVec2::new(55.0, 50.0),
            radius: 5.0,
        });
        assert_eq!(scene.hit_test(DVec2::new(56.0, 50.0)), Some(DragHandle::Mean));
        assert_eq!(scene.hit_test(DVec2::new(40.0, 50.0)), Some(DragHandle::Eigen1));
        assert_eq!(scene.hit_test(DVec2::new(0.0, 0.0)), None);
    }

    #[test]
    fn svg_serialization() {
        let mut scene = Scene::new(DVec2::new(200.0, 100.0));
        scene.push(Node::Rect {
            origin: DVec2::new(10.0, 20.0),
            size: DVec2::new(30.0, 40.5),
            fill: Color::AMBER,
            stroke: Some(Stroke::new(Color::BLACK, 2.5)),
        });
        scene.push(Node::Text {
            position: DVec2::new(5.0, 5.0),
            text: "P<Q".to_string(),
            size: 12.0,
            anchor: Anchor::Middle,
            color: Color::BLACK,
        });
        let svg = scene.to_svg();
        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100""#));
        assert!(svg.contains(r##"<rect x="10" y="20" width="30" height="40.5" fill="#eab308" stroke="#000000" stroke-width="2.5"/>"##));
        assert!(svg.contains("P&lt;Q"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn arrowhead_points_along_line() {
        let [tip, left, right] = arrowhead(DVec2::ZERO, DVec2::new(10.0, 0.0), 4.0);
        assert_eq!(tip, DVec2::new(10.0, 0.0));
        assert!((left.x - 6.0).abs() < 1e-12 && (right.x - 6.0).abs() < 1e-12);
        assert!((left.y + right.y).abs() < 1e-12);
    }

    #[test]
    fn number_formatting() {
        assert_eq!(fmt_num(3.0), "3");
        assert_eq!(fmt_num(2.456), "2.46");
        assert_eq!(fmt_num(-0.001), "0");
    }
}
