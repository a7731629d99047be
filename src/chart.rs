//! Chart renderer: turns a data series plus domain bounds into a scene.
//!
//! Every render is a full clear-and-rebuild. The only state kept between
//! renders is the scale cache, keyed on container size, margins and domains.

use crate::core::{Color, DragHandle, Margins, Style};
use crate::scale::{BandScale, LinearScale, PlanarScales, Tick};
use crate::scene::{Anchor, HitTarget, Node, Scene, Stroke};
use glam::DVec2;
use serde::{Deserialize, Serialize};

const TICK_SIZE: f64 = 6.0;
const TICK_PADDING: f64 = 3.0;
const TICK_FONT: f64 = 12.0;
const TICK_COUNT: usize = 10;
const AXIS_STROKE: Stroke = Stroke::new(Color::BLACK, 1.5);

/// Pointer radius around each eigenvector tip.
pub const HANDLE_HIT_RADIUS: f64 = 20.0;
pub const MEAN_RADIUS: f64 = 5.0;
const POINT_RADIUS: f64 = 1.5;
const ARROW_WIDTH: f64 = 4.0;
const ARROW_HEAD: f64 = 12.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    /// Samples in data space, ordered by x.
    pub samples: Vec<DVec2>,
    pub style: Style,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ChartKind {
    Bars {
        categories: Vec<String>,
        values: Vec<f64>,
        y_domain: [f64; 2],
        padding: f64,
        style: Style,
    },
    Density {
        x_domain: [f64; 2],
        y_domain: [f64; 2],
        curves: Vec<Curve>,
    },
    Scatter {
        domain: [f64; 2],
        points: Vec<DVec2>,
        mean: DVec2,
        /// Eigenvector arrow tips in data space.
        tips: [DVec2; 2],
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub margins: Margins,
    pub kind: ChartKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ChartScales {
    Band { x: BandScale, y: LinearScale },
    Planar(PlanarScales),
}

#[derive(Clone, Debug, PartialEq)]
struct ScaleKey {
    size: DVec2,
    margins: Margins,
    x: XDomain,
    y: [f64; 2],
}

#[derive(Clone, Debug, PartialEq)]
enum XDomain {
    Categories(Vec<String>, u64),
    Continuous([f64; 2]),
}

#[derive(Debug, Default)]
pub struct ChartRenderer {
    cache: Option<(ScaleKey, ChartScales)>,
    rebuilds: u64,
}

impl ChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, size: DVec2, chart: &Chart) -> Scene {
        let inner = chart.margins.inner(size);
        if !(inner.x > 0.0 && inner.y > 0.0) {
            tracing::warn!(width = size.x, height = size.y, "container too small to draw, skipping render");
            self.cache = None;
            return Scene::new(size);
        }

        let scales = self.scales_for(size, chart).clone();
        let mut scene = Scene::new(size);
        match (&chart.kind, &scales) {
            (
                ChartKind::Bars {
                    values,
                    style,
                    ..
                },
                ChartScales::Band { x, y },
            ) => {
                draw_bottom_axis(&mut scene, &x.ticks(), x.range, y.range[0]);
                draw_left_axis(&mut scene, &y.ticks(TICK_COUNT), y.range, x.range[0]);
                draw_bars(&mut scene, values, x, y, style);
            }
            (ChartKind::Density { curves, .. }, ChartScales::Planar(planar)) => {
                draw_bottom_axis(&mut scene, &planar.x.ticks(TICK_COUNT), planar.x.range, planar.y.range[0]);
                draw_left_axis(&mut scene, &planar.y.ticks(TICK_COUNT), planar.y.range, planar.x.range[0]);
                for curve in curves {
                    draw_density(&mut scene, curve, planar);
                }
            }
            (
                ChartKind::Scatter {
                    points,
                    mean,
                    tips,
                    ..
                },
                ChartScales::Planar(planar),
            ) => {
                let centre = DVec2::new(
                    (planar.x.range[0] + planar.x.range[1]) * 0.5,
                    (planar.y.range[0] + planar.y.range[1]) * 0.5,
                );
                draw_bottom_axis(&mut scene, &planar.x.ticks(TICK_COUNT), planar.x.range, centre.y);
                draw_left_axis(&mut scene, &planar.y.ticks(TICK_COUNT), planar.y.range, centre.x);
                draw_scatter(&mut scene, points, *mean, tips, planar);
            }
            _ => unreachable!("scale cache built for a different chart kind"),
        }
        tracing::trace!(nodes = scene.nodes.len(), "chart rendered");
        scene
    }

    /// Scales of the last render, if it drew a continuous chart.
    pub fn planar_scales(&self) -> Option<PlanarScales> {
        match &self.cache {
            Some((_, ChartScales::Planar(p))) => Some(*p),
            _ => None,
        }
    }

    pub fn scales(&self) -> Option<&ChartScales> {
        self.cache.as_ref().map(|(_, s)| s)
    }

    /// How many times scales were recomputed.
    pub fn scale_rebuilds(&self) -> u64 {
        self.rebuilds
    }

    fn scales_for(&mut self, size: DVec2, chart: &Chart) -> &ChartScales {
        let key = scale_key(size, chart);
        let stale = match &self.cache {
            Some((cached, _)) => *cached != key,
            None => true,
        };
        if stale {
            let scales = build_scales(size, chart);
            self.rebuilds += 1;
            self.cache = Some((key, scales));
        }
        match &self.cache {
            Some((_, scales)) => scales,
            None => unreachable!(),
        }
    }
}

fn scale_key(size: DVec2, chart: &Chart) -> ScaleKey {
    let (x, y) = match &chart.kind {
        ChartKind::Bars {
            categories,
            y_domain,
            padding,
            ..
        } => (
            XDomain::Categories(categories.clone(), padding.to_bits()),
            *y_domain,
        ),
        ChartKind::Density {
            x_domain, y_domain, ..
        } => (XDomain::Continuous(*x_domain), *y_domain),
        ChartKind::Scatter { domain, .. } => (XDomain::Continuous(*domain), *domain),
    };
    ScaleKey {
        size,
        margins: chart.margins,
        x,
        y,
    }
}

fn build_scales(size: DVec2, chart: &Chart) -> ChartScales {
    let m = chart.margins;
    let inner = m.inner(size);
    let x_range = [m.left, m.left + inner.x];
    let y_range = [m.top + inner.y, m.top];
    match &chart.kind {
        ChartKind::Bars {
            categories,
            y_domain,
            padding,
            ..
        } => ChartScales::Band {
            x: BandScale::new(categories.clone(), x_range, *padding),
            y: LinearScale::new(*y_domain, y_range),
        },
        ChartKind::Density {
            x_domain, y_domain, ..
        } => ChartScales::Planar(PlanarScales {
            x: LinearScale::new(*x_domain, x_range),
            y: LinearScale::new(*y_domain, y_range),
        }),
        ChartKind::Scatter { domain, .. } => ChartScales::Planar(PlanarScales {
            x: LinearScale::new(*domain, x_range),
            y: LinearScale::new(*domain, y_range),
        }),
    }
}

fn draw_bottom_axis(scene: &mut Scene, ticks: &[Tick], range: [f64; 2], y: f64) {
    scene.push(Node::Line {
        from: DVec2::new(range[0], y),
        to: DVec2::new(range[1], y),
        stroke: AXIS_STROKE,
        arrow: None,
    });
    for tick in ticks {
        scene.push(Node::Line {
            from: DVec2::new(tick.offset, y),
            to: DVec2::new(tick.offset, y + TICK_SIZE),
            stroke: AXIS_STROKE,
            arrow: None,
        });
        scene.push(Node::Text {
            position: DVec2::new(tick.offset, y + TICK_SIZE + TICK_PADDING + TICK_FONT * 0.71),
            text: tick.label.clone(),
            size: TICK_FONT,
            anchor: Anchor::Middle,
            color: Color::BLACK,
        });
    }
}

fn draw_left_axis(scene: &mut Scene, ticks: &[Tick], range: [f64; 2], x: f64) {
    scene.push(Node::Line {
        from: DVec2::new(x, range[0]),
        to: DVec2::new(x, range[1]),
        stroke: AXIS_STROKE,
        arrow: None,
    });
    for tick in ticks {
        scene.push(Node::Line {
            from: DVec2::new(x - TICK_SIZE, tick.offset),
            to: DVec2::new(x, tick.offset),
            stroke: AXIS_STROKE,
            arrow: None,
        });
        scene.push(Node::Text {
            position: DVec2::new(x - TICK_SIZE - TICK_PADDING, tick.offset + TICK_FONT * 0.32),
            text: tick.label.clone(),
            size: TICK_FONT,
            anchor: Anchor::End,
            color: Color::BLACK,
        });
    }
}

fn draw_bars(scene: &mut Scene, values: &[f64], x: &BandScale, y: &LinearScale, style: &Style) {
    let baseline = y.range[0];
    let top = y.range[1];
    let width = x.bandwidth();
    for (i, &v) in values.iter().enumerate() {
        let Some(left) = x.position_of(i) else {
            continue;
        };
        if !v.is_finite() {
            continue;
        }
        let py = y.apply(v).clamp(top.min(baseline), top.max(baseline));
        scene.push(Node::Rect {
            origin: DVec2::new(left, py),
            size: DVec2::new(width, baseline - py),
            fill: style.fill(),
            stroke: Some(Stroke::new(Color::BLACK, style.size as f64)),
        });
    }
}

fn draw_density(scene: &mut Scene, curve: &Curve, scales: &PlanarScales) {
    let (Some(first), Some(last)) = (curve.samples.first(), curve.samples.last()) else {
        return;
    };
    let [d0, d1] = scales.y.domain;
    let (floor, ceiling) = (d0.min(d1), d0.max(d1));
    let baseline = scales.y.apply(floor);

    let mut points: Vec<DVec2> = curve
        .samples
        .iter()
        .map(|s| {
            // Degenerate densities fall back to the baseline.
            let v = if s.y.is_finite() { s.y.max(floor).min(ceiling) } else { floor };
            DVec2::new(scales.x.apply(s.x), scales.y.apply(v))
        })
        .collect();
    points.push(DVec2::new(scales.x.apply(last.x), baseline));
    points.push(DVec2::new(scales.x.apply(first.x), baseline));

    scene.push(Node::Area {
        points,
        fill: curve.style.fill(),
        stroke: Some(Stroke::new(Color::BLACK, curve.style.size as f64)),
    });
}

fn draw_scatter(scene: &mut Scene, points: &[DVec2], mean: DVec2, tips: &[DVec2; 2], scales: &PlanarScales) {
    for &p in points {
        scene.push(Node::Circle {
            center: scales.to_pixel(p),
            radius: POINT_RADIUS,
            fill: Color::DARK_GREEN,
        });
    }

    let origin = scales.to_pixel(mean);
    for (tip, handle) in tips.iter().zip([DragHandle::Eigen1, DragHandle::Eigen2]) {
        let tip_px = scales.to_pixel(*tip);
        scene.push(Node::Line {
            from: origin,
            to: tip_px,
            stroke: Stroke::new(Color::DARK_GOLD, ARROW_WIDTH),
            arrow: Some(ARROW_HEAD),
        });
        scene.hit_targets.push(HitTarget {
            handle,
            center: tip_px,
            radius: HANDLE_HIT_RADIUS,
        });
    }

    scene.push(Node::Circle {
        center: origin,
        radius: MEAN_RADIUS,
        fill: Color::DARK_RED,
    });
    scene.hit_targets.push(HitTarget {
        handle: DragHandle::Mean,
        center: origin,
        radius: MEAN_RADIUS,
    });
}
