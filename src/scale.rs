//! Domain → pixel mappings and axis ticks.

use glam::DVec2;
use serde::{Deserialize, Serialize};

// Anything denser is not a readable axis.
const MAX_TICKS: f64 = 1000.0;

/// Monotonic linear map from `domain` to `range` (pixels).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
}

impl LinearScale {
    pub const fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, x: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let span = d1 - d0;
        if span == 0.0 {
            return (r0 + r1) * 0.5;
        }
        r0 + (x - d0) / span * (r1 - r0)
    }

    pub fn invert(&self, px: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let span = r1 - r0;
        if span == 0.0 {
            return (d0 + d1) * 0.5;
        }
        d0 + (px - r0) / span * (d1 - d0)
    }

    /// Ticks on a "nice" step covering the domain, roughly `count` of them.
    pub fn ticks(&self, count: usize) -> Vec<Tick> {
        let lo = self.domain[0].min(self.domain[1]);
        let hi = self.domain[0].max(self.domain[1]);
        let width = hi - lo;
        if !width.is_finite() {
            return vec![];
        }
        let step = nice_step(width, count);
        let start = (lo / step - 1e-9).ceil();
        let end = (hi / step + 1e-9).floor();
        if !(end - start <= MAX_TICKS) {
            return vec![];
        }
        (start as i64..=end as i64)
            .map(|i| {
                let value = i as f64 * step;
                Tick {
                    value,
                    offset: self.apply(value),
                    label: format_tick(value, step),
                }
            })
            .collect()
    }
}

/// Evenly spaced bands over discrete categories, with `padding` used for both
/// the inner gaps and the outer edges (as a fraction of one step).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandScale {
    pub domain: Vec<String>,
    pub range: [f64; 2],
    pub padding: f64,
}

impl BandScale {
    pub fn new(domain: Vec<String>, range: [f64; 2], padding: f64) -> Self {
        Self {
            domain,
            range,
            padding: padding.clamp(0.0, 1.0),
        }
    }

    pub fn step(&self) -> f64 {
        let n = self.domain.len() as f64;
        let [r0, r1] = self.range;
        (r1 - r0) / (n - self.padding + 2.0 * self.padding).max(1.0)
    }

    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    /// Left edge of the band for `index`.
    pub fn position_of(&self, index: usize) -> Option<f64> {
        if index >= self.domain.len() {
            return None;
        }
        let n = self.domain.len() as f64;
        let [r0, r1] = self.range;
        let step = self.step();
        let start = r0 + ((r1 - r0) - step * (n - self.padding)) * 0.5;
        Some(start + step * index as f64)
    }

    /// One tick centred under each band.
    pub fn ticks(&self) -> Vec<Tick> {
        let half = self.bandwidth() * 0.5;
        self.domain
            .iter()
            .enumerate()
            .filter_map(|(i, label)| {
                self.position_of(i).map(|x| Tick {
                    value: i as f64,
                    offset: x + half,
                    label: label.clone(),
                })
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub value: f64,
    /// Pixel position along the axis.
    pub offset: f64,
    pub label: String,
}

/// Linear x/y scales for charts that map the pointer back into data space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanarScales {
    pub x: LinearScale,
    pub y: LinearScale,
}

impl PlanarScales {
    pub fn to_pixel(&self, p: DVec2) -> DVec2 {
        DVec2::new(self.x.apply(p.x), self.y.apply(p.y))
    }

    pub fn to_domain(&self, px: DVec2) -> DVec2 {
        DVec2::new(self.x.invert(px.x), self.y.invert(px.y))
    }
}

/// Calculate nice tick step for given range.
pub fn nice_step(range: f64, target_ticks: usize) -> f64 {
    if range <= 0.0 || !range.is_finite() {
        return 1.0;
    }
    let rough = range / target_ticks.max(1) as f64;
    let exp = rough.log10().floor();
    let base = 10f64.powf(exp);

    let normalized = rough / base;
    let nice = if normalized <= 1.5 {
        1.0
    } else if normalized <= 3.0 {
        2.0
    } else if normalized <= 7.0 {
        5.0
    } else {
        10.0
    };

    nice * base
}

/// Format tick value with as many decimals as the step needs.
pub fn format_tick(val: f64, step: f64) -> String {
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10().floor()) as usize
    };
    let text = format!("{:.*}", decimals, val);
    // "-0" / "-0.0" read badly on an axis
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text[1..].to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_maps_and_inverts() {
        let s = LinearScale::new([-5.0, 5.0], [0.0, 500.0]);
        assert_eq!(s.apply(-5.0), 0.0);
        assert_eq!(s.apply(0.0), 250.0);
        assert!((s.invert(s.apply(1.7)) - 1.7).abs() < 1e-12);
    }

    #[test]
    fn inverted_range_for_y_axis() {
        let s = LinearScale::new([0.0, 0.5], [400.0, 0.0]);
        assert_eq!(s.apply(0.0), 400.0);
        assert_eq!(s.apply(0.5), 0.0);
        assert!((s.invert(200.0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn degenerate_domain_maps_to_middle() {
        let s = LinearScale::new([1.0, 1.0], [0.0, 10.0]);
        assert_eq!(s.apply(3.0), 5.0);
    }

    #[test]
    fn ticks_cover_domain() {
        let s = LinearScale::new([-5.0, 5.0], [0.0, 100.0]);
        let ticks = s.ticks(10);
        assert_eq!(ticks.first().unwrap().value, -5.0);
        assert_eq!(ticks.last().unwrap().value, 5.0);
        assert_eq!(ticks.len(), 11);
        assert_eq!(ticks[5].label, "0");
    }

    #[test]
    fn fractional_ticks_are_labelled_with_step_precision() {
        let s = LinearScale::new([0.0, 0.5], [400.0, 0.0]);
        let labels: Vec<String> = s.ticks(10).into_iter().map(|t| t.label).collect();
        assert_eq!(labels.first().unwrap(), "0.00");
        assert!(labels.contains(&"0.25".to_string()));
        assert_eq!(labels.last().unwrap(), "0.50");
    }

    #[test]
    fn unbounded_domains_have_no_ticks() {
        assert!(LinearScale::new([-1e308, 1e308], [0.0, 500.0]).ticks(10).is_empty());
        assert!(LinearScale::new([0.0, f64::NAN], [0.0, 500.0]).ticks(10).is_empty());
        assert!(LinearScale::new([0.0, f64::INFINITY], [0.0, 500.0]).ticks(10).is_empty());
        let wide = LinearScale::new([0.0, 1e300], [0.0, 500.0]).ticks(10);
        assert!((10..=12).contains(&wide.len()));
    }

    #[test]
    fn band_positions_with_padding() {
        let keys: Vec<String> = (1..=6).map(|i| i.to_string()).collect();
        let s = BandScale::new(keys, [0.0, 620.0], 0.2);
        // step = 620 / (6 - 0.2 + 0.4) = 100
        assert!((s.step() - 100.0).abs() < 1e-9);
        assert!((s.bandwidth() - 80.0).abs() < 1e-9);
        assert!((s.position_of(0).unwrap() - 20.0).abs() < 1e-9);
        assert!((s.position_of(5).unwrap() - 520.0).abs() < 1e-9);
        assert!(s.position_of(6).is_none());
        assert!((s.ticks()[0].offset - 60.0).abs() < 1e-9);
    }

    #[test]
    fn negative_zero_label() {
        assert_eq!(format_tick(-0.0, 0.1), "0.0");
        assert_eq!(format_tick(-1e-17, 1.0), "0");
        assert_eq!(format_tick(-1.5, 0.5), "-1.5");
    }
}
