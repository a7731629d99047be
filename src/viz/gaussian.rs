use super::{Readout, Visualization};
use crate::chart::{Chart, ChartKind, ChartRenderer, Curve};
use crate::config::{check_domain, check_sampling, GaussianConfig};
use crate::core::{Color, GaussianParams, Margins, Style};
use crate::formula;
use crate::param::NumericParameter;
use crate::scene::Scene;
use crate::stats;
use crate::Result;
use glam::DVec2;

/// Density of N(μ, σ²) driven by a mean and a std slider.
#[derive(Debug)]
pub struct GaussianExplorer {
    mean: NumericParameter,
    std: NumericParameter,
    xs: Vec<f64>,
    x_domain: [f64; 2],
    y_domain: [f64; 2],
    height: f64,
    margins: Margins,
}

impl GaussianExplorer {
    pub fn from_config(config: &GaussianConfig) -> Result<Self> {
        check_sampling(config.x_domain, config.sample_step)?;
        check_domain("y_domain", config.y_domain)?;
        Ok(Self {
            mean: config.mean.build()?,
            std: config.std.build()?,
            xs: stats::sample_grid(config.x_domain[0], config.x_domain[1], config.sample_step),
            x_domain: config.x_domain,
            y_domain: config.y_domain,
            height: config.height,
            margins: config.margins,
        })
    }

    pub fn mean(&self) -> &NumericParameter {
        &self.mean
    }

    pub fn std(&self) -> &NumericParameter {
        &self.std
    }

    pub fn params(&self) -> GaussianParams {
        GaussianParams::new(self.mean.value(), self.std.value())
    }

    fn chart(&self) -> Chart {
        let params = self.params();
        Chart {
            margins: self.margins,
            kind: ChartKind::Density {
                x_domain: self.x_domain,
                y_domain: self.y_domain,
                curves: vec![density_curve(&self.xs, params, Style::default().color(Color::GOLD).size(2.5))],
            },
        }
    }
}

pub(super) fn density_curve(xs: &[f64], params: GaussianParams, style: Style) -> Curve {
    Curve {
        samples: xs.iter().map(|&x| DVec2::new(x, params.pdf(x))).collect(),
        style,
    }
}

impl Visualization for GaussianExplorer {
    fn name(&self) -> &'static str {
        "gaussian"
    }

    fn parameters(&self) -> Vec<(&'static str, NumericParameter)> {
        vec![("mean", self.mean.clone()), ("std", self.std.clone())]
    }

    fn draw(&self, renderer: &mut ChartRenderer, size: DVec2) -> Scene {
        renderer.render(size, &self.chart())
    }

    fn height_for(&self, _width: f64) -> f64 {
        self.height
    }

    fn readouts(&self) -> Vec<Readout> {
        vec![
            Readout {
                label: self.mean.label().to_string(),
                latex: formula::fixed2(self.mean.value()),
            },
            Readout {
                label: self.std.label().to_string(),
                latex: formula::fixed2(self.std.value()),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Node;

    #[test]
    fn curve_peaks_at_the_mean() {
        let viz = GaussianExplorer::from_config(&GaussianConfig::default()).unwrap();
        viz.mean.set_value(1.0);
        let ChartKind::Density { curves, .. } = viz.chart().kind else {
            panic!("expected a density chart");
        };
        let peak = curves[0]
            .samples
            .iter()
            .copied()
            .fold(DVec2::new(0.0, f64::MIN), |best, p| if p.y > best.y { p } else { best });
        assert!((peak.x - 1.0).abs() < 0.011);
        assert_eq!(curves[0].samples.len(), 1000);
    }

    #[test]
    fn draws_one_filled_area() {
        let viz = GaussianExplorer::from_config(&GaussianConfig::default()).unwrap();
        let scene = viz.draw(&mut ChartRenderer::new(), DVec2::new(600.0, 450.0));
        let areas = scene.nodes.iter().filter(|n| matches!(n, Node::Area { .. })).count();
        assert_eq!(areas, 1);
    }
}
