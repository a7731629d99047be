use super::gaussian::density_curve;
use super::{Readout, Visualization};
use crate::chart::{Chart, ChartKind, ChartRenderer};
use crate::config::{check_domain, check_sampling, KlConfig};
use crate::core::{Color, GaussianParams, Margins, Style};
use crate::formula;
use crate::param::NumericParameter;
use crate::scene::Scene;
use crate::stats;
use crate::Result;
use glam::DVec2;

/// Two overlaid Gaussians P and Q with a live KL(P‖Q) readout.
#[derive(Debug)]
pub struct KlDivergenceExplorer {
    mean_q: NumericParameter,
    std_q: NumericParameter,
    mean_p: NumericParameter,
    std_p: NumericParameter,
    xs: Vec<f64>,
    x_domain: [f64; 2],
    y_domain: [f64; 2],
    height: f64,
    opacity: f32,
    margins: Margins,
}

impl KlDivergenceExplorer {
    pub fn from_config(config: &KlConfig) -> Result<Self> {
        check_sampling(config.x_domain, config.sample_step)?;
        check_domain("y_domain", config.y_domain)?;
        Ok(Self {
            mean_q: config.mean_q.build()?,
            std_q: config.std_q.build()?,
            mean_p: config.mean_p.build()?,
            std_p: config.std_p.build()?,
            xs: stats::sample_grid(config.x_domain[0], config.x_domain[1], config.sample_step),
            x_domain: config.x_domain,
            y_domain: config.y_domain,
            height: config.height,
            opacity: config.opacity,
            margins: config.margins,
        })
    }

    pub fn p(&self) -> GaussianParams {
        GaussianParams::new(self.mean_p.value(), self.std_p.value())
    }

    pub fn q(&self) -> GaussianParams {
        GaussianParams::new(self.mean_q.value(), self.std_q.value())
    }

    /// KL(P‖Q) for the current slider values.
    pub fn divergence(&self) -> f64 {
        self.p().kl_divergence(&self.q())
    }

    pub fn divergence_text(&self) -> String {
        formula::fixed2(self.divergence())
    }
}

impl Visualization for KlDivergenceExplorer {
    fn name(&self) -> &'static str {
        "kl"
    }

    fn parameters(&self) -> Vec<(&'static str, NumericParameter)> {
        vec![
            ("mean_q", self.mean_q.clone()),
            ("std_q", self.std_q.clone()),
            ("mean_p", self.mean_p.clone()),
            ("std_p", self.std_p.clone()),
        ]
    }

    fn draw(&self, renderer: &mut ChartRenderer, size: DVec2) -> Scene {
        let style = Style::default().color(Color::GOLD).size(2.5).opacity(self.opacity);
        let chart = Chart {
            margins: self.margins,
            kind: ChartKind::Density {
                x_domain: self.x_domain,
                y_domain: self.y_domain,
                curves: vec![
                    density_curve(&self.xs, self.q(), style),
                    density_curve(&self.xs, self.p(), style),
                ],
            },
        };
        renderer.render(size, &chart)
    }

    fn height_for(&self, _width: f64) -> f64 {
        self.height
    }

    fn readouts(&self) -> Vec<Readout> {
        vec![Readout {
            label: formula::kl_label().to_string(),
            latex: self.divergence_text(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Node;

    fn explorer() -> KlDivergenceExplorer {
        KlDivergenceExplorer::from_config(&KlConfig::default()).unwrap()
    }

    #[test]
    fn default_readout() {
        let viz = explorer();
        assert_eq!(viz.divergence_text(), "0.18");
        assert_eq!(viz.readouts()[0].label, "D_{KL}(P||Q)");
    }

    #[test]
    fn matching_sliders_give_zero() {
        let viz = explorer();
        viz.mean_p.set_value(-0.3);
        assert_eq!(viz.divergence_text(), "0.00");
    }

    #[test]
    fn both_curves_are_translucent() {
        let viz = explorer();
        let scene = viz.draw(&mut ChartRenderer::new(), DVec2::new(600.0, 450.0));
        let fills: Vec<f32> = scene
            .nodes
            .iter()
            .filter_map(|n| match n {
                Node::Area { fill, .. } => Some(fill.a),
                _ => None,
            })
            .collect();
        assert_eq!(fills.len(), 2);
        assert!(fills.iter().all(|a| (a - 0.7).abs() < 1e-6));
    }
}
