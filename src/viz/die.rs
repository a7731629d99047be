use super::Visualization;
use crate::chart::{Chart, ChartKind, ChartRenderer};
use crate::config::{check_domain, DieConfig};
use crate::core::{Color, Style};
use crate::param::NumericParameter;
use crate::scene::Scene;
use crate::{Result, VizError};
use error_stack::Report;
use glam::DVec2;

/// Static bar chart of a six-sided die.
#[derive(Debug)]
pub struct DieDistribution {
    chart: Chart,
    height: f64,
}

impl DieDistribution {
    pub fn fair() -> Self {
        Self::build(&DieConfig::fair())
    }

    pub fn loaded() -> Self {
        Self::build(&DieConfig::loaded())
    }

    pub fn from_config(config: &DieConfig) -> Result<Self> {
        check_domain("y_domain", config.y_domain)?;
        if config.probabilities.is_empty() {
            return Err(Report::new(VizError::InvalidParameter {
                name: "probabilities".to_string(),
                reason: "need at least one face".to_string(),
            }));
        }
        if let Some(p) = config.probabilities.iter().find(|p| !(p.is_finite() && **p >= 0.0)) {
            return Err(Report::new(VizError::InvalidParameter {
                name: "probabilities".to_string(),
                reason: format!("{p} is not a probability"),
            }));
        }
        Ok(Self::build(config))
    }

    fn build(config: &DieConfig) -> Self {
        let categories = (1..=config.probabilities.len()).map(|i| i.to_string()).collect();
        Self {
            chart: Chart {
                margins: config.margins,
                kind: ChartKind::Bars {
                    categories,
                    values: config.probabilities.clone(),
                    y_domain: config.y_domain,
                    padding: config.padding,
                    style: Style::default().color(Color::AMBER).size(2.5),
                },
            },
            height: config.height,
        }
    }

    pub fn probabilities(&self) -> &[f64] {
        match &self.chart.kind {
            ChartKind::Bars { values, .. } => values,
            _ => &[],
        }
    }
}

impl Visualization for DieDistribution {
    fn name(&self) -> &'static str {
        "die"
    }

    fn parameters(&self) -> Vec<(&'static str, NumericParameter)> {
        vec![]
    }

    fn draw(&self, renderer: &mut ChartRenderer, size: DVec2) -> Scene {
        renderer.render(size, &self.chart)
    }

    fn height_for(&self, _width: f64) -> f64 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Node;

    #[test]
    fn loaded_die_has_a_heavy_six() {
        let die = DieDistribution::loaded();
        let p = die.probabilities();
        assert_eq!(p.len(), 6);
        assert!(p[5] > p[0] && p[1] < p[0]);
    }

    #[test]
    fn taller_bars_for_likelier_faces() {
        let die = DieDistribution::loaded();
        let scene = die.draw(&mut ChartRenderer::new(), DVec2::new(660.0, 400.0));
        let heights: Vec<f64> = scene
            .nodes
            .iter()
            .filter_map(|n| match n {
                Node::Rect { size, .. } => Some(size.y),
                _ => None,
            })
            .collect();
        assert_eq!(heights.len(), 6);
        assert!(heights[5] > heights[0]);
        assert!(heights[1] < heights[0]);
    }

    #[test]
    fn rejects_negative_probability() {
        let config = DieConfig {
            probabilities: vec![0.5, -0.1],
            ..DieConfig::default()
        };
        assert!(DieDistribution::from_config(&config).is_err());
    }
}
