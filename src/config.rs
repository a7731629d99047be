//! Initial state for each visualization, deserializable from the page.
//!
//! Every field has a default equal to the values the blog ships with, so
//! `{"kind": "kl"}` alone is a complete config.

use crate::core::{CovarianceModel, Margins, MeanVector};
use crate::param::NumericParameter;
use crate::scene::Container;
use crate::viz::{
    Composition, CovarianceExplorer, DiffusionStepper, DieDistribution, GaussianExplorer,
    KlDivergenceExplorer, MountedVisualization,
};
use crate::{Result, VizError};
use error_stack::{Report, ResultExt};
use glam::{DMat2, DVec2};
use serde::{Deserialize, Serialize};

/// Upper bound on scatter points per chart.
pub const MAX_POINTS: usize = 1000;
/// Upper bound on samples per density curve.
pub const MAX_CURVE_SAMPLES: usize = 1000;

fn invalid(name: &str, reason: String) -> Report<VizError> {
    Report::new(VizError::InvalidParameter {
        name: name.to_string(),
        reason,
    })
}

/// A finite, increasing axis domain.
pub(crate) fn check_domain(name: &str, domain: [f64; 2]) -> Result<()> {
    let [d0, d1] = domain;
    if !(d0.is_finite() && d1.is_finite()) {
        return Err(invalid(name, format!("domain {domain:?} must be finite")));
    }
    if !(d0 < d1) {
        return Err(invalid(name, format!("domain {domain:?} must be increasing")));
    }
    Ok(())
}

/// A sampling step that keeps a curve over `x_domain` within [`MAX_CURVE_SAMPLES`].
pub(crate) fn check_sampling(x_domain: [f64; 2], step: f64) -> Result<()> {
    check_domain("x_domain", x_domain)?;
    if !(step > 0.0 && step.is_finite()) {
        return Err(invalid("sample_step", format!("{step} must be positive")));
    }
    let samples = (x_domain[1] - x_domain[0]) / step;
    if !(samples <= MAX_CURVE_SAMPLES as f64 + 1e-6) {
        return Err(invalid(
            "sample_step",
            format!("{step} gives {samples:.0} samples, at most {MAX_CURVE_SAMPLES} allowed"),
        ));
    }
    Ok(())
}

pub(crate) fn check_point_count(n: usize) -> Result<()> {
    if n > MAX_POINTS {
        return Err(invalid("num_points", format!("{n} exceeds {MAX_POINTS}")));
    }
    Ok(())
}

/// One range input. All five fields are required when given.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SliderConfig {
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
}

impl SliderConfig {
    pub fn new(label: impl Into<String>, min: f64, max: f64, step: f64, value: f64) -> Self {
        Self {
            label: label.into(),
            min,
            max,
            step,
            value,
        }
    }

    pub fn build(&self) -> Result<NumericParameter> {
        NumericParameter::new(self.label.clone(), self.min, self.max, self.step, self.value)
    }
}

// Standard deviations stop at 0.1: a zero std has no density.
fn mean_slider(label: &str, value: f64) -> SliderConfig {
    SliderConfig::new(label, -5.0, 5.0, 0.1, value)
}

fn std_slider(label: &str) -> SliderConfig {
    SliderConfig::new(label, 0.1, 10.0, 0.1, 1.0)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DieConfig {
    pub probabilities: Vec<f64>,
    pub y_domain: [f64; 2],
    pub padding: f64,
    pub height: f64,
    pub margins: Margins,
}

impl DieConfig {
    pub fn fair() -> Self {
        Self::default()
    }

    pub fn loaded() -> Self {
        Self {
            probabilities: vec![1.0 / 6.0, 1.0 / 12.0, 0.10, 0.15, 1.0 / 6.0, 1.0 / 3.0],
            ..Self::default()
        }
    }
}

impl Default for DieConfig {
    fn default() -> Self {
        Self {
            probabilities: vec![1.0 / 6.0; 6],
            y_domain: [0.0, 0.4],
            padding: 0.2,
            height: 400.0,
            margins: Margins::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaussianConfig {
    pub mean: SliderConfig,
    pub std: SliderConfig,
    pub x_domain: [f64; 2],
    pub y_domain: [f64; 2],
    pub sample_step: f64,
    pub height: f64,
    pub margins: Margins,
}

impl Default for GaussianConfig {
    fn default() -> Self {
        Self {
            mean: mean_slider(r"\mu", 0.0),
            std: std_slider(r"\sigma"),
            x_domain: [-5.0, 5.0],
            y_domain: [0.0, 0.5],
            sample_step: 0.01,
            height: 450.0,
            margins: Margins::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KlConfig {
    pub mean_q: SliderConfig,
    pub std_q: SliderConfig,
    pub mean_p: SliderConfig,
    pub std_p: SliderConfig,
    pub x_domain: [f64; 2],
    pub y_domain: [f64; 2],
    pub sample_step: f64,
    pub height: f64,
    pub opacity: f32,
    pub margins: Margins,
}

impl Default for KlConfig {
    fn default() -> Self {
        Self {
            mean_q: mean_slider(r"\mu_Q", -0.3),
            std_q: std_slider(r"\sigma_Q"),
            mean_p: mean_slider(r"\mu_P", 0.3),
            std_p: std_slider(r"\sigma_P"),
            x_domain: [-5.0, 5.0],
            y_domain: [0.0, 0.5],
            sample_step: 0.01,
            height: 450.0,
            opacity: 0.7,
            margins: Margins::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CovarianceConfig {
    pub eigenvalues: [f64; 2],
    /// Eigenvectors as columns.
    pub eigenvectors: [[f64; 2]; 2],
    pub mean: [f64; 2],
    pub num_points: usize,
    pub seed: u64,
    pub domain: [f64; 2],
    pub margins: Margins,
}

impl CovarianceConfig {
    pub fn model(&self) -> Result<CovarianceModel> {
        let [c0, c1] = self.eigenvectors;
        CovarianceModel::new(
            DVec2::from(self.eigenvalues),
            DMat2::from_cols(DVec2::from(c0), DVec2::from(c1)),
        )
    }

    pub fn mean(&self) -> MeanVector {
        MeanVector::new(self.mean[0], self.mean[1])
    }
}

impl Default for CovarianceConfig {
    fn default() -> Self {
        let h = std::f64::consts::FRAC_1_SQRT_2;
        Self {
            eigenvalues: [2.0, 1.0],
            eigenvectors: [[h, h], [h, -h]],
            mean: [0.0, 0.0],
            num_points: 1000,
            seed: 0x5eed,
            domain: [-5.0, 5.0],
            margins: Margins::uniform(20.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepperConfig {
    pub slider: SliderConfig,
    pub frames: u32,
    /// Image path with a `{frame}` placeholder.
    pub image_pattern: String,
    /// Image width as a share of the container width.
    pub width_fraction: f64,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            slider: SliderConfig::new("diffusion step", 1.0, 20.0, 1.0, 1.0),
            frames: 20,
            image_pattern: "src/assets/noised-images-intro/astronaut/astronaut-{frame}.jpg".to_string(),
            width_fraction: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VisualizationConfig {
    Die(DieConfig),
    Gaussian(GaussianConfig),
    Kl(KlConfig),
    Covariance(CovarianceConfig),
    Stepper(StepperConfig),
}

impl VisualizationConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).change_context(VizError::Config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).change_context(VizError::Config)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Die(_) => "die",
            Self::Gaussian(_) => "gaussian",
            Self::Kl(_) => "kl",
            Self::Covariance(_) => "covariance",
            Self::Stepper(_) => "stepper",
        }
    }

    /// Default config for a `kind` name.
    pub fn default_for(kind: &str) -> Result<Self> {
        Ok(match kind {
            "die" => Self::Die(DieConfig::fair()),
            "loaded_die" => Self::Die(DieConfig::loaded()),
            "gaussian" => Self::Gaussian(GaussianConfig::default()),
            "kl" => Self::Kl(KlConfig::default()),
            "covariance" => Self::Covariance(CovarianceConfig::default()),
            "stepper" => Self::Stepper(StepperConfig::default()),
            other => {
                return Err(Report::new(VizError::InvalidInput(format!(
                    "unknown visualization kind `{other}`"
                ))));
            }
        })
    }
}

/// Build the visualization described by `config` and mount it into `container`.
pub fn mount_config(config: &VisualizationConfig, container: Container) -> Result<Box<dyn MountedVisualization>> {
    let mounted: Box<dyn MountedVisualization> = match config {
        VisualizationConfig::Die(c) => Box::new(Composition::mount(DieDistribution::from_config(c)?, container)),
        VisualizationConfig::Gaussian(c) => {
            Box::new(Composition::mount(GaussianExplorer::from_config(c)?, container))
        }
        VisualizationConfig::Kl(c) => Box::new(Composition::mount(KlDivergenceExplorer::from_config(c)?, container)),
        VisualizationConfig::Covariance(c) => {
            Box::new(Composition::mount(CovarianceExplorer::from_config(c)?, container))
        }
        VisualizationConfig::Stepper(c) => Box::new(Composition::mount(DiffusionStepper::from_config(c)?, container)),
    };
    Ok(mounted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_alone_is_a_complete_config() {
        let cfg = VisualizationConfig::from_json(r#"{"kind": "kl"}"#).unwrap();
        assert_eq!(cfg, VisualizationConfig::Kl(KlConfig::default()));
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let cfg = VisualizationConfig::from_json(r#"{"kind": "covariance", "num_points": 10, "seed": 3}"#).unwrap();
        let VisualizationConfig::Covariance(c) = cfg else {
            panic!("wrong kind");
        };
        assert_eq!(c.num_points, 10);
        assert_eq!(c.seed, 3);
        assert_eq!(c.eigenvalues, [2.0, 1.0]);
    }

    #[test]
    fn bad_json_is_a_config_error() {
        let err = VisualizationConfig::from_json(r#"{"kind": "pie"}"#).unwrap_err();
        assert!(matches!(err.current_context(), VizError::Config));
    }

    #[test]
    fn std_sliders_stay_above_zero() {
        let c = KlConfig::default();
        assert!(c.std_p.min > 0.0 && c.std_q.min > 0.0);
        assert!(GaussianConfig::default().std.min > 0.0);
    }

    #[test]
    fn default_covariance_model_is_valid() {
        let model = CovarianceConfig::default().model().unwrap();
        assert_eq!(model, CovarianceModel::default());
    }

    #[test]
    fn skewed_eigenvectors_are_rejected() {
        let c = CovarianceConfig {
            eigenvectors: [[1.0, 0.0], [1.0, 0.0]],
            ..CovarianceConfig::default()
        };
        assert!(c.model().is_err());
    }

    #[test]
    fn default_sampling_sits_at_the_curve_limit() {
        let c = GaussianConfig::default();
        assert!(check_sampling(c.x_domain, c.sample_step).is_ok());
        assert!(check_sampling(c.x_domain, c.sample_step / 2.0).is_err());
        assert!(check_sampling(c.x_domain, f64::NAN).is_err());
        assert!(check_domain("d", [0.0, f64::INFINITY]).is_err());
        assert!(check_point_count(MAX_POINTS).is_ok());
        assert!(check_point_count(MAX_POINTS + 1).is_err());
    }

    #[test]
    fn loaded_die_sums_to_one() {
        let sum: f64 = DieConfig::loaded().probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn default_lookup_by_kind() {
        assert_eq!(VisualizationConfig::default_for("kl").unwrap().kind(), "kl");
        assert!(VisualizationConfig::default_for("nope").is_err());
    }
}
