use super::{Readout, Visualization};
use crate::chart::ChartRenderer;
use crate::config::StepperConfig;
use crate::param::NumericParameter;
use crate::scene::{Node, Scene};
use crate::Result;
use glam::DVec2;

/// A slider stepping through pre-rendered noised frames of one image.
#[derive(Debug)]
pub struct DiffusionStepper {
    step: NumericParameter,
    frames: u32,
    pattern: String,
    width_fraction: f64,
}

impl DiffusionStepper {
    pub fn from_config(config: &StepperConfig) -> Result<Self> {
        Ok(Self {
            step: config.slider.build()?,
            frames: config.frames,
            pattern: config.image_pattern.clone(),
            width_fraction: config.width_fraction.clamp(0.0, 1.0),
        })
    }

    pub fn step(&self) -> &NumericParameter {
        &self.step
    }

    /// Step 1 shows the noisiest frame.
    pub fn frame(&self) -> i64 {
        self.frames as i64 - self.step.value().round() as i64 + 2
    }

    pub fn image_href(&self) -> String {
        self.pattern.replace("{frame}", &self.frame().to_string())
    }
}

impl Visualization for DiffusionStepper {
    fn name(&self) -> &'static str {
        "stepper"
    }

    fn parameters(&self) -> Vec<(&'static str, NumericParameter)> {
        vec![("step", self.step.clone())]
    }

    fn draw(&self, _renderer: &mut ChartRenderer, size: DVec2) -> Scene {
        let mut scene = Scene::new(size);
        let side = (size.x * self.width_fraction).min(size.y);
        if !(side > 0.0) {
            tracing::warn!(width = size.x, height = size.y, "container too small to draw, skipping render");
            return scene;
        }
        scene.push(Node::Image {
            origin: DVec2::new((size.x - side) * 0.5, 0.0),
            size: DVec2::splat(side),
            href: self.image_href(),
        });
        scene
    }

    fn height_for(&self, width: f64) -> f64 {
        width * self.width_fraction
    }

    fn readouts(&self) -> Vec<Readout> {
        vec![Readout {
            label: self.step.label().to_string(),
            latex: format!("{}", self.step.value()),
        }]
    }
}
