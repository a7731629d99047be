use super::{PointerEvent, Readout, Visualization};
use crate::chart::{Chart, ChartKind, ChartRenderer};
use crate::config::{check_domain, check_point_count, CovarianceConfig};
use crate::core::{CovarianceModel, Margins, MeanVector};
use crate::drag::{CovarianceState, DragController, DragState};
use crate::formula;
use crate::param::NumericParameter;
use crate::scale::PlanarScales;
use crate::scene::Scene;
use crate::stats;
use crate::Result;
use glam::DVec2;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Point cloud of N(μ, Σ) with draggable mean and eigenvector handles.
///
/// The standard-normal draws are made once; every redraw re-projects them
/// through the current model so the cloud deforms instead of resampling.
#[derive(Debug)]
pub struct CovarianceExplorer {
    samples: Vec<DVec2>,
    state: Mutex<CovarianceState>,
    drag: Mutex<DragController>,
    domain: [f64; 2],
    margins: Margins,
}

impl CovarianceExplorer {
    pub fn from_config(config: &CovarianceConfig) -> Result<Self> {
        check_domain("domain", config.domain)?;
        check_point_count(config.num_points)?;
        let model = config.model()?;
        let mut rng = SmallRng::seed_from_u64(config.seed);
        Ok(Self {
            samples: stats::standard_normal_samples(config.num_points, &mut rng),
            state: Mutex::new(CovarianceState {
                model,
                mean: config.mean(),
            }),
            drag: Mutex::new(DragController::new()),
            domain: config.domain,
            margins: config.margins,
        })
    }

    pub fn state(&self) -> CovarianceState {
        *self.state.lock()
    }

    pub fn model(&self) -> CovarianceModel {
        self.state.lock().model
    }

    pub fn mean(&self) -> MeanVector {
        self.state.lock().mean
    }

    pub fn drag_state(&self) -> DragState {
        self.drag.lock().state()
    }

    /// The fixed standard-normal draws.
    pub fn samples(&self) -> &[DVec2] {
        &self.samples
    }

    pub fn points(&self) -> Vec<DVec2> {
        let state = self.state();
        stats::project_samples(&self.samples, &state.model, state.mean)
    }

    /// Σ, row-major.
    pub fn covariance_table(&self) -> [[f64; 2]; 2] {
        self.model().covariance().transpose().to_cols_array_2d()
    }

    pub fn mean_table(&self) -> [f64; 2] {
        let mean = self.mean();
        [mean.x, mean.y]
    }
}

impl Visualization for CovarianceExplorer {
    fn name(&self) -> &'static str {
        "covariance"
    }

    fn parameters(&self) -> Vec<(&'static str, NumericParameter)> {
        vec![]
    }

    fn draw(&self, renderer: &mut ChartRenderer, size: DVec2) -> Scene {
        let state = self.state();
        let chart = Chart {
            margins: self.margins,
            kind: ChartKind::Scatter {
                domain: self.domain,
                points: stats::project_samples(&self.samples, &state.model, state.mean),
                mean: state.mean.as_dvec2(),
                tips: [
                    state.model.arrow_tip(0, state.mean),
                    state.model.arrow_tip(1, state.mean),
                ],
            },
        };
        renderer.render(size, &chart)
    }

    fn height_for(&self, width: f64) -> f64 {
        width
    }

    fn on_pointer(&self, event: PointerEvent, scene: &Scene, scales: Option<&PlanarScales>) -> bool {
        match event {
            PointerEvent::Down(px) => {
                self.drag.lock().pointer_down(px, scene);
                false
            }
            PointerEvent::Move(px) => {
                let Some(scales) = scales else {
                    return false;
                };
                let current = self.state();
                let next = self.drag.lock().pointer_move(px, scales, &current);
                match next {
                    Some(next) => {
                        *self.state.lock() = next;
                        true
                    }
                    None => false,
                }
            }
            PointerEvent::Up => {
                self.drag.lock().pointer_up();
                false
            }
        }
    }

    fn readouts(&self) -> Vec<Readout> {
        let state = self.state();
        vec![
            Readout {
                label: r"\Sigma".to_string(),
                latex: formula::matrix_latex(state.model.covariance()),
            },
            Readout {
                label: r"\mu".to_string(),
                latex: formula::vector_latex(state.mean.as_dvec2()),
            },
        ]
    }
}
