//! Drag the mean and eigenvector tips of a 2-D Gaussian in a window.

use diffusion_viz::prelude::*;
use diffusion_viz::runtime::run_visualization;

fn main() -> Result<()> {
    let config = CovarianceConfig {
        num_points: 600,
        seed: 7,
        ..CovarianceConfig::default()
    };
    run_visualization(VisualizationConfig::Covariance(config))
}
