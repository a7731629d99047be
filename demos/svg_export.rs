//! Render one visualization to SVG on stdout.
//!
//! cargo run --example svg_export -- --kind kl --set mean_p=1.2 > kl.svg

use clap::Parser;
use diffusion_viz::prelude::*;
use error_stack::{Report, ResultExt};
use glam::DVec2;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Clone, Debug)]
#[command(name = "svg_export")]
#[command(about = "Render a diffusion-primer visualization as SVG")]
struct Args {
    /// Visualization kind: die, loaded_die, gaussian, kl, covariance, stepper
    #[arg(long, default_value = "kl")]
    kind: String,

    /// JSON config file; overrides --kind
    #[arg(long)]
    config: Option<String>,

    /// Container width in pixels
    #[arg(long, default_value = "600")]
    width: f64,

    /// Container height in pixels; defaults to the visualization's own
    #[arg(long)]
    height: Option<f64>,

    /// Slider assignments, `name=value`
    #[arg(long = "set")]
    sets: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "diffusion_viz=debug".into()),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path).change_context(VizError::Config)?;
            VisualizationConfig::from_json(&json)?
        }
        None => VisualizationConfig::default_for(&args.kind)?,
    };
    info!(kind = config.kind(), "exporting");

    let mounted = mount_config(&config, Container::new(args.width, 0.0))?;
    let height = args.height.unwrap_or_else(|| mounted.height_for(args.width));
    mounted.resize(DVec2::new(args.width, height));

    for assignment in &args.sets {
        let (name, raw) = assignment
            .split_once('=')
            .ok_or_else(|| Report::new(VizError::InvalidInput(assignment.clone())))?;
        let value = mounted.set_parameter_input(name.trim(), raw)?;
        info!(name, value, "slider set");
    }

    for readout in mounted.readouts() {
        info!(label = %readout.label, value = %readout.latex, "readout");
    }
    println!("{}", mounted.scene().to_svg());
    Ok(())
}
