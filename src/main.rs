//! Reads a model bundle from a local directory, measures its somatic input resistance
//! and tunes the soma leak conductance toward the input resistance given in an
//! optional user specification
//!
//! ```text
//! rin-tuning 488683425 user_specifications.json
//! rin-tuning "http://celltypes.brain-map.org/experiment/electrophysiology/488683425"
//! ```

use std::{fs::File, io::BufWriter, path::PathBuf};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use rin_tuning::{
    compartment::{passive::SingleCompartmentBuilder, CompartmentReference},
    config::{load_user_specifications, TuningTarget},
    error::{ModelSourceError, RInTuningError},
    model::{DirectoryModelSource, ModelIdentifier, ModelSource},
    pipeline::{PipelineSettings, TuningPipeline},
    plotting::DEFAULT_PLOT_FILE,
    simulation::SimulationConfig,
};


#[derive(Parser)]
#[command(name = "rin-tuning")]
#[command(about = "Measures somatic input resistance and tunes leak conductance toward a target", long_about = None)]
struct Cli {
    /// Model identifier, a number or a URL containing it
    model_id: Option<String>,

    /// JSON file with the target input resistance and passive defaults
    user_specifications: Option<PathBuf>,

    /// Directory holding model bundles as <MODEL_ROOT>/<id>/manifest.json
    #[arg(long, default_value = "models")]
    model_root: PathBuf,

    /// Directory the model bundle is copied to
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,

    /// Stimulus amplitude (nA)
    #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
    stim_amp: f64,

    /// Stimulus delay (ms)
    #[arg(long, default_value_t = 100.)]
    stim_delay: f64,

    /// Stimulus duration (ms)
    #[arg(long, default_value_t = 800.)]
    stim_dur: f64,

    /// Simulation end time (ms)
    #[arg(long, default_value_t = 1000.)]
    tstop: f64,

    /// Initial membrane potential (mV)
    #[arg(long, default_value_t = -65., allow_negative_numbers = true)]
    v_init: f64,

    /// Integration timestep (ms)
    #[arg(long, default_value_t = 0.025)]
    dt: f64,

    /// Where to save the voltage trace
    #[arg(long, default_value = DEFAULT_PLOT_FILE)]
    plot_path: PathBuf,

    /// Skip plotting the voltage trace
    #[arg(long)]
    no_plot: bool,

    /// Skip the verification run of the patched model
    #[arg(long)]
    skip_verification: bool,

    /// Write the patched fit parameters to this file
    #[arg(long)]
    write_patched: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), RInTuningError> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let model_id = ModelIdentifier::from_argument(cli.model_id.as_deref())?;
    info!("getting cell {}", model_id);

    let target = match &cli.user_specifications {
        Some(path) => load_user_specifications(path)?,
        None => TuningTarget::default(),
    };

    let source = DirectoryModelSource::new(&cli.model_root);
    let descriptor = source.query(model_id)?;
    let assets = source.materialize(&descriptor, &cli.work_dir)?;
    info!(
        "soma diam {:.3} um, L {:.3} um",
        assets.soma.diameter, assets.soma.length,
    );

    let settings = PipelineSettings {
        simulation: SimulationConfig {
            stim_amp: cli.stim_amp,
            stim_delay: cli.stim_delay,
            stim_dur: cli.stim_dur,
            tstop: cli.tstop,
            location: CompartmentReference::soma(),
            v_init: cli.v_init,
        },
        plot_path: if cli.no_plot { None } else { Some(cli.plot_path.clone()) },
        verify: !cli.skip_verification,
        ..PipelineSettings::default()
    };

    let builder = SingleCompartmentBuilder::new(assets.soma, cli.dt);
    let mut pipeline = TuningPipeline::new(builder, settings);
    let report = pipeline.run(assets.description, &target)?;

    info!("finished at stage {:?}", report.stage);
    info!("baseline r_in {:.3} MOhm", report.baseline.r_in);
    if let Some(verification) = &report.verification {
        info!("tuned r_in {:.3} MOhm", verification.r_in);
    }

    if let Some(path) = &cli.write_patched {
        let file = File::create(path)
            .map_err(|e| ModelSourceError::Io(format!("{}: {}", path.display(), e)))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report.description)
            .map_err(|e| ModelSourceError::Io(format!("{}: {}", path.display(), e)))?;
        info!("wrote patched fit parameters to {}", path.display());
    }

    Ok(())
}
