//! Measures the input resistance of a cell, tunes its leak conductance toward a target
//! and verifies the result on a rebuilt cell.
//!
//! The pipeline moves strictly forward through [`PipelineStage`], any failure stops it
//! where it is and is returned to the caller, parameters are only patched once the
//! baseline measurement succeeded.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use crate::config::TuningTarget;
use crate::error::RInTuningError;
use crate::estimation::{estimate_input_resistance, RInResult};
use crate::geometry::measure_surface_area;
use crate::model::ModelDescription;
use crate::plotting::plot_voltage_trace;
use crate::simulation::{
    install_current_clamp, BuildCell, SimulationConfig, SimulationEngine, Trace, TraceRecorder,
};
use crate::tuning::{
    estimate_gbar, patch_parameters, ParameterChange, ParameterSelector, SectionSelector,
    MICROSIEMENS_TO_SIEMENS,
};


/// Stages of the pipeline in the order they are reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineStage {
    /// No cell has been built
    Unbuilt,
    /// Cell built with stimulus and recordings attached
    Configured,
    /// Baseline run finished and its input resistance computed
    BaselineRun,
    /// Parameters patched with the estimated conductance
    Tuned,
    /// Patched cell rebuilt, rerun and remeasured
    Verified,
}

/// Installs the stimulus described by `config` and attaches recordings at its location
pub fn configure_protocol<E: SimulationEngine>(
    engine: &mut E,
    config: &SimulationConfig,
) -> Result<TraceRecorder, RInTuningError> {
    install_current_clamp(engine, config)?;

    TraceRecorder::attach(engine, &config.location)
}

/// Runs a configured engine, optionally plots the trace and measures input resistance
pub fn run_protocol<E: SimulationEngine>(
    engine: &mut E,
    recorder: &TraceRecorder,
    config: &SimulationConfig,
    plot_path: Option<&Path>,
) -> Result<(Trace, RInResult), RInTuningError> {
    engine.initialize_and_run(config)?;
    let trace = recorder.trace(engine)?;

    if let Some(path) = plot_path {
        plot_voltage_trace(&trace, path)?;
    }

    let result = estimate_input_resistance(
        &trace,
        recorder.dt(),
        config.stim_delay,
        config.stim_dur,
        config.stim_amp,
    )?;

    if result.r_in < 0. {
        warn!("negative input resistance {:.3} MOhm, stimulus was not hyperpolarizing", result.r_in);
    }

    Ok((trace, result))
}

/// Installs a current step, runs the engine and measures input resistance in one go
pub fn measure_input_resistance<E: SimulationEngine>(
    engine: &mut E,
    config: &SimulationConfig,
    plot_path: Option<&Path>,
) -> Result<(Trace, RInResult), RInTuningError> {
    let recorder = configure_protocol(engine, config)?;

    run_protocol(engine, &recorder, config, plot_path)
}

/// Settings of a tuning run
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Protocol used for both the baseline and verification runs
    pub simulation: SimulationConfig,
    /// Where to save the voltage trace after each run, `None` to skip plotting
    pub plot_path: Option<PathBuf>,
    /// Whether to rebuild and remeasure the patched cell
    pub verify: bool,
    /// Sections receiving the estimated conductance
    pub sections: SectionSelector,
    /// Parameters receiving the estimated conductance
    pub parameters: ParameterSelector,
    /// Factor converting the estimate in uS/cm^2 to the units of the parameter
    pub conductance_scale: f64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        PipelineSettings {
            simulation: SimulationConfig::default(),
            plot_path: None,
            verify: true,
            sections: SectionSelector::named(["soma"]),
            parameters: ParameterSelector::named(["g_pas"]),
            conductance_scale: MICROSIEMENS_TO_SIEMENS,
        }
    }
}

/// Outcome of a tuning run
#[derive(Debug, Clone)]
pub struct TuningReport {
    /// Last stage reached
    pub stage: PipelineStage,
    /// Passive properties taken from the user specification
    pub filled_passive: Vec<&'static str>,
    /// Measurement of the unpatched cell
    pub baseline: RInResult,
    /// Surface area of the measured compartment (cm^2)
    pub surface_area: Option<f64>,
    /// Estimated leak conductance (uS/cm^2)
    pub gbar_estimate: Option<f64>,
    /// Changes made to the genome
    pub changes: Vec<ParameterChange>,
    /// Measurement of the patched cell
    pub verification: Option<RInResult>,
    /// Description with the patch applied, identical to the input when not tuned
    pub description: ModelDescription,
}

/// Drives a cell builder through measurement, tuning and verification
pub struct TuningPipeline<B: BuildCell> {
    builder: B,
    settings: PipelineSettings,
    stage: PipelineStage,
}

impl<B: BuildCell> TuningPipeline<B> {
    pub fn new(builder: B, settings: PipelineSettings) -> Self {
        TuningPipeline {
            builder,
            settings,
            stage: PipelineStage::Unbuilt,
        }
    }

    /// Last stage reached
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    fn advance(&mut self, next: PipelineStage) {
        debug!("pipeline stage {:?} -> {:?}", self.stage, next);
        self.stage = next;
    }

    /// Runs the pipeline on `description`, without a target input resistance the
    /// cell is only measured, the returned report holds the patched description
    pub fn run(
        &mut self,
        mut description: ModelDescription,
        target: &TuningTarget,
    ) -> Result<TuningReport, RInTuningError> {
        self.stage = PipelineStage::Unbuilt;
        let config = self.settings.simulation.clone();
        let plot_path = self.settings.plot_path.clone();

        let filled_passive = description.fill_missing_passive(&target.passive_defaults);

        let mut cell = self.builder.build(&description)?;
        let recorder = configure_protocol(&mut cell, &config)?;
        self.advance(PipelineStage::Configured);

        let (_, baseline) = run_protocol(&mut cell, &recorder, &config, plot_path.as_deref())?;
        self.advance(PipelineStage::BaselineRun);
        info!("baseline input resistance {:.3} MOhm", baseline.r_in);

        let mut report = TuningReport {
            stage: self.stage,
            filled_passive,
            baseline,
            surface_area: None,
            gbar_estimate: None,
            changes: vec![],
            verification: None,
            description: description.clone(),
        };

        let target_r_in = match target.input_resistance {
            Some(value) => value,
            None => {
                info!("no target input resistance given, skipping tuning");
                return Ok(report);
            }
        };

        let surface_area = measure_surface_area(&cell, &config.location)?;
        let gbar = estimate_gbar(target_r_in, surface_area)?;

        let patched = patch_parameters(
            &description.genome,
            gbar * self.settings.conductance_scale,
            &self.settings.sections,
            &self.settings.parameters,
        );
        if patched.changes.is_empty() {
            warn!("no genome entries matched {:?} on {:?}", self.settings.parameters, self.settings.sections);
        }
        description.genome = patched.assignments;
        self.advance(PipelineStage::Tuned);

        report.surface_area = Some(surface_area);
        report.gbar_estimate = Some(gbar);
        report.changes = patched.changes;
        report.description = description;
        report.stage = self.stage;

        if !self.settings.verify {
            return Ok(report);
        }

        let mut cell = self.builder.build(&report.description)?;
        let (_, verification) = measure_input_resistance(&mut cell, &config, plot_path.as_deref())?;
        self.advance(PipelineStage::Verified);
        info!(
            "verified input resistance {:.3} MOhm, target {:.3} MOhm",
            verification.r_in, target_r_in,
        );

        report.verification = Some(verification);
        report.stage = self.stage;

        Ok(report)
    }
}
