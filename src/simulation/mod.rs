//! The surface of a simulation engine that the measurement protocol relies on, along
//! with stimulus installation and trace recording.
//!
//! Engines expose section addressing, current clamps, a fixed timestep, scalar
//! recordings and a way to initialize and run for an explicit [`SimulationConfig`].
//! Nothing here reads ambient engine state, the timestep is owned by the engine
//! and every run receives its duration and initial voltage through the config.

use tracing::debug;
use crate::compartment::{CompartmentReference, SectionGeometry};
use crate::error::{ConfigurationError, RInTuningError, SimulationError};
use crate::model::ModelDescription;


/// Settings of a single current step run, immutable once a run starts
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Amplitude of the injected current (nA), negative hyperpolarizes
    pub stim_amp: f64,
    /// Delay before the stimulus begins (ms)
    pub stim_delay: f64,
    /// Duration of the stimulus (ms)
    pub stim_dur: f64,
    /// Simulation end time (ms)
    pub tstop: f64,
    /// Compartment receiving the stimulus and being recorded
    pub location: CompartmentReference,
    /// Initial membrane potential (mV)
    pub v_init: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            stim_amp: -1.0,
            stim_delay: 100.,
            stim_dur: 800.,
            tstop: 1000.,
            location: CompartmentReference::soma(),
            v_init: -65.,
        }
    }
}

impl SimulationConfig {
    /// Checks that the stimulus fits within the simulation, delay and duration must be
    /// non-negative and the stimulus must end before `tstop`
    pub fn validate_stimulus(&self) -> Result<(), ConfigurationError> {
        if !(self.stim_delay >= 0.) {
            return Err(ConfigurationError::InvalidStimulus(
                format!("delay must be non-negative, got {} ms", self.stim_delay)
            ));
        }
        if !(self.stim_dur >= 0.) {
            return Err(ConfigurationError::InvalidStimulus(
                format!("duration must be non-negative, got {} ms", self.stim_dur)
            ));
        }
        if self.stim_delay + self.stim_dur > self.tstop {
            return Err(ConfigurationError::InvalidStimulus(
                format!(
                    "stimulus ends at {} ms which is after the end of the simulation at {} ms",
                    self.stim_delay + self.stim_dur,
                    self.tstop,
                )
            ));
        }

        Ok(())
    }
}

/// Current clamp point process delivering a rectangular current step
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentClamp {
    /// Where the current is injected
    pub location: CompartmentReference,
    /// Amplitude (nA)
    pub amp: f64,
    /// Onset (ms)
    pub delay: f64,
    /// Duration (ms)
    pub dur: f64,
}

impl CurrentClamp {
    /// Injected current at time `t` (ms), the clamp is on for `delay <= t < delay + dur`
    pub fn current_at(&self, t: f64) -> f64 {
        if t >= self.delay && t < self.delay + self.dur {
            self.amp
        } else {
            0.
        }
    }
}

/// Scalar quantities that can be recorded over time
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedQuantity {
    /// Simulation time (ms)
    Time,
    /// Membrane potential at a location (mV)
    Voltage(CompartmentReference),
}

/// Handle to a recording attached to an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingHandle(pub usize);

/// Simulation engine used to run the measurement protocol
pub trait SimulationEngine {
    /// Fixed integration timestep (ms), `None` when the engine has not defined one
    fn timestep(&self) -> Option<f64>;
    /// Diameter and length of the section containing `location`
    fn section_geometry(&self, location: &CompartmentReference) -> Result<SectionGeometry, SimulationError>;
    /// Attaches a current clamp that will be active during subsequent runs
    fn insert_current_clamp(&mut self, clamp: CurrentClamp) -> Result<(), SimulationError>;
    /// Starts sampling a quantity once per timestep during subsequent runs
    fn record(&mut self, quantity: RecordedQuantity) -> Result<RecordingHandle, SimulationError>;
    /// Samples collected by a recording during the last run
    fn recording(&self, handle: RecordingHandle) -> Result<&[f64], SimulationError>;
    /// Sets every compartment to `config.v_init` and integrates until `config.tstop`
    fn initialize_and_run(&mut self, config: &SimulationConfig) -> Result<(), SimulationError>;
}

/// Builds a simulation engine from a model description, used to rebuild
/// the cell after its parameters are patched
pub trait BuildCell {
    /// Engine produced by the builder
    type Engine: SimulationEngine;
    /// Creates a fresh engine from the description
    fn build(&self, description: &ModelDescription) -> Result<Self::Engine, RInTuningError>;
}

/// Installs a current step on the compartment referenced by `config`,
/// fails without attaching anything if the stimulus does not fit in the simulation
pub fn install_current_clamp<E: SimulationEngine>(
    engine: &mut E,
    config: &SimulationConfig,
) -> Result<(), RInTuningError> {
    config.validate_stimulus()?;

    let clamp = CurrentClamp {
        location: config.location.clone(),
        amp: config.stim_amp,
        delay: config.stim_delay,
        dur: config.stim_dur,
    };
    debug!(
        "installing current clamp at {}: amp {} nA, delay {} ms, dur {} ms",
        clamp.location, clamp.amp, clamp.delay, clamp.dur,
    );

    engine.insert_current_clamp(clamp)?;

    Ok(())
}

/// Time and voltage samples of a single run, time is strictly increasing and
/// both series have the same length
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    time: Vec<f64>,
    voltage: Vec<f64>,
    dt: f64,
}

impl Trace {
    /// Creates a trace from recorded samples, fails if the lengths differ or
    /// time is not strictly increasing
    pub fn new(time: Vec<f64>, voltage: Vec<f64>, dt: f64) -> Result<Self, SimulationError> {
        if time.len() != voltage.len() {
            return Err(SimulationError::MalformedTrace(
                format!("{} time samples but {} voltage samples", time.len(), voltage.len())
            ));
        }
        if let Some(n) = (1..time.len()).find(|&n| !(time[n] > time[n - 1])) {
            return Err(SimulationError::MalformedTrace(
                format!("time is not strictly increasing at sample {}", n)
            ));
        }

        Ok(Trace { time, voltage, dt })
    }

    /// Creates a trace where sample `n` is taken at `n * dt`
    pub fn from_voltages(voltage: Vec<f64>, dt: f64) -> Result<Self, SimulationError> {
        let time = (0..voltage.len())
            .map(|n| n as f64 * dt)
            .collect();

        Trace::new(time, voltage, dt)
    }

    /// Sample times (ms)
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Membrane potentials (mV)
    pub fn voltage(&self) -> &[f64] {
        &self.voltage
    }

    /// Sampling interval (ms)
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn len(&self) -> usize {
        self.voltage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voltage.is_empty()
    }
}

/// Pair of synchronized recordings of simulation time and voltage at one location
#[derive(Debug, Clone)]
pub struct TraceRecorder {
    time: RecordingHandle,
    voltage: RecordingHandle,
    dt: f64,
}

impl TraceRecorder {
    /// Attaches time and voltage recordings to the engine before a run,
    /// fails if the engine has not defined a timestep
    pub fn attach<E: SimulationEngine>(
        engine: &mut E,
        location: &CompartmentReference,
    ) -> Result<Self, RInTuningError> {
        let dt = engine.timestep()
            .ok_or(ConfigurationError::TimestepUndefined)?;

        let time = engine.record(RecordedQuantity::Time)?;
        let voltage = engine.record(RecordedQuantity::Voltage(location.clone()))?;

        Ok(TraceRecorder { time, voltage, dt })
    }

    /// Collects the samples of the last run into a [`Trace`]
    pub fn trace<E: SimulationEngine>(&self, engine: &E) -> Result<Trace, SimulationError> {
        Trace::new(
            engine.recording(self.time)?.to_vec(),
            engine.recording(self.voltage)?.to_vec(),
            self.dt,
        )
    }

    /// Sampling interval the recordings were attached with (ms)
    pub fn dt(&self) -> f64 {
        self.dt
    }
}
