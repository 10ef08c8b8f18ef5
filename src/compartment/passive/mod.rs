//! A single compartment ("ball") cell with a passive leak conductance,
//! integrated with forward Euler

use compartment_traits::CompartmentBase;
use tracing::{debug, warn};
use super::{CompartmentReference, CurrentVoltage, SectionGeometry, Timestep};
use crate::error::{ConfigurationError, RInTuningError, SimulationError};
use crate::model::{Capacitance, ModelDescription};
use crate::simulation::{
    BuildCell, CurrentClamp, RecordedQuantity, RecordingHandle, SimulationConfig, SimulationEngine,
};


/// Conversion of `S/cm^2 * cm^2 * mV` to nA
const LEAK_CURRENT_SCALE: f64 = 1e6;
/// Conversion of `uF/cm^2 * cm^2` to nF
const CAPACITANCE_SCALE: f64 = 1e3;

/// Parameters the passive membrane reads from the genome, anything else is ignored
const PASSIVE_PARAMETERS: [&str; 4] = ["g_pas", "e_pas", "cm", "Ra"];

/// Single compartment with a leak channel, `c_m * dV/dt = i_stim - g_pas * (V - e_pas)`
/// scaled by the surface area of the compartment
#[derive(CompartmentBase, Debug, Clone)]
pub struct SingleCompartmentCell {
    /// Name of the only section
    pub section: String,
    /// Geometry of the section
    pub geometry: SectionGeometry,
    /// Membrane potential (mV)
    pub current_voltage: f64,
    /// Timestep (ms)
    pub dt: f64,
    /// Specific membrane capacitance (uF/cm^2)
    pub c_m: f64,
    /// Leak conductance (S/cm^2)
    pub g_pas: f64,
    /// Leak reversal potential (mV)
    pub e_pas: f64,
    /// Axial resistivity (ohm cm), unused with a single compartment
    pub r_a: Option<f64>,
    /// Current clamps targeting the compartment
    pub clamps: Vec<CurrentClamp>,
    /// Simulation time (ms)
    pub time: f64,
    recordings: Vec<(RecordedQuantity, Vec<f64>)>,
}

impl Default for SingleCompartmentCell {
    fn default() -> Self {
        SingleCompartmentCell {
            section: String::from("soma"),
            geometry: SectionGeometry { diameter: 20., length: 20. },
            current_voltage: -65.,
            dt: 0.025,
            c_m: 1.,
            g_pas: 1e-4,
            e_pas: -65.,
            r_a: None,
            clamps: vec![],
            time: 0.,
            recordings: vec![],
        }
    }
}

impl SingleCompartmentCell {
    /// Surface area of the compartment (cm^2)
    pub fn surface_area(&self) -> f64 {
        self.geometry.surface_area()
    }

    /// Input resistance of the membrane at steady state (MOhm)
    pub fn steady_state_input_resistance(&self) -> f64 {
        1. / (self.g_pas * self.surface_area() * LEAK_CURRENT_SCALE)
    }

    fn check_location(&self, location: &CompartmentReference) -> Result<(), SimulationError> {
        if location.section != self.section || location.index != 0 {
            return Err(SimulationError::UnknownSection(location.to_string()));
        }
        if !(0. ..=1.).contains(&location.position) {
            return Err(SimulationError::PositionOutOfRange(location.position));
        }

        Ok(())
    }

    fn stimulus_current(&self, t: f64) -> f64 {
        self.clamps.iter()
            .map(|clamp| clamp.current_at(t))
            .sum()
    }

    /// Updates cell voltage given an input current (nA)
    pub fn update_cell_voltage(&mut self, input_current: f64) {
        let area = self.surface_area();
        let i_leak = self.g_pas * area * (self.current_voltage - self.e_pas) * LEAK_CURRENT_SCALE;
        let capacitance = self.c_m * area * CAPACITANCE_SCALE;

        self.current_voltage += self.dt * (input_current - i_leak) / capacitance;
    }

    fn sample(&mut self) {
        let (time, voltage) = (self.time, self.current_voltage);

        for (quantity, samples) in self.recordings.iter_mut() {
            match quantity {
                RecordedQuantity::Time => samples.push(time),
                RecordedQuantity::Voltage(_) => samples.push(voltage),
            }
        }
    }
}

impl SimulationEngine for SingleCompartmentCell {
    fn timestep(&self) -> Option<f64> {
        let dt = self.get_dt();

        (dt > 0. && dt.is_finite()).then_some(dt)
    }

    fn section_geometry(&self, location: &CompartmentReference) -> Result<SectionGeometry, SimulationError> {
        self.check_location(location)?;

        Ok(self.geometry)
    }

    fn insert_current_clamp(&mut self, clamp: CurrentClamp) -> Result<(), SimulationError> {
        self.check_location(&clamp.location)?;
        self.clamps.push(clamp);

        Ok(())
    }

    fn record(&mut self, quantity: RecordedQuantity) -> Result<RecordingHandle, SimulationError> {
        if let RecordedQuantity::Voltage(location) = &quantity {
            self.check_location(location)?;
        }
        self.recordings.push((quantity, vec![]));

        Ok(RecordingHandle(self.recordings.len() - 1))
    }

    fn recording(&self, handle: RecordingHandle) -> Result<&[f64], SimulationError> {
        self.recordings.get(handle.0)
            .map(|(_, samples)| samples.as_slice())
            .ok_or(SimulationError::UnknownRecording(handle.0))
    }

    fn initialize_and_run(&mut self, config: &SimulationConfig) -> Result<(), SimulationError> {
        self.time = 0.;
        self.current_voltage = config.v_init;
        self.recordings.iter_mut()
            .for_each(|(_, samples)| samples.clear());

        let iterations = (config.tstop / self.dt).round() as usize;
        debug!(
            "running {} for {} ms ({} steps of {} ms) from {} mV",
            self.section, config.tstop, iterations, self.dt, config.v_init,
        );

        self.sample();
        for step in 1..=iterations {
            let input_current = self.stimulus_current(self.time);
            self.update_cell_voltage(input_current);
            self.time = step as f64 * self.dt;
            self.sample();
        }

        Ok(())
    }
}

/// Builds a [`SingleCompartmentCell`] from a model description given the geometry of the soma,
/// genome entries on the section take precedence over the passive block and repeated
/// entries for the same parameter are averaged
#[derive(Debug, Clone)]
pub struct SingleCompartmentBuilder {
    /// Section the compartment represents
    pub section: String,
    /// Geometry of the section
    pub geometry: SectionGeometry,
    /// Timestep (ms)
    pub dt: f64,
}

impl SingleCompartmentBuilder {
    pub fn new(geometry: SectionGeometry, dt: f64) -> Self {
        SingleCompartmentBuilder {
            section: String::from("soma"),
            geometry,
            dt,
        }
    }

    fn genome_value(&self, description: &ModelDescription, name: &str) -> Option<f64> {
        let values = description.parameter_values(&self.section, name);

        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }

    fn passive_capacitance(&self, description: &ModelDescription) -> Option<f64> {
        match description.passive()?.cm.as_ref()? {
            Capacitance::Uniform(cm) => Some(*cm),
            Capacitance::PerSection(entries) => entries.iter()
                .find(|entry| entry.section == self.section)
                .map(|entry| entry.cm),
        }
    }
}

impl BuildCell for SingleCompartmentBuilder {
    type Engine = SingleCompartmentCell;

    fn build(&self, description: &ModelDescription) -> Result<SingleCompartmentCell, RInTuningError> {
        let passive = description.passive();

        let e_pas = self.genome_value(description, "e_pas")
            .or(passive.and_then(|p| p.e_pas))
            .ok_or(ConfigurationError::MissingPassiveProperty(String::from("e_pas")))?;
        let c_m = self.genome_value(description, "cm")
            .or(self.passive_capacitance(description))
            .ok_or(ConfigurationError::MissingPassiveProperty(String::from("cm")))?;
        let g_pas = self.genome_value(description, "g_pas")
            .ok_or(ConfigurationError::MissingParameter(String::from("g_pas")))?;
        let r_a = self.genome_value(description, "Ra")
            .or(passive.and_then(|p| p.ra));

        let ignored = description.genome.iter()
            .filter(|entry| entry.section == self.section)
            .filter(|entry| !PASSIVE_PARAMETERS.contains(&entry.name.as_str()))
            .count();
        if ignored > 0 {
            warn!("ignoring {} active parameters on {}, only the passive membrane is simulated", ignored, self.section);
        }

        debug!(
            "built {}: diam {} um, L {} um, cm {} uF/cm^2, g_pas {} S/cm^2, e_pas {} mV",
            self.section, self.geometry.diameter, self.geometry.length, c_m, g_pas, e_pas,
        );

        Ok(
            SingleCompartmentCell {
                section: self.section.clone(),
                geometry: self.geometry,
                current_voltage: e_pas,
                dt: self.dt,
                c_m,
                g_pas,
                e_pas,
                r_a,
                ..SingleCompartmentCell::default()
            }
        )
    }
}
