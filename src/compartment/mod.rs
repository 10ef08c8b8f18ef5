//! Addressing and geometry of compartments along with the accessor traits shared by
//! compartment models, includes a single compartment passive cell that can be
//! driven by the measurement protocol.

use std::fmt::{Display, Formatter};
use crate::error::SimulationError;
pub mod passive;
/// A set of macros to automatically derive the accessor traits of a compartment.
pub mod compartment_traits {
    pub use compartment_traits::*;
}


/// Gets the membrane potential of the compartment (mV)
pub trait CurrentVoltage {
    fn get_current_voltage(&self) -> f64;
}

/// Handles changes in simulation timestep information
pub trait Timestep {
    /// Retrieves timestep value (ms)
    fn get_dt(&self) -> f64;
    /// Updates instance with new timestep information (ms)
    fn set_dt(&mut self, dt: f64);
}

/// Reference to a location on the cell, a section given by its name and index
/// (`soma[0]`) and a normalized position along that section (`0.5` is the midpoint)
#[derive(Debug, Clone, PartialEq)]
pub struct CompartmentReference {
    /// Name of the section (`soma`, `dend`, `axon`, ...)
    pub section: String,
    /// Index of the section among sections with the same name
    pub index: usize,
    /// Normalized position along the section, within `[0, 1]`
    pub position: f64,
}

impl CompartmentReference {
    /// Creates a new reference, fails if `position` is not within `[0, 1]`
    pub fn new(section: &str, index: usize, position: f64) -> Result<Self, SimulationError> {
        if !(0. ..=1.).contains(&position) {
            return Err(SimulationError::PositionOutOfRange(position));
        }

        Ok(
            CompartmentReference {
                section: String::from(section),
                index,
                position,
            }
        )
    }

    /// Midpoint of the first soma section, `soma[0](0.5)`
    pub fn soma() -> Self {
        CompartmentReference {
            section: String::from("soma"),
            index: 0,
            position: 0.5,
        }
    }
}

impl Default for CompartmentReference {
    fn default() -> Self {
        CompartmentReference::soma()
    }
}

impl Display for CompartmentReference {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}[{}]({})", self.section, self.index, self.position)
    }
}

/// Cylindrical geometry of a section
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionGeometry {
    /// Diameter (um)
    pub diameter: f64,
    /// Length (um)
    pub length: f64,
}

impl SectionGeometry {
    /// Lateral surface area of the section (cm^2), see [`crate::geometry::surface_area`]
    pub fn surface_area(&self) -> f64 {
        crate::geometry::surface_area(self.diameter, self.length)
    }
}
