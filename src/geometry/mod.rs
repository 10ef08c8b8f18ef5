//! Surface area of a compartment, only meaningful for single compartment models
//! since sections are treated as one uniform cylinder

use std::f64::consts::PI;
use tracing::info;
use crate::compartment::CompartmentReference;
use crate::error::SimulationError;
use crate::simulation::SimulationEngine;


/// Conversion from um^2 to cm^2
pub const SQUARE_MICRONS_TO_SQUARE_CENTIMETERS: f64 = 1e-8;

/// Lateral surface area of a cylinder (cm^2) given its diameter and length in um,
/// the flat ends are not part of the membrane
pub fn surface_area(diameter: f64, length: f64) -> f64 {
    // circumference times length
    diameter * PI * length * SQUARE_MICRONS_TO_SQUARE_CENTIMETERS
}

/// Reads the geometry of the section at `location` from the engine and returns its surface area (cm^2)
pub fn measure_surface_area<E: SimulationEngine>(
    engine: &E,
    location: &CompartmentReference,
) -> Result<f64, SimulationError> {
    let area = engine.section_geometry(location)?.surface_area();
    info!("{} surface area {:.3e} cm^2", location, area);

    Ok(area)
}
