//! # Input Resistance Tuning
//!
//! `rin_tuning` measures the somatic input resistance of a neuron model with a
//! hyperpolarizing current step and tunes the passive leak conductance of the model
//! so that its input resistance matches a target.
//!
//! The measurement protocol is written against the [`simulation::SimulationEngine`]
//! trait so any engine exposing section addressing, current clamps, recordings and a
//! fixed timestep can be measured. A single compartment passive cell is included in
//! [`compartment::passive`] along with a source for model bundles on disk in [`model`].
//!
//! ## Example Code
//!
//! ### Measuring a passive cell
//!
//! ```rust
//! use rin_tuning::{
//!     compartment::passive::SingleCompartmentCell,
//!     error::RInTuningError,
//!     pipeline::measure_input_resistance,
//!     simulation::SimulationConfig,
//! };
//!
//! fn main() -> Result<(), RInTuningError> {
//!     let mut cell = SingleCompartmentCell::default();
//!
//!     // inject -0.01 nA from 100 ms to 900 ms and record until 1000 ms
//!     let config = SimulationConfig {
//!         stim_amp: -0.01,
//!         ..SimulationConfig::default()
//!     };
//!
//!     let (_trace, result) = measure_input_resistance(&mut cell, &config, None)?;
//!
//!     let expected = cell.steady_state_input_resistance();
//!     assert!((result.r_in - expected).abs() / expected < 0.01);
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Tuning leak conductance toward a target
//!
//! ```rust
//! use rin_tuning::{
//!     compartment::{SectionGeometry, passive::SingleCompartmentBuilder},
//!     config::TuningTarget,
//!     error::RInTuningError,
//!     model::{ModelDescription, ParameterAssignment, PassiveProperties, Capacitance},
//!     pipeline::{PipelineSettings, TuningPipeline},
//! };
//!
//! fn main() -> Result<(), RInTuningError> {
//!     let description = ModelDescription {
//!         passive: vec![PassiveProperties {
//!             e_pas: Some(-65.),
//!             ra: Some(100.),
//!             cm: Some(Capacitance::Uniform(1.)),
//!         }],
//!         genome: vec![ParameterAssignment::new("soma", "g_pas", 1e-4)],
//!         conditions: None,
//!     };
//!
//!     let builder = SingleCompartmentBuilder::new(
//!         SectionGeometry { diameter: 20., length: 20. },
//!         0.025,
//!     );
//!     let mut pipeline = TuningPipeline::new(builder, PipelineSettings::default());
//!
//!     let target = TuningTarget {
//!         input_resistance: Some(200.),
//!         ..TuningTarget::default()
//!     };
//!     let report = pipeline.run(description, &target)?;
//!
//!     let verified = report.verification.expect("verification enabled by default");
//!     assert!((verified.r_in - 200.).abs() < 2.);
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod compartment;
pub mod simulation;
pub mod estimation;
pub mod geometry;
pub mod tuning;
pub mod config;
pub mod model;
pub mod plotting;
pub mod pipeline;
