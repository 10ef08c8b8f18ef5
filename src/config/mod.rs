//! User specification of the tuning target, read once at startup from a flat JSON mapping
//!
//! ```json
//! { "e_pas": -70.0, "cm": 1.0, "ra": 100.0, "R-in": 150.0 }
//! ```
//!
//! Every key is optional, passive values are only used when the model does not
//! define them and without `R-in` the cell is measured but not tuned.

use std::{fs, path::Path};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use crate::error::ConfigurationError;


/// Passive properties to use when the model omits them
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct PassiveDefaults {
    /// Leak reversal potential (mV)
    #[serde(default)]
    pub e_pas: Option<f64>,
    /// Specific membrane capacitance (uF/cm^2)
    #[serde(default)]
    pub cm: Option<f64>,
    /// Axial resistivity (ohm cm)
    #[serde(default)]
    pub ra: Option<f64>,
}

/// Desired input resistance and the passive defaults supplied by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct TuningTarget {
    /// Desired input resistance (MOhm)
    #[serde(default, rename = "R-in", alias = "r_in")]
    pub input_resistance: Option<f64>,
    #[serde(flatten)]
    pub passive_defaults: PassiveDefaults,
}

const KNOWN_KEYS: [&str; 5] = ["e_pas", "cm", "ra", "R-in", "r_in"];

/// Parses a user specification, the contents must be a JSON object whose values are all numbers
pub fn parse_user_specifications(contents: &str) -> Result<TuningTarget, ConfigurationError> {
    let value: Value = serde_json::from_str(contents)
        .map_err(|e| ConfigurationError::MalformedJson(e.to_string()))?;

    let mapping = value.as_object()
        .ok_or(ConfigurationError::NotAMapping)?;

    for (key, item) in mapping {
        if !item.is_number() {
            return Err(ConfigurationError::NotFlatMapping(key.clone()));
        }
        if !KNOWN_KEYS.contains(&key.as_str()) {
            debug!("ignoring unknown user specification key '{}'", key);
        }
    }

    serde_json::from_value(value)
        .map_err(|e| ConfigurationError::MalformedJson(e.to_string()))
}

/// Reads and parses a user specification file
pub fn load_user_specifications<P: AsRef<Path>>(path: P) -> Result<TuningTarget, ConfigurationError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .map_err(|e| ConfigurationError::UnreadableFile(format!("{}: {}", path.display(), e)))?;

    let target = parse_user_specifications(&contents)?;
    debug!("loaded user specification from {}: {:?}", path.display(), target);

    Ok(target)
}
