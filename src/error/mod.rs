//! Error sets for every stage of the measurement and tuning pipeline, each stage
//! has its own error type that converts into [`RInTuningError`]

use std::fmt::{Display, Debug, Formatter, Result};


/// Error set for malformed or missing configuration
pub enum ConfigurationError {
    /// User specification file could not be read
    UnreadableFile(String),
    /// User specification is not valid JSON
    MalformedJson(String),
    /// User specification is not a JSON object
    NotAMapping,
    /// User specification contains a key whose value is not a number
    NotFlatMapping(String),
    /// A passive property is neither in the model nor in the user defaults
    MissingPassiveProperty(String),
    /// A genome parameter needed to build the cell is missing
    MissingParameter(String),
    /// Simulation engine has no timestep defined
    TimestepUndefined,
    /// Stimulus timing is not compatible with the simulation length
    InvalidStimulus(String),
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ConfigurationError::UnreadableFile(msg) => write!(f, "Cannot read specification file: {}", msg),
            ConfigurationError::MalformedJson(msg) => write!(f, "Invalid JSON format: {}", msg),
            ConfigurationError::NotAMapping => write!(f, "JSON file does not contain a mapping"),
            ConfigurationError::NotFlatMapping(key) => write!(
                f, "Value of '{}' must be a number, specification must be a flat mapping", key
            ),
            ConfigurationError::MissingPassiveProperty(key) => write!(
                f, "Passive property '{}' is missing from the model and the user specification", key
            ),
            ConfigurationError::MissingParameter(name) => write!(
                f, "Parameter '{}' is missing from the model genome", name
            ),
            ConfigurationError::TimestepUndefined => write!(f, "Simulation engine has no timestep defined"),
            ConfigurationError::InvalidStimulus(msg) => write!(f, "Invalid stimulus: {}", msg),
        }
    }
}

impl Debug for ConfigurationError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "file: {}, line: {}, error: {}", file!(), line!(), self)
    }
}

/// Error set for model identifiers that cannot be interpreted
pub enum ModelIdentifierError {
    /// No model identifier was given
    MissingArgument,
    /// Input contains no digits
    NoDigits(String),
    /// Digit sequence does not fit in an identifier
    InvalidDigits(String),
}

impl Display for ModelIdentifierError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ModelIdentifierError::MissingArgument => write!(f, "No model identifier provided"),
            ModelIdentifierError::NoDigits(input) => write!(f, "No digits found in string: {}", input),
            ModelIdentifierError::InvalidDigits(input) => write!(
                f, "Invalid digit sequence found in string: {}", input
            ),
        }
    }
}

impl Debug for ModelIdentifierError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "file: {}, line: {}, error: {}", file!(), line!(), self)
    }
}

/// Error set for input resistance measurement
pub enum MeasurementError {
    /// Stimulus amplitude is zero so resistance is undefined
    DivisionByZero,
    /// Sample index required by the stimulus window is not within the trace
    StimulusWindowOutOfRange {
        /// Name of the sample being looked up
        sample: &'static str,
        /// Requested index (negative when before the first sample)
        index: i64,
        /// Number of samples in the trace
        len: usize,
    },
    /// Timestep must be greater than zero
    NonPositiveTimestep(f64),
}

impl Display for MeasurementError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            MeasurementError::DivisionByZero => write!(
                f, "Stimulus amplitude is zero, input resistance is undefined"
            ),
            MeasurementError::StimulusWindowOutOfRange { sample, index, len } => write!(
                f, "{} sample index {} is outside of recorded trace of length {}", sample, index, len
            ),
            MeasurementError::NonPositiveTimestep(dt) => write!(
                f, "Timestep must be positive, got {}", dt
            ),
        }
    }
}

impl Debug for MeasurementError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "file: {}, line: {}, error: {}", file!(), line!(), self)
    }
}

/// Error set for parameters outside of their valid domain
pub enum InvalidParameterError {
    /// Target input resistance must be greater than zero
    NonPositiveInputResistance(f64),
    /// Surface area must be greater than zero
    NonPositiveSurfaceArea(f64),
}

impl Display for InvalidParameterError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            InvalidParameterError::NonPositiveInputResistance(value) => write!(
                f, "Target input resistance must be positive, got {} MOhm", value
            ),
            InvalidParameterError::NonPositiveSurfaceArea(value) => write!(
                f, "Surface area must be positive, got {} cm^2", value
            ),
        }
    }
}

impl Debug for InvalidParameterError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "file: {}, line: {}, error: {}", file!(), line!(), self)
    }
}

/// Error set for interactions with the simulation engine
pub enum SimulationError {
    /// Section cannot be found in the cell
    UnknownSection(String),
    /// Position along a section must be between 0 and 1
    PositionOutOfRange(f64),
    /// Recording handle does not refer to an attached recording
    UnknownRecording(usize),
    /// Recorded samples do not form a valid trace
    MalformedTrace(String),
}

impl Display for SimulationError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            SimulationError::UnknownSection(name) => write!(f, "Section not found: {}", name),
            SimulationError::PositionOutOfRange(x) => write!(
                f, "Position along section must be within [0, 1], got {}", x
            ),
            SimulationError::UnknownRecording(id) => write!(f, "Recording not found: {}", id),
            SimulationError::MalformedTrace(msg) => write!(f, "Malformed trace: {}", msg),
        }
    }
}

impl Debug for SimulationError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "file: {}, line: {}, error: {}", file!(), line!(), self)
    }
}

/// Error set for retrieving model assets
pub enum ModelSourceError {
    /// No model bundle exists for the identifier
    ModelNotFound(u64),
    /// Manifest does not list the given key
    MissingManifestEntry(String),
    /// Asset could not be read or copied
    Io(String),
    /// Asset contents could not be parsed
    MalformedAsset(String),
}

impl Display for ModelSourceError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ModelSourceError::ModelNotFound(id) => write!(f, "No model found for identifier {}", id),
            ModelSourceError::MissingManifestEntry(key) => write!(f, "Manifest has no entry for '{}'", key),
            ModelSourceError::Io(msg) => write!(f, "Model asset I/O failure: {}", msg),
            ModelSourceError::MalformedAsset(msg) => write!(f, "Malformed model asset: {}", msg),
        }
    }
}

impl Debug for ModelSourceError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "file: {}, line: {}, error: {}", file!(), line!(), self)
    }
}

/// Error from the plotting backend
pub struct PlotError(pub String);

impl Display for PlotError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "Could not plot voltage trace: {}", self.0)
    }
}

impl Debug for PlotError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "file: {}, line: {}, error: {}", file!(), line!(), self)
    }
}

/// A set of errors that may occur when using the library
pub enum RInTuningError {
    /// Errors related to configuration
    ConfigurationRelatedError(ConfigurationError),
    /// Errors related to model identifiers
    ModelIdentifierRelatedError(ModelIdentifierError),
    /// Errors related to measuring input resistance
    MeasurementRelatedError(MeasurementError),
    /// Errors related to invalid tuning parameters
    InvalidParameterRelatedError(InvalidParameterError),
    /// Errors related to the simulation engine
    SimulationRelatedError(SimulationError),
    /// Errors related to retrieving model assets
    ModelSourceRelatedError(ModelSourceError),
    /// Errors related to plotting
    PlotRelatedError(PlotError),
}

impl Display for RInTuningError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            RInTuningError::ConfigurationRelatedError(err) => write!(f, "{}", err),
            RInTuningError::ModelIdentifierRelatedError(err) => write!(f, "{}", err),
            RInTuningError::MeasurementRelatedError(err) => write!(f, "{}", err),
            RInTuningError::InvalidParameterRelatedError(err) => write!(f, "{}", err),
            RInTuningError::SimulationRelatedError(err) => write!(f, "{}", err),
            RInTuningError::ModelSourceRelatedError(err) => write!(f, "{}", err),
            RInTuningError::PlotRelatedError(err) => write!(f, "{}", err),
        }
    }
}

impl Debug for RInTuningError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "file: {}, line: {}, error: {}", file!(), line!(), self)
    }
}

impl std::error::Error for RInTuningError {}

macro_rules! impl_from_error {
    ($err:ty, $variant:ident) => {
        impl From<$err> for RInTuningError {
            fn from(err: $err) -> RInTuningError {
                RInTuningError::$variant(err)
            }
        }
    };
}

impl_from_error!(ConfigurationError, ConfigurationRelatedError);
impl_from_error!(ModelIdentifierError, ModelIdentifierRelatedError);
impl_from_error!(MeasurementError, MeasurementRelatedError);
impl_from_error!(InvalidParameterError, InvalidParameterRelatedError);
impl_from_error!(SimulationError, SimulationRelatedError);
impl_from_error!(ModelSourceError, ModelSourceRelatedError);
impl_from_error!(PlotError, PlotRelatedError);
