//! Model identifiers, model descriptions and the sources model bundles are retrieved from.
//!
//! A model description is the parameter set of a fitted cell, a `passive` block with
//! membrane properties and a `genome` listing every parameter assignment per section.
//! Bundles on disk follow the layout of Allen Cell Types biophysical models, a
//! `manifest.json` pointing at the fit parameters and the SWC morphology.

use std::{
    fmt::{Display, Formatter},
    fs,
    path::{Path, PathBuf},
};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};
use crate::compartment::SectionGeometry;
use crate::config::PassiveDefaults;
use crate::error::{ModelIdentifierError, ModelSourceError};


lazy_static::lazy_static! {
    static ref DIGITS: Regex = Regex::new(r"\d+").expect("digit pattern is a valid regex");
}

/// Numeric identifier of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelIdentifier(pub u64);

impl ModelIdentifier {
    /// Extracts the identifier from a plain number (`"488683425"`) or from the first run
    /// of digits in a string such as a URL
    /// (`"http://celltypes.brain-map.org/experiment/electrophysiology/488683425"`)
    pub fn parse(input: &str) -> Result<Self, ModelIdentifierError> {
        let found = DIGITS.find(input)
            .ok_or_else(|| ModelIdentifierError::NoDigits(String::from(input)))?;

        found.as_str()
            .parse::<u64>()
            .map(ModelIdentifier)
            .map_err(|_| ModelIdentifierError::InvalidDigits(String::from(input)))
    }

    /// Parses an identifier given on the command line, fails if none was given
    pub fn from_argument(argument: Option<&str>) -> Result<Self, ModelIdentifierError> {
        let input = argument.ok_or(ModelIdentifierError::MissingArgument)?;

        ModelIdentifier::parse(input)
    }
}

impl Display for ModelIdentifier {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumericValue {
    Number(f64),
    Text(String),
}

impl NumericValue {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            NumericValue::Number(value) => Ok(value),
            NumericValue::Text(text) => text.trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("cannot convert '{}' to a number", text))),
        }
    }
}

// model files store most values as strings
fn deserialize_numeric<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    NumericValue::deserialize(deserializer)?.into_f64()
}

fn deserialize_optional_numeric<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Option::<NumericValue>::deserialize(deserializer)?
        .map(|value| value.into_f64::<D::Error>())
        .transpose()
}

/// Assignment of a value to a parameter on a section, a genome may contain
/// several assignments of the same parameter on the same section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterAssignment {
    /// Section name (`soma`, `dend`, ...)
    pub section: String,
    /// Parameter name (`g_pas`, `gbar_NaV`, ...)
    pub name: String,
    /// Value of the parameter
    #[serde(deserialize_with = "deserialize_numeric")]
    pub value: f64,
    /// Mechanism the parameter belongs to, empty for built in properties
    #[serde(default)]
    pub mechanism: String,
}

impl ParameterAssignment {
    pub fn new(section: &str, name: &str, value: f64) -> Self {
        ParameterAssignment {
            section: String::from(section),
            name: String::from(name),
            value,
            mechanism: String::new(),
        }
    }
}

/// Specific membrane capacitance of a section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionCapacitance {
    /// Section name
    pub section: String,
    /// Specific membrane capacitance (uF/cm^2)
    #[serde(deserialize_with = "deserialize_numeric")]
    pub cm: f64,
}

/// Membrane capacitance given either for the whole cell or per section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Capacitance {
    /// Same capacitance everywhere (uF/cm^2)
    Uniform(f64),
    /// Capacitance for each section
    PerSection(Vec<SectionCapacitance>),
}

/// Passive membrane properties of a model, any of which may be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassiveProperties {
    /// Leak reversal potential (mV)
    #[serde(default, deserialize_with = "deserialize_optional_numeric", skip_serializing_if = "Option::is_none")]
    pub e_pas: Option<f64>,
    /// Axial resistivity (ohm cm)
    #[serde(default, deserialize_with = "deserialize_optional_numeric", skip_serializing_if = "Option::is_none")]
    pub ra: Option<f64>,
    /// Specific membrane capacitance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cm: Option<Capacitance>,
}

/// Fitted parameter set of a model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDescription {
    /// Passive properties, only the first entry is used
    #[serde(default)]
    pub passive: Vec<PassiveProperties>,
    /// Ordered parameter assignments
    #[serde(default)]
    pub genome: Vec<ParameterAssignment>,
    /// Experimental conditions, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<serde_json::Value>,
}

impl ModelDescription {
    /// Parses a description from fit parameter JSON
    pub fn from_json_str(contents: &str) -> Result<Self, ModelSourceError> {
        serde_json::from_str(contents)
            .map_err(|e| ModelSourceError::MalformedAsset(format!("fit parameters: {}", e)))
    }

    /// Reads a description from a fit parameter file
    pub fn from_file(path: &Path) -> Result<Self, ModelSourceError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ModelSourceError::Io(format!("{}: {}", path.display(), e)))?;

        ModelDescription::from_json_str(&contents)
    }

    /// Passive properties of the model if present
    pub fn passive(&self) -> Option<&PassiveProperties> {
        self.passive.first()
    }

    /// Every value assigned to `name` on `section`, in genome order
    pub fn parameter_values(&self, section: &str, name: &str) -> Vec<f64> {
        self.genome.iter()
            .filter(|entry| entry.section == section && entry.name == name)
            .map(|entry| entry.value)
            .collect()
    }

    /// Fills passive properties missing from the model with the given defaults,
    /// values already present are kept, returns the names of the filled properties
    pub fn fill_missing_passive(&mut self, defaults: &PassiveDefaults) -> Vec<&'static str> {
        if self.passive.is_empty() {
            self.passive.push(PassiveProperties::default());
        }
        let passive = &mut self.passive[0];

        let mut filled = vec![];

        if let (None, Some(e_pas)) = (passive.e_pas, defaults.e_pas) {
            passive.e_pas = Some(e_pas);
            filled.push("e_pas");
        }
        if let (None, Some(cm)) = (&passive.cm, defaults.cm) {
            passive.cm = Some(Capacitance::Uniform(cm));
            filled.push("cm");
        }
        if let (None, Some(ra)) = (passive.ra, defaults.ra) {
            passive.ra = Some(ra);
            filled.push("ra");
        }

        for key in &filled {
            info!("filled missing passive property '{}' from user specification", key);
        }

        filled
    }
}

/// Single entry of a bundle manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Lookup key (`MORPHOLOGY`, `MODFILE_DIR`, ...)
    pub key: String,
    /// Kind of entry, `file` or `dir`
    #[serde(rename = "type")]
    pub kind: String,
    /// Path relative to the bundle
    pub spec: String,
}

/// Model files referenced by the biophysical section of a manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiophysEntry {
    /// Files making up the model, the manifest itself and the fit parameters
    pub model_file: Vec<String>,
    /// Kind of biophysical model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
}

/// Manifest of a model bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub biophys: Vec<BiophysEntry>,
    #[serde(default)]
    pub manifest: Vec<ManifestEntry>,
}

/// Key of the morphology file in a manifest
pub const MORPHOLOGY_KEY: &str = "MORPHOLOGY";
/// File name of the manifest within a bundle
pub const MANIFEST_FILE: &str = "manifest.json";

impl Manifest {
    /// Reads a manifest from disk
    pub fn from_file(path: &Path) -> Result<Self, ModelSourceError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ModelSourceError::Io(format!("{}: {}", path.display(), e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| ModelSourceError::MalformedAsset(format!("manifest: {}", e)))
    }

    /// Path of the entry with the given key relative to `base`
    pub fn path(&self, base: &Path, key: &str) -> Result<PathBuf, ModelSourceError> {
        self.manifest.iter()
            .find(|entry| entry.key == key)
            .map(|entry| base.join(&entry.spec))
            .ok_or_else(|| ModelSourceError::MissingManifestEntry(String::from(key)))
    }

    /// Name of the fit parameter file, the first model file that is not the manifest
    pub fn fit_parameters_file(&self) -> Result<&str, ModelSourceError> {
        self.biophys.first()
            .and_then(|entry| {
                entry.model_file.iter()
                    .find(|file| !file.ends_with(MANIFEST_FILE))
            })
            .map(|file| file.as_str())
            .ok_or_else(|| ModelSourceError::MissingManifestEntry(String::from("biophys.model_file")))
    }

    /// Every file the bundle consists of, relative to the bundle
    pub fn files(&self) -> Result<Vec<String>, ModelSourceError> {
        let mut files = vec![String::from(MANIFEST_FILE), String::from(self.fit_parameters_file()?)];

        for entry in self.manifest.iter().filter(|entry| entry.kind == "file") {
            if !files.contains(&entry.spec) {
                files.push(entry.spec.clone());
            }
        }

        Ok(files)
    }
}

/// SWC structure type of somatic samples
const SWC_SOMA: u32 = 1;

struct SwcSample {
    x: f64,
    y: f64,
    z: f64,
    radius: f64,
}

fn parse_swc_field<T: std::str::FromStr>(field: Option<&str>, line_number: usize) -> Result<T, ModelSourceError> {
    field.and_then(|value| value.parse::<T>().ok())
        .ok_or_else(|| ModelSourceError::MalformedAsset(format!("swc line {}", line_number)))
}

/// Geometry of the soma given an SWC morphology, a single point soma of radius `r` is a
/// cylinder with diameter and length `2r`, a soma made of several points is a cylinder
/// whose length is the path through the points and whose diameter is the mean diameter
pub fn soma_geometry_from_swc(contents: &str) -> Result<SectionGeometry, ModelSourceError> {
    let mut soma = vec![];

    for (n, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let _id: i64 = parse_swc_field(fields.next(), n + 1)?;
        let structure: u32 = parse_swc_field(fields.next(), n + 1)?;
        let x: f64 = parse_swc_field(fields.next(), n + 1)?;
        let y: f64 = parse_swc_field(fields.next(), n + 1)?;
        let z: f64 = parse_swc_field(fields.next(), n + 1)?;
        let radius: f64 = parse_swc_field(fields.next(), n + 1)?;

        if structure == SWC_SOMA {
            soma.push(SwcSample { x, y, z, radius });
        }
    }

    match soma.as_slice() {
        [] => Err(ModelSourceError::MalformedAsset(String::from("swc has no soma samples"))),
        [point] => Ok(SectionGeometry { diameter: 2. * point.radius, length: 2. * point.radius }),
        points => {
            let length = points.windows(2)
                .map(|pair| {
                    ((pair[1].x - pair[0].x).powi(2) + (pair[1].y - pair[0].y).powi(2) + (pair[1].z - pair[0].z).powi(2))
                        .sqrt()
                })
                .sum();
            let diameter = points.iter()
                .map(|point| 2. * point.radius)
                .sum::<f64>() / points.len() as f64;

            Ok(SectionGeometry { diameter, length })
        }
    }
}

/// Queryable handle to a model bundle
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    /// Identifier of the model
    pub id: ModelIdentifier,
    /// Where the bundle is stored at the source
    pub location: PathBuf,
    /// Manifest of the bundle
    pub manifest: Manifest,
}

/// Model files materialized to local storage
#[derive(Debug, Clone)]
pub struct ModelAssets {
    /// Directory containing the materialized files
    pub directory: PathBuf,
    /// Fitted parameters
    pub description: ModelDescription,
    /// Soma geometry taken from the morphology
    pub soma: SectionGeometry,
}

/// Source of model bundles
pub trait ModelSource {
    /// Looks up the bundle of a model
    fn query(&self, id: ModelIdentifier) -> Result<ModelDescriptor, ModelSourceError>;
    /// Copies the bundle to `destination` and loads it
    fn materialize(&self, descriptor: &ModelDescriptor, destination: &Path) -> Result<ModelAssets, ModelSourceError>;
}

/// Model bundles stored as `<root>/<id>/manifest.json` with files relative to the bundle directory
#[derive(Debug, Clone)]
pub struct DirectoryModelSource {
    pub root: PathBuf,
}

impl DirectoryModelSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        DirectoryModelSource { root: root.as_ref().to_path_buf() }
    }
}

// copying a file onto itself truncates it before it is read
fn is_same_file(from: &Path, to: &Path) -> bool {
    if from == to {
        return true;
    }

    match (fs::canonicalize(from), fs::canonicalize(to)) {
        (Ok(from), Ok(to)) => from == to,
        _ => false,
    }
}

impl ModelSource for DirectoryModelSource {
    fn query(&self, id: ModelIdentifier) -> Result<ModelDescriptor, ModelSourceError> {
        let location = self.root.join(id.to_string());
        let manifest_path = location.join(MANIFEST_FILE);

        if !manifest_path.is_file() {
            return Err(ModelSourceError::ModelNotFound(id.0));
        }

        let manifest = Manifest::from_file(&manifest_path)?;
        debug!("found model {} at {}", id, location.display());

        Ok(ModelDescriptor { id, location, manifest })
    }

    fn materialize(&self, descriptor: &ModelDescriptor, destination: &Path) -> Result<ModelAssets, ModelSourceError> {
        fs::create_dir_all(destination)
            .map_err(|e| ModelSourceError::Io(format!("{}: {}", destination.display(), e)))?;

        for file in descriptor.manifest.files()? {
            let from = descriptor.location.join(&file);
            let to = destination.join(&file);

            if is_same_file(&from, &to) {
                debug!("{} is already in place", to.display());
                continue;
            }
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| ModelSourceError::Io(format!("{}: {}", parent.display(), e)))?;
            }
            fs::copy(&from, &to)
                .map_err(|e| ModelSourceError::Io(format!("{}: {}", from.display(), e)))?;
        }
        info!("materialized model {} to {}", descriptor.id, destination.display());

        let description = ModelDescription::from_file(
            &destination.join(descriptor.manifest.fit_parameters_file()?)
        )?;

        let morphology_path = descriptor.manifest.path(destination, MORPHOLOGY_KEY)?;
        let morphology = fs::read_to_string(&morphology_path)
            .map_err(|e| ModelSourceError::Io(format!("{}: {}", morphology_path.display(), e)))?;
        let soma = soma_geometry_from_swc(&morphology)?;

        Ok(
            ModelAssets {
                directory: destination.to_path_buf(),
                description,
                soma,
            }
        )
    }
}
