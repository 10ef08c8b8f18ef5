//! Leak conductance estimation and patching of model parameters.
//!
//! The estimate assumes the whole input resistance comes from a uniform leak over
//! the measured surface, it gets worse with active channels and with every
//! compartment beyond the soma.

use std::collections::BTreeSet;
use tracing::info;
use crate::error::InvalidParameterError;
use crate::model::ParameterAssignment;


/// Conversion from uS/cm^2 to S/cm^2
pub const MICROSIEMENS_TO_SIEMENS: f64 = 1e-6;

/// Leak conductance (uS/cm^2) giving `target_r_in` (MOhm) over `surface_area` (cm^2),
/// `1 / (MOhm * cm^2) = uS / cm^2`
pub fn estimate_gbar(target_r_in: f64, surface_area: f64) -> Result<f64, InvalidParameterError> {
    if !(target_r_in > 0.) {
        return Err(InvalidParameterError::NonPositiveInputResistance(target_r_in));
    }
    if !(surface_area > 0.) {
        return Err(InvalidParameterError::NonPositiveSurfaceArea(surface_area));
    }

    let gbar = (1. / target_r_in) / surface_area;
    info!("gbar_leak_estimate {:.5} uS / cm2", gbar);

    Ok(gbar)
}

macro_rules! impl_name_selector {
    ($name:ident, $all:ident, $named:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum $name {
            /// Matches every name
            $all,
            /// Matches only the names in the set
            $named(BTreeSet<String>),
        }

        impl $name {
            /// Selects only the given names
            pub fn named<I, S>(names: I) -> Self
            where
                I: IntoIterator<Item = S>,
                S: Into<String>,
            {
                $name::$named(names.into_iter().map(Into::into).collect())
            }

            /// Whether `name` is selected
            pub fn matches(&self, name: &str) -> bool {
                match self {
                    $name::$all => true,
                    $name::$named(names) => names.contains(name),
                }
            }
        }
    };
}

impl_name_selector!(SectionSelector, AllSections, Sections, "Selects the sections a patch applies to");
impl_name_selector!(ParameterSelector, AllParameters, Parameters, "Selects the parameters a patch applies to");

/// Change made to a single assignment by a patch
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterChange {
    /// Index of the assignment in the parameter set
    pub index: usize,
    pub section: String,
    pub name: String,
    pub old_value: f64,
    pub new_value: f64,
}

impl ParameterChange {
    /// Percent change from the old value, `None` if the old value is zero
    pub fn percent_change(&self) -> Option<f64> {
        if self.old_value == 0. {
            None
        } else {
            Some((self.new_value - self.old_value) / self.old_value * 100.)
        }
    }
}

/// Parameter set after a patch along with the changes made
#[derive(Debug, Clone, PartialEq)]
pub struct PatchedParameters {
    /// Every assignment in the original order
    pub assignments: Vec<ParameterAssignment>,
    /// One change for each assignment that was selected
    pub changes: Vec<ParameterChange>,
}

/// Returns a copy of `assignments` where every entry on a selected section with a selected
/// name takes `value`, all other entries are unchanged and order is preserved, repeated
/// entries for the same section and parameter are all updated
pub fn patch_parameters(
    assignments: &[ParameterAssignment],
    value: f64,
    sections: &SectionSelector,
    parameters: &ParameterSelector,
) -> PatchedParameters {
    let mut patched = assignments.to_vec();
    let mut changes = vec![];

    for (index, entry) in patched.iter_mut().enumerate() {
        if !sections.matches(&entry.section) || !parameters.matches(&entry.name) {
            continue;
        }

        changes.push(
            ParameterChange {
                index,
                section: entry.section.clone(),
                name: entry.name.clone(),
                old_value: entry.value,
                new_value: value,
            }
        );
        entry.value = value;
    }

    for change in &changes {
        match change.percent_change() {
            Some(percent) => info!(
                "updating {} {} from {:.3} to {:.3}, percent change: {:.3}",
                change.section, change.name, change.old_value, change.new_value, percent,
            ),
            None => info!(
                "updating {} {} from {:.3} to {:.3}",
                change.section, change.name, change.old_value, change.new_value,
            ),
        }
    }

    PatchedParameters { assignments: patched, changes }
}
