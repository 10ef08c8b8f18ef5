//! Input resistance from the steady state deflection of a current step.
//!
//! The resting and trough voltages are single samples, the last sample before the
//! stimulus starts and the last sample before it ends, located by flooring the stimulus
//! onset and offset onto the sampling grid:
//!
//! ```text
//! stim_start_idx = floor(stim_delay / dt)               rest   = v[stim_start_idx - 1]
//! stim_end_idx   = floor((stim_delay + stim_dur) / dt)  trough = v[stim_end_idx - 1]
//! ```
//!
//! The sample positions are part of the contract, tuned conductances depend on them.
//! A single sample is sensitive to noise and to a membrane that has not settled by the
//! end of the step, averaging over a window would give different values.

use tracing::info;
use crate::error::MeasurementError;
use crate::simulation::Trace;


/// Sample indices of the stimulus onset and offset on a sampling grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StimulusWindow {
    /// `floor(stim_delay / dt)`
    pub start_index: i64,
    /// `floor((stim_delay + stim_dur) / dt)`
    pub end_index: i64,
}

impl StimulusWindow {
    /// Locates the stimulus on a grid with spacing `dt` (ms)
    pub fn from_timing(dt: f64, stim_delay: f64, stim_dur: f64) -> Result<Self, MeasurementError> {
        if !(dt > 0.) || !dt.is_finite() {
            return Err(MeasurementError::NonPositiveTimestep(dt));
        }

        Ok(
            StimulusWindow {
                start_index: (stim_delay / dt).floor() as i64,
                end_index: ((stim_delay + stim_dur) / dt).floor() as i64,
            }
        )
    }

    /// Index of the last sample before the stimulus starts, timings far outside
    /// the grid saturate and fall outside any trace
    pub fn rest_index(&self) -> i64 {
        self.start_index.saturating_sub(1)
    }

    /// Index of the last sample before the stimulus ends
    pub fn trough_index(&self) -> i64 {
        self.end_index.saturating_sub(1)
    }
}

/// Resting and trough voltages of a current step and the resulting input resistance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RInResult {
    /// Voltage before the stimulus (mV)
    pub v_rest: f64,
    /// Voltage at the end of the stimulus (mV)
    pub v_trough: f64,
    /// Time of the resting sample (ms)
    pub v_rest_time: f64,
    /// Time of the trough sample (ms)
    pub v_trough_time: f64,
    /// Input resistance (MOhm)
    pub r_in: f64,
    /// Index of the resting sample
    pub rest_index: usize,
    /// Index of the trough sample
    pub trough_index: usize,
}

fn sample_at(voltages: &[f64], index: i64, sample: &'static str) -> Result<(usize, f64), MeasurementError> {
    usize::try_from(index).ok()
        .and_then(|i| voltages.get(i).map(|v| (i, *v)))
        .ok_or(MeasurementError::StimulusWindowOutOfRange { sample, index, len: voltages.len() })
}

/// Calculates input resistance as `(v_rest - v_trough) / |stim_amp|`, in MOhm when
/// voltage is in mV and current in nA, the trace must cover the whole stimulus and
/// at least one sample before it
pub fn estimate_input_resistance(
    trace: &Trace,
    dt: f64,
    stim_delay: f64,
    stim_dur: f64,
    stim_amp: f64,
) -> Result<RInResult, MeasurementError> {
    if stim_amp == 0. {
        return Err(MeasurementError::DivisionByZero);
    }

    let window = StimulusWindow::from_timing(dt, stim_delay, stim_dur)?;

    let (rest_index, v_rest) = sample_at(trace.voltage(), window.rest_index(), "V_rest")?;
    let (trough_index, v_trough) = sample_at(trace.voltage(), window.trough_index(), "V_trough")?;

    let v_rest_time = rest_index as f64 * dt;
    let v_trough_time = trough_index as f64 * dt;

    let r_in = (v_rest - v_trough) / stim_amp.abs();

    info!("V_rest [ {:.3} ] mV occurs at [ {:.3} ] ms", v_rest, v_rest_time);
    info!("V_trough [ {:.3} ] mV occurs at [ {:.3} ] ms", v_trough, v_trough_time);
    info!(
        "r_in = [ {:.3} - {:.3} ] mV / [ {:.3} ] nA = {:.3} MOhm",
        v_rest, v_trough, stim_amp.abs(), r_in,
    );

    Ok(
        RInResult {
            v_rest,
            v_trough,
            v_rest_time,
            v_trough_time,
            r_in,
            rest_index,
            trough_index,
        }
    )
}
