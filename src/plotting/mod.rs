//! Voltage trace plots written after each run

use std::path::Path;
use plotters::prelude::*;
use tracing::debug;
use crate::error::PlotError;
use crate::simulation::Trace;


/// File the voltage trace is written to by default
pub const DEFAULT_PLOT_FILE: &str = "voltage_trace_Rin.png";

fn plot_error<E: std::fmt::Display>(err: E) -> PlotError {
    PlotError(err.to_string())
}

/// Plots voltage against time and saves the image to `path`
pub fn plot_voltage_trace(trace: &Trace, path: &Path) -> Result<(), PlotError> {
    let (time, voltage) = (trace.time(), trace.voltage());

    let t_min = time.first().copied().unwrap_or(0.);
    let t_max = time.last().copied().unwrap_or(1.).max(t_min + trace.dt());
    let (v_min, v_max) = voltage.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let (v_min, v_max) = if v_min.is_finite() && v_max > v_min {
        let padding = (v_max - v_min) * 0.05;
        (v_min - padding, v_max + padding)
    } else if v_min.is_finite() {
        (v_min - 1., v_min + 1.)
    } else {
        (-1., 1.)
    };

    let root = BitMapBackend::new(path, (1280, 720)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Voltage Trace", ("sans-serif", 34).into_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(t_min..t_max, v_min..v_max)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("Time (ms)")
        .y_desc("Voltage (mV)")
        .draw()
        .map_err(plot_error)?;

    chart.draw_series(LineSeries::new(
        time.iter().copied().zip(voltage.iter().copied()),
        &BLUE,
    )).map_err(plot_error)?;

    root.present().map_err(plot_error)?;
    debug!("saved voltage trace to {}", path.display());

    Ok(())
}
