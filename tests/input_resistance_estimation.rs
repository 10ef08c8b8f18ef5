#[cfg(test)]
mod tests {
    use rin_tuning::{
        error::{MeasurementError, RInTuningError},
        estimation::{estimate_input_resistance, StimulusWindow},
        simulation::Trace,
    };

    const DT: f64 = 0.025;
    const STIM_DELAY: f64 = 100.;
    const STIM_DUR: f64 = 800.;

    fn step_trace(v_rest: f64, v_trough: f64, len: usize, stim_start: usize) -> Trace {
        let voltage = (0..len)
            .map(|n| if n < stim_start { v_rest } else { v_trough })
            .collect();

        Trace::from_voltages(voltage, DT).unwrap()
    }

    #[test]
    pub fn test_stimulus_window_indices() -> Result<(), MeasurementError> {
        let window = StimulusWindow::from_timing(DT, STIM_DELAY, STIM_DUR)?;

        assert_eq!(window.start_index, 4000);
        assert_eq!(window.end_index, 36000);
        assert_eq!(window.rest_index(), 3999);
        assert_eq!(window.trough_index(), 35999);

        let window = StimulusWindow::from_timing(0.1, 10., 20.)?;

        assert_eq!(window.rest_index(), 99);
        assert_eq!(window.trough_index(), 299);

        Ok(())
    }

    #[test]
    pub fn test_stimulus_window_rejects_timestep() {
        assert!(matches!(
            StimulusWindow::from_timing(0., STIM_DELAY, STIM_DUR),
            Err(MeasurementError::NonPositiveTimestep(_)),
        ));
        assert!(matches!(
            StimulusWindow::from_timing(-0.025, STIM_DELAY, STIM_DUR),
            Err(MeasurementError::NonPositiveTimestep(_)),
        ));
        assert!(matches!(
            StimulusWindow::from_timing(f64::NAN, STIM_DELAY, STIM_DUR),
            Err(MeasurementError::NonPositiveTimestep(_)),
        ));
    }

    #[test]
    pub fn test_step_deflection() -> Result<(), RInTuningError> {
        let trace = step_trace(-65., -75., 40001, 4000);

        let result = estimate_input_resistance(&trace, DT, STIM_DELAY, STIM_DUR, -1.)?;

        assert_eq!(result.v_rest, -65.);
        assert_eq!(result.v_trough, -75.);
        assert_eq!(result.r_in, 10.);
        assert_eq!(result.rest_index, 3999);
        assert_eq!(result.trough_index, 35999);
        assert!((result.v_rest_time - 99.975).abs() < 1e-9);
        assert!((result.v_trough_time - 899.975).abs() < 1e-9);

        Ok(())
    }

    #[test]
    pub fn test_amplitude_scaling() -> Result<(), RInTuningError> {
        let trace = step_trace(-70., -72., 40001, 4000);

        let result = estimate_input_resistance(&trace, DT, STIM_DELAY, STIM_DUR, -0.1)?;
        assert!((result.r_in - 20.).abs() < 1e-9);

        // depolarizing steps give a negative resistance instead of failing
        let trace = step_trace(-70., -60., 40001, 4000);

        let result = estimate_input_resistance(&trace, DT, STIM_DELAY, STIM_DUR, 0.5)?;
        assert!((result.r_in + 20.).abs() < 1e-9);

        Ok(())
    }

    #[test]
    pub fn test_samples_are_single_points() -> Result<(), RInTuningError> {
        let voltage: Vec<f64> = (0..40001)
            .map(|n| -60. - n as f64 * 0.001)
            .collect();
        let trace = Trace::from_voltages(voltage.clone(), DT)?;

        let result = estimate_input_resistance(&trace, DT, STIM_DELAY, STIM_DUR, -1.)?;

        assert_eq!(result.v_rest, voltage[3999]);
        assert_eq!(result.v_trough, voltage[35999]);
        assert!((result.r_in - 32.).abs() < 1e-6);

        Ok(())
    }

    #[test]
    pub fn test_zero_amplitude() {
        let trace = step_trace(-65., -75., 40001, 4000);

        assert!(matches!(
            estimate_input_resistance(&trace, DT, STIM_DELAY, STIM_DUR, 0.),
            Err(MeasurementError::DivisionByZero),
        ));

        // amplitude is checked before the trace
        let empty = Trace::from_voltages(vec![], DT).unwrap();

        assert!(matches!(
            estimate_input_resistance(&empty, DT, STIM_DELAY, STIM_DUR, 0.),
            Err(MeasurementError::DivisionByZero),
        ));
    }

    #[test]
    pub fn test_window_outside_trace() {
        let short = step_trace(-65., -75., 20000, 4000);

        assert!(matches!(
            estimate_input_resistance(&short, DT, STIM_DELAY, STIM_DUR, -1.),
            Err(MeasurementError::StimulusWindowOutOfRange { index: 35999, len: 20000, .. }),
        ));

        let trace = step_trace(-65., -75., 40001, 4000);

        assert!(matches!(
            estimate_input_resistance(&trace, DT, 0., STIM_DUR, -1.),
            Err(MeasurementError::StimulusWindowOutOfRange { index: -1, .. }),
        ));
    }

    #[test]
    pub fn test_extreme_timing_outside_trace() -> Result<(), MeasurementError> {
        let window = StimulusWindow::from_timing(DT, -1e300, STIM_DUR)?;
        assert_eq!(window.start_index, i64::MIN);
        assert_eq!(window.rest_index(), i64::MIN);

        let window = StimulusWindow::from_timing(DT, STIM_DELAY, f64::INFINITY)?;
        assert_eq!(window.trough_index(), i64::MAX - 1);

        let trace = step_trace(-65., -75., 40001, 4000);

        for stim_delay in [-1e300, f64::NEG_INFINITY] {
            assert!(matches!(
                estimate_input_resistance(&trace, DT, stim_delay, STIM_DUR, -1.),
                Err(MeasurementError::StimulusWindowOutOfRange { sample: "V_rest", .. }),
            ));
        }

        assert!(matches!(
            estimate_input_resistance(&trace, DT, STIM_DELAY, 1e300, -1.),
            Err(MeasurementError::StimulusWindowOutOfRange { sample: "V_trough", .. }),
        ));

        Ok(())
    }

    #[test]
    pub fn test_malformed_trace() {
        assert!(Trace::new(vec![0., 1., 2.], vec![-65., -65.], 1.).is_err());
        assert!(Trace::new(vec![0., 1., 1.], vec![-65., -65., -65.], 1.).is_err());
        assert!(Trace::new(vec![0., 1., 2.], vec![-65., -65., -65.], 1.).is_ok());
    }
}
