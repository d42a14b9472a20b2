//! Ignition-delay extraction from simulated trajectories
//!
//! Reduces a [`SimulationTrace`] and a declared criterion to a single
//! delay. The working signal is the criterion target (pressure,
//! temperature, or one species) optionally differentiated once or twice
//! by second-order finite differences; the event is the tallest interior
//! peak of that signal, with ties resolved to the earliest time because
//! ignition is physically a first-crossing event.
//!
//! Two behaviors are inherited from how experimentalists actually reduce
//! their data: a species target missing from the mechanism falls back to
//! the pressure d/dt-max criterion (after trying the non-excited spelling
//! for `*`-suffixed radicals), and a `max` criterion with no interior
//! peak falls back to the first derivative. Both fallbacks are logged.
//!
//! RCM delays are measured from the end of compression: any configured
//! compression time is subtracted, and candidate events inside the
//! compression stroke are discarded.

use crate::core_types::criterion::{IgnitionCriterion, IgnitionRule, IgnitionTarget};
use crate::error::ValidationError;
use crate::physics::{first_derivative, second_derivative};
use crate::solver::{SimulationTrace, SpeciesLookup};
use tracing::warn;

/// Relative tolerance for treating two peak heights as tied
const TIE_TOLERANCE: f64 = 1.0e-9;

/// Minimum height of a secondary peak relative to the main event before
/// it is reported as a first-stage delay (filters float dust)
const FIRST_STAGE_MIN_HEIGHT: f64 = 1.0e-2;

/// Extracted ignition timing for one trajectory
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedIgnition {
    /// Overall ignition delay, seconds from simulation start (minus any
    /// compression time)
    pub delay_s: f64,
    /// First-stage delay for two-stage ignition, when a distinct earlier
    /// peak precedes the main event
    pub first_stage_s: Option<f64>,
}

/// Reduce a trajectory to its ignition delay per the declared criterion
pub fn detect_ignition<M: SpeciesLookup + ?Sized>(
    trace: &SimulationTrace,
    criterion: &IgnitionCriterion,
    mech: &M,
    compression_time_s: f64,
) -> Result<DetectedIgnition, ValidationError> {
    let times = trace.times();
    let (signal, rule) = target_signal(trace, criterion, mech);

    // A signal that never rises has no excursion to detect, whatever the
    // rule; failing here beats reporting a spurious zero-derivative point
    if !has_rising_excursion(&signal) {
        return Err(ValidationError::NoIgnitionDetected(format!(
            "target '{}' is monotonically non-increasing over the whole trace",
            criterion.target
        )));
    }

    let working = match rule {
        IgnitionRule::MaxValue => signal,
        IgnitionRule::MaxFirstDerivative => first_derivative(times, &signal),
        IgnitionRule::MaxSecondDerivative => second_derivative(times, &signal),
    };

    let mut peaks = interior_peaks(&working);
    let mut effective = working;
    if peaks.is_empty() && rule == IgnitionRule::MaxValue {
        // Still-rising signal at the horizon: fall back on the slope
        warn!(
            target = %criterion.target,
            "no peak in target signal; falling back on first derivative"
        );
        effective = first_derivative(times, &effective);
        peaks = interior_peaks(&effective);
    }
    if peaks.is_empty() {
        return Err(ValidationError::NoIgnitionDetected(format!(
            "no ignition event before the {:.3e} s horizon",
            times[times.len() - 1]
        )));
    }

    // Peaks inside the compression stroke are piston artifacts, not
    // ignition; only post-compression candidates compete
    peaks.retain(|&i| times[i] > compression_time_s);
    if peaks.is_empty() {
        return Err(ValidationError::NoIgnitionDetected(
            "only events found are inside the compression stroke".into(),
        ));
    }

    // Tallest remaining peak wins; ties within floating tolerance go to
    // the earliest sample. The window scales with the peak height so
    // small-magnitude signals (species mole fractions) keep a genuinely
    // relative tolerance
    let max_height = peaks
        .iter()
        .map(|&i| effective[i])
        .fold(f64::NEG_INFINITY, f64::max);
    let tie = TIE_TOLERANCE * max_height.abs() + f64::MIN_POSITIVE;
    let event = peaks
        .iter()
        .copied()
        .find(|&i| effective[i] >= max_height - tie)
        .ok_or_else(|| {
            ValidationError::NoIgnitionDetected("peak heights are all non-finite".into())
        })?;

    let delay_s = times[event] - compression_time_s;

    // Distinct earlier peak of comparable height marks first-stage ignition
    let first_stage_s = peaks
        .iter()
        .copied()
        .filter(|&i| i < event)
        .find(|&i| effective[i] >= FIRST_STAGE_MIN_HEIGHT * max_height.abs())
        .map(|i| times[i] - compression_time_s);

    Ok(DetectedIgnition {
        delay_s,
        first_stage_s,
    })
}

/// Resolve the criterion target to a sampled signal
///
/// Species lookup tries the recorded spelling, then the non-excited
/// spelling for `*`-suffixed radicals; an unresolvable species falls back
/// to the pressure d/dt-max criterion with a warning.
fn target_signal<M: SpeciesLookup + ?Sized>(
    trace: &SimulationTrace,
    criterion: &IgnitionCriterion,
    mech: &M,
) -> (Vec<f64>, IgnitionRule) {
    match &criterion.target {
        IgnitionTarget::Pressure => (trace.pressures().to_vec(), criterion.rule),
        IgnitionTarget::Temperature => (trace.temperatures().to_vec(), criterion.rule),
        IgnitionTarget::Species(name) => {
            let index = mech.find_species(name).or_else(|| {
                name.strip_suffix('*')
                    .and_then(|base| mech.find_species(base))
            });
            match index {
                Some(i) => (trace.species_signal(i), criterion.rule),
                None => {
                    warn!(
                        species = %name,
                        "ignition target not in mechanism; falling back on pressure d/dt max"
                    );
                    (trace.pressures().to_vec(), IgnitionRule::MaxFirstDerivative)
                }
            }
        }
    }
}

/// True when the signal rises anywhere, beyond floating tolerance
fn has_rising_excursion(signal: &[f64]) -> bool {
    let scale = signal
        .iter()
        .fold(0.0_f64, |acc, &v| acc.max(v.abs()))
        .max(1.0e-300);
    signal
        .windows(2)
        .any(|pair| pair[1] > pair[0] + TIE_TOLERANCE * scale)
}

/// Indices of interior local maxima
///
/// `>` on the left and `>=` on the right reports the first sample of a
/// flat-topped peak, preserving the earliest-time tie-break. Endpoints
/// are excluded: a maximum at the horizon is not a resolved event.
fn interior_peaks(signal: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    for i in 1..signal.len().saturating_sub(1) {
        if signal[i] > signal[i - 1] && signal[i] >= signal[i + 1] && signal[i].is_finite() {
            peaks.push(i);
        }
    }
    peaks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::criterion::IgnitionCriterion;
    use crate::solver::SyntheticSolver;
    use approx::assert_relative_eq;
    use nalgebra::DVector;

    /// Trace with pressure (and OH) following the supplied signal
    fn trace_from_pressure(times: &[f64], pressures: &[f64]) -> SimulationTrace {
        let mech = SyntheticSolver::hydrogen_oxygen();
        let oh = mech.find_species("OH").unwrap();
        let n_species = mech.species_names().len();
        let mut trace = SimulationTrace::with_capacity(times.len());
        for (i, &t) in times.iter().enumerate() {
            let mut x = DVector::zeros(n_species);
            x[oh] = pressures[i] * 1e-9;
            trace.push(t, 1500.0, pressures[i], 1.0, x);
        }
        trace
    }

    fn uniform_times(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 * 1e-6).collect()
    }

    #[test]
    fn test_single_peak_max_value() {
        let times = uniform_times(101);
        // Gaussian bump centered at sample 60
        let signal: Vec<f64> = (0..101)
            .map(|i| 1e5 + 5e4 * (-((i as f64 - 60.0) / 8.0).powi(2)).exp())
            .collect();
        let trace = trace_from_pressure(&times, &signal);
        let mech = SyntheticSolver::hydrogen_oxygen();
        let criterion = IgnitionCriterion::new(IgnitionTarget::Pressure, IgnitionRule::MaxValue);
        let found = detect_ignition(&trace, &criterion, &mech, 0.0).unwrap();
        assert_relative_eq!(found.delay_s, 60.0e-6, epsilon = 1e-12);
        assert!(found.first_stage_s.is_none());
    }

    #[test]
    fn test_first_derivative_rule_finds_steepest_rise() {
        let times = uniform_times(201);
        // Logistic step: steepest slope at the center, sample 100
        let signal: Vec<f64> = (0..201)
            .map(|i| 1e5 + 1e5 / (1.0 + (-(i as f64 - 100.0) / 10.0).exp()))
            .collect();
        let trace = trace_from_pressure(&times, &signal);
        let mech = SyntheticSolver::hydrogen_oxygen();
        let found =
            detect_ignition(&trace, &IgnitionCriterion::pressure_rise(), &mech, 0.0).unwrap();
        assert_relative_eq!(found.delay_s, 100.0e-6, epsilon = 1e-12);
    }

    #[test]
    fn test_second_derivative_rule() {
        let times = uniform_times(201);
        // Max curvature of the logistic sits before the steepest slope
        let signal: Vec<f64> = (0..201)
            .map(|i| 1e5 + 1e5 / (1.0 + (-(i as f64 - 100.0) / 10.0).exp()))
            .collect();
        let trace = trace_from_pressure(&times, &signal);
        let mech = SyntheticSolver::hydrogen_oxygen();
        let criterion =
            IgnitionCriterion::new(IgnitionTarget::Pressure, IgnitionRule::MaxSecondDerivative);
        let found = detect_ignition(&trace, &criterion, &mech, 0.0).unwrap();
        assert!(found.delay_s < 100.0e-6);
        assert!(found.delay_s > 50.0e-6);
    }

    #[test]
    fn test_monotone_non_increasing_fails() {
        let times = uniform_times(100);
        let signal: Vec<f64> = (0..100).map(|i| 2e5 - f64::from(i) * 100.0).collect();
        let trace = trace_from_pressure(&times, &signal);
        let mech = SyntheticSolver::hydrogen_oxygen();
        for rule in [
            IgnitionRule::MaxValue,
            IgnitionRule::MaxFirstDerivative,
            IgnitionRule::MaxSecondDerivative,
        ] {
            let criterion = IgnitionCriterion::new(IgnitionTarget::Pressure, rule);
            assert!(matches!(
                detect_ignition(&trace, &criterion, &mech, 0.0),
                Err(ValidationError::NoIgnitionDetected(_))
            ));
        }
    }

    #[test]
    fn test_equal_peaks_take_earlier_time() {
        let times = uniform_times(100);
        let mut signal = vec![1e5; 100];
        signal[30] = 2e5;
        signal[70] = 2e5;
        let trace = trace_from_pressure(&times, &signal);
        let mech = SyntheticSolver::hydrogen_oxygen();
        let criterion = IgnitionCriterion::new(IgnitionTarget::Pressure, IgnitionRule::MaxValue);
        let found = detect_ignition(&trace, &criterion, &mech, 0.0).unwrap();
        assert_relative_eq!(found.delay_s, 30.0e-6, epsilon = 1e-12);
    }

    #[test]
    fn test_tie_window_stays_relative_for_small_signals() {
        // Radical traces sit around 1e-3; an earlier peak genuinely lower
        // than the maximum must not be absorbed by an absolute tie window
        let times = uniform_times(101);
        let mut signal = vec![1.0e5; 101];
        signal[30] = 1.0e6 - 0.5;
        signal[70] = 1.0e6;
        // OH mirrors pressure at 1e-9 scale, so the two peaks differ by
        // 5e-10 in mole fraction, far beyond 1e-9 relative tolerance
        let trace = trace_from_pressure(&times, &signal);
        let mech = SyntheticSolver::hydrogen_oxygen();
        let found = detect_ignition(&trace, &IgnitionCriterion::species_peak("OH"), &mech, 0.0)
            .unwrap();
        assert_relative_eq!(found.delay_s, 70.0e-6, epsilon = 1e-12);
    }

    #[test]
    fn test_two_stage_ignition_reports_first_stage() {
        let times = uniform_times(300);
        let signal: Vec<f64> = (0..300)
            .map(|i| {
                let first = 3e4 * (-((i as f64 - 80.0) / 6.0).powi(2)).exp();
                let main = 1e5 * (-((i as f64 - 200.0) / 6.0).powi(2)).exp();
                1e5 + first + main
            })
            .collect();
        let trace = trace_from_pressure(&times, &signal);
        let mech = SyntheticSolver::hydrogen_oxygen();
        let criterion = IgnitionCriterion::new(IgnitionTarget::Pressure, IgnitionRule::MaxValue);
        let found = detect_ignition(&trace, &criterion, &mech, 0.0).unwrap();
        assert_relative_eq!(found.delay_s, 200.0e-6, epsilon = 1e-12);
        assert_relative_eq!(found.first_stage_s.unwrap(), 80.0e-6, epsilon = 1e-12);
    }

    #[test]
    fn test_compression_time_subtracted() {
        let times = uniform_times(300);
        let signal: Vec<f64> = (0..300)
            .map(|i| 1e5 + 1e5 * (-((i as f64 - 200.0) / 6.0).powi(2)).exp())
            .collect();
        let trace = trace_from_pressure(&times, &signal);
        let mech = SyntheticSolver::hydrogen_oxygen();
        let criterion = IgnitionCriterion::new(IgnitionTarget::Pressure, IgnitionRule::MaxValue);
        let found = detect_ignition(&trace, &criterion, &mech, 50.0e-6).unwrap();
        assert_relative_eq!(found.delay_s, 150.0e-6, epsilon = 1e-12);

        // Event entirely inside the compression stroke: nothing to report
        assert!(matches!(
            detect_ignition(&trace, &criterion, &mech, 250.0e-6),
            Err(ValidationError::NoIgnitionDetected(_))
        ));
    }

    #[test]
    fn test_excited_radical_falls_back_to_base_species() {
        let times = uniform_times(101);
        let signal: Vec<f64> = (0..101)
            .map(|i| 1e5 + 5e4 * (-((i as f64 - 40.0) / 6.0).powi(2)).exp())
            .collect();
        // OH trace mirrors pressure in the fixture
        let trace = trace_from_pressure(&times, &signal);
        let mech = SyntheticSolver::hydrogen_oxygen();
        let criterion = IgnitionCriterion::species_peak("OH*");
        let found = detect_ignition(&trace, &criterion, &mech, 0.0).unwrap();
        assert_relative_eq!(found.delay_s, 40.0e-6, epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_species_falls_back_to_pressure() {
        let times = uniform_times(201);
        let signal: Vec<f64> = (0..201)
            .map(|i| 1e5 + 1e5 / (1.0 + (-(i as f64 - 100.0) / 10.0).exp()))
            .collect();
        let trace = trace_from_pressure(&times, &signal);
        let mech = SyntheticSolver::hydrogen_oxygen();
        let criterion = IgnitionCriterion::species_peak("CH");
        let found = detect_ignition(&trace, &criterion, &mech, 0.0).unwrap();
        // Same answer as the pressure d/dt-max criterion
        assert_relative_eq!(found.delay_s, 100.0e-6, epsilon = 1e-12);
    }

    #[test]
    fn test_max_value_still_rising_falls_back_to_derivative() {
        let times = uniform_times(201);
        // Logistic that has not peaked by the horizon
        let signal: Vec<f64> = (0..201)
            .map(|i| 1e5 + 1e5 / (1.0 + (-(i as f64 - 180.0) / 10.0).exp()))
            .collect();
        let trace = trace_from_pressure(&times, &signal);
        let mech = SyntheticSolver::hydrogen_oxygen();
        let criterion = IgnitionCriterion::new(IgnitionTarget::Pressure, IgnitionRule::MaxValue);
        let found = detect_ignition(&trace, &criterion, &mech, 0.0).unwrap();
        assert_relative_eq!(found.delay_s, 180.0e-6, epsilon = 1e-12);
    }
}
