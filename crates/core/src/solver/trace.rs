//! Simulated reactor trajectory
//!
//! A trace is the ordered sample history one integration produces: time,
//! temperature, pressure, normalized volume, and the species mole-fraction
//! vector at each step. It is owned by the simulation step that produced
//! it and dropped after ignition-delay extraction.

use crate::error::ValidationError;
use nalgebra::DVector;

/// Ordered (time, state) samples from one reactor integration
#[derive(Debug, Clone, Default)]
pub struct SimulationTrace {
    times: Vec<f64>,
    temperatures: Vec<f64>,
    pressures: Vec<f64>,
    volumes: Vec<f64>,
    species: Vec<DVector<f64>>,
}

impl SimulationTrace {
    #[must_use]
    pub fn with_capacity(samples: usize) -> Self {
        SimulationTrace {
            times: Vec::with_capacity(samples),
            temperatures: Vec::with_capacity(samples),
            pressures: Vec::with_capacity(samples),
            volumes: Vec::with_capacity(samples),
            species: Vec::with_capacity(samples),
        }
    }

    /// Append one sample; `time` is seconds from simulation start
    pub fn push(
        &mut self,
        time: f64,
        temperature_k: f64,
        pressure_pa: f64,
        volume: f64,
        mole_fractions: DVector<f64>,
    ) {
        self.times.push(time);
        self.temperatures.push(temperature_k);
        self.pressures.push(pressure_pa);
        self.volumes.push(volume);
        self.species.push(mole_fractions);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    #[must_use]
    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    #[must_use]
    pub fn pressures(&self) -> &[f64] {
        &self.pressures
    }

    #[must_use]
    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }

    /// Mole-fraction history of one mechanism species
    #[must_use]
    pub fn species_signal(&self, index: usize) -> Vec<f64> {
        self.species.iter().map(|x| x[index]).collect()
    }

    /// Reject traces the solver should never have produced
    ///
    /// Non-finite or non-positive temperature/pressure/volume and
    /// non-monotonic times all indicate a diverged integration.
    pub fn check_physical(&self) -> Result<(), ValidationError> {
        if self.len() < 3 {
            return Err(ValidationError::IntegrationDivergence(format!(
                "trace has only {} samples",
                self.len()
            )));
        }
        for i in 0..self.len() {
            let (t, p, v) = (self.temperatures[i], self.pressures[i], self.volumes[i]);
            if !(t.is_finite() && p.is_finite() && v.is_finite() && self.times[i].is_finite()) {
                return Err(ValidationError::IntegrationDivergence(format!(
                    "non-finite state at sample {i} (t = {} s)",
                    self.times[i]
                )));
            }
            if t <= 0.0 || p <= 0.0 || v <= 0.0 {
                return Err(ValidationError::IntegrationDivergence(format!(
                    "non-physical state at sample {i}: T = {t} K, P = {p} Pa, V = {v}"
                )));
            }
            if i > 0 && self.times[i] <= self.times[i - 1] {
                return Err(ValidationError::IntegrationDivergence(format!(
                    "time not strictly increasing at sample {i}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_trace(samples: usize, pressure: f64) -> SimulationTrace {
        let mut trace = SimulationTrace::with_capacity(samples);
        for i in 0..samples {
            trace.push(
                i as f64 * 1e-6,
                1000.0,
                pressure,
                1.0,
                DVector::from_vec(vec![0.5, 0.5]),
            );
        }
        trace
    }

    #[test]
    fn test_physical_trace_accepted() {
        assert!(flat_trace(10, 1e5).check_physical().is_ok());
    }

    #[test]
    fn test_negative_pressure_rejected() {
        let err = flat_trace(10, -1.0).check_physical().unwrap_err();
        assert!(matches!(err, ValidationError::IntegrationDivergence(_)));
    }

    #[test]
    fn test_short_trace_rejected() {
        assert!(flat_trace(2, 1e5).check_physical().is_err());
    }

    #[test]
    fn test_species_signal_extraction() {
        let mut trace = SimulationTrace::default();
        for i in 0..5 {
            let x = f64::from(i) * 0.1;
            trace.push(f64::from(i), 1000.0, 1e5, 1.0, DVector::from_vec(vec![1.0 - x, x]));
        }
        let signal = trace.species_signal(1);
        assert_eq!(signal.len(), 5);
        assert!((signal[3] - 0.3).abs() < 1e-12);
    }
}
