//! Synthetic kinetics backend
//!
//! An analytic [`KineticsModel`] that produces thermal-runaway-shaped
//! trajectories without a real kinetics library. The induction period
//! follows a Livengood-Wu knock integral over an Arrhenius correlation
//! `tau = A exp(Ta / T) (P / Pref)^n`, so wall forcing that compresses the
//! charge genuinely shortens the predicted delay. At ignition the
//! temperature rises along a logistic ramp, pressure follows the ideal-gas
//! relation at the instantaneous volume, fuel and oxidizer are consumed,
//! and radical tracers pulse through a peak at the event.
//!
//! The backend exists so the full pipeline (state construction, forcing,
//! detection, error metrics) runs end to end in tests and demos; it is
//! not a kinetics mechanism.

use crate::error::ValidationError;
use crate::physics::VolumeForcing;
use crate::solver::interface::{InitialState, KineticsModel, SpeciesLookup};
use crate::solver::trace::SimulationTrace;
use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use tracing::debug;

/// Role a species plays in the synthetic trajectory shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpeciesRole {
    Fuel,
    Oxidizer,
    Diluent,
    /// Short-lived intermediate: pulses through a peak at ignition
    Radical,
    /// Stable product: rises with reaction progress
    Product,
}

/// Arrhenius correlation parameters for the induction time
#[derive(Debug, Clone, Copy)]
pub struct DelayCorrelation {
    /// Pre-exponential factor, seconds
    pub pre_exponential_s: f64,
    /// Activation temperature `Ea / R`, kelvin
    pub activation_temperature_k: f64,
    /// Pressure exponent
    pub pressure_exponent: f64,
    /// Reference pressure, pascal
    pub reference_pressure_pa: f64,
}

impl DelayCorrelation {
    /// Induction time at a given state, seconds
    #[must_use]
    pub fn tau(&self, temperature_k: f64, pressure_pa: f64) -> f64 {
        self.pre_exponential_s
            * (self.activation_temperature_k / temperature_k).exp()
            * (pressure_pa / self.reference_pressure_pa).powf(self.pressure_exponent)
    }
}

/// Analytic reactor backend with a fixed species table
pub struct SyntheticSolver {
    names: Vec<String>,
    molar_masses: Vec<f64>,
    roles: Vec<SpeciesRole>,
    index: FxHashMap<String, usize>,
    correlation: DelayCorrelation,
    gamma: f64,
    samples: usize,
    /// Relative noise amplitude and RNG seed, when signal noise is wanted
    noise: Option<(f64, u64)>,
}

/// Default sample count per trajectory; enough that a first derivative is
/// resolvable across the ignition ramp
const DEFAULT_SAMPLES: usize = 4001;

impl SyntheticSolver {
    /// Dilute hydrogen/oxygen mixture table with an argon-dominated
    /// specific-heat ratio, tuned to shock-tube delay scales (hundreds of
    /// microseconds around 1100-1300 K, 2 atm)
    #[must_use]
    pub fn hydrogen_oxygen() -> Self {
        SyntheticSolver::new(
            &[
                ("H2", 2.016e-3, SpeciesRole::Fuel),
                ("O2", 31.998e-3, SpeciesRole::Oxidizer),
                ("Ar", 39.948e-3, SpeciesRole::Diluent),
                ("N2", 28.014e-3, SpeciesRole::Diluent),
                ("OH", 17.007e-3, SpeciesRole::Radical),
                ("H2O", 18.015e-3, SpeciesRole::Product),
            ],
            DelayCorrelation {
                pre_exponential_s: 1.8e-9,
                activation_temperature_k: 15_000.0,
                pressure_exponent: -0.5,
                reference_pressure_pa: 101_325.0,
            },
            1.64,
        )
    }

    fn new(
        species: &[(&str, f64, SpeciesRole)],
        correlation: DelayCorrelation,
        gamma: f64,
    ) -> Self {
        let names: Vec<String> = species.iter().map(|&(n, _, _)| n.to_string()).collect();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        SyntheticSolver {
            names,
            molar_masses: species.iter().map(|&(_, m, _)| m).collect(),
            roles: species.iter().map(|&(_, _, r)| r).collect(),
            index,
            correlation,
            gamma,
            samples: DEFAULT_SAMPLES,
            noise: None,
        }
    }

    /// Add relative noise to the generated signals (deterministic per seed)
    #[must_use]
    pub fn with_noise(mut self, relative_amplitude: f64, seed: u64) -> Self {
        self.noise = Some((relative_amplitude, seed));
        self
    }

    /// Override the trajectory sample count
    #[must_use]
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples.max(16);
        self
    }

    /// Induction correlation in use (exposed for test calibration)
    #[must_use]
    pub fn correlation(&self) -> DelayCorrelation {
        self.correlation
    }

    fn check_state(state: &InitialState) -> Result<(), ValidationError> {
        if !(state.temperature_k.is_finite() && state.temperature_k > 0.0) {
            return Err(ValidationError::IntegrationDivergence(format!(
                "initial temperature {} K is non-physical",
                state.temperature_k
            )));
        }
        if !(state.pressure_pa.is_finite() && state.pressure_pa > 0.0) {
            return Err(ValidationError::IntegrationDivergence(format!(
                "initial pressure {} Pa is non-physical",
                state.pressure_pa
            )));
        }
        Ok(())
    }
}

impl SpeciesLookup for SyntheticSolver {
    fn species_names(&self) -> &[String] {
        &self.names
    }

    fn molar_mass(&self, index: usize) -> f64 {
        self.molar_masses[index]
    }

    fn find_species(&self, name: &str) -> Option<usize> {
        if let Some(&i) = self.index.get(name) {
            return Some(i);
        }
        self.names.iter().position(|n| n.eq_ignore_ascii_case(name))
    }
}

impl KineticsModel for SyntheticSolver {
    fn integrate(
        &self,
        state: &InitialState,
        forcing: Option<&dyn VolumeForcing>,
        horizon_s: f64,
    ) -> Result<SimulationTrace, ValidationError> {
        SyntheticSolver::check_state(state)?;
        if !(horizon_s.is_finite() && horizon_s > 0.0) {
            return Err(ValidationError::IntegrationDivergence(format!(
                "horizon {horizon_s} s is not a positive time"
            )));
        }

        let mut n = self.samples;
        let mut dt = horizon_s / (n - 1) as f64;
        if let Some(min_step) = forcing.and_then(VolumeForcing::min_time_step) {
            // Do not step over the forcing profile's grid
            if dt > min_step {
                dt = min_step;
                n = (horizon_s / dt).ceil() as usize + 1;
            }
        }

        // Pass 1: volume from the wall velocity, induction from the knock
        // integral over the pre-ignition polytropic state
        let mut times = Vec::with_capacity(n);
        let mut volumes = Vec::with_capacity(n);
        let mut base_temps = Vec::with_capacity(n);
        let mut base_pres = Vec::with_capacity(n);
        let mut volume = 1.0;
        let mut knock = 0.0;
        let mut ignition_time = f64::INFINITY;
        for i in 0..n {
            let t = i as f64 * dt;
            if let Some(f) = forcing {
                if i > 0 {
                    volume += f.wall_velocity(t - dt) * dt;
                }
                if volume <= 0.0 || !volume.is_finite() {
                    return Err(ValidationError::IntegrationDivergence(format!(
                        "forced volume collapsed to {volume} at t = {t} s"
                    )));
                }
            }
            let temp = state.temperature_k * volume.powf(-(self.gamma - 1.0));
            let pres = state.pressure_pa * volume.powf(-self.gamma);
            times.push(t);
            volumes.push(volume);
            base_temps.push(temp);
            base_pres.push(pres);

            if ignition_time.is_infinite() {
                knock += dt / self.correlation.tau(temp, pres);
                if knock >= 1.0 {
                    ignition_time = t;
                }
            }
        }

        debug!(
            ignition_time,
            horizon_s,
            forced = forcing.is_some(),
            "synthetic integration complete"
        );

        // Pass 2: overlay the ignition ramp and species shapes
        let fuel_fraction: f64 = self
            .roles
            .iter()
            .enumerate()
            .filter(|&(_, &r)| r == SpeciesRole::Fuel)
            .map(|(i, _)| state.mole_fractions[i])
            .sum();
        let delta_t = (30_000.0 * fuel_fraction).min(1800.0);
        let ramp_width = (5.0 * dt).max(ignition_time * 1.0e-3);

        let mut rng = self
            .noise
            .map(|(amp, seed)| (amp, StdRng::seed_from_u64(seed)));
        let mut trace = SimulationTrace::with_capacity(times.len());
        for i in 0..times.len() {
            // Logistic reaction progress centered on the ignition time
            let progress = if ignition_time.is_infinite() {
                0.0
            } else {
                1.0 / (1.0 + (-(times[i] - ignition_time) / ramp_width).exp())
            };

            let mut temp = base_temps[i] + delta_t * progress;
            let mut pres = base_pres[i] * (temp / base_temps[i]);
            let mut x = DVector::zeros(self.names.len());
            for (s, &role) in self.roles.iter().enumerate() {
                let initial = state.mole_fractions[s];
                x[s] = match role {
                    SpeciesRole::Fuel | SpeciesRole::Oxidizer => initial * (1.0 - progress),
                    SpeciesRole::Diluent => initial,
                    // c (1 - c) pulses through its maximum exactly at the event
                    SpeciesRole::Radical => {
                        initial + 0.4 * fuel_fraction * progress * (1.0 - progress)
                    }
                    SpeciesRole::Product => initial + fuel_fraction * progress,
                };
            }

            if let Some((amp, ref mut r)) = rng {
                temp *= 1.0 + amp * r.random_range(-1.0..1.0);
                pres *= 1.0 + amp * r.random_range(-1.0..1.0);
                for v in x.iter_mut() {
                    *v = (*v * (1.0 + amp * r.random_range(-1.0..1.0))).max(0.0);
                }
            }

            trace.push(times[i], temp, pres, volumes[i], x);
        }

        Ok(trace)
    }

    fn specific_heat_ratio(&self, _state: &InitialState) -> f64 {
        self.gamma
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::PressureRiseProfile;
    use approx::assert_relative_eq;

    fn dilute_state(mech: &SyntheticSolver, temperature_k: f64) -> InitialState {
        let mut x = DVector::zeros(mech.species_names().len());
        x[mech.find_species("H2").unwrap()] = 0.00444;
        x[mech.find_species("O2").unwrap()] = 0.00566;
        x[mech.find_species("Ar").unwrap()] = 0.9899;
        let total = x.sum();
        InitialState {
            temperature_k,
            pressure_pa: 220_000.0,
            mole_fractions: x / total,
        }
    }

    #[test]
    fn test_constant_volume_ignites_near_correlation_delay() {
        let mech = SyntheticSolver::hydrogen_oxygen();
        let state = dilute_state(&mech, 1164.48);
        let tau = mech.correlation().tau(1164.48, 220_000.0);
        let trace = mech.integrate(&state, None, 100.0 * tau).unwrap();
        trace.check_physical().unwrap();

        // Temperature jump happens close to the correlation's tau
        let t_half = state.temperature_k + 0.5 * (trace.temperatures().last().unwrap() - state.temperature_k);
        let crossing = trace
            .times()
            .iter()
            .zip(trace.temperatures())
            .find(|&(_, &temp)| temp > t_half)
            .map(|(&t, _)| t)
            .expect("trajectory never ignited");
        assert_relative_eq!(crossing, tau, max_relative = 0.1);
    }

    #[test]
    fn test_hotter_charge_ignites_sooner() {
        let mech = SyntheticSolver::hydrogen_oxygen();
        let tau_cool = mech.correlation().tau(1100.0, 220_000.0);

        let ignition_at = |temperature: f64| {
            let state = dilute_state(&mech, temperature);
            let trace = mech.integrate(&state, None, 10.0 * tau_cool).unwrap();
            let t0 = trace.temperatures()[0];
            trace
                .times()
                .iter()
                .zip(trace.temperatures())
                .find(|&(_, &temp)| temp > t0 + 50.0)
                .map(|(&t, _)| t)
                .expect("no ignition")
        };

        assert!(ignition_at(1250.0) < ignition_at(1100.0));
    }

    #[test]
    fn test_pressure_rise_forcing_shortens_delay() {
        let mech = SyntheticSolver::hydrogen_oxygen();
        let state = dilute_state(&mech, 1164.48);
        let tau = mech.correlation().tau(1164.48, 220_000.0);
        let horizon = 20.0 * tau;

        let unforced = mech.integrate(&state, None, horizon).unwrap();
        let profile = PressureRiseProfile::new(100.0, 1.64, horizon).unwrap();
        let forced = mech.integrate(&state, Some(&profile), horizon).unwrap();

        let event = |trace: &SimulationTrace| {
            let t0 = trace.temperatures()[0];
            trace
                .times()
                .iter()
                .zip(trace.temperatures())
                .find(|&(_, &temp)| temp > t0 + 50.0)
                .map(|(&t, _)| t)
                .expect("no ignition")
        };
        assert!(
            event(&forced) < event(&unforced),
            "compression from the pressure rise must advance ignition"
        );
    }

    #[test]
    fn test_radical_pulses_and_product_rises() {
        let mech = SyntheticSolver::hydrogen_oxygen();
        let state = dilute_state(&mech, 1200.0);
        let tau = mech.correlation().tau(1200.0, 220_000.0);
        let trace = mech.integrate(&state, None, 20.0 * tau).unwrap();

        let oh = trace.species_signal(mech.find_species("OH").unwrap());
        let peak = oh.iter().cloned().fold(f64::MIN, f64::max);
        assert!(peak > oh[0], "OH must pulse above its initial value");
        assert!(
            *oh.last().unwrap() < peak,
            "OH must decay after the ignition event"
        );

        let h2o = trace.species_signal(mech.find_species("H2O").unwrap());
        assert!(h2o.last().unwrap() > &h2o[0]);
    }

    #[test]
    fn test_no_ignition_within_tiny_horizon() {
        let mech = SyntheticSolver::hydrogen_oxygen();
        let state = dilute_state(&mech, 1164.48);
        let tau = mech.correlation().tau(1164.48, 220_000.0);
        // Horizon far below tau: knock integral never reaches one
        let trace = mech.integrate(&state, None, tau * 1e-3).unwrap();
        let spread = trace.temperatures().iter().cloned().fold(f64::MIN, f64::max)
            - trace.temperatures().iter().cloned().fold(f64::MAX, f64::min);
        assert!(spread < 1.0, "no runaway expected, spread was {spread} K");
    }

    #[test]
    fn test_noise_is_deterministic_per_seed() {
        let state = dilute_state(&SyntheticSolver::hydrogen_oxygen(), 1200.0);
        let a = SyntheticSolver::hydrogen_oxygen()
            .with_noise(0.01, 42)
            .integrate(&state, None, 1e-3)
            .unwrap();
        let b = SyntheticSolver::hydrogen_oxygen()
            .with_noise(0.01, 42)
            .integrate(&state, None, 1e-3)
            .unwrap();
        assert_eq!(a.pressures(), b.pressures());
    }

    #[test]
    fn test_bad_state_rejected() {
        let mech = SyntheticSolver::hydrogen_oxygen();
        let mut state = dilute_state(&mech, 1200.0);
        state.pressure_pa = -5.0;
        assert!(matches!(
            mech.integrate(&state, None, 1e-3),
            Err(ValidationError::IntegrationDivergence(_))
        ));
    }
}
