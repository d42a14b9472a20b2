//! Reactor wall forcing from apparatus corrections
//!
//! Non-ideal facilities are emulated by moving the wall of the otherwise
//! constant-volume reactor. Two profiles are supported:
//!
//! - [`VolumeProfile`]: a measured volume-time history (RCM compression
//!   stroke), normalized and differentiated into a wall velocity.
//! - [`PressureRiseProfile`]: a shock tube's post-shock pressure drift,
//!   converted to an equivalent volume history via a polytropic state
//!   change following Chaos and Dryer, *Int J Chem Kinet* 2010 42:143-150
//!   (doi:10.1002/kin.20471). A linear pressure ramp
//!   `P(t) = P0 (A t + 1)` with fractional rise rate `A` maps to the
//!   normalized volume `v(t) = (A t + 1)^(-1/gamma)`, whose derivative
//!   drives the wall.
//!
//! Both profiles pre-compute wall velocity once by second-order finite
//! differences and answer queries by linear interpolation, returning zero
//! outside the sampled window.

use crate::error::ValidationError;
use crate::physics::derivative::{first_derivative, interp};

/// Sampling frequency for constructed pressure-rise histories, Hz
///
/// 20 kHz matches typical shock-tube pressure-transducer acquisition and
/// resolves sub-millisecond delays comfortably.
pub const PROFILE_SAMPLE_FREQ_HZ: f64 = 2.0e4;

/// Wall velocity of the reactor as a function of time
///
/// Implemented by the facility-correction profiles and consumed by
/// kinetics backends through
/// [`KineticsModel::integrate`](crate::solver::KineticsModel::integrate).
/// Velocity assumes a unit wall area, so it equals `dv/dt` of the
/// normalized volume.
pub trait VolumeForcing: Send + Sync {
    /// Wall velocity at `time` seconds, zero outside the profile window
    fn wall_velocity(&self, time: f64) -> f64;

    /// Smallest spacing of the underlying time grid, if any
    ///
    /// Backends cap their internal step at this value so the forcing is
    /// not skipped over.
    fn min_time_step(&self) -> Option<f64> {
        None
    }
}

/// Wall velocity from a measured volume-time history
#[derive(Debug, Clone)]
pub struct VolumeProfile {
    times: Vec<f64>,
    velocities: Vec<f64>,
    min_dt: f64,
}

impl VolumeProfile {
    /// Build from a volume history; volumes are normalized by the first
    /// sample so a unit wall area yields the velocity directly
    pub fn new(times_s: &[f64], volumes: &[f64]) -> Result<VolumeProfile, ValidationError> {
        if times_s.len() != volumes.len() || times_s.len() < 3 {
            return Err(ValidationError::UnsupportedApparatus(format!(
                "volume history needs >= 3 matched samples, got {} times / {} volumes",
                times_s.len(),
                volumes.len()
            )));
        }
        if volumes[0] <= 0.0 {
            return Err(ValidationError::UnsupportedApparatus(
                "volume history starts at non-positive volume".into(),
            ));
        }
        let mut min_dt = f64::INFINITY;
        for pair in times_s.windows(2) {
            let dt = pair[1] - pair[0];
            if dt <= 0.0 {
                return Err(ValidationError::UnsupportedApparatus(
                    "volume history times are not strictly increasing".into(),
                ));
            }
            min_dt = min_dt.min(dt);
        }

        let normalized: Vec<f64> = volumes.iter().map(|&v| v / volumes[0]).collect();
        let velocities = first_derivative(times_s, &normalized);
        Ok(VolumeProfile {
            times: times_s.to_vec(),
            velocities,
            min_dt,
        })
    }
}

impl VolumeForcing for VolumeProfile {
    fn wall_velocity(&self, time: f64) -> f64 {
        interp(time, &self.times, &self.velocities, 0.0, 0.0)
    }

    fn min_time_step(&self) -> Option<f64> {
        Some(self.min_dt)
    }
}

/// Wall velocity emulating a shock tube's linear post-shock pressure rise
#[derive(Debug, Clone)]
pub struct PressureRiseProfile {
    times: Vec<f64>,
    velocities: Vec<f64>,
}

impl PressureRiseProfile {
    /// Build from a fractional rise rate in 1/s over `[0, time_end]`
    ///
    /// `gamma` is the mixture's specific-heat ratio at the initial state,
    /// supplied by the kinetics backend.
    pub fn new(
        pressure_rise_per_s: f64,
        gamma: f64,
        time_end_s: f64,
    ) -> Result<PressureRiseProfile, ValidationError> {
        if !(pressure_rise_per_s.is_finite() && pressure_rise_per_s >= 0.0) {
            return Err(ValidationError::UnsupportedApparatus(format!(
                "pressure-rise rate {pressure_rise_per_s} 1/s is not a finite non-negative value"
            )));
        }
        if !(gamma.is_finite() && gamma > 1.0) {
            return Err(ValidationError::UnsupportedApparatus(format!(
                "specific-heat ratio {gamma} must exceed 1"
            )));
        }
        if !(time_end_s.is_finite() && time_end_s > 0.0) {
            return Err(ValidationError::UnsupportedApparatus(format!(
                "profile end time {time_end_s} s must be positive"
            )));
        }

        let dt = 1.0 / PROFILE_SAMPLE_FREQ_HZ;
        let samples = (time_end_s / dt).ceil() as usize + 1;
        let mut times = Vec::with_capacity(samples);
        let mut volumes = Vec::with_capacity(samples);
        for i in 0..samples {
            let t = i as f64 * dt;
            times.push(t);
            // Polytropic volume for P(t)/P0 = A t + 1, normalized to v(0) = 1
            volumes.push((pressure_rise_per_s * t + 1.0).powf(-1.0 / gamma));
        }

        let velocities = first_derivative(&times, &volumes);
        Ok(PressureRiseProfile { times, velocities })
    }
}

impl VolumeForcing for PressureRiseProfile {
    fn wall_velocity(&self, time: f64) -> f64 {
        interp(time, &self.times, &self.velocities, 0.0, 0.0)
    }

    fn min_time_step(&self) -> Option<f64> {
        Some(1.0 / PROFILE_SAMPLE_FREQ_HZ)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_volume_history_gives_zero_velocity() {
        let times: Vec<f64> = (0..100).map(|i| f64::from(i) * 1e-4).collect();
        let volumes = vec![2.5; 100];
        let profile = VolumeProfile::new(&times, &volumes).unwrap();
        assert_relative_eq!(profile.wall_velocity(5e-3), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_volume_history_velocity() {
        // v(t) = 1 + 10 t (normalized), so dv/dt = 10 everywhere inside
        let times: Vec<f64> = (0..100).map(|i| f64::from(i) * 1e-4).collect();
        let volumes: Vec<f64> = times.iter().map(|&t| 3.0 * (1.0 + 10.0 * t)).collect();
        let profile = VolumeProfile::new(&times, &volumes).unwrap();
        assert_relative_eq!(profile.wall_velocity(4.3e-3), 10.0, epsilon = 1e-6);
        // Outside the window the wall is still
        assert_relative_eq!(profile.wall_velocity(1.0), 0.0);
        assert_relative_eq!(profile.wall_velocity(-1e-3), 0.0);
    }

    #[test]
    fn test_pressure_rise_contracts_volume() {
        // Rising pressure compresses the charge: wall velocity is negative
        let profile = PressureRiseProfile::new(100.0, 1.66, 2.0e-3).unwrap();
        let v = profile.wall_velocity(1.0e-3);
        assert!(v < 0.0, "rising pressure must contract the volume, got {v}");
    }

    #[test]
    fn test_pressure_rise_matches_analytic_derivative() {
        let rate = 50.0;
        let gamma = 1.4;
        let profile = PressureRiseProfile::new(rate, gamma, 5.0e-3).unwrap();
        let t = 2.0e-3;
        let analytic = -(rate / gamma) * (rate * t + 1.0).powf(-1.0 / gamma - 1.0);
        assert_relative_eq!(profile.wall_velocity(t), analytic, max_relative = 1e-4);
    }

    #[test]
    fn test_zero_rise_rate_is_still_wall() {
        let profile = PressureRiseProfile::new(0.0, 1.4, 1.0e-3).unwrap();
        assert_relative_eq!(profile.wall_velocity(5e-4), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_histories_rejected() {
        assert!(VolumeProfile::new(&[0.0, 1.0], &[1.0, 1.0]).is_err());
        assert!(VolumeProfile::new(&[0.0, 1.0, 0.5], &[1.0, 1.0, 1.0]).is_err());
        assert!(PressureRiseProfile::new(f64::NAN, 1.4, 1e-3).is_err());
        assert!(PressureRiseProfile::new(10.0, 0.9, 1e-3).is_err());
    }
}
