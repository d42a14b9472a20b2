//! Reactor simulation driver
//!
//! Wraps the black-box kinetics backend: picks the simulation horizon,
//! materializes the wall forcing the chosen model calls for, runs the
//! integration, and rejects traces the backend should never have
//! produced. One run is a blocking numeric computation; a run that
//! reaches its horizon without igniting surfaces as
//! `NoIgnitionDetected` downstream rather than being killed mid-step.

use crate::error::ValidationError;
use crate::physics::{PressureRiseProfile, VolumeForcing};
use crate::simulation::state::{ReactorCase, ReactorModel};
use crate::solver::{KineticsModel, SimulationTrace};
use tracing::debug;

/// Horizon and tolerance knobs for one simulation run
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    /// Horizon as a multiple of the measured delay
    pub horizon_factor: f64,
    /// Fallback horizon in seconds when the record carries no usable
    /// measured delay
    pub default_horizon_s: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            // 100x the experimental delay comfortably brackets the
            // prediction even for mechanisms off by an order of magnitude
            horizon_factor: 100.0,
            default_horizon_s: 0.1,
        }
    }
}

/// Runs reactor cases against one kinetics backend
pub struct ReactorSimulator<'m, M: KineticsModel + ?Sized> {
    mech: &'m M,
    config: SimulationConfig,
}

impl<'m, M: KineticsModel + ?Sized> ReactorSimulator<'m, M> {
    #[must_use]
    pub fn new(mech: &'m M) -> Self {
        ReactorSimulator {
            mech,
            config: SimulationConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    /// Simulation horizon for a case, seconds
    #[must_use]
    pub fn horizon_s(&self, case: &ReactorCase) -> f64 {
        if case.measured_delay_s > 0.0 && case.measured_delay_s.is_finite() {
            self.config.horizon_factor * case.measured_delay_s + case.compression_time_s
        } else {
            self.config.default_horizon_s
        }
    }

    /// Integrate one case into a trajectory
    pub fn simulate(&self, case: &ReactorCase) -> Result<SimulationTrace, ValidationError> {
        let horizon = self.horizon_s(case);
        debug!(horizon, model = ?case.model, "starting reactor integration");

        let trace = match &case.model {
            ReactorModel::ConstantVolume => self.mech.integrate(&case.initial, None, horizon)?,
            ReactorModel::PressureRise { rate_per_s } => {
                let gamma = self.mech.specific_heat_ratio(&case.initial);
                let profile = PressureRiseProfile::new(*rate_per_s, gamma, horizon)?;
                self.mech
                    .integrate(&case.initial, Some(&profile as &dyn VolumeForcing), horizon)?
            }
            ReactorModel::VolumeHistory(profile) => {
                self.mech
                    .integrate(&case.initial, Some(profile as &dyn VolumeForcing), horizon)?
            }
        };

        trace.check_physical()?;
        Ok(trace)
    }
}
