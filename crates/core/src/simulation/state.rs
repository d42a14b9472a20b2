//! Initial-state construction and physical-model selection
//!
//! Turns one immutable [`DataPoint`] into a solver-ready case: SI initial
//! state, the physical model the apparatus calls for, and the timing
//! metadata the detector needs. Model selection happens once here, not
//! per integration step: a pressure-rise correction selects the
//! volume-forced shock-tube model, a volume history selects the RCM
//! traced-compression model, and an absent correction selects the ideal
//! constant-volume adiabatic reactor.

use crate::core_types::composition::DEFAULT_SUM_TOLERANCE;
use crate::core_types::record::{Apparatus, ApparatusCorrection, DataPoint};
use crate::core_types::units::Unit;
use crate::error::ValidationError;
use crate::physics::VolumeProfile;
use crate::solver::{InitialState, SpeciesLookup};

/// Physical reactor model chosen for one datapoint
#[derive(Debug, Clone)]
pub enum ReactorModel {
    /// Constant-volume adiabatic reactor (ideal post-shock or
    /// post-compression state)
    ConstantVolume,
    /// Shock-tube wall forced by a fractional pressure-rise rate, 1/s;
    /// the profile itself is built at simulation time because it spans
    /// the simulation horizon
    PressureRise { rate_per_s: f64 },
    /// RCM wall driven by a measured volume-time history
    VolumeHistory(VolumeProfile),
}

/// Solver-ready case for one datapoint
#[derive(Debug, Clone)]
pub struct ReactorCase {
    pub initial: InitialState,
    pub model: ReactorModel,
    /// Measured ignition delay in seconds; sets the simulation horizon
    pub measured_delay_s: f64,
    /// RCM compression time in seconds, subtracted from detected delays
    pub compression_time_s: f64,
}

/// Builds [`ReactorCase`]s against one kinetic mechanism
pub struct InitialStateBuilder<'m, M: SpeciesLookup + ?Sized> {
    mech: &'m M,
    sum_tolerance: f64,
}

impl<'m, M: SpeciesLookup + ?Sized> InitialStateBuilder<'m, M> {
    #[must_use]
    pub fn new(mech: &'m M) -> Self {
        InitialStateBuilder {
            mech,
            sum_tolerance: DEFAULT_SUM_TOLERANCE,
        }
    }

    /// Override the composition sum tolerance
    #[must_use]
    pub fn with_sum_tolerance(mut self, tolerance: f64) -> Self {
        self.sum_tolerance = tolerance;
        self
    }

    /// Construct the case for one datapoint; the datapoint is not mutated
    pub fn build(
        &self,
        apparatus: Apparatus,
        point: &DataPoint,
    ) -> Result<ReactorCase, ValidationError> {
        let temperature_k = point.temperature.convert_to(Unit::Kelvin)?.magnitude();
        let pressure_pa = point.pressure.convert_to(Unit::Pascal)?.magnitude();
        if temperature_k <= 0.0 || pressure_pa <= 0.0 {
            return Err(ValidationError::UnitConversion(format!(
                "initial state is non-physical: T = {temperature_k} K, P = {pressure_pa} Pa"
            )));
        }
        let mole_fractions = point.composition.resolve(self.mech, self.sum_tolerance)?;
        let measured_delay_s = point.measured_delay.convert_to(Unit::Second)?.magnitude();

        let correction = point.correction.as_ref().filter(|c| !c.is_empty());
        let model = select_model(apparatus, correction)?;
        let compression_time_s = match correction.and_then(|c| c.compression_time) {
            Some(ct) => ct.convert_to(Unit::Second)?.magnitude(),
            None => 0.0,
        };

        Ok(ReactorCase {
            initial: InitialState {
                temperature_k,
                pressure_pa,
                mole_fractions,
            },
            model,
            measured_delay_s,
            compression_time_s,
        })
    }
}

fn select_model(
    apparatus: Apparatus,
    correction: Option<&ApparatusCorrection>,
) -> Result<ReactorModel, ValidationError> {
    let Some(correction) = correction else {
        return Ok(ReactorModel::ConstantVolume);
    };

    match apparatus {
        Apparatus::ShockTube => {
            if correction.volume_history.is_some() || correction.compression_time.is_some() {
                return Err(ValidationError::UnsupportedApparatus(
                    "volume history / compression time are RCM corrections, \
                     not applicable to a shock tube"
                        .into(),
                ));
            }
            match correction.pressure_rise {
                Some(rate) => {
                    let rate_per_s = rate.convert_to(Unit::PerSecond)?.magnitude();
                    Ok(ReactorModel::PressureRise { rate_per_s })
                }
                None => Ok(ReactorModel::ConstantVolume),
            }
        }
        Apparatus::Rcm => {
            if correction.pressure_rise.is_some() {
                return Err(ValidationError::UnsupportedApparatus(
                    "pressure-rise rate is a shock-tube correction, not applicable to an RCM"
                        .into(),
                ));
            }
            match &correction.volume_history {
                Some(history) => Ok(ReactorModel::VolumeHistory(VolumeProfile::new(
                    &history.times_s,
                    &history.volumes,
                )?)),
                None => Ok(ReactorModel::ConstantVolume),
            }
        }
    }
}
