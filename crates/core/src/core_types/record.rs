//! Experimental record types
//!
//! A record is the externally parsed form of one published dataset: an
//! apparatus kind plus an ordered sequence of datapoints. Shared defaults
//! (common pressure, composition, criterion) must already be resolved into
//! independent copies by the parser; the engine treats every datapoint as
//! a self-contained immutable value with no cross-references, so cloning
//! or mutating one can never affect another.

use crate::core_types::composition::Composition;
use crate::core_types::criterion::IgnitionCriterion;
use crate::core_types::units::UnitValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Apparatus that produced the measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Apparatus {
    /// Shock tube
    ShockTube,
    /// Rapid compression machine
    Rcm,
}

impl fmt::Display for Apparatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Apparatus::ShockTube => write!(f, "shock tube"),
            Apparatus::Rcm => write!(f, "RCM"),
        }
    }
}

/// Measured reactor volume as a function of time, for RCM records that
/// report the full compression stroke
///
/// Times are seconds, volumes are arbitrary consistent units; the profile
/// is normalized by its first sample before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeHistory {
    pub times_s: Vec<f64>,
    pub volumes: Vec<f64>,
}

/// Facility-specific corrections for non-ideal apparatus behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ApparatusCorrection {
    /// Fractional pressure rise per unit time behind the reflected shock
    /// (shock tube only)
    pub pressure_rise: Option<UnitValue>,
    /// Measured volume-time history (RCM only)
    pub volume_history: Option<VolumeHistory>,
    /// Compression time to subtract from detected delays (RCM only)
    pub compression_time: Option<UnitValue>,
}

impl ApparatusCorrection {
    /// Shock-tube pressure-rise correction
    #[must_use]
    pub fn with_pressure_rise(rate: UnitValue) -> Self {
        ApparatusCorrection {
            pressure_rise: Some(rate),
            ..ApparatusCorrection::default()
        }
    }

    /// True when no correction field is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pressure_rise.is_none()
            && self.volume_history.is_none()
            && self.compression_time.is_none()
    }
}

/// One experimental measurement, fully self-contained
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub temperature: UnitValue,
    pub pressure: UnitValue,
    pub composition: Composition,
    pub ignition: IgnitionCriterion,
    pub correction: Option<ApparatusCorrection>,
    pub measured_delay: UnitValue,
}

/// One curated dataset: apparatus kind plus its datapoints
///
/// Constructed once from an external source and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    pub apparatus: Apparatus,
    pub datapoints: Vec<DataPoint>,
}

impl ExperimentRecord {
    #[must_use]
    pub fn new(apparatus: Apparatus, datapoints: Vec<DataPoint>) -> Self {
        ExperimentRecord {
            apparatus,
            datapoints,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.datapoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.datapoints.is_empty()
    }
}
