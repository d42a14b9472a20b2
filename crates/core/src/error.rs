//! Error taxonomy for the validation engine
//!
//! Per-datapoint failures are contained at the validator boundary and
//! recorded on the offending [`ComparisonResult`](crate::ComparisonResult);
//! record-level failures (empty record, unresolvable mechanism) abort the
//! record. Every numeric failure message names the datapoint that
//! triggered it so a bad entry in a curated database is diagnosable.

use std::fmt;

/// Errors produced while evaluating an experimental record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Mixture fractions do not sum to one, contain duplicates, or name a
    /// species the kinetic mechanism does not know
    InvalidComposition(String),
    /// Unknown unit tag or arithmetic across incompatible dimensions
    UnitConversion(String),
    /// The underlying solver failed to converge or produced non-physical
    /// state values (negative temperature/pressure/volume, NaN)
    IntegrationDivergence(String),
    /// No ignition event found before the simulation horizon, or the
    /// target signal shows no excursion at all
    NoIgnitionDetected(String),
    /// Unrecognized apparatus kind, or a correction the apparatus does not
    /// support (e.g. a pressure-rise rate on an RCM record)
    UnsupportedApparatus(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidComposition(msg) => write!(f, "invalid composition: {msg}"),
            ValidationError::UnitConversion(msg) => write!(f, "unit conversion failed: {msg}"),
            ValidationError::IntegrationDivergence(msg) => {
                write!(f, "integration diverged: {msg}")
            }
            ValidationError::NoIgnitionDetected(msg) => write!(f, "no ignition detected: {msg}"),
            ValidationError::UnsupportedApparatus(msg) => {
                write!(f, "unsupported apparatus: {msg}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    /// Prefix the message with the datapoint that triggered the failure
    #[must_use]
    pub fn with_datapoint(self, index: usize, temperature_k: f64) -> Self {
        let tag = |msg: &str| format!("datapoint {index} (T = {temperature_k} K): {msg}");
        match self {
            ValidationError::InvalidComposition(m) => ValidationError::InvalidComposition(tag(&m)),
            ValidationError::UnitConversion(m) => ValidationError::UnitConversion(tag(&m)),
            ValidationError::IntegrationDivergence(m) => {
                ValidationError::IntegrationDivergence(tag(&m))
            }
            ValidationError::NoIgnitionDetected(m) => ValidationError::NoIgnitionDetected(tag(&m)),
            ValidationError::UnsupportedApparatus(m) => {
                ValidationError::UnsupportedApparatus(tag(&m))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_category() {
        let err = ValidationError::UnitConversion("bad tag".into());
        assert_eq!(err.to_string(), "unit conversion failed: bad tag");
    }

    #[test]
    fn test_datapoint_context_preserved() {
        let err =
            ValidationError::NoIgnitionDetected("horizon reached".into()).with_datapoint(3, 1164.48);
        assert!(err.to_string().contains("datapoint 3"));
        assert!(err.to_string().contains("1164.48"));
    }
}
