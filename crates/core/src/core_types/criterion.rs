//! Ignition detection criteria
//!
//! Each datapoint declares which signal marks ignition and which feature
//! of that signal to look for. The rule set is closed: the three rules
//! cover the criteria reported by shock-tube and RCM studies, and an
//! exhaustive match keeps unsupported additions a compile-time error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Signal the detection rule is applied to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnitionTarget {
    /// Reactor pressure trace
    Pressure,
    /// Reactor temperature trace
    Temperature,
    /// Mole-fraction trace of a named species (e.g. `OH`, `OH*`, `CH`)
    Species(String),
}

impl fmt::Display for IgnitionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnitionTarget::Pressure => write!(f, "pressure"),
            IgnitionTarget::Temperature => write!(f, "temperature"),
            IgnitionTarget::Species(name) => write!(f, "{name}"),
        }
    }
}

/// Feature of the target signal that marks the ignition event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnitionRule {
    /// Time of the signal's global maximum
    MaxValue,
    /// Time of the maximum first derivative ("d/dt max")
    MaxFirstDerivative,
    /// Time of the maximum second derivative, for weak excursions where
    /// slope alone is ambiguous
    MaxSecondDerivative,
}

impl fmt::Display for IgnitionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnitionRule::MaxValue => write!(f, "max"),
            IgnitionRule::MaxFirstDerivative => write!(f, "d/dt max"),
            IgnitionRule::MaxSecondDerivative => write!(f, "d2/dt2 max"),
        }
    }
}

/// Declared ignition criterion, immutable once attached to a datapoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnitionCriterion {
    pub target: IgnitionTarget,
    pub rule: IgnitionRule,
}

impl IgnitionCriterion {
    #[must_use]
    pub fn new(target: IgnitionTarget, rule: IgnitionRule) -> Self {
        IgnitionCriterion { target, rule }
    }

    /// Pressure d/dt-max, the workhorse shock-tube criterion
    #[must_use]
    pub fn pressure_rise() -> Self {
        IgnitionCriterion::new(IgnitionTarget::Pressure, IgnitionRule::MaxFirstDerivative)
    }

    /// Peak of a species trace, e.g. `OH` or `OH*` emission proxies
    #[must_use]
    pub fn species_peak(name: impl Into<String>) -> Self {
        IgnitionCriterion::new(IgnitionTarget::Species(name.into()), IgnitionRule::MaxValue)
    }
}

impl fmt::Display for IgnitionCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.rule, self.target)
    }
}
