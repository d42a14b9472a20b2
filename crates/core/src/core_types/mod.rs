//! Core types and utilities

pub mod composition;
pub mod criterion;
pub mod record;
pub mod units;

pub use composition::{Basis, Composition, SpeciesFraction, DEFAULT_SUM_TOLERANCE};
pub use criterion::{IgnitionCriterion, IgnitionRule, IgnitionTarget};
pub use record::{Apparatus, ApparatusCorrection, DataPoint, ExperimentRecord, VolumeHistory};
pub use units::{Dimension, Unit, UnitValue};
