//! Ignition-Delay Validation Core Library
//!
//! Validates chemical-kinetics models by comparing simulated
//! ignition-delay predictions against curated shock-tube and
//! rapid-compression-machine records. For each datapoint the engine
//! reconstructs the initial thermodynamic state, integrates a
//! zero-dimensional reactor through a black-box kinetics backend
//! (including non-ideal facility effects such as pressure-rise forcing),
//! extracts the predicted delay with the experiment's declared detection
//! criterion, and scores it against the measurement.
//!
//! ## Pipeline
//!
//! - Unit-tagged quantities and record types ([`core_types`])
//! - Apparatus physics: wall-forcing profiles and finite differences
//!   ([`physics`])
//! - Kinetics backend seam plus a bundled synthetic backend ([`solver`])
//! - State construction, simulation, ignition detection, and record
//!   validation ([`simulation`])

// Core types and utilities
pub mod core_types;

// Error taxonomy shared across the pipeline
pub mod error;

// Apparatus physics and signal processing
pub mod physics;

// Kinetics backend interface and synthetic backend
pub mod solver;

// Per-datapoint pipeline and record validation
pub mod simulation;

// Re-export core types
pub use core_types::{Apparatus, ApparatusCorrection, DataPoint, ExperimentRecord, VolumeHistory};
pub use core_types::{Basis, Composition, SpeciesFraction};
pub use core_types::{Dimension, Unit, UnitValue};
pub use core_types::{IgnitionCriterion, IgnitionRule, IgnitionTarget};
pub use error::ValidationError;

// Re-export solver seam
pub use solver::{InitialState, KineticsModel, SimulationTrace, SpeciesLookup, SyntheticSolver};

// Re-export pipeline types
pub use simulation::{
    detect_ignition, Comparison, ComparisonResult, DetectedIgnition, ErrorReduction,
    InitialStateBuilder, ReactorCase, ReactorModel, ReactorSimulator, RecordSummary,
    SimulationConfig, ValidationConfig, Validator,
};
