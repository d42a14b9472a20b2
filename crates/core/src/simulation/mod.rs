//! Per-datapoint pipeline: state construction, simulation, detection,
//! comparison, and record-level aggregation

pub mod detect;
pub mod runner;
pub mod state;
pub mod validate;

pub use detect::{detect_ignition, DetectedIgnition};
pub use runner::{ReactorSimulator, SimulationConfig};
pub use state::{InitialStateBuilder, ReactorCase, ReactorModel};
pub use validate::{
    Comparison, ComparisonResult, ErrorReduction, RecordSummary, ValidationConfig, Validator,
};
