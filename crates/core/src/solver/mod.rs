//! Kinetics backend interface and bundled synthetic backend
//!
//! The real reacting-flow integrator lives outside this crate; everything
//! here is the seam it plugs into, plus an analytic stand-in used by the
//! integration suites and the headless demo.

pub mod interface;
pub mod synthetic;
pub mod trace;

pub use interface::{InitialState, KineticsModel, SpeciesLookup};
pub use synthetic::{DelayCorrelation, SyntheticSolver};
pub use trace::SimulationTrace;
