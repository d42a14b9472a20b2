//! Kinetics backend trait definitions
//!
//! The reacting-flow solver is a black box behind [`KineticsModel`]: given
//! an initial state, an optional wall forcing, and a time horizon it
//! returns a [`SimulationTrace`]. The engine never looks inside the
//! integration, which keeps ignition detection and error metrics testable
//! against synthetic backends.

use crate::error::ValidationError;
use crate::physics::VolumeForcing;
use crate::solver::trace::SimulationTrace;
use nalgebra::DVector;

/// Solver-ready initial thermodynamic state, SI units throughout
#[derive(Debug, Clone, PartialEq)]
pub struct InitialState {
    /// Temperature in kelvin
    pub temperature_k: f64,
    /// Pressure in pascal
    pub pressure_pa: f64,
    /// Normalized mole fractions indexed by mechanism species
    pub mole_fractions: DVector<f64>,
}

/// Read-only species metadata of a kinetic mechanism
pub trait SpeciesLookup {
    /// Species names in mechanism order
    fn species_names(&self) -> &[String];

    /// Molar mass of a species in kg/mol
    fn molar_mass(&self, index: usize) -> f64;

    /// Find a species by record identifier
    ///
    /// Tries an exact match first, then case-insensitive; record spellings
    /// and mechanism spellings frequently disagree on case.
    fn find_species(&self, name: &str) -> Option<usize> {
        let names = self.species_names();
        if let Some(i) = names.iter().position(|n| n == name) {
            return Some(i);
        }
        names.iter().position(|n| n.eq_ignore_ascii_case(name))
    }
}

/// Black-box reactor integration capability
///
/// The mechanism data behind an implementation is shared and read-only;
/// `Send + Sync` lets one instance serve concurrent datapoint runs.
pub trait KineticsModel: SpeciesLookup + Send + Sync {
    /// Integrate the reactor from `state` until `horizon_s` seconds
    ///
    /// `forcing` moves the reactor wall (volume-forced models); `None`
    /// means constant volume. The returned trace must sample finely
    /// enough that a first derivative is resolvable near the ignition
    /// event.
    fn integrate(
        &self,
        state: &InitialState,
        forcing: Option<&dyn VolumeForcing>,
        horizon_s: f64,
    ) -> Result<SimulationTrace, ValidationError>;

    /// Specific-heat ratio of the mixture at the initial state
    ///
    /// Used to construct the polytropic pressure-rise profile. The
    /// default suits diatomic-dominated mixtures; backends with real
    /// thermodynamic data should override.
    fn specific_heat_ratio(&self, state: &InitialState) -> f64 {
        let _ = state;
        1.4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TwoSpecies {
        names: Vec<String>,
    }

    impl SpeciesLookup for TwoSpecies {
        fn species_names(&self) -> &[String] {
            &self.names
        }

        fn molar_mass(&self, _index: usize) -> f64 {
            0.028
        }
    }

    #[test]
    fn test_find_species_prefers_exact_match() {
        let mech = TwoSpecies {
            names: vec!["oh".into(), "OH".into()],
        };
        assert_eq!(mech.find_species("OH"), Some(1));
        assert_eq!(mech.find_species("oh"), Some(0));
        // Case-insensitive fallback picks the first candidate
        assert_eq!(mech.find_species("Oh"), Some(0));
        assert_eq!(mech.find_species("CH4"), None);
    }
}
