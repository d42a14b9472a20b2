//! Mixture composition types and normalization
//!
//! A record's mixture is a list of species fractions under a single basis
//! (mole or mass). Before simulation the list is resolved against the
//! kinetic mechanism into a dense mole-fraction vector: identifiers are
//! matched to mechanism species, mass fractions are converted using molar
//! masses, and the result is renormalized so the fractions sum to exactly
//! one. Resolution is a pure transform; the record composition is never
//! mutated.

use crate::error::ValidationError;
use crate::solver::SpeciesLookup;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Default tolerance on the fraction sum before normalization
pub const DEFAULT_SUM_TOLERANCE: f64 = 1.0e-3;

/// Basis under which fractions are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Basis {
    /// Mole (volume) fractions
    Mole,
    /// Mass fractions; conversion requires mechanism molar masses
    Mass,
}

/// One species entry of a mixture definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesFraction {
    /// Chemical formula or structure key as the record spells it
    pub species: String,
    /// Fraction in `[0, 1]` under the composition's basis
    pub amount: f64,
}

impl SpeciesFraction {
    #[must_use]
    pub fn new(species: impl Into<String>, amount: f64) -> Self {
        SpeciesFraction {
            species: species.into(),
            amount,
        }
    }
}

/// Ordered mixture definition under one basis
///
/// Invariants enforced at construction: no duplicate identifiers, every
/// fraction in `[0, 1]`, at least one entry. The sum-to-one check is
/// deferred to [`Composition::resolve`] because its tolerance is a
/// configuration knob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    basis: Basis,
    fractions: Vec<SpeciesFraction>,
}

impl Composition {
    /// Build a composition, validating per-entry invariants
    pub fn new(
        basis: Basis,
        fractions: Vec<SpeciesFraction>,
    ) -> Result<Composition, ValidationError> {
        if fractions.is_empty() {
            return Err(ValidationError::InvalidComposition(
                "mixture has no species".into(),
            ));
        }
        for (i, entry) in fractions.iter().enumerate() {
            if !(0.0..=1.0).contains(&entry.amount) || !entry.amount.is_finite() {
                return Err(ValidationError::InvalidComposition(format!(
                    "fraction {} for species '{}' is outside [0, 1]",
                    entry.amount, entry.species
                )));
            }
            if fractions[..i].iter().any(|e| e.species == entry.species) {
                return Err(ValidationError::InvalidComposition(format!(
                    "duplicate species '{}'",
                    entry.species
                )));
            }
        }
        Ok(Composition { basis, fractions })
    }

    /// Convenience constructor for mole-fraction mixtures
    pub fn mole(fractions: Vec<SpeciesFraction>) -> Result<Composition, ValidationError> {
        Composition::new(Basis::Mole, fractions)
    }

    #[must_use]
    pub fn basis(&self) -> Basis {
        self.basis
    }

    #[must_use]
    pub fn fractions(&self) -> &[SpeciesFraction] {
        &self.fractions
    }

    /// Resolve against a mechanism into a normalized mole-fraction vector
    ///
    /// Fails when the fraction sum misses 1 by more than `sum_tolerance`
    /// or when an identifier does not match any mechanism species. Mass
    /// fractions are converted with the mechanism's molar masses before
    /// normalization. Resolving an already-normalized mole composition is
    /// idempotent.
    pub fn resolve<M: SpeciesLookup + ?Sized>(
        &self,
        mech: &M,
        sum_tolerance: f64,
    ) -> Result<DVector<f64>, ValidationError> {
        let sum: f64 = self.fractions.iter().map(|e| e.amount).sum();
        if (sum - 1.0).abs() > sum_tolerance {
            return Err(ValidationError::InvalidComposition(format!(
                "fractions sum to {sum}, expected 1 within {sum_tolerance}"
            )));
        }

        let n = mech.species_names().len();
        let mut amounts = DVector::zeros(n);
        for entry in &self.fractions {
            let index = mech.find_species(&entry.species).ok_or_else(|| {
                ValidationError::InvalidComposition(format!(
                    "species '{}' not found in mechanism",
                    entry.species
                ))
            })?;
            amounts[index] = match self.basis {
                Basis::Mole => entry.amount,
                // Moles per unit mixture mass; the scale cancels on normalization
                Basis::Mass => entry.amount / mech.molar_mass(index),
            };
        }

        let total: f64 = amounts.sum();
        if total <= 0.0 {
            return Err(ValidationError::InvalidComposition(
                "all resolved fractions are zero".into(),
            ));
        }
        Ok(amounts / total)
    }
}
