//! Unit-tagged physical quantities for experimental record handling
//!
//! Experimental records report quantities in whatever units the original
//! publication used (kPa, Torr, µs, 1/ms, ...). This module provides a
//! [`UnitValue`] wrapper carrying the numeric magnitude together with its
//! unit tag, so conversion to the solver's SI system is explicit and
//! mixing incompatible dimensions is an error instead of a silent bug.
//!
//! # Design Philosophy
//! - All magnitudes are f64; ignition delays span µs to s and relative
//!   errors are computed from their ratios
//! - `Unit` is a closed enum grouped by [`Dimension`]; conversion between
//!   units of the same dimension is exact and round-trip stable
//! - Temperature conversions are affine (offset + scale), everything else
//!   is a pure scale factor to SI
//! - Arithmetic across dimensions fails with `ValidationError::UnitConversion`
//!   rather than panicking
//! - Serde support so externally parsed records deserialize directly

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Div, Mul};

/// Physical dimension of a unit tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    /// Time (SI: second)
    Time,
    /// Pressure (SI: pascal)
    Pressure,
    /// Absolute temperature (SI: kelvin)
    Temperature,
    /// Inverse time, used for pressure-rise rates (SI: 1/second)
    InverseTime,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Time => write!(f, "time"),
            Dimension::Pressure => write!(f, "pressure"),
            Dimension::Temperature => write!(f, "temperature"),
            Dimension::InverseTime => write!(f, "inverse time"),
        }
    }
}

/// Closed set of units accepted from experimental records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    // Time
    Second,
    Millisecond,
    Microsecond,
    Nanosecond,
    Minute,
    // Pressure
    Pascal,
    Kilopascal,
    Megapascal,
    Bar,
    Atmosphere,
    Torr,
    // Temperature
    Kelvin,
    Celsius,
    // Inverse time (pressure-rise rates)
    PerSecond,
    PerMillisecond,
    PerMicrosecond,
}

impl Unit {
    /// Dimension this unit measures
    #[must_use]
    pub fn dimension(self) -> Dimension {
        match self {
            Unit::Second
            | Unit::Millisecond
            | Unit::Microsecond
            | Unit::Nanosecond
            | Unit::Minute => Dimension::Time,
            Unit::Pascal
            | Unit::Kilopascal
            | Unit::Megapascal
            | Unit::Bar
            | Unit::Atmosphere
            | Unit::Torr => Dimension::Pressure,
            Unit::Kelvin | Unit::Celsius => Dimension::Temperature,
            Unit::PerSecond | Unit::PerMillisecond | Unit::PerMicrosecond => Dimension::InverseTime,
        }
    }

    /// SI unit of this unit's dimension
    #[must_use]
    pub fn si_unit(self) -> Unit {
        match self.dimension() {
            Dimension::Time => Unit::Second,
            Dimension::Pressure => Unit::Pascal,
            Dimension::Temperature => Unit::Kelvin,
            Dimension::InverseTime => Unit::PerSecond,
        }
    }

    /// Scale factor and offset mapping a magnitude in this unit to SI:
    /// `si = magnitude * scale + offset`
    fn to_si_affine(self) -> (f64, f64) {
        match self {
            Unit::Second | Unit::Pascal | Unit::Kelvin | Unit::PerSecond => (1.0, 0.0),
            Unit::Millisecond => (1.0e-3, 0.0),
            Unit::Microsecond => (1.0e-6, 0.0),
            Unit::Nanosecond => (1.0e-9, 0.0),
            Unit::Minute => (60.0, 0.0),
            Unit::Kilopascal => (1.0e3, 0.0),
            Unit::Megapascal => (1.0e6, 0.0),
            Unit::Bar => (1.0e5, 0.0),
            Unit::Atmosphere => (101_325.0, 0.0),
            Unit::Torr => (101_325.0 / 760.0, 0.0),
            Unit::Celsius => (1.0, 273.15),
            Unit::PerMillisecond => (1.0e3, 0.0),
            Unit::PerMicrosecond => (1.0e6, 0.0),
        }
    }

    /// Parse a record unit tag (e.g. `"kPa"`, `"us"`, `"1/ms"`)
    ///
    /// Accepts the spellings found in curated ignition-delay databases,
    /// including `µs`/`μs` for microseconds.
    pub fn parse(tag: &str) -> Result<Unit, ValidationError> {
        let unit = match tag.trim() {
            "s" | "sec" | "second" | "seconds" => Unit::Second,
            "ms" | "millisecond" | "milliseconds" => Unit::Millisecond,
            "us" | "\u{b5}s" | "\u{3bc}s" | "microsecond" | "microseconds" => Unit::Microsecond,
            "ns" | "nanosecond" | "nanoseconds" => Unit::Nanosecond,
            "min" | "minute" | "minutes" => Unit::Minute,
            "Pa" | "pascal" => Unit::Pascal,
            "kPa" | "kilopascal" => Unit::Kilopascal,
            "MPa" | "megapascal" => Unit::Megapascal,
            "bar" => Unit::Bar,
            "atm" | "atmosphere" => Unit::Atmosphere,
            "torr" | "Torr" | "mmHg" => Unit::Torr,
            "K" | "kelvin" => Unit::Kelvin,
            "C" | "degC" | "celsius" => Unit::Celsius,
            "1/s" | "/s" => Unit::PerSecond,
            "1/ms" | "/ms" => Unit::PerMillisecond,
            "1/us" | "/us" => Unit::PerMicrosecond,
            other => {
                return Err(ValidationError::UnitConversion(format!(
                    "unrecognized unit tag '{other}'"
                )))
            }
        };
        Ok(unit)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Unit::Second => "s",
            Unit::Millisecond => "ms",
            Unit::Microsecond => "us",
            Unit::Nanosecond => "ns",
            Unit::Minute => "min",
            Unit::Pascal => "Pa",
            Unit::Kilopascal => "kPa",
            Unit::Megapascal => "MPa",
            Unit::Bar => "bar",
            Unit::Atmosphere => "atm",
            Unit::Torr => "torr",
            Unit::Kelvin => "K",
            Unit::Celsius => "C",
            Unit::PerSecond => "1/s",
            Unit::PerMillisecond => "1/ms",
            Unit::PerMicrosecond => "1/us",
        };
        write!(f, "{tag}")
    }
}

/// A numeric magnitude tagged with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitValue {
    magnitude: f64,
    unit: Unit,
}

impl UnitValue {
    /// Create a new tagged quantity
    #[must_use]
    pub const fn new(magnitude: f64, unit: Unit) -> Self {
        UnitValue { magnitude, unit }
    }

    /// Raw magnitude in the carried unit
    #[must_use]
    pub fn magnitude(self) -> f64 {
        self.magnitude
    }

    /// Unit tag
    #[must_use]
    pub fn unit(self) -> Unit {
        self.unit
    }

    /// Dimension of the carried unit
    #[must_use]
    pub fn dimension(self) -> Dimension {
        self.unit.dimension()
    }

    /// Magnitude expressed in the SI unit of this quantity's dimension
    #[must_use]
    pub fn to_si(self) -> f64 {
        let (scale, offset) = self.unit.to_si_affine();
        self.magnitude * scale + offset
    }

    /// Convert to another unit of the same dimension
    ///
    /// Fails with `ValidationError::UnitConversion` when the dimensions
    /// differ. Converting back to the original unit reproduces the
    /// original magnitude within floating tolerance.
    pub fn convert_to(self, target: Unit) -> Result<UnitValue, ValidationError> {
        if self.unit.dimension() != target.dimension() {
            return Err(ValidationError::UnitConversion(format!(
                "cannot convert {} ({}) to {} ({})",
                self.unit,
                self.unit.dimension(),
                target,
                target.dimension()
            )));
        }
        let (scale, offset) = target.to_si_affine();
        Ok(UnitValue::new((self.to_si() - offset) / scale, target))
    }

    /// Checked addition; the result carries `self`'s unit
    pub fn try_add(self, rhs: UnitValue) -> Result<UnitValue, ValidationError> {
        let rhs = rhs.convert_to(self.unit)?;
        Ok(UnitValue::new(self.magnitude + rhs.magnitude, self.unit))
    }

    /// Checked subtraction; the result carries `self`'s unit
    pub fn try_sub(self, rhs: UnitValue) -> Result<UnitValue, ValidationError> {
        let rhs = rhs.convert_to(self.unit)?;
        Ok(UnitValue::new(self.magnitude - rhs.magnitude, self.unit))
    }

    /// Dimensionless ratio of two quantities of the same dimension
    pub fn ratio(self, rhs: UnitValue) -> Result<f64, ValidationError> {
        let rhs = rhs.convert_to(self.unit)?;
        Ok(self.magnitude / rhs.magnitude)
    }
}

impl Mul<f64> for UnitValue {
    type Output = UnitValue;
    fn mul(self, rhs: f64) -> UnitValue {
        UnitValue::new(self.magnitude * rhs, self.unit)
    }
}

impl Div<f64> for UnitValue {
    type Output = UnitValue;
    fn div(self, rhs: f64) -> UnitValue {
        UnitValue::new(self.magnitude / rhs, self.unit)
    }
}

impl fmt::Display for UnitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pressure_to_si() {
        let p = UnitValue::new(220.0, Unit::Kilopascal);
        assert_relative_eq!(p.to_si(), 220_000.0);

        let atm = UnitValue::new(1.0, Unit::Atmosphere);
        assert_relative_eq!(atm.to_si(), 101_325.0);
    }

    #[test]
    fn test_time_round_trip() {
        let delay = UnitValue::new(471.54, Unit::Microsecond);
        let in_ms = delay.convert_to(Unit::Millisecond).unwrap();
        assert_relative_eq!(in_ms.magnitude(), 0.47154, epsilon = 1e-12);

        let back = in_ms.convert_to(Unit::Microsecond).unwrap();
        assert_relative_eq!(back.magnitude(), 471.54, epsilon = 1e-9);
    }

    #[test]
    fn test_celsius_affine() {
        let t = UnitValue::new(25.0, Unit::Celsius);
        assert_relative_eq!(t.to_si(), 298.15);

        let k = t.convert_to(Unit::Kelvin).unwrap();
        let back = k.convert_to(Unit::Celsius).unwrap();
        assert_relative_eq!(back.magnitude(), 25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let p = UnitValue::new(1.0, Unit::Bar);
        let err = p.convert_to(Unit::Second).unwrap_err();
        assert!(matches!(err, ValidationError::UnitConversion(_)));

        let t = UnitValue::new(300.0, Unit::Kelvin);
        assert!(p.try_add(t).is_err());
    }

    #[test]
    fn test_pressure_rise_rate_units() {
        let rise = UnitValue::new(0.10, Unit::PerMillisecond);
        assert_relative_eq!(rise.to_si(), 100.0);

        let per_s = rise.convert_to(Unit::PerSecond).unwrap();
        assert_relative_eq!(per_s.magnitude(), 100.0);
    }

    #[test]
    fn test_parse_record_tags() {
        assert_eq!(Unit::parse("kPa").unwrap(), Unit::Kilopascal);
        assert_eq!(Unit::parse("us").unwrap(), Unit::Microsecond);
        assert_eq!(Unit::parse("\u{b5}s").unwrap(), Unit::Microsecond);
        assert_eq!(Unit::parse("1/ms").unwrap(), Unit::PerMillisecond);
        assert!(Unit::parse("furlong").is_err());
    }

    #[test]
    fn test_ratio_and_arithmetic() {
        let a = UnitValue::new(2.0, Unit::Millisecond);
        let b = UnitValue::new(500.0, Unit::Microsecond);
        assert_relative_eq!(a.ratio(b).unwrap(), 4.0);

        let sum = a.try_add(b).unwrap();
        assert_eq!(sum.unit(), Unit::Millisecond);
        assert_relative_eq!(sum.magnitude(), 2.5);

        let scaled = a * 100.0;
        assert_relative_eq!(scaled.magnitude(), 200.0);
    }
}
