//! # Unit Types
//!
//! Type-safe wrappers for the units used by the ASCE 7 wind provisions.
//! These are simple f64 newtypes: a `Feet` cannot be passed where a `Psf`
//! is expected, and conversion into the units the code equations are
//! written in (ft, ft², psf, mph) is explicit through `From`.
//!
//! ## Base Units
//!
//! - Length: feet (ft) - also inches, meters
//! - Area: square feet (ft²) - also in², m²
//! - Pressure: pounds per square foot (psf) - also Pa
//! - Velocity: miles per hour (mph) - also m/s, km/h
//!
//! ## Parsed Quantities
//!
//! Catalog and configuration files carry values such as `"16 psf"` or
//! `"3280 ft"`. [`convert_to_unit`] reads these into a [`Quantity`]. Strings
//! that look numeric but carry an unknown unit are passed through as text
//! with a warning rather than rejected.
//!
//! ## Example
//!
//! ```rust
//! use wind_core::units::{Feet, Meters, Mph, MetersPerSecond, convert_to_unit, ParsedValue};
//!
//! let h: Feet = Meters(10.0).into();
//! assert!((h.0 - 32.8084).abs() < 1e-4);
//!
//! let v: Mph = MetersPerSecond(50.0).into();
//! assert!((v.0 - 111.8468).abs() < 1e-4);
//!
//! match convert_to_unit("16 psf") {
//!     ParsedValue::Quantity(q) => assert_eq!(q.magnitude, 16.0),
//!     ParsedValue::Text(_) => unreachable!(),
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::errors::{CalcError, CalcResult};

const FT_PER_M: f64 = 1.0 / 0.3048;
const PA_PER_PSF: f64 = 47.880_258_980_335_84;
const M_PER_S_PER_MPH: f64 = 0.447_04;
const KM_PER_MILE: f64 = 1.609_344;

// ============================================================================
// Length Units
// ============================================================================

/// Length in feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feet(pub f64);

/// Length in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

impl From<Inches> for Feet {
    fn from(inches: Inches) -> Self {
        Feet(inches.0 / 12.0)
    }
}

impl From<Meters> for Feet {
    fn from(m: Meters) -> Self {
        Feet(m.0 * FT_PER_M)
    }
}

impl From<Feet> for Meters {
    fn from(ft: Feet) -> Self {
        Meters(ft.0 / FT_PER_M)
    }
}

impl Mul for Feet {
    type Output = SqFt;
    fn mul(self, rhs: Feet) -> SqFt {
        SqFt(self.0 * rhs.0)
    }
}

impl Div for Feet {
    type Output = f64;
    fn div(self, rhs: Feet) -> f64 {
        self.0 / rhs.0
    }
}

// ============================================================================
// Area Units
// ============================================================================

/// Area in square feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqFt(pub f64);

/// Area in square inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqIn(pub f64);

/// Area in square meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqM(pub f64);

impl From<SqIn> for SqFt {
    fn from(sqin: SqIn) -> Self {
        SqFt(sqin.0 / 144.0)
    }
}

impl From<SqM> for SqFt {
    fn from(sqm: SqM) -> Self {
        SqFt(sqm.0 * FT_PER_M * FT_PER_M)
    }
}

// ============================================================================
// Pressure Units
// ============================================================================

/// Pressure in pounds per square foot (psf)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Psf(pub f64);

/// Pressure in pascals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pascals(pub f64);

impl From<Pascals> for Psf {
    fn from(pa: Pascals) -> Self {
        Psf(pa.0 / PA_PER_PSF)
    }
}

impl From<Psf> for Pascals {
    fn from(psf: Psf) -> Self {
        Pascals(psf.0 * PA_PER_PSF)
    }
}

impl Neg for Psf {
    type Output = Psf;
    fn neg(self) -> Psf {
        Psf(-self.0)
    }
}

impl Psf {
    /// Magnitude of the pressure
    pub fn abs(self) -> Psf {
        Psf(self.0.abs())
    }
}

// ============================================================================
// Velocity Units
// ============================================================================

/// Velocity in miles per hour
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mph(pub f64);

/// Velocity in meters per second
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetersPerSecond(pub f64);

/// Velocity in kilometers per hour
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KilometersPerHour(pub f64);

impl From<MetersPerSecond> for Mph {
    fn from(v: MetersPerSecond) -> Self {
        Mph(v.0 / M_PER_S_PER_MPH)
    }
}

impl From<KilometersPerHour> for Mph {
    fn from(v: KilometersPerHour) -> Self {
        Mph(v.0 / KM_PER_MILE)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }

            /// Larger of two values
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }

            /// Smaller of two values
            pub fn min(self, other: Self) -> Self {
                Self(self.0.min(other.0))
            }
        }
    };
}

impl_arithmetic!(Feet);
impl_arithmetic!(Inches);
impl_arithmetic!(Meters);
impl_arithmetic!(SqFt);
impl_arithmetic!(SqIn);
impl_arithmetic!(SqM);
impl_arithmetic!(Psf);
impl_arithmetic!(Pascals);
impl_arithmetic!(Mph);
impl_arithmetic!(MetersPerSecond);
impl_arithmetic!(KilometersPerHour);

// ============================================================================
// Parsed Quantities
// ============================================================================

/// Physical dimension of a parsed quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Dimensionless,
    Length,
    Area,
    Pressure,
    Velocity,
}

/// Unit symbols understood by the catalog and configuration readers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    Dimensionless,
    Foot,
    Inch,
    Meter,
    Millimeter,
    SquareFoot,
    SquareInch,
    SquareMeter,
    Psf,
    Psi,
    Pascal,
    Kilopascal,
    Mph,
    MetersPerSecond,
    KilometersPerHour,
}

impl Unit {
    /// Look up a unit by symbol (e.g., "ft", "psf", "m/s", "ft**2")
    pub fn from_symbol(symbol: &str) -> Option<Unit> {
        let unit = match symbol.trim() {
            "" => Unit::Dimensionless,
            "ft" | "foot" | "feet" => Unit::Foot,
            "in" | "inch" | "inches" => Unit::Inch,
            "m" | "meter" | "meters" => Unit::Meter,
            "mm" => Unit::Millimeter,
            "ft**2" | "ft^2" | "ft²" | "sqft" | "sf" => Unit::SquareFoot,
            "in**2" | "in^2" | "in²" => Unit::SquareInch,
            "m**2" | "m^2" | "m²" => Unit::SquareMeter,
            "psf" => Unit::Psf,
            "psi" => Unit::Psi,
            "Pa" => Unit::Pascal,
            "kPa" => Unit::Kilopascal,
            "mph" => Unit::Mph,
            "m/s" => Unit::MetersPerSecond,
            "km/h" | "kph" => Unit::KilometersPerHour,
            _ => return None,
        };
        Some(unit)
    }

    /// Canonical symbol for display
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Dimensionless => "",
            Unit::Foot => "ft",
            Unit::Inch => "in",
            Unit::Meter => "m",
            Unit::Millimeter => "mm",
            Unit::SquareFoot => "ft²",
            Unit::SquareInch => "in²",
            Unit::SquareMeter => "m²",
            Unit::Psf => "psf",
            Unit::Psi => "psi",
            Unit::Pascal => "Pa",
            Unit::Kilopascal => "kPa",
            Unit::Mph => "mph",
            Unit::MetersPerSecond => "m/s",
            Unit::KilometersPerHour => "km/h",
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            Unit::Dimensionless => Dimension::Dimensionless,
            Unit::Foot | Unit::Inch | Unit::Meter | Unit::Millimeter => Dimension::Length,
            Unit::SquareFoot | Unit::SquareInch | Unit::SquareMeter => Dimension::Area,
            Unit::Psf | Unit::Psi | Unit::Pascal | Unit::Kilopascal => Dimension::Pressure,
            Unit::Mph | Unit::MetersPerSecond | Unit::KilometersPerHour => Dimension::Velocity,
        }
    }

    /// Multiplier from this unit to the base unit of its dimension
    /// (ft, ft², psf, mph)
    fn to_base(&self) -> f64 {
        match self {
            Unit::Dimensionless | Unit::Foot | Unit::SquareFoot | Unit::Psf | Unit::Mph => 1.0,
            Unit::Inch => 1.0 / 12.0,
            Unit::Meter => FT_PER_M,
            Unit::Millimeter => FT_PER_M / 1000.0,
            Unit::SquareInch => 1.0 / 144.0,
            Unit::SquareMeter => FT_PER_M * FT_PER_M,
            Unit::Psi => 144.0,
            Unit::Pascal => 1.0 / PA_PER_PSF,
            Unit::Kilopascal => 1000.0 / PA_PER_PSF,
            Unit::MetersPerSecond => 1.0 / M_PER_S_PER_MPH,
            Unit::KilometersPerHour => 1.0 / KM_PER_MILE,
        }
    }
}

/// A magnitude tagged with a unit, as read from catalogs and config files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub magnitude: f64,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(magnitude: f64, unit: Unit) -> Self {
        Quantity { magnitude, unit }
    }

    /// Plain number without a unit
    pub fn scalar(magnitude: f64) -> Self {
        Quantity::new(magnitude, Unit::Dimensionless)
    }

    pub fn dimension(&self) -> Dimension {
        self.unit.dimension()
    }

    /// Magnitude expressed in the base unit of this quantity's dimension
    pub fn base_magnitude(&self) -> f64 {
        self.magnitude * self.unit.to_base()
    }

    /// Convert to another unit of the same dimension
    pub fn convert_to(&self, unit: Unit) -> CalcResult<Quantity> {
        if unit.dimension() != self.dimension() {
            return Err(CalcError::configuration(
                "unit",
                format!("cannot convert {} to {}", self, unit.symbol()),
            ));
        }
        Ok(Quantity::new(self.base_magnitude() / unit.to_base(), unit))
    }

    fn expect(&self, dimension: Dimension, field: &str) -> CalcResult<f64> {
        if self.dimension() != dimension {
            return Err(CalcError::configuration(
                field,
                format!("expected a {:?} value, got '{}'", dimension, self),
            ));
        }
        Ok(self.base_magnitude())
    }

    /// Dimensionless value, `field` names the value in error messages
    pub fn as_scalar(&self, field: &str) -> CalcResult<f64> {
        self.expect(Dimension::Dimensionless, field)
    }

    pub fn as_feet(&self, field: &str) -> CalcResult<Feet> {
        self.expect(Dimension::Length, field).map(Feet)
    }

    pub fn as_sqft(&self, field: &str) -> CalcResult<SqFt> {
        self.expect(Dimension::Area, field).map(SqFt)
    }

    pub fn as_psf(&self, field: &str) -> CalcResult<Psf> {
        self.expect(Dimension::Pressure, field).map(Psf)
    }

    pub fn as_mph(&self, field: &str) -> CalcResult<Mph> {
        self.expect(Dimension::Velocity, field).map(Mph)
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.unit {
            Unit::Dimensionless => write!(f, "{}", self.magnitude),
            unit => write!(f, "{} {}", self.magnitude, unit.symbol()),
        }
    }
}

/// Outcome of lenient quantity parsing
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    Quantity(Quantity),
    Text(String),
}

/// Read a string that is likely to hold a quantity (e.g., `"16 psf"`).
///
/// Strings whose first token is a number are parsed as a number plus an
/// optional unit. When the unit is not recognized a warning is logged and
/// the raw string is returned unmodified. Strings that do not start with a
/// number (e.g., `"single_log"`) are returned as text without a warning.
pub fn convert_to_unit(raw: &str) -> ParsedValue {
    let trimmed = raw.trim();
    let (number, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((number, rest)) => (number, rest.trim()),
        None => (trimmed, ""),
    };

    let Ok(magnitude) = number.parse::<f64>() else {
        return ParsedValue::Text(raw.to_string());
    };

    match Unit::from_symbol(rest) {
        Some(unit) => ParsedValue::Quantity(Quantity::new(magnitude, unit)),
        None => {
            tracing::warn!("'{}' was not evaluated as a unit", raw);
            ParsedValue::Text(raw.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_inches_to_feet() {
        let ft: Feet = Inches(30.0).into();
        assert_eq!(ft.0, 2.5);
    }

    #[test]
    fn test_metric_conversions() {
        let ft: Feet = Meters(0.3048).into();
        assert_relative_eq!(ft.0, 1.0, epsilon = 1e-12);

        let psf: Psf = Pascals(47.880_258_980_335_84).into();
        assert_relative_eq!(psf.0, 1.0, epsilon = 1e-12);

        let mph: Mph = KilometersPerHour(160.9344).into();
        assert_relative_eq!(mph.0, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_arithmetic() {
        let a = Feet(10.0);
        let b = Feet(5.0);
        assert_eq!((a + b).0, 15.0);
        assert_eq!((a - b).0, 5.0);
        assert_eq!((a * 2.0).0, 20.0);
        assert_eq!((a / 2.0).0, 5.0);
        assert_eq!(a / b, 2.0);
        assert_eq!((a * b).0, 50.0);
        assert_eq!(a.max(b), a);
        assert_eq!(a.min(b), b);
    }

    #[test]
    fn test_serialization() {
        let p = Psf(16.0);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "16.0");

        let roundtrip: Psf = serde_json::from_str(&json).unwrap();
        assert_eq!(p, roundtrip);
    }

    #[test]
    fn test_convert_to_unit_quantity_string() {
        assert_eq!(
            convert_to_unit("1 ft"),
            ParsedValue::Quantity(Quantity::new(1.0, Unit::Foot))
        );
    }

    #[test]
    fn test_convert_to_unit_number_string() {
        assert_eq!(convert_to_unit("1"), ParsedValue::Quantity(Quantity::scalar(1.0)));
    }

    #[test]
    fn test_convert_to_unit_alpha_string() {
        assert_eq!(convert_to_unit("ft"), ParsedValue::Text("ft".to_string()));
    }

    #[test]
    fn test_convert_to_unit_scientific_string() {
        assert_eq!(
            convert_to_unit("-9.5e-05 ft"),
            ParsedValue::Quantity(Quantity::new(-9.5e-5, Unit::Foot))
        );
    }

    #[test]
    fn test_convert_to_unit_unknown_unit_passes_through() {
        assert_eq!(convert_to_unit("1 xyz"), ParsedValue::Text("1 xyz".to_string()));
    }

    #[test]
    fn test_quantity_conversion() {
        let q = Quantity::new(1.0, Unit::Kilopascal);
        let psf = q.as_psf("p").unwrap();
        assert_relative_eq!(psf.0, 20.885_434, epsilon = 1e-6);

        let inches = Quantity::new(3.0, Unit::Foot).convert_to(Unit::Inch).unwrap();
        assert_relative_eq!(inches.magnitude, 36.0, epsilon = 1e-12);
    }

    #[test]
    fn test_quantity_wrong_dimension() {
        let q = Quantity::new(16.0, Unit::Psf);
        assert!(q.as_feet("h").is_err());
        assert!(q.convert_to(Unit::Foot).is_err());
    }
}
