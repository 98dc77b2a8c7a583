//! # Wind Loads (ASCE 7-22 Chapters 26, 27, 30)
//!
//! Velocity-pressure primitives, the wind-input aggregator, and the two
//! pressure servers built on top of them.
//!
//! ## Modules
//!
//! - [`velocity`] - K_zt, K_e, K_z, q_z, gust effect factor, zone dimension `a`
//! - [`inputs`] - Per-building quantities shared by both servers
//! - [`config`] - Server options (JSON files, explicit overrides, defaults)
//! - [`mwfrs`] - Main wind force resisting system pressures (Chapter 27)
//! - [`candc`] - Components and cladding pressures (Chapter 30)
//!
//! ## Example
//!
//! ```rust
//! use wind_core::catalog::Catalog;
//! use wind_core::units::{Feet, Mph};
//! use wind_core::wind::{Axis, BuildingType, Element, Exposure, Location};
//! use wind_core::wind::inputs::{calc_wind_server_inputs, SiteInputs};
//! use wind_core::wind::mwfrs::MainWindServer;
//!
//! let catalog = Catalog::shared().unwrap();
//! let site = SiteInputs::new(Mph(115.0), Exposure::C, BuildingType::LowRise, Feet(60.0), Feet(40.0), Feet(15.0));
//! let inputs = calc_wind_server_inputs(&site, catalog).unwrap();
//!
//! let server = MainWindServer::from_inputs(&inputs, catalog).unwrap();
//! let leeward = server.get_load(Axis::X, Element::Wall, Location::named("leeward")).unwrap();
//! assert!(leeward.p1.0 < 0.0);
//! ```

pub mod candc;
pub mod config;
pub mod inputs;
pub mod mwfrs;
pub mod velocity;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{CalcError, CalcResult};
use crate::units::Feet;

/// Sign of a value, with `sign(0) = 0`
pub(crate) fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Plan dimensions and heights must be positive and finite
pub(crate) fn require_positive(name: &str, value: Feet) -> CalcResult<()> {
    if value.0 > 0.0 && value.0.is_finite() {
        Ok(())
    } else {
        Err(CalcError::out_of_domain(name, format!("{} ft", value.0), "must be a positive length"))
    }
}

// ============================================================================
// Axis
// ============================================================================

/// Plan axis of the building; also the wind direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    #[serde(rename = "x")]
    X,
    #[serde(rename = "y")]
    Y,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::X, Axis::Y];

    pub fn code(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }

    pub fn from_code(code: &str) -> CalcResult<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            _ => Err(CalcError::configuration("axis", format!("Unsupported axis: {}", code))),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Axis {
    type Err = CalcError;
    fn from_str(s: &str) -> CalcResult<Self> {
        Axis::from_code(s)
    }
}

// ============================================================================
// Exposure Category
// ============================================================================

/// Surface roughness exposure category (Section 26.7.3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exposure {
    B,
    C,
    D,
}

impl Exposure {
    /// Catalog key (e.g., "C")
    pub fn code(&self) -> &'static str {
        match self {
            Exposure::B => "B",
            Exposure::C => "C",
            Exposure::D => "D",
        }
    }

    pub fn from_code(code: &str) -> CalcResult<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "B" => Ok(Exposure::B),
            "C" => Ok(Exposure::C),
            "D" => Ok(Exposure::D),
            _ => Err(CalcError::key_not_found("exposure categories", code)),
        }
    }
}

impl fmt::Display for Exposure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Exposure {}", self.code())
    }
}

impl FromStr for Exposure {
    type Err = CalcError;
    fn from_str(s: &str) -> CalcResult<Self> {
        Exposure::from_code(s)
    }
}

// ============================================================================
// Building Type
// ============================================================================

/// Building classification used to pick coefficient tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingType {
    #[serde(rename = "low-rise")]
    LowRise,
    #[serde(rename = "mid-rise")]
    MidRise,
    #[serde(rename = "open")]
    Open,
}

impl BuildingType {
    /// Catalog key (e.g., "low-rise")
    pub fn code(&self) -> &'static str {
        match self {
            BuildingType::LowRise => "low-rise",
            BuildingType::MidRise => "mid-rise",
            BuildingType::Open => "open",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BuildingType::LowRise => "Low-Rise Building",
            BuildingType::MidRise => "Mid-Rise Building",
            BuildingType::Open => "Open Building",
        }
    }

    pub fn from_code(code: &str) -> CalcResult<Self> {
        match code.trim() {
            "low-rise" => Ok(BuildingType::LowRise),
            "mid-rise" => Ok(BuildingType::MidRise),
            "open" => Ok(BuildingType::Open),
            _ => Err(CalcError::configuration(
                "building_type",
                format!("Unsupported building type: {}", code),
            )),
        }
    }
}

impl fmt::Display for BuildingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for BuildingType {
    type Err = CalcError;
    fn from_str(s: &str) -> CalcResult<Self> {
        BuildingType::from_code(s)
    }
}

// ============================================================================
// MWFRS Query Types
// ============================================================================

/// Building element for MWFRS pressures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    #[serde(rename = "wall")]
    Wall,
    #[serde(rename = "roof")]
    Roof,
    #[serde(rename = "parapet")]
    Parapet,
}

impl Element {
    pub fn code(&self) -> &'static str {
        match self {
            Element::Wall => "wall",
            Element::Roof => "roof",
            Element::Parapet => "parapet",
        }
    }

    pub fn from_code(code: &str) -> CalcResult<Self> {
        match code.trim() {
            "wall" => Ok(Element::Wall),
            "roof" => Ok(Element::Roof),
            "parapet" => Ok(Element::Parapet),
            _ => Err(CalcError::configuration("element", format!("Unsupported element: {}", code))),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Element {
    type Err = CalcError;
    fn from_str(s: &str) -> CalcResult<Self> {
        Element::from_code(s)
    }
}

/// Where on an element a pressure is requested.
///
/// Named locations are catalog keys (`"windward"`, `"leeward"`, `"side"`,
/// `"d<=h"`, ...). A numeric location is an elevation for walls or the
/// distance from the windward edge for roofs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    Named(String),
    At(Feet),
}

impl Location {
    pub fn named(tag: impl Into<String>) -> Self {
        Location::Named(tag.into())
    }
}

impl From<&str> for Location {
    fn from(tag: &str) -> Self {
        Location::Named(tag.to_string())
    }
}

impl From<Feet> for Location {
    fn from(distance: Feet) -> Self {
        Location::At(distance)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Named(tag) => write!(f, "{}", tag),
            Location::At(distance) => write!(f, "{} ft", distance.0),
        }
    }
}

// ============================================================================
// C&C Query Types
// ============================================================================

/// Which gust effect factor applies to constant-coefficient C&C zones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GustMethod {
    #[serde(rename = "x")]
    X,
    #[serde(rename = "y")]
    Y,
    /// Larger of G_x and G_y
    #[default]
    #[serde(rename = "max")]
    Max,
}

impl GustMethod {
    pub fn from_code(code: &str) -> CalcResult<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(GustMethod::X),
            "y" => Ok(GustMethod::Y),
            "max" => Ok(GustMethod::Max),
            _ => Err(CalcError::configuration("G_method", format!("Unsupported gust method: {}", code))),
        }
    }

    /// Gust effect factor for this method
    pub fn select(&self, g_x: f64, g_y: f64) -> f64 {
        match self {
            GustMethod::X => g_x,
            GustMethod::Y => g_y,
            GustMethod::Max => g_x.max(g_y),
        }
    }
}

impl FromStr for GustMethod {
    type Err = CalcError;
    fn from_str(s: &str) -> CalcResult<Self> {
        GustMethod::from_code(s)
    }
}

impl From<Axis> for GustMethod {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::X => GustMethod::X,
            Axis::Y => GustMethod::Y,
        }
    }
}
