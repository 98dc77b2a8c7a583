//! # Server Configuration
//!
//! Both pressure servers are configured from a flat set of named values,
//! [`WindOptions`]. Options can come from a JSON file, from explicit
//! arguments, or from a [`WindInputs`] record; explicit values override
//! file values through [`WindOptions::merge`]. The merged options are then
//! resolved into a [`MainWindConfig`] or [`CandCConfig`], which applies
//! defaults and reports the first missing required value.
//!
//! ## JSON Format
//!
//! Keys follow ASCE notation. Dimensional values carry their unit:
//!
//! ```json
//! {
//!   "building_type": "low-rise",
//!   "roof_type": "gable",
//!   "roof_angle": 15,
//!   "ridge_axis": "x",
//!   "L_x": "30 ft", "L_y": "30 ft", "h": "30 ft",
//!   "G_x": 0.85, "G_y": 0.85,
//!   "q_h": "39.7 psf", "q_p": null
//! }
//! ```
//!
//! ## Example
//!
//! ```rust
//! use wind_core::units::Psf;
//! use wind_core::wind::config::{CandCConfig, WindOptions};
//!
//! let file = WindOptions::from_json_str(r#"{
//!     "building_type": "low-rise", "roof_angle": 0, "a": "10 ft",
//!     "G_x": 0.85, "G_y": 0.85, "q_h": "25 psf"
//! }"#).unwrap();
//!
//! let overrides = WindOptions { q_h: Some(Psf(27.8)), ..Default::default() };
//! let config = CandCConfig::resolve(&file.merge(overrides)).unwrap();
//! assert_eq!(config.q_h, Psf(27.8));
//! assert_eq!(config.k_d, 0.85);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::errors::{CalcError, CalcResult};
use crate::units::{convert_to_unit, Feet, Mph, ParsedValue, Psf, Quantity};
use crate::wind::inputs::WindInputs;
use crate::wind::{Axis, BuildingType};

pub const DEFAULT_ROOF_ANGLE: f64 = 0.0;
pub const DEFAULT_K_D: f64 = 0.85;
pub const DEFAULT_K_ZT: f64 = 1.0;
pub const DEFAULT_K_E: f64 = 1.0;
pub const DEFAULT_GC_PI: f64 = 0.18;
pub const DEFAULT_ROOF_TYPE: &str = "flat";

// ============================================================================
// Wind Options
// ============================================================================

/// Named server inputs, every one optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindOptions {
    pub building_type: Option<BuildingType>,
    pub roof_type: Option<String>,
    pub roof_angle: Option<f64>,
    pub ridge_axis: Option<Axis>,
    #[serde(rename = "L_x")]
    pub l_x: Option<Feet>,
    #[serde(rename = "L_y")]
    pub l_y: Option<Feet>,
    pub h: Option<Feet>,
    #[serde(rename = "G_x")]
    pub g_x: Option<f64>,
    #[serde(rename = "G_y")]
    pub g_y: Option<f64>,
    #[serde(rename = "GC_pi")]
    pub gc_pi: Option<f64>,
    #[serde(rename = "K_d")]
    pub k_d: Option<f64>,
    #[serde(rename = "K_zt")]
    pub k_zt: Option<f64>,
    #[serde(rename = "K_e")]
    pub k_e: Option<f64>,
    #[serde(rename = "V")]
    pub v: Option<Mph>,
    pub z_g: Option<Feet>,
    pub alpha: Option<f64>,
    pub q_h: Option<Psf>,
    pub q_p: Option<Psf>,
    pub a: Option<Feet>,
    pub h_e: Option<Feet>,
    pub h_c: Option<Feet>,
}

macro_rules! merge_fields {
    ($base:expr, $overrides:expr, $($field:ident),+ $(,)?) => {
        WindOptions {
            $($field: $overrides.$field.or($base.$field),)+
        }
    };
}

impl WindOptions {
    /// Parse options from a JSON object.
    ///
    /// Strings holding quantities (`"30 ft"`, `"110 mph"`) are converted;
    /// `null` leaves the option unset. Keys that are not server inputs are
    /// ignored.
    pub fn from_json_str(json: &str) -> CalcResult<Self> {
        let raw: Map<String, Value> = serde_json::from_str(json)?;
        let mut options = WindOptions::default();
        for (key, value) in &raw {
            options.set(key, value)?;
        }
        Ok(options)
    }

    /// Read options from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> CalcResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Set one option from a raw JSON value
    pub fn set(&mut self, key: &str, value: &Value) -> CalcResult<()> {
        match key {
            "building_type" => self.building_type = text(key, value)?.map(|s| BuildingType::from_code(&s)).transpose()?,
            "roof_type" => self.roof_type = text(key, value)?,
            "ridge_axis" => self.ridge_axis = text(key, value)?.map(|s| Axis::from_code(&s)).transpose()?,
            "roof_angle" => self.roof_angle = scalar(key, value)?,
            "G_x" => self.g_x = scalar(key, value)?,
            "G_y" => self.g_y = scalar(key, value)?,
            "GC_pi" => self.gc_pi = scalar(key, value)?,
            "K_d" => self.k_d = scalar(key, value)?,
            "K_zt" => self.k_zt = scalar(key, value)?,
            "K_e" => self.k_e = scalar(key, value)?,
            "alpha" => self.alpha = scalar(key, value)?,
            "L_x" => self.l_x = length(key, value)?,
            "L_y" => self.l_y = length(key, value)?,
            "h" => self.h = length(key, value)?,
            "z_g" => self.z_g = length(key, value)?,
            "a" => self.a = length(key, value)?,
            "h_e" => self.h_e = length(key, value)?,
            "h_c" => self.h_c = length(key, value)?,
            "q_h" => self.q_h = quantity(key, value)?.map(|q| q.as_psf(key)).transpose()?,
            "q_p" => self.q_p = quantity(key, value)?.map(|q| q.as_psf(key)).transpose()?,
            "V" => self.v = quantity(key, value)?.map(|q| q.as_mph(key)).transpose()?,
            _ => tracing::debug!("Ignoring unknown wind option '{}'", key),
        }
        Ok(())
    }

    /// Combine with `overrides`; a value set in `overrides` wins
    pub fn merge(self, overrides: WindOptions) -> WindOptions {
        merge_fields!(
            self, overrides, building_type, roof_type, roof_angle, ridge_axis, l_x, l_y, h, g_x, g_y, gc_pi,
            k_d, k_zt, k_e, v, z_g, alpha, q_h, q_p, a, h_e, h_c,
        )
    }
}

impl From<&WindInputs> for WindOptions {
    fn from(inputs: &WindInputs) -> Self {
        WindOptions {
            building_type: Some(inputs.building_type),
            roof_type: Some(inputs.roof_type.clone()),
            roof_angle: Some(inputs.roof_angle),
            ridge_axis: inputs.ridge_axis,
            l_x: Some(inputs.l_x),
            l_y: Some(inputs.l_y),
            h: Some(inputs.h),
            g_x: Some(inputs.g_x),
            g_y: Some(inputs.g_y),
            gc_pi: Some(inputs.gc_pi),
            k_d: Some(inputs.k_d),
            k_zt: Some(inputs.k_zt),
            k_e: Some(inputs.k_e),
            v: Some(inputs.v),
            z_g: Some(inputs.z_g),
            alpha: Some(inputs.alpha),
            q_h: Some(inputs.q_h),
            q_p: inputs.q_p,
            a: Some(inputs.a),
            h_e: inputs.h_e,
            h_c: inputs.h_c,
        }
    }
}

fn quantity(key: &str, value: &Value) -> CalcResult<Option<Quantity>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_f64()
            .map(|x| Some(Quantity::scalar(x)))
            .ok_or_else(|| CalcError::configuration(key, format!("'{}' is not a finite number", n))),
        Value::String(s) => match convert_to_unit(s) {
            ParsedValue::Quantity(q) => Ok(Some(q)),
            ParsedValue::Text(t) => Err(CalcError::configuration(key, format!("'{}' is not a quantity", t))),
        },
        other => Err(CalcError::configuration(key, format!("expected a number or quantity, got {}", other))),
    }
}

fn scalar(key: &str, value: &Value) -> CalcResult<Option<f64>> {
    quantity(key, value)?.map(|q| q.as_scalar(key)).transpose()
}

fn length(key: &str, value: &Value) -> CalcResult<Option<Feet>> {
    quantity(key, value)?.map(|q| q.as_feet(key)).transpose()
}

fn text(key: &str, value: &Value) -> CalcResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(CalcError::configuration(key, format!("expected a string, got {}", other))),
    }
}

fn required<T>(value: Option<T>, field: &str) -> CalcResult<T> {
    value.ok_or_else(|| CalcError::missing_field(field))
}

// ============================================================================
// Resolved Configurations
// ============================================================================

/// Complete MWFRS server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainWindConfig {
    pub building_type: BuildingType,
    pub roof_angle: f64,
    pub ridge_axis: Option<Axis>,
    pub l_x: Feet,
    pub l_y: Feet,
    pub h: Feet,
    pub g_x: f64,
    pub g_y: f64,
    /// Stored as a magnitude
    pub gc_pi: f64,
    pub k_d: f64,
    pub k_zt: f64,
    pub k_e: f64,
    pub q_h: Psf,
    /// Needed for parapets
    pub q_p: Option<Psf>,
    /// `v`, `z_g` and `alpha` are needed to recompute q_z on windward walls
    pub v: Option<Mph>,
    pub z_g: Option<Feet>,
    pub alpha: Option<f64>,
}

impl MainWindConfig {
    /// Apply defaults and check required values.
    ///
    /// Required: `building_type`, `L_x`, `L_y`, `h`, `G_x`, `G_y`, `q_h`.
    pub fn resolve(options: &WindOptions) -> CalcResult<Self> {
        Ok(MainWindConfig {
            building_type: required(options.building_type, "building_type")?,
            roof_angle: options.roof_angle.unwrap_or(DEFAULT_ROOF_ANGLE),
            ridge_axis: options.ridge_axis,
            l_x: required(options.l_x, "L_x")?,
            l_y: required(options.l_y, "L_y")?,
            h: required(options.h, "h")?,
            g_x: required(options.g_x, "G_x")?,
            g_y: required(options.g_y, "G_y")?,
            gc_pi: options.gc_pi.unwrap_or(DEFAULT_GC_PI).abs(),
            k_d: options.k_d.unwrap_or(DEFAULT_K_D),
            k_zt: options.k_zt.unwrap_or(DEFAULT_K_ZT),
            k_e: options.k_e.unwrap_or(DEFAULT_K_E),
            q_h: required(options.q_h, "q_h")?,
            q_p: options.q_p,
            v: options.v,
            z_g: options.z_g,
            alpha: options.alpha,
        })
    }

    /// Gust effect factor for wind along `axis`
    pub fn gust_factor(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.g_x,
            Axis::Y => self.g_y,
        }
    }
}

/// Complete C&C server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandCConfig {
    pub building_type: BuildingType,
    /// Required unless the roof falls in the flat band
    pub roof_type: Option<String>,
    pub roof_angle: f64,
    /// Zone dimension
    pub a: Feet,
    pub g_x: f64,
    pub g_y: f64,
    /// Stored as a magnitude
    pub gc_pi: f64,
    pub k_d: f64,
    pub q_h: Psf,
    /// Needed by zones that use parapet-height velocity pressure
    pub q_p: Option<Psf>,
    pub h_c: Option<Feet>,
    pub h_e: Option<Feet>,
}

impl CandCConfig {
    /// Apply defaults and check required values.
    ///
    /// Required: `building_type`, `a`, `G_x`, `G_y`, `q_h`.
    pub fn resolve(options: &WindOptions) -> CalcResult<Self> {
        Ok(CandCConfig {
            building_type: required(options.building_type, "building_type")?,
            roof_type: options.roof_type.clone(),
            roof_angle: options.roof_angle.unwrap_or(DEFAULT_ROOF_ANGLE),
            a: required(options.a, "a")?,
            g_x: required(options.g_x, "G_x")?,
            g_y: required(options.g_y, "G_y")?,
            gc_pi: options.gc_pi.unwrap_or(DEFAULT_GC_PI).abs(),
            k_d: options.k_d.unwrap_or(DEFAULT_K_D),
            q_h: required(options.q_h, "q_h")?,
            q_p: options.q_p,
            h_c: options.h_c,
            h_e: options.h_e,
        })
    }

    /// Roof type, or a missing-field error naming it
    pub fn require_roof_type(&self) -> CalcResult<&str> {
        self.roof_type.as_deref().ok_or_else(|| CalcError::missing_field("roof_type"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    const FILE: &str = r#"{
        "building_type": "low-rise",
        "roof_type": "gable",
        "roof_angle": 15,
        "ridge_axis": "x",
        "L_x": "30 ft",
        "L_y": "30 ft",
        "h": "30 ft",
        "G_x": 0.85,
        "G_y": 0.85,
        "GC_pi": -0.18,
        "K_d": 0.85,
        "V": "150 mph",
        "z_g": "3280 ft",
        "alpha": 7.5,
        "q_h": "39.69832372 psf",
        "q_p": null,
        "comment": "test building"
    }"#;

    #[test]
    fn test_from_json_str() {
        let options = WindOptions::from_json_str(FILE).unwrap();
        assert_eq!(options.building_type, Some(BuildingType::LowRise));
        assert_eq!(options.ridge_axis, Some(Axis::X));
        assert_eq!(options.roof_angle, Some(15.0));
        assert_eq!(options.l_x, Some(Feet(30.0)));
        assert_eq!(options.l_y, Some(Feet(30.0)));
        assert_eq!(options.v, Some(Mph(150.0)));
        assert_eq!(options.q_p, None);
        assert_eq!(options.a, None);
    }

    #[test]
    fn test_wrong_dimension_names_key() {
        let err = WindOptions::from_json_str(r#"{"h": "30 psf"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("'h'"));

        // Lengths must carry a unit
        assert!(WindOptions::from_json_str(r#"{"L_x": 30}"#).is_err());
        assert!(WindOptions::from_json_str(r#"{"q_h": "fast"}"#).is_err());
    }

    #[test]
    fn test_unsupported_building_type() {
        let err = WindOptions::from_json_str(r#"{"building_type": "tower"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let file = WindOptions::from_json_str(FILE).unwrap();
        let overrides = WindOptions {
            roof_angle: Some(20.0),
            q_p: Some(Psf(40.72)),
            ..Default::default()
        };
        let merged = file.merge(overrides);
        assert_eq!(merged.roof_angle, Some(20.0));
        assert_eq!(merged.q_p, Some(Psf(40.72)));
        assert_eq!(merged.ridge_axis, Some(Axis::X));
    }

    #[test]
    fn test_main_wind_resolve() {
        let options = WindOptions::from_json_str(FILE).unwrap();
        let config = MainWindConfig::resolve(&options).unwrap();
        assert_eq!(config.gc_pi, 0.18);
        assert_eq!(config.k_zt, 1.0);
        assert_eq!(config.k_e, 1.0);
        assert_eq!(config.gust_factor(Axis::Y), 0.85);
    }

    #[test]
    fn test_main_wind_missing_field() {
        let mut options = WindOptions::from_json_str(FILE).unwrap();
        options.q_h = None;
        assert_eq!(MainWindConfig::resolve(&options).unwrap_err(), CalcError::missing_field("q_h"));
    }

    #[test]
    fn test_candc_resolve() {
        let options = WindOptions::from_json_str(r#"{
            "building_type": "open", "roof_angle": 22.5, "a": "10 ft",
            "G_x": 0.85, "G_y": 0.8, "q_h": "27.8 psf"
        }"#)
        .unwrap();
        let config = CandCConfig::resolve(&options).unwrap();
        assert_eq!(config.gc_pi, 0.18);
        assert_eq!(config.k_d, 0.85);
        assert_eq!(config.require_roof_type().unwrap_err(), CalcError::missing_field("roof_type"));

        let mut options = options;
        options.a = None;
        assert_eq!(CandCConfig::resolve(&options).unwrap_err(), CalcError::missing_field("a"));
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = WindOptions::from_json_file("/nonexistent/wind.json").unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }
}
