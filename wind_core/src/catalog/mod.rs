//! # Coefficient Catalogs
//!
//! Read-only tables transcribed from ASCE 7-22:
//!
//! | Table | File |
//! |-------|------|
//! | Fig. 26.8-1 topographic factor parameters | `ASCE_TopoCoefficients.json` |
//! | Table 26.11-1 terrain exposure constants | `ASCE_Table_26-11-1.csv` |
//! | Fig. 27.3-1 / 27.3.4 MWFRS pressure coefficients | `ASCE_MainWindCoefficients.json` |
//! | Chapter 30 C&C pressure coefficients | `ASCE_CandCCoefficients.json` |
//!
//! A default copy of each file is embedded in the crate. [`Catalog::shared`]
//! parses it once per process and hands out a `&'static Catalog`;
//! [`Catalog::load_from_dir`] reads a replacement set from disk.
//!
//! ## Example
//!
//! ```rust
//! use wind_core::catalog::Catalog;
//!
//! let catalog = Catalog::shared().unwrap();
//! let exposure_c = catalog.exposure_constants("C").unwrap();
//! assert_eq!(exposure_c.alpha, 9.8);
//!
//! let walls = catalog.candc_record("low-rise", "walls").unwrap();
//! assert!(walls.get("4+").is_some());
//! ```

pub mod exposure;
pub mod records;

pub use exposure::{ExposureConstants, ExposureTable};
pub use records::{CoefficientEntry, CoefficientLeaf, CoefficientRecord};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::{CalcError, CalcResult};

pub const TOPOGRAPHIC_FILE: &str = "ASCE_TopoCoefficients.json";
pub const EXPOSURE_FILE: &str = "ASCE_Table_26-11-1.csv";
pub const MAIN_WIND_FILE: &str = "ASCE_MainWindCoefficients.json";
pub const CANDC_FILE: &str = "ASCE_CandCCoefficients.json";

const BUILTIN_TOPOGRAPHIC: &str = include_str!("../../data/ASCE_TopoCoefficients.json");
const BUILTIN_EXPOSURE: &str = include_str!("../../data/ASCE_Table_26-11-1.csv");
const BUILTIN_MAIN_WIND: &str = include_str!("../../data/ASCE_MainWindCoefficients.json");
const BUILTIN_CANDC: &str = include_str!("../../data/ASCE_CandCCoefficients.json");

static SHARED: Lazy<CalcResult<Catalog>> = Lazy::new(Catalog::builtin);

// ============================================================================
// Topographic Features
// ============================================================================

/// Fig. 26.8-1 parameters for one topographic feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopoFeature {
    /// K_1/(H/L_h) by exposure category
    #[serde(rename = "K_1/(H/L_h)")]
    pub k1_ratio: BTreeMap<String, f64>,
    /// Horizontal attenuation factor by location ("upwind", "downwind")
    pub mu: BTreeMap<String, f64>,
    /// Height attenuation factor
    pub gamma: f64,
}

impl TopoFeature {
    pub fn k1_ratio(&self, exposure: &str) -> CalcResult<f64> {
        self.k1_ratio
            .get(exposure)
            .copied()
            .ok_or_else(|| CalcError::key_not_found("Fig. 26.8-1 K_1/(H/L_h)", exposure))
    }

    pub fn mu(&self, location: &str) -> CalcResult<f64> {
        self.mu
            .get(location)
            .copied()
            .ok_or_else(|| CalcError::key_not_found("Fig. 26.8-1 mu", location))
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// The four ASCE coefficient tables
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    topographic: BTreeMap<String, TopoFeature>,
    exposure: ExposureTable,
    main_wind: Value,
    candc: Value,
}

impl Catalog {
    /// Parse catalog tables from their file contents
    pub fn from_sources(topographic: &str, exposure: &str, main_wind: &str, candc: &str) -> CalcResult<Self> {
        let topographic: BTreeMap<String, TopoFeature> = serde_json::from_str(topographic)
            .map_err(|e| CalcError::serialization(format!("{}: {}", TOPOGRAPHIC_FILE, e)))?;
        let exposure = ExposureTable::from_csv_str(exposure, EXPOSURE_FILE)?;
        let main_wind = parse_object(main_wind, MAIN_WIND_FILE)?;
        let candc = parse_object(candc, CANDC_FILE)?;

        Ok(Catalog {
            topographic,
            exposure,
            main_wind,
            candc,
        })
    }

    /// Catalog built from the tables embedded in the crate
    pub fn builtin() -> CalcResult<Self> {
        Self::from_sources(BUILTIN_TOPOGRAPHIC, BUILTIN_EXPOSURE, BUILTIN_MAIN_WIND, BUILTIN_CANDC)
    }

    /// Process-wide built-in catalog, parsed on first use
    pub fn shared() -> CalcResult<&'static Catalog> {
        SHARED.as_ref().map_err(Clone::clone)
    }

    /// Load all four tables from a directory
    pub fn load_from_dir(dir: impl AsRef<Path>) -> CalcResult<Self> {
        let dir = dir.as_ref();
        let read = |name: &str| -> CalcResult<String> {
            let path = dir.join(name);
            std::fs::read_to_string(&path)
                .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))
        };

        let catalog = Self::from_sources(
            &read(TOPOGRAPHIC_FILE)?,
            &read(EXPOSURE_FILE)?,
            &read(MAIN_WIND_FILE)?,
            &read(CANDC_FILE)?,
        )?;

        tracing::info!(
            "Loaded ASCE catalog from {} ({} topographic features, exposure categories {})",
            dir.display(),
            catalog.topographic.len(),
            catalog.exposure.categories().collect::<Vec<_>>().join(", ")
        );
        Ok(catalog)
    }

    // ------------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------------

    /// Fig. 26.8-1 parameters ("ridge", "escarpment", "hill")
    pub fn topo_feature(&self, feature: &str) -> CalcResult<&TopoFeature> {
        self.topographic
            .get(feature)
            .ok_or_else(|| CalcError::key_not_found("Fig. 26.8-1 topographic features", feature))
    }

    /// Table 26.11-1 row ("B", "C", "D")
    pub fn exposure_constants(&self, exposure: &str) -> CalcResult<&ExposureConstants> {
        self.exposure.get(exposure)
    }

    pub fn exposure_table(&self) -> &ExposureTable {
        &self.exposure
    }

    /// MWFRS coefficient record at `building_type` / `path...`
    /// (e.g., `["wall", "L/B=2"]`, `["roof_normal", "h/L=0.5", "15"]`)
    pub fn main_wind_record(&self, building_type: &str, path: &[&str]) -> CalcResult<CoefficientRecord> {
        let mut keys = vec![building_type];
        keys.extend_from_slice(path);
        let value = walk(&self.main_wind, MAIN_WIND_FILE, &keys)?;
        CoefficientRecord::from_json(value, &keys.join("/"))
    }

    /// C&C coefficient record for one table (e.g., `"walls"`, `"low_gable"`)
    pub fn candc_record(&self, building_type: &str, table: &str) -> CalcResult<CoefficientRecord> {
        let value = walk(&self.candc, CANDC_FILE, &[building_type, table])?;
        CoefficientRecord::from_json(value, &format!("{}/{}", building_type, table))
    }
}

fn parse_object(content: &str, source: &str) -> CalcResult<Value> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| CalcError::serialization(format!("{}: {}", source, e)))?;
    if !value.is_object() {
        return Err(CalcError::serialization(format!("{}: expected a JSON object", source)));
    }
    Ok(value)
}

fn walk<'a>(root: &'a Value, catalog: &str, keys: &[&str]) -> CalcResult<&'a Value> {
    let mut node = root;
    for (depth, key) in keys.iter().enumerate() {
        node = node
            .get(*key)
            .ok_or_else(|| CalcError::key_not_found(catalog, keys[..=depth].join("/")))?;
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::units::{Feet, Psf};

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.exposure_table().len(), 3);
        assert_eq!(catalog.exposure_table().categories().collect::<Vec<_>>(), ["B", "C", "D"]);
        assert_eq!(catalog.exposure_constants("B").unwrap().z_g, Feet(3280.0));
        assert_eq!(catalog.exposure_constants("D").unwrap().z_min, Feet(7.0));
    }

    #[test]
    fn test_shared_is_loaded_once() {
        let a = Catalog::shared().unwrap();
        let b = Catalog::shared().unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_topo_lookup() {
        let catalog = Catalog::shared().unwrap();
        let escarpment = catalog.topo_feature("escarpment").unwrap();
        assert_eq!(escarpment.k1_ratio("B").unwrap(), 0.75);
        assert_eq!(escarpment.mu("downwind").unwrap(), 4.0);
        assert_eq!(escarpment.gamma, 2.5);

        assert_eq!(catalog.topo_feature("mesa").unwrap_err().kind(), ErrorKind::Lookup);
        assert_eq!(escarpment.k1_ratio("E").unwrap_err().kind(), ErrorKind::Lookup);
        assert_eq!(escarpment.mu("sideways").unwrap_err().kind(), ErrorKind::Lookup);
    }

    #[test]
    fn test_main_wind_lookup() {
        let catalog = Catalog::shared().unwrap();
        let walls = catalog.main_wind_record("low-rise", &["wall", "L/B=2"]).unwrap();
        let leeward = walls.get("leeward").unwrap();
        assert_eq!(leeward.number("c1").unwrap(), -0.3);
        assert_eq!(leeward.pressure("p_min").unwrap(), Some(Psf(16.0)));

        let roof = catalog
            .main_wind_record("mid-rise", &["roof_normal", "h/L=0.5", "15"])
            .unwrap();
        assert!(roof.get("windward").is_some());
        assert!(roof.get("leeward").is_some());

        let err = catalog.main_wind_record("low-rise", &["wall", "L/B=3"]).unwrap_err();
        assert_eq!(err, CalcError::key_not_found(MAIN_WIND_FILE, "low-rise/wall/L/B=3"));
    }

    #[test]
    fn test_candc_lookup() {
        let catalog = Catalog::shared().unwrap();
        let flat = catalog.candc_record("low-rise", "flat").unwrap();
        assert_eq!(flat.get("1-").unwrap().text("kind"), Some("double_log"));
        assert_eq!(flat.get("1V-").unwrap().text("kind"), Some("double_log"));
        assert_eq!(flat.get("2-").unwrap().text("kind"), Some("single_log"));
        assert_eq!(flat.keys().filter(|zone| zone.ends_with('-')).count(), 5);

        let open = catalog.candc_record("open", "monoslope_clear_7.5").unwrap();
        assert_eq!(open.len(), 6);

        assert_eq!(
            catalog.candc_record("low-rise", "low_dome").unwrap_err().kind(),
            ErrorKind::Lookup
        );
    }

    #[test]
    fn test_malformed_sources() {
        assert!(Catalog::from_sources("{", BUILTIN_EXPOSURE, BUILTIN_MAIN_WIND, BUILTIN_CANDC).is_err());
        assert!(Catalog::from_sources(BUILTIN_TOPOGRAPHIC, BUILTIN_EXPOSURE, "[]", BUILTIN_CANDC).is_err());
    }

    #[test]
    fn test_load_from_missing_dir() {
        let err = Catalog::load_from_dir("/nonexistent/wind_core/catalog").unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_load_from_dir() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        let catalog = Catalog::load_from_dir(dir).unwrap();
        assert_eq!(catalog, *Catalog::shared().unwrap());
    }
}
