//! Coefficient records read from the ASCE catalogs.
//!
//! A [`CoefficientRecord`] is a two-level mapping: category key (a wall
//! location, a roof zone, ...) to a [`CoefficientEntry`], which maps
//! coefficient names to [`CoefficientLeaf`] values.
//!
//! ```json
//! {
//!   "windward": { "c1": 0.8, "c2": 0.8, "p_min": "16 psf", "q_z": "q_z" },
//!   "leeward":  { "c1": -0.5, "c2": -0.5, "p_min": "16 psf" }
//! }
//! ```
//!
//! Numeric leaves (plain numbers and unit strings like `"16 psf"`) become
//! [`CoefficientLeaf::Numeric`]; everything else is kept verbatim as
//! [`CoefficientLeaf::Opaque`]. Only numeric leaves take part in
//! interpolation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::{CalcError, CalcResult};
use crate::units::{convert_to_unit, ParsedValue, Psf, Quantity};

/// A single coefficient value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CoefficientLeaf {
    /// Number, optionally unit-tagged (e.g., `0.8`, `"16 psf"`)
    Numeric(Quantity),
    /// Tag or flag copied as-is (e.g., `"single_log"`, `true`)
    Opaque(Value),
}

impl CoefficientLeaf {
    /// Build a leaf from a raw JSON value, parsing unit strings leniently
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => match n.as_f64() {
                Some(x) => CoefficientLeaf::Numeric(Quantity::scalar(x)),
                None => CoefficientLeaf::Opaque(value.clone()),
            },
            Value::String(s) => match convert_to_unit(s) {
                ParsedValue::Quantity(q) => CoefficientLeaf::Numeric(q),
                ParsedValue::Text(t) => CoefficientLeaf::Opaque(Value::String(t)),
            },
            other => CoefficientLeaf::Opaque(other.clone()),
        }
    }

    pub fn as_quantity(&self) -> Option<&Quantity> {
        match self {
            CoefficientLeaf::Numeric(q) => Some(q),
            CoefficientLeaf::Opaque(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CoefficientLeaf::Opaque(Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

/// Coefficients for one location or zone
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoefficientEntry {
    pub values: BTreeMap<String, CoefficientLeaf>,
}

impl CoefficientEntry {
    pub fn get(&self, name: &str) -> Option<&CoefficientLeaf> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Dimensionless coefficient, missing or unit-tagged values are errors
    pub fn number(&self, name: &str) -> CalcResult<f64> {
        self.quantity(name)?.as_scalar(name)
    }

    pub fn quantity(&self, name: &str) -> CalcResult<Quantity> {
        match self.values.get(name) {
            Some(CoefficientLeaf::Numeric(q)) => Ok(*q),
            Some(CoefficientLeaf::Opaque(v)) => Err(CalcError::configuration(
                name,
                format!("expected a numeric coefficient, got {}", v),
            )),
            None => Err(CalcError::missing_field(name)),
        }
    }

    /// Optional pressure value (e.g., `p_min`)
    pub fn pressure(&self, name: &str) -> CalcResult<Option<Psf>> {
        if !self.contains(name) {
            return Ok(None);
        }
        self.quantity(name)?.as_psf(name).map(Some)
    }

    /// Optional text tag (e.g., `kind`, `q_z`)
    pub fn text(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(CoefficientLeaf::as_text)
    }

    /// Boolean flag, absent means false
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(CoefficientLeaf::Opaque(Value::Bool(true))))
    }
}

/// Two-level coefficient mapping (category key to coefficient entry)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoefficientRecord {
    pub entries: BTreeMap<String, CoefficientEntry>,
}

impl CoefficientRecord {
    /// Parse a record from a JSON object of objects.
    ///
    /// `source` names the catalog table in error messages.
    pub fn from_json(value: &Value, source: &str) -> CalcResult<Self> {
        let outer = value.as_object().ok_or_else(|| {
            CalcError::serialization(format!("{}: expected an object of coefficient entries", source))
        })?;

        let mut entries = BTreeMap::new();
        for (key, inner) in outer {
            let inner = inner.as_object().ok_or_else(|| {
                CalcError::serialization(format!("{}/{}: expected an object of coefficients", source, key))
            })?;
            let values = inner
                .iter()
                .map(|(name, v)| (name.clone(), CoefficientLeaf::from_json(v)))
                .collect();
            entries.insert(key.clone(), CoefficientEntry { values });
        }
        Ok(CoefficientRecord { entries })
    }

    pub fn get(&self, key: &str) -> Option<&CoefficientEntry> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add all entries of `other`, replacing entries with the same key
    pub fn extend(&mut self, other: CoefficientRecord) {
        self.entries.extend(other.entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Unit;
    use serde_json::json;

    #[test]
    fn test_leaf_parsing() {
        assert_eq!(
            CoefficientLeaf::from_json(&json!(0.8)),
            CoefficientLeaf::Numeric(Quantity::scalar(0.8))
        );
        assert_eq!(
            CoefficientLeaf::from_json(&json!("16 psf")),
            CoefficientLeaf::Numeric(Quantity::new(16.0, Unit::Psf))
        );
        assert_eq!(
            CoefficientLeaf::from_json(&json!("single_log")),
            CoefficientLeaf::Opaque(json!("single_log"))
        );
        assert_eq!(CoefficientLeaf::from_json(&json!(true)), CoefficientLeaf::Opaque(json!(true)));
    }

    #[test]
    fn test_record_from_json() {
        let record = CoefficientRecord::from_json(
            &json!({
                "windward": { "c1": 0.8, "c2": 0.8, "p_min": "16 psf", "q_z": "q_z" },
                "leeward": { "c1": -0.5, "c2": -0.5, "p_min": "16 psf" }
            }),
            "wall",
        )
        .unwrap();

        assert_eq!(record.len(), 2);
        let windward = record.get("windward").unwrap();
        assert_eq!(windward.number("c1").unwrap(), 0.8);
        assert_eq!(windward.pressure("p_min").unwrap(), Some(Psf(16.0)));
        assert_eq!(windward.text("q_z"), Some("q_z"));
        assert_eq!(record.get("leeward").unwrap().text("q_z"), None);
    }

    #[test]
    fn test_entry_getters() {
        let record = CoefficientRecord::from_json(
            &json!({ "4P+": { "kind": "composite", "use_q_p": true, "p_min": "32 psf" } }),
            "walls",
        )
        .unwrap();
        let entry = record.get("4P+").unwrap();
        assert!(entry.flag("use_q_p"));
        assert!(!entry.flag("missing"));
        assert!(entry.number("kind").is_err());
        assert_eq!(entry.number("c1").unwrap_err(), CalcError::missing_field("c1"));
        assert_eq!(entry.pressure("nope").unwrap(), None);
    }

    #[test]
    fn test_record_rejects_non_objects() {
        assert!(CoefficientRecord::from_json(&json!([1, 2]), "bad").is_err());
        assert!(CoefficientRecord::from_json(&json!({ "a": 1 }), "bad").is_err());
    }
}
