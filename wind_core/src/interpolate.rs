//! # Linear Interpolation
//!
//! Scalar interpolation and structural interpolation over coefficient
//! records. ASCE 7 tabulates coefficients at breakpoints (L/B = 1, 2, 4;
//! h/L = 0.25, 0.5, 1; roof angles 10°..80°) and permits linear
//! interpolation between them.
//!
//! ```text
//! y3 = y1 + (y2 - y1) / (x2 - x1) * (x3 - x1)
//! ```
//!
//! Extrapolation (x3 outside [x1, x2]) simply extends the linear trend;
//! callers are responsible for choosing the bracketing breakpoints.

use crate::catalog::{CoefficientEntry, CoefficientLeaf, CoefficientRecord};
use crate::errors::{CalcError, CalcResult};
use crate::units::Quantity;

/// Linear interpolation between two points.
///
/// Fails with an out-of-domain error when `x1 == x2`.
///
/// # Example
///
/// ```rust
/// use wind_core::interpolate::linterp;
///
/// assert_eq!(linterp(1.0, 1.0, 3.0, 3.0, 2.0).unwrap(), 2.0);
/// assert!(linterp(1.0, 1.0, 1.0, 3.0, 2.0).is_err());
/// ```
pub fn linterp(x1: f64, y1: f64, x2: f64, y2: f64, x3: f64) -> CalcResult<f64> {
    let width = x2 - x1;
    if width == 0.0 || !width.is_finite() {
        return Err(CalcError::out_of_domain(
            "interpolation bracket",
            format!("[{}, {}]", x1, x2),
            "interpolation requires two distinct, finite bounds",
        ));
    }
    Ok(y1 + (y2 - y1) / width * (x3 - x1))
}

fn linterp_quantity(x1: f64, q1: &Quantity, x2: f64, q2: &Quantity, x3: f64, name: &str) -> CalcResult<Quantity> {
    // Bring the upper bound into the lower bound's unit
    let q2 = q2.convert_to(q1.unit).map_err(|_| {
        CalcError::configuration(
            name,
            format!("cannot interpolate between '{}' and '{}'", q1, q2),
        )
    })?;
    let magnitude = linterp(x1, q1.magnitude, x2, q2.magnitude, x3)?;
    Ok(Quantity::new(magnitude, q1.unit))
}

/// Interpolate two structurally identical coefficient records.
///
/// Every numeric leaf is linearly interpolated; every opaque leaf is copied
/// from `record_1` regardless of `x3`. Both records must have the same keys
/// and the same coefficient names under each key; any difference, or a
/// numeric leaf paired with an opaque one, is a configuration error.
///
/// # Example
///
/// ```rust
/// use wind_core::catalog::CoefficientRecord;
/// use wind_core::interpolate::linterp_records;
/// use serde_json::json;
///
/// let r1 = CoefficientRecord::from_json(&json!({"leeward": {"c1": -0.3, "kind": "x"}}), "r1").unwrap();
/// let r2 = CoefficientRecord::from_json(&json!({"leeward": {"c1": -0.2, "kind": "y"}}), "r2").unwrap();
///
/// let r3 = linterp_records(2.0, &r1, 4.0, &r2, 3.0).unwrap();
/// let leeward = r3.get("leeward").unwrap();
/// assert!((leeward.number("c1").unwrap() + 0.25).abs() < 1e-12);
/// assert_eq!(leeward.text("kind"), Some("x"));
/// ```
pub fn linterp_records(
    x1: f64,
    record_1: &CoefficientRecord,
    x2: f64,
    record_2: &CoefficientRecord,
    x3: f64,
) -> CalcResult<CoefficientRecord> {
    if !record_1.keys().eq(record_2.keys()) {
        return Err(CalcError::configuration(
            "keys",
            format!(
                "records being interpolated have different keys: [{}] and [{}]",
                record_1.keys().collect::<Vec<_>>().join(", "),
                record_2.keys().collect::<Vec<_>>().join(", ")
            ),
        ));
    }

    let mut result = CoefficientRecord::default();

    for (key, entry_1) in &record_1.entries {
        let entry_2 = record_2.get(key).ok_or_else(|| {
            CalcError::configuration(key.as_str(), "records being interpolated have different keys")
        })?;
        if !entry_1.values.keys().eq(entry_2.values.keys()) {
            return Err(CalcError::configuration(
                key.as_str(),
                "records being interpolated have different coefficient names",
            ));
        }

        let mut entry_3 = CoefficientEntry::default();
        for (name, leaf_1) in &entry_1.values {
            let leaf_3 = match leaf_1 {
                CoefficientLeaf::Numeric(q1) => {
                    let q2 = entry_2.get(name).and_then(CoefficientLeaf::as_quantity).ok_or_else(|| {
                        CalcError::configuration(
                            format!("{}.{}", key, name),
                            "numeric coefficient has no numeric counterpart in the upper record",
                        )
                    })?;
                    CoefficientLeaf::Numeric(linterp_quantity(x1, q1, x2, q2, x3, name)?)
                }
                CoefficientLeaf::Opaque(_) => leaf_1.clone(),
            };
            entry_3.values.insert(name.clone(), leaf_3);
        }
        result.entries.insert(key.clone(), entry_3);
    }

    Ok(result)
}
