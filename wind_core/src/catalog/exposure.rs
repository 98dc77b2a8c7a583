//! Terrain exposure constants (ASCE 7-22 Table 26.11-1).
//!
//! Read from a CSV file with a header row. Columns are located by name so
//! their order does not matter; lengths may carry units (`"3280 ft"`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{CalcError, CalcResult};
use crate::units::{convert_to_unit, Feet, ParsedValue, Quantity};

/// One row of Table 26.11-1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposureConstants {
    /// 3-s gust power law exponent (α)
    pub alpha: f64,
    /// Nominal height of the atmospheric boundary layer (z_g)
    pub z_g: Feet,
    /// 3-s gust speed power law constants (â, b̂)
    pub a_hat: f64,
    pub b_hat: f64,
    /// Mean hourly speed power law constants (ᾱ, b̄)
    pub alpha_bar: f64,
    pub b_bar: f64,
    /// Turbulence intensity factor (c)
    pub c: f64,
    /// Integral length scale factor (ℓ)
    pub l: Feet,
    /// Integral length scale power law exponent (ε̄)
    pub epsilon_bar: f64,
    pub z_min: Feet,
}

/// Table 26.11-1 keyed by exposure category ("B", "C", "D")
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExposureTable {
    rows: BTreeMap<String, ExposureConstants>,
}

impl ExposureTable {
    /// Parse the table from CSV text. `source` names the file in errors.
    pub fn from_csv_str(content: &str, source: &str) -> CalcResult<Self> {
        let mut lines = content.lines();

        let header_line = lines
            .next()
            .ok_or_else(|| CalcError::file_error("read", source, "CSV file is empty"))?;

        let headers: Vec<&str> = header_line.split(',').map(str::trim).collect();
        let col_index = |name: &str| -> CalcResult<usize> {
            headers
                .iter()
                .position(|h| *h == name)
                .ok_or_else(|| CalcError::file_error("parse", source, format!("Missing '{}' column", name)))
        };

        let exposure_idx = col_index("Exposure")?;
        let alpha_idx = col_index("alpha")?;
        let z_g_idx = col_index("z_g")?;
        let a_hat_idx = col_index("a_hat")?;
        let b_hat_idx = col_index("b_hat")?;
        let alpha_bar_idx = col_index("alpha_bar")?;
        let b_bar_idx = col_index("b_bar")?;
        let c_idx = col_index("c")?;
        let l_idx = col_index("l")?;
        let epsilon_bar_idx = col_index("epsilon_bar")?;
        let z_min_idx = col_index("z_min")?;

        let mut table = ExposureTable::default();

        for (offset, line) in lines.enumerate() {
            let line_num = offset + 2;
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            let quantity = |idx: usize, column: &str| -> CalcResult<Quantity> {
                let raw = fields.get(idx).copied().unwrap_or("");
                match convert_to_unit(raw) {
                    ParsedValue::Quantity(q) => Ok(q),
                    ParsedValue::Text(t) => Err(CalcError::file_error(
                        "parse",
                        source,
                        format!("line {}: '{}' is not a valid {} value", line_num, t, column),
                    )),
                }
            };
            let scalar = |idx: usize, column: &str| quantity(idx, column)?.as_scalar(column);
            let length = |idx: usize, column: &str| quantity(idx, column)?.as_feet(column);

            let exposure = fields.get(exposure_idx).copied().unwrap_or("");
            if exposure.is_empty() {
                continue; // Skip rows without a category
            }

            let row = ExposureConstants {
                alpha: scalar(alpha_idx, "alpha")?,
                z_g: length(z_g_idx, "z_g")?,
                a_hat: scalar(a_hat_idx, "a_hat")?,
                b_hat: scalar(b_hat_idx, "b_hat")?,
                alpha_bar: scalar(alpha_bar_idx, "alpha_bar")?,
                b_bar: scalar(b_bar_idx, "b_bar")?,
                c: scalar(c_idx, "c")?,
                l: length(l_idx, "l")?,
                epsilon_bar: scalar(epsilon_bar_idx, "epsilon_bar")?,
                z_min: length(z_min_idx, "z_min")?,
            };
            table.rows.insert(exposure.to_string(), row);
        }

        Ok(table)
    }

    /// Constants for one exposure category
    pub fn get(&self, exposure: &str) -> CalcResult<&ExposureConstants> {
        self.rows
            .get(exposure)
            .ok_or_else(|| CalcError::key_not_found("ASCE Table 26.11-1", exposure))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
