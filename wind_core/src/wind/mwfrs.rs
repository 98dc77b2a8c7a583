//! # MWFRS Pressures (ASCE 7-22 Chapter 27, Directional Procedure)
//!
//! [`MainWindServer`] resolves the external pressure coefficients for both
//! wind directions once, at construction, and then answers pressure queries
//! for walls, roofs, and parapets.
//!
//! ## Coefficient Resolution
//!
//! For wind along x, `L = L_x` and `B = L_y` (reversed for y).
//!
//! - **Walls** (Fig. 27.3-1): interpolated on `L/B` over the tabulated
//!   values 1, 2, 4 and held constant outside them.
//! - **Roofs**, wind parallel to the ridge or `θ < 10°`: interpolated on
//!   `h/L` over 0.5 and 1.
//! - **Roofs**, wind normal to the ridge: interpolated on `θ` between the
//!   bracketing tabulated angles (10° to 80°), then on `h/L` over 0.25,
//!   0.5, and 1.
//! - **Parapets** (Section 27.3.4): tabulated `GC_pn`, used as-is.
//!
//! ## Pressures
//!
//! ```text
//! walls, roofs:  p = q K_d G C_p + q_h K_d GC_pi sign(C_p)
//! parapets:      p = q_p K_d GC_pn
//! ```
//!
//! Each tabulated pair `(c1, c2)` gives two pressures, each with its
//! magnitude raised to `p_min` if smaller.
//!
//! ## Example
//!
//! ```rust
//! use wind_core::catalog::Catalog;
//! use wind_core::units::{Feet, Psf};
//! use wind_core::wind::{Axis, BuildingType, Element, Location};
//! use wind_core::wind::config::{MainWindConfig, WindOptions};
//! use wind_core::wind::mwfrs::MainWindServer;
//!
//! let options = WindOptions {
//!     building_type: Some(BuildingType::LowRise),
//!     l_x: Some(Feet(30.0)),
//!     l_y: Some(Feet(30.0)),
//!     h: Some(Feet(30.0)),
//!     g_x: Some(0.85),
//!     g_y: Some(0.85),
//!     q_h: Some(Psf(39.7)),
//!     ..Default::default()
//! };
//! let config = MainWindConfig::resolve(&options).unwrap();
//! let server = MainWindServer::new(config, Catalog::shared().unwrap()).unwrap();
//!
//! let roof = server.get_load(Axis::X, Element::Roof, Location::At(Feet(25.0))).unwrap();
//! assert!(roof.p1.0 < roof.p2.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CoefficientEntry, CoefficientRecord};
use crate::equations::{Derivation, DerivationStep, Equation, Term, Traced};
use crate::errors::{CalcError, CalcResult};
use crate::interpolate::linterp_records;
use crate::units::{Feet, Psf};
use crate::wind::config::{MainWindConfig, WindOptions};
use crate::wind::inputs::WindInputs;
use crate::wind::velocity::{exposure_coefficient, velocity_pressure};
use crate::wind::{require_positive, sign, Axis, BuildingType, Element, Location};

/// Tabulated roof angles for wind normal to the ridge (degrees)
const ROOF_NORMAL_ANGLES: [f64; 9] = [10.0, 15.0, 20.0, 25.0, 30.0, 35.0, 45.0, 60.0, 80.0];

/// Below this angle the roof is treated as flat
const FLAT_ROOF_LIMIT: f64 = 10.0;

/// Pressures from the two tabulated coefficients of a location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressurePair {
    /// From coefficient `c1`
    pub p1: Psf,
    /// From coefficient `c2`
    pub p2: Psf,
}

/// Resolved coefficients for one wind direction
#[derive(Debug, Clone, PartialEq)]
struct AxisCoefficients {
    wall: CoefficientRecord,
    roof: CoefficientRecord,
    parapet: CoefficientRecord,
}

impl AxisCoefficients {
    fn get(&self, element: Element) -> &CoefficientRecord {
        match element {
            Element::Wall => &self.wall,
            Element::Roof => &self.roof,
            Element::Parapet => &self.parapet,
        }
    }
}

/// MWFRS wind pressure server
#[derive(Debug, Clone, PartialEq)]
pub struct MainWindServer {
    config: MainWindConfig,
    x: AxisCoefficients,
    y: AxisCoefficients,
    derivation: Derivation,
}

impl MainWindServer {
    /// Resolve the coefficient tables for both axes.
    ///
    /// Open buildings are not supported. A roof at 10° or steeper needs a
    /// ridge axis for the direction normal to the ridge.
    pub fn new(config: MainWindConfig, catalog: &Catalog) -> CalcResult<Self> {
        match config.building_type {
            BuildingType::LowRise | BuildingType::MidRise => {}
            BuildingType::Open => {
                return Err(CalcError::not_supported("MWFRS pressures for open buildings"));
            }
        }
        require_positive("L_x", config.l_x)?;
        require_positive("L_y", config.l_y)?;
        require_positive("h", config.h)?;

        let mut derivation = Derivation::new();
        let x = resolve_axis(&config, catalog, Axis::X, &mut derivation)?;
        let y = resolve_axis(&config, catalog, Axis::Y, &mut derivation)?;

        Ok(MainWindServer {
            config,
            x,
            y,
            derivation,
        })
    }

    pub fn from_options(options: &WindOptions, catalog: &Catalog) -> CalcResult<Self> {
        Self::new(MainWindConfig::resolve(options)?, catalog)
    }

    pub fn from_inputs(inputs: &WindInputs, catalog: &Catalog) -> CalcResult<Self> {
        Self::from_options(&WindOptions::from(inputs), catalog)
    }

    pub fn config(&self) -> &MainWindConfig {
        &self.config
    }

    /// Resolved coefficients for one axis and element
    pub fn coefficients(&self, axis: Axis, element: Element) -> &CoefficientRecord {
        match axis {
            Axis::X => self.x.get(element),
            Axis::Y => self.y.get(element),
        }
    }

    /// Interpolations performed while resolving the coefficients
    pub fn derivation(&self) -> &Derivation {
        &self.derivation
    }

    /// Wind pressures for an axis, element, and location.
    ///
    /// Numeric locations are an elevation on walls (always the windward
    /// wall) or the distance from the windward edge on roofs. Parapet
    /// locations must be named.
    pub fn get_load(&self, axis: Axis, element: Element, location: impl Into<Location>) -> CalcResult<PressurePair> {
        self.get_load_traced(axis, element, location).map(|(pressures, _)| pressures)
    }

    /// Same as [`get_load`](Self::get_load), with the steps that produced the pressures
    pub fn get_load_traced(
        &self,
        axis: Axis,
        element: Element,
        location: impl Into<Location>,
    ) -> CalcResult<(PressurePair, Derivation)> {
        let location = location.into();
        let (key, elevation) = self.resolve_location(element, &location)?;

        let entry = self.coefficients(axis, element).get(&key).ok_or_else(|| {
            CalcError::key_not_found(format!("{}-axis {} coefficients", axis, element), key.as_str())
        })?;

        let mut derivation = Derivation::new();
        let q = self.velocity_pressure(entry, elevation, &mut derivation)?;
        let p_min = entry.pressure("p_min")?.unwrap_or_default().abs();
        let subscript = format!("{} {} {}", axis, element, key);

        let p1 = self.pressure(axis, element, entry, "c1", q, p_min, &subscript, &mut derivation)?;
        let p2 = self.pressure(axis, element, entry, "c2", q, p_min, &subscript, &mut derivation)?;

        Ok((PressurePair { p1, p2 }, derivation))
    }

    fn resolve_location(&self, element: Element, location: &Location) -> CalcResult<(String, Option<Feet>)> {
        match (location, element) {
            (Location::Named(tag), _) => Ok((tag.clone(), None)),
            (Location::At(d), Element::Roof) => Ok((roof_zone(*d, self.config.h).to_string(), None)),
            (Location::At(z), Element::Wall) => Ok(("windward".to_string(), Some(*z))),
            (Location::At(_), Element::Parapet) => Err(CalcError::configuration(
                "location",
                "parapet locations must be named (\"windward\" or \"leeward\")",
            )),
        }
    }

    /// Velocity pressure selected by the entry's `q_z` tag (default `q_h`)
    fn velocity_pressure(
        &self,
        entry: &CoefficientEntry,
        elevation: Option<Feet>,
        derivation: &mut Derivation,
    ) -> CalcResult<Psf> {
        match entry.text("q_z").unwrap_or("q_h") {
            "q_h" => Ok(self.config.q_h),
            "q_p" => self.config.q_p.ok_or_else(|| CalcError::missing_field("q_p")),
            "q_z" => {
                let z = elevation.ok_or_else(|| CalcError::missing_field("elevation"))?;
                let v = self.config.v.ok_or_else(|| CalcError::missing_field("V"))?;
                let z_g = self.config.z_g.ok_or_else(|| CalcError::missing_field("z_g"))?;
                let alpha = self.config.alpha.ok_or_else(|| CalcError::missing_field("alpha"))?;

                let k_z = exposure_coefficient(z, z_g, alpha)?;
                derivation.push(k_z.step().with_subscript("z"));
                let q_z = velocity_pressure(k_z.k_z, self.config.k_zt, self.config.k_e, v);
                derivation.push(q_z.step().with_subscript("z"));
                Ok(q_z.q_z)
            }
            other => Err(CalcError::configuration(
                "q_z",
                format!("Unsupported velocity pressure selector: {}", other),
            )),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn pressure(
        &self,
        axis: Axis,
        element: Element,
        entry: &CoefficientEntry,
        coefficient: &str,
        q: Psf,
        p_min: Psf,
        subscript: &str,
        derivation: &mut Derivation,
    ) -> CalcResult<Psf> {
        let c_p = entry.number(coefficient)?;
        let k_d = self.config.k_d;

        let (p, mut step) = match element {
            Element::Parapet => {
                let p = q * (k_d * c_p);
                let step = DerivationStep::new(
                    Equation::MwfrsParapetPressure,
                    Some(subscript),
                    vec![
                        Term::new("q_p", q.0, "psf"),
                        Term::new("K_d", k_d, ""),
                        Term::new("GC_pn", c_p, ""),
                    ],
                    Term::new("p_p", 0.0, "psf"),
                );
                (p, step)
            }
            Element::Wall | Element::Roof => {
                let g = self.config.gust_factor(axis);
                let gc_pi = self.config.gc_pi;
                let p = q * (k_d * g * c_p) + self.config.q_h * (k_d * gc_pi * sign(c_p));
                let step = DerivationStep::new(
                    Equation::MwfrsPressure,
                    Some(subscript),
                    vec![
                        Term::new("q", q.0, "psf"),
                        Term::new("K_d", k_d, ""),
                        Term::new("G", g, ""),
                        Term::new("C_p", c_p, ""),
                        Term::new("q_h", self.config.q_h.0, "psf"),
                        Term::new("GC_pi", gc_pi, ""),
                    ],
                    Term::new("p", 0.0, "psf"),
                );
                (p, step)
            }
        };

        let floored = floor_magnitude(p, p_min);
        step.terms.push(Term::new("p_min", p_min.0, "psf"));
        step.result.value = floored.0;
        derivation.push(step);
        Ok(floored)
    }
}

/// Raise the magnitude of `p` to at least `p_min`, keeping its sign
pub(crate) fn floor_magnitude(p: Psf, p_min: Psf) -> Psf {
    Psf(p.0.abs().max(p_min.0.abs()) * sign(p.0))
}

/// Roof zone for a distance from the windward edge
fn roof_zone(d: Feet, h: Feet) -> &'static str {
    if d <= h / 2.0 {
        "d<=h/2"
    } else if d <= h {
        "d<=h"
    } else if d <= h * 2.0 {
        "d<=2h"
    } else {
        "d>2h"
    }
}

// ============================================================================
// Coefficient Resolution
// ============================================================================

fn resolve_axis(
    config: &MainWindConfig,
    catalog: &Catalog,
    axis: Axis,
    derivation: &mut Derivation,
) -> CalcResult<AxisCoefficients> {
    let building = config.building_type.code();
    let (l, b) = match axis {
        Axis::X => (config.l_x, config.l_y),
        Axis::Y => (config.l_y, config.l_x),
    };

    // Walls
    let l_over_b = l / b;
    let walls = [
        (1.0, catalog.main_wind_record(building, &["wall", "L/B=1"])?),
        (2.0, catalog.main_wind_record(building, &["wall", "L/B=2"])?),
        (4.0, catalog.main_wind_record(building, &["wall", "L/B=4"])?),
    ];
    tracing::debug!("{}-axis walls: L/B = {:.4}", axis, l_over_b);
    let wall = interpolate_table(&walls, l_over_b, &format!("{} wall L/B", axis), derivation)?;

    // Roof
    let h_over_l = config.h / l;
    let roof = if config.ridge_axis == Some(axis) || config.roof_angle < FLAT_ROOF_LIMIT {
        tracing::debug!("{}-axis roof: parallel to ridge or flat, h/L = {:.4}", axis, h_over_l);
        let parallel = [
            (0.5, catalog.main_wind_record(building, &["roof_parallel", "h/L=0.5"])?),
            (1.0, catalog.main_wind_record(building, &["roof_parallel", "h/L=1"])?),
        ];
        interpolate_table(&parallel, h_over_l, &format!("{} roof h/L", axis), derivation)?
    } else if config.ridge_axis.is_some() {
        let (angle_1, angle_2) = roof_angle_bracket(config.roof_angle)?;
        tracing::debug!(
            "{}-axis roof: normal to ridge, theta = {} between {} and {}, h/L = {:.4}",
            axis,
            config.roof_angle,
            angle_1,
            angle_2,
            h_over_l
        );

        let mut normal = Vec::with_capacity(3);
        for (ratio, ratio_key) in [(0.25, "h/L=0.25"), (0.5, "h/L=0.5"), (1.0, "h/L=1")] {
            let lower = catalog.main_wind_record(building, &["roof_normal", ratio_key, &angle_1.to_string()])?;
            let upper = catalog.main_wind_record(building, &["roof_normal", ratio_key, &angle_2.to_string()])?;
            normal.push((ratio, linterp_records(angle_1, &lower, angle_2, &upper, config.roof_angle)?));
        }
        derivation.push(interpolation_step(
            &format!("{} roof theta", axis),
            angle_1,
            angle_2,
            config.roof_angle,
        ));
        interpolate_table(&normal, h_over_l, &format!("{} roof h/L", axis), derivation)?
    } else {
        return Err(CalcError::configuration("ridge_axis", "ridge_axis not set"));
    };

    let parapet = catalog.main_wind_record(building, &["parapet"])?;

    Ok(AxisCoefficients { wall, roof, parapet })
}

/// Tabulated angles bracketing `roof_angle`; 10° uses [10, 15]
fn roof_angle_bracket(roof_angle: f64) -> CalcResult<(f64, f64)> {
    ROOF_NORMAL_ANGLES
        .windows(2)
        .find(|pair| roof_angle <= pair[1])
        .map(|pair| (pair[0], pair[1]))
        .ok_or_else(|| {
            CalcError::out_of_domain(
                "roof_angle",
                format!("{} degrees", roof_angle),
                "Roof angle is greater than 80 degrees",
            )
        })
}

/// Pick or interpolate a record from a table sorted by its parameter.
/// Outside the table the nearest end is used.
fn interpolate_table(
    table: &[(f64, CoefficientRecord)],
    x: f64,
    label: &str,
    derivation: &mut Derivation,
) -> CalcResult<CoefficientRecord> {
    let (first_x, first) = table
        .first()
        .ok_or_else(|| CalcError::configuration(label, "no tabulated coefficients"))?;
    if x <= *first_x {
        return Ok(first.clone());
    }

    for pair in table.windows(2) {
        let (x1, r1) = &pair[0];
        let (x2, r2) = &pair[1];
        if x <= *x2 {
            derivation.push(interpolation_step(label, *x1, *x2, x));
            return linterp_records(*x1, r1, *x2, r2, x);
        }
    }

    let (_, last) = table
        .last()
        .ok_or_else(|| CalcError::configuration(label, "no tabulated coefficients"))?;
    Ok(last.clone())
}

fn interpolation_step(label: &str, x1: f64, x2: f64, x3: f64) -> DerivationStep {
    DerivationStep::new(
        Equation::LinearInterpolation,
        Some(label),
        vec![Term::new("x1", x1, ""), Term::new("x2", x2, "")],
        Term::new("x3", x3, ""),
    )
}
