//! # Components and Cladding Pressures (ASCE 7-22 Chapter 30)
//!
//! [`CandCServer`] resolves a single zone table at construction and then
//! evaluates zone pressures for a given effective wind area.
//!
//! ## Zone Tables
//!
//! Low-rise buildings combine the wall zones, one roof band, and, when both
//! the canopy and eave heights are known, one canopy band:
//!
//! | Roof angle      | Roof zones            |
//! |-----------------|-----------------------|
//! | θ ≤ 7°          | `flat`                |
//! | 7° < θ ≤ 20°    | `low_<roof_type>`     |
//! | 20° < θ ≤ 27°   | `mid_<roof_type>`     |
//! | 27° < θ ≤ 45°   | `high_<roof_type>`    |
//!
//! | h_c / h_e       | Canopy zones          |
//! |-----------------|-----------------------|
//! | ≤ 0.5           | `low_canopy`          |
//! | < 0.9           | `mid_canopy`          |
//! | ≤ 1.0           | `high_canopy`         |
//!
//! Open buildings interpolate the `<roof_type>_<angle>` tables between the
//! tabulated angles 0°, 7.5°, 15°, 30°, 45°.
//!
//! ## Zone Curves
//!
//! ```text
//! single_log:  GC_p = c1 + c2 log10(A),  A clamped to [low_limit, high_limit]
//! double_log:  two single_log segments split at break_point
//! constants:   C_n = c1 (A ≤ a²), c2 (A ≤ 4a²), c3 otherwise
//! composite:   p = p(positive_zone) - p(negative_zone)
//!
//! log curves:  p = q K_d (GC_p + GC_pi sign(GC_p))
//! constants:   p = q K_d G C_n
//! ```
//!
//! The result magnitude is raised to `p_min` (16 psf unless the zone or the
//! query says otherwise), keeping its sign.

use std::collections::BTreeMap;

use crate::catalog::{Catalog, CoefficientEntry, CoefficientRecord};
use crate::equations::{Derivation, DerivationStep, Equation, Term};
use crate::errors::{CalcError, CalcResult};
use crate::interpolate::linterp_records;
use crate::units::{Psf, SqFt};
use crate::wind::config::{CandCConfig, WindOptions};
use crate::wind::inputs::WindInputs;
use crate::wind::mwfrs::floor_magnitude;
use crate::wind::{sign, BuildingType, GustMethod};

/// Floor applied when neither the zone nor the query sets one
pub const DEFAULT_P_MIN: Psf = Psf(16.0);

/// Tabulated open-building roof angles (degrees)
const OPEN_ROOF_ANGLES: [f64; 5] = [0.0, 7.5, 15.0, 30.0, 45.0];

/// Pressure coefficient curve of a zone
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneCurve {
    SingleLog {
        c1: f64,
        c2: f64,
        low_limit: f64,
        high_limit: f64,
    },
    DoubleLog {
        e1c1: f64,
        e1c2: f64,
        e2c1: f64,
        e2c2: f64,
        break_point: f64,
        low_limit: f64,
        high_limit: f64,
    },
    /// Net pressure coefficients banded at a² and 4a²
    Constants { c1: f64, c2: f64, c3: f64 },
    Composite {
        positive_zone: String,
        negative_zone: String,
    },
}

impl ZoneCurve {
    pub fn kind(&self) -> &'static str {
        match self {
            ZoneCurve::SingleLog { .. } => "single_log",
            ZoneCurve::DoubleLog { .. } => "double_log",
            ZoneCurve::Constants { .. } => "constants",
            ZoneCurve::Composite { .. } => "composite",
        }
    }

    /// External pressure coefficient GC_p for a log curve
    fn log_coefficient(&self, area: f64) -> Option<f64> {
        match *self {
            ZoneCurve::SingleLog {
                c1,
                c2,
                low_limit,
                high_limit,
            } => Some(c1 + c2 * area.max(low_limit).min(high_limit).log10()),
            ZoneCurve::DoubleLog {
                e1c1,
                e1c2,
                e2c1,
                e2c2,
                break_point,
                low_limit,
                high_limit,
            } => {
                if area <= break_point {
                    Some(e1c1 + e1c2 * area.max(low_limit).log10())
                } else {
                    Some(e2c1 + e2c2 * area.min(high_limit).log10())
                }
            }
            ZoneCurve::Constants { .. } | ZoneCurve::Composite { .. } => None,
        }
    }
}

/// Resolved coefficients for one C&C zone
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneCoefficients {
    pub curve: ZoneCurve,
    /// Zone-specific floor, replaces the default
    pub p_min: Option<Psf>,
    /// Zone-specific internal pressure coefficient (canopies use 0)
    pub gc_pi: Option<f64>,
    /// Evaluate with the parapet-height velocity pressure
    pub use_q_p: bool,
}

impl ZoneCoefficients {
    /// Parse a catalog entry, dispatching on its `kind` tag
    pub fn from_entry(zone: &str, entry: &CoefficientEntry) -> CalcResult<Self> {
        let curve = match entry.text("kind") {
            Some("single_log") => ZoneCurve::SingleLog {
                c1: entry.number("c1")?,
                c2: entry.number("c2")?,
                low_limit: entry.number("low_limit")?,
                high_limit: entry.number("high_limit")?,
            },
            Some("double_log") => ZoneCurve::DoubleLog {
                e1c1: entry.number("e1c1")?,
                e1c2: entry.number("e1c2")?,
                e2c1: entry.number("e2c1")?,
                e2c2: entry.number("e2c2")?,
                break_point: entry.number("break_point")?,
                low_limit: entry.number("low_limit")?,
                high_limit: entry.number("high_limit")?,
            },
            Some("constants") => ZoneCurve::Constants {
                c1: entry.number("c1")?,
                c2: entry.number("c2")?,
                c3: entry.number("c3")?,
            },
            Some("composite") => ZoneCurve::Composite {
                positive_zone: zone_reference(zone, entry, "positive_zone")?,
                negative_zone: zone_reference(zone, entry, "negative_zone")?,
            },
            Some(other) => {
                return Err(CalcError::configuration(
                    "kind",
                    format!("Unsupported kind for zone {}: {}", zone, other),
                ))
            }
            None => {
                return Err(CalcError::configuration(
                    "kind",
                    format!("Zone {} has no kind", zone),
                ))
            }
        };

        let gc_pi = if entry.contains("GC_pi") {
            Some(entry.number("GC_pi")?)
        } else {
            None
        };

        Ok(ZoneCoefficients {
            curve,
            p_min: entry.pressure("p_min")?,
            gc_pi,
            use_q_p: entry.flag("use_q_p"),
        })
    }
}

fn zone_reference(zone: &str, entry: &CoefficientEntry, field: &str) -> CalcResult<String> {
    entry
        .text(field)
        .map(str::to_string)
        .ok_or_else(|| CalcError::configuration(field, format!("Composite zone {} is missing {}", zone, field)))
}

/// Optional overrides for a C&C pressure query.
///
/// Explicit values win over zone and server values. `gc_pi` and `p_min`
/// are used as magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LoadQuery {
    /// Gust effect factor for `constants` zones. Components of a composite
    /// zone always use the larger of `G_x` and `G_y`.
    pub gust: GustMethod,
    /// Velocity pressure override
    pub q_z: Option<Psf>,
    pub gc_pi: Option<f64>,
    pub p_min: Option<Psf>,
}

impl LoadQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gust(mut self, gust: GustMethod) -> Self {
        self.gust = gust;
        self
    }

    pub fn with_q_z(mut self, q_z: Psf) -> Self {
        self.q_z = Some(q_z);
        self
    }

    pub fn with_gc_pi(mut self, gc_pi: f64) -> Self {
        self.gc_pi = Some(gc_pi);
        self
    }

    pub fn with_p_min(mut self, p_min: Psf) -> Self {
        self.p_min = Some(p_min);
        self
    }
}

/// Velocity pressure for one query, tagged with where it came from
#[derive(Debug, Clone, Copy)]
struct VelocityPressure {
    symbol: &'static str,
    value: Psf,
}

/// Components and cladding pressure server
#[derive(Debug, Clone, PartialEq)]
pub struct CandCServer {
    config: CandCConfig,
    zones: BTreeMap<String, ZoneCoefficients>,
}

impl CandCServer {
    pub fn new(config: CandCConfig, catalog: &Catalog) -> CalcResult<Self> {
        if config.roof_angle < 0.0 || !config.roof_angle.is_finite() {
            return Err(CalcError::out_of_domain(
                "roof_angle",
                format!("{} degrees", config.roof_angle),
                "Roof angle must be zero or positive",
            ));
        }

        let record = match config.building_type {
            BuildingType::LowRise => low_rise_zones(&config, catalog)?,
            BuildingType::MidRise => return Err(CalcError::not_supported("C&C pressures for mid-rise buildings")),
            BuildingType::Open => open_zones(&config, catalog)?,
        };

        let zones = record
            .entries
            .iter()
            .map(|(zone, entry)| Ok((zone.clone(), ZoneCoefficients::from_entry(zone, entry)?)))
            .collect::<CalcResult<BTreeMap<_, _>>>()?;
        validate_composites(&zones)?;

        tracing::debug!(
            "C&C zones for {} at {} degrees: {}",
            config.building_type,
            config.roof_angle,
            zones.keys().cloned().collect::<Vec<_>>().join(", ")
        );

        Ok(CandCServer { config, zones })
    }

    pub fn from_options(options: &WindOptions, catalog: &Catalog) -> CalcResult<Self> {
        Self::new(CandCConfig::resolve(options)?, catalog)
    }

    pub fn from_inputs(inputs: &WindInputs, catalog: &Catalog) -> CalcResult<Self> {
        Self::from_options(&WindOptions::from(inputs), catalog)
    }

    pub fn config(&self) -> &CandCConfig {
        &self.config
    }

    /// Names of the resolved zones
    pub fn zones(&self) -> impl Iterator<Item = &str> {
        self.zones.keys().map(String::as_str)
    }

    pub fn zone(&self, name: &str) -> CalcResult<&ZoneCoefficients> {
        self.zones
            .get(name)
            .ok_or_else(|| CalcError::key_not_found("C&C zones", name))
    }

    /// Design pressure for a zone and effective wind area
    pub fn get_load(&self, zone: &str, area: impl Into<SqFt>, query: &LoadQuery) -> CalcResult<Psf> {
        self.get_load_traced(zone, area, query).map(|(p, _)| p)
    }

    /// Same as [`get_load`](Self::get_load), with the steps that produced the pressure
    pub fn get_load_traced(
        &self,
        zone: &str,
        area: impl Into<SqFt>,
        query: &LoadQuery,
    ) -> CalcResult<(Psf, Derivation)> {
        let area = area.into();
        let coefficients = self.zone(zone)?;

        let gc_pi = query
            .gc_pi
            .map(f64::abs)
            .or(coefficients.gc_pi)
            .unwrap_or(self.config.gc_pi);
        let p_min = query
            .p_min
            .map(Psf::abs)
            .or(coefficients.p_min)
            .unwrap_or(DEFAULT_P_MIN);
        let q = match query.q_z {
            Some(value) => VelocityPressure { symbol: "q_z", value },
            None if coefficients.use_q_p => VelocityPressure {
                symbol: "q_p",
                value: self.config.q_p.ok_or_else(|| CalcError::missing_field("q_p"))?,
            },
            None => VelocityPressure {
                symbol: "q_h",
                value: self.config.q_h,
            },
        };

        let mut derivation = Derivation::new();
        let p = match &coefficients.curve {
            ZoneCurve::Composite {
                positive_zone,
                negative_zone,
            } => {
                let p_positive = self.unfloored(positive_zone, area, q, gc_pi, &mut derivation)?;
                let p_negative = self.unfloored(negative_zone, area, q, gc_pi, &mut derivation)?;
                let p = p_positive - p_negative;
                derivation.push(DerivationStep::new(
                    Equation::CandCCompositePressure,
                    Some(zone),
                    vec![
                        Term::new("p_positive", p_positive.0, "psf"),
                        Term::new("p_negative", p_negative.0, "psf"),
                    ],
                    Term::new("p", p.0, "psf"),
                ));
                p
            }
            curve => self.evaluate(zone, curve, area, q, gc_pi, query.gust, &mut derivation)?,
        };

        Ok((floor_magnitude(p, p_min), derivation))
    }

    /// Component of a composite zone, without a floor
    fn unfloored(
        &self,
        zone: &str,
        area: SqFt,
        q: VelocityPressure,
        gc_pi: f64,
        derivation: &mut Derivation,
    ) -> CalcResult<Psf> {
        let coefficients = self.zone(zone)?;
        self.evaluate(zone, &coefficients.curve, area, q, gc_pi, GustMethod::Max, derivation)
    }

    #[allow(clippy::too_many_arguments)]
    fn evaluate(
        &self,
        zone: &str,
        curve: &ZoneCurve,
        area: SqFt,
        q: VelocityPressure,
        gc_pi: f64,
        gust: GustMethod,
        derivation: &mut Derivation,
    ) -> CalcResult<Psf> {
        let k_d = self.config.k_d;

        if let ZoneCurve::Constants { c1, c2, c3 } = *curve {
            let a_squared = (self.config.a * self.config.a).0;
            let c_n = if area.0 <= a_squared {
                c1
            } else if area.0 <= 4.0 * a_squared {
                c2
            } else {
                c3
            };
            let g = gust.select(self.config.g_x, self.config.g_y);
            let p = q.value * (k_d * g * c_n);
            derivation.push(DerivationStep::new(
                Equation::OpenBuildingCandCPressure,
                Some(zone),
                vec![
                    Term::new(q.symbol, q.value.0, "psf"),
                    Term::new("K_d", k_d, ""),
                    Term::new("G", g, ""),
                    Term::new("C_n", c_n, ""),
                ],
                Term::new("p", p.0, "psf"),
            ));
            return Ok(p);
        }

        let gc_p = curve.log_coefficient(area.0).ok_or_else(|| {
            CalcError::configuration(zone, "composite zones may only reference log or constant zones")
        })?;
        let p = q.value * (k_d * (gc_p + gc_pi * sign(gc_p)));
        derivation.push(DerivationStep::new(
            Equation::CandCPressure,
            Some(zone),
            vec![
                Term::new(q.symbol, q.value.0, "psf"),
                Term::new("K_d", k_d, ""),
                Term::new("A", area.0, "ft²"),
                Term::new("GC_p", gc_p, ""),
                Term::new("GC_pi", gc_pi, ""),
            ],
            Term::new("p", p.0, "psf"),
        ));
        Ok(p)
    }
}

/// Composite zones must name existing, non-composite zones
fn validate_composites(zones: &BTreeMap<String, ZoneCoefficients>) -> CalcResult<()> {
    for (name, coefficients) in zones {
        if let ZoneCurve::Composite {
            positive_zone,
            negative_zone,
        } = &coefficients.curve
        {
            for reference in [positive_zone, negative_zone] {
                match zones.get(reference) {
                    None => {
                        return Err(CalcError::configuration(
                            name.as_str(),
                            format!("Composite zone {} references unknown zone {}", name, reference),
                        ))
                    }
                    Some(ZoneCoefficients {
                        curve: ZoneCurve::Composite { .. },
                        ..
                    }) => {
                        return Err(CalcError::configuration(
                            name.as_str(),
                            format!("Composite zone {} references composite zone {}", name, reference),
                        ))
                    }
                    Some(_) => {}
                }
            }
        }
    }
    Ok(())
}

// ============================================================================
// Zone Table Selection
// ============================================================================

fn low_rise_zones(config: &CandCConfig, catalog: &Catalog) -> CalcResult<CoefficientRecord> {
    let building = config.building_type.code();
    let mut record = catalog.candc_record(building, "walls")?;

    let angle = config.roof_angle;
    let roof_table = if angle <= 7.0 {
        "flat".to_string()
    } else if angle <= 20.0 {
        format!("low_{}", config.require_roof_type()?)
    } else if angle <= 27.0 {
        format!("mid_{}", config.require_roof_type()?)
    } else if angle <= 45.0 {
        format!("high_{}", config.require_roof_type()?)
    } else {
        return Err(CalcError::out_of_domain(
            "roof_angle",
            format!("{} degrees", angle),
            "Roof slope greater than 45 degrees",
        ));
    };
    record.extend(catalog.candc_record(building, &roof_table)?);

    if let (Some(h_c), Some(h_e)) = (config.h_c, config.h_e) {
        let ratio = h_c / h_e;
        let canopy_table = if ratio <= 0.5 {
            "low_canopy"
        } else if ratio < 0.9 {
            "mid_canopy"
        } else if ratio <= 1.0 {
            "high_canopy"
        } else {
            return Err(CalcError::out_of_domain(
                "h_c/h_e",
                format!("{:.3}", ratio),
                "Canopy is higher than mean eave height",
            ));
        };
        record.extend(catalog.candc_record(building, canopy_table)?);
    }

    Ok(record)
}

fn open_zones(config: &CandCConfig, catalog: &Catalog) -> CalcResult<CoefficientRecord> {
    let building = config.building_type.code();
    let roof_type = config.require_roof_type()?;
    let angle = config.roof_angle;

    let (angle_1, angle_2) = OPEN_ROOF_ANGLES
        .windows(2)
        .find(|pair| angle <= pair[1])
        .map(|pair| (pair[0], pair[1]))
        .ok_or_else(|| {
            CalcError::out_of_domain(
                "roof_angle",
                format!("{} degrees", angle),
                "Roof slope is greater than 45 degrees",
            )
        })?;

    let lower = catalog.candc_record(building, &format!("{}_{}", roof_type, angle_1))?;
    let upper = catalog.candc_record(building, &format!("{}_{}", roof_type, angle_2))?;
    linterp_records(angle_1, &lower, angle_2, &upper, angle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::units::Feet;
    use approx::assert_relative_eq;

    fn catalog() -> &'static Catalog {
        Catalog::shared().unwrap()
    }

    fn low_rise_options() -> WindOptions {
        WindOptions {
            building_type: Some(BuildingType::LowRise),
            roof_type: Some("gable".to_string()),
            roof_angle: Some(0.0),
            a: Some(Feet(10.0)),
            g_x: Some(0.85),
            g_y: Some(0.85),
            gc_pi: Some(0.18),
            k_d: Some(0.85),
            q_h: Some(Psf(27.8)),
            q_p: Some(Psf(30.0)),
            ..Default::default()
        }
    }

    fn open_options(roof_angle: f64) -> WindOptions {
        WindOptions {
            building_type: Some(BuildingType::Open),
            roof_type: Some("monoslope_clear".to_string()),
            roof_angle: Some(roof_angle),
            ..low_rise_options()
        }
    }

    fn server(options: &WindOptions) -> CandCServer {
        CandCServer::from_options(options, catalog()).unwrap()
    }

    #[test]
    fn test_single_log_zone() {
        let server = server(&low_rise_options());
        let query = LoadQuery::new().with_q_z(Psf(27.8));

        let p = server.get_load("4+", SqFt(9.0), &query).unwrap();
        assert_relative_eq!(p.0, 27.8834, epsilon = 1e-9);

        let p = server.get_load("4+", SqFt(50.0), &query).unwrap();
        assert_relative_eq!(p.0, 24.966_557_63, epsilon = 1e-6);

        let p = server.get_load("4+", SqFt(750.0), &query).unwrap();
        assert_relative_eq!(p.0, 20.793_499_63, epsilon = 1e-6);

        let p = server.get_load("4-", SqFt(50.0), &query).unwrap();
        assert_relative_eq!(p.0, -27.329_557_63, epsilon = 1e-6);
    }

    #[test]
    fn test_walls_use_roof_height_pressure() {
        let server = server(&low_rise_options());
        let implicit = server.get_load("4+", SqFt(50.0), &LoadQuery::new()).unwrap();
        assert_relative_eq!(implicit.0, 24.966_557_63, epsilon = 1e-6);
    }

    #[test]
    fn test_double_log_zone() {
        let server = server(&low_rise_options());
        let query = LoadQuery::new();

        // Flat roof zone 1V-: segments meet at 100 ft², clamped to [10, 500]
        for (area, expected) in [
            (9.0, -44.4244),
            (20.0, -43.713_066_11),
            (100.0, -42.0614),
            (200.0, -35.955_309_98),
            (750.0, -27.8834),
        ] {
            let p = server.get_load("1V-", SqFt(area), &query).unwrap();
            assert_relative_eq!(p.0, expected, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_default_minimum_pressure() {
        let server = server(&low_rise_options());
        let p = server.get_load("1+", SqFt(100.0), &LoadQuery::new()).unwrap();
        assert_eq!(p, DEFAULT_P_MIN);

        let p = server
            .get_load("1+", SqFt(100.0), &LoadQuery::new().with_p_min(Psf(-4.0)))
            .unwrap();
        assert_relative_eq!(p.0, 27.8 * 0.85 * 0.38, epsilon = 1e-9);
    }

    #[test]
    fn test_composite_is_difference_of_components() {
        let server = server(&low_rise_options());
        let area = SqFt(10.0);

        let p = server.get_load("4P+", area, &LoadQuery::new()).unwrap();

        // Composites carry GC_pi = 0 and use q_p
        let unfloored = LoadQuery::new()
            .with_q_z(Psf(30.0))
            .with_gc_pi(0.0)
            .with_p_min(Psf(0.0));
        let positive = server.get_load("4+", area, &unfloored).unwrap();
        let negative = server.get_load("2-", area, &unfloored).unwrap();
        assert_relative_eq!(p.0, (positive - negative).0, epsilon = 1e-9);
        assert_relative_eq!(p.0, 30.0 * 0.85 * (1.0 + 2.3), epsilon = 1e-9);
    }

    #[test]
    fn test_flat_roof_with_canopy() {
        let options = WindOptions {
            q_p: Some(Psf(28.1)),
            h_c: Some(Feet(10.0)),
            h_e: Some(Feet(20.0)),
            ..low_rise_options()
        };
        let server = server(&options);

        let p = server.get_load("4P+", SqFt(50.0), &LoadQuery::new()).unwrap();
        assert_relative_eq!(p.0, 67.028_893_15, epsilon = 1e-6);

        let p = server
            .get_load("4P+", SqFt(600.0), &LoadQuery::new().with_q_z(Psf(14.0)))
            .unwrap();
        assert_eq!(p, Psf(32.0));

        let p = server.get_load("1_prime+", SqFt(500.0), &LoadQuery::new()).unwrap();
        assert_eq!(p, Psf(16.0));

        let p = server.get_load("1_prime-", SqFt(1000.0), &LoadQuery::new()).unwrap();
        assert_eq!(p, Psf(-16.0));

        assert!(server.zone("C-").is_ok());
    }

    #[test]
    fn test_low_slope_gable_zones() {
        let options = WindOptions {
            roof_angle: Some(10.0),
            h_c: Some(Feet(10.0)),
            h_e: Some(Feet(20.0)),
            ..low_rise_options()
        };
        let server = server(&options);

        let zones: Vec<&str> = server.zones().collect();
        let mut expected = vec![
            "1+", "1-", "2+", "2-", "3+", "3-", "4+", "4-", "4P+", "4P-", "5+", "5-", "5P+", "5P-", "C+", "C-",
        ];
        expected.sort_unstable();
        assert_eq!(zones, expected);

        let c1 = |zone: &str| match server.zone(zone).unwrap().curve {
            ZoneCurve::SingleLog { c1, .. } => c1,
            ref other => panic!("unexpected curve {:?}", other),
        };
        assert_relative_eq!(c1("1-"), -3.0155, epsilon = 1e-12);
        assert_relative_eq!(c1("4-"), -1.2766, epsilon = 1e-12);
    }

    #[test]
    fn test_composite_floor() {
        let options = WindOptions {
            q_p: Some(Psf(5.0)),
            ..low_rise_options()
        };
        let server = server(&options);
        let p = server.get_load("4P+", SqFt(10.0), &LoadQuery::new()).unwrap();
        assert_eq!(p, Psf(32.0));
    }

    #[test]
    fn test_composite_requires_parapet_pressure() {
        let options = WindOptions {
            q_p: None,
            ..low_rise_options()
        };
        let err = server(&options).get_load("5P-", SqFt(10.0), &LoadQuery::new()).unwrap_err();
        assert_eq!(err, CalcError::missing_field("q_p"));
    }

    #[test]
    fn test_composite_guard() {
        let mut zones = BTreeMap::new();
        let composite = |positive: &str, negative: &str| ZoneCoefficients {
            curve: ZoneCurve::Composite {
                positive_zone: positive.to_string(),
                negative_zone: negative.to_string(),
            },
            p_min: None,
            gc_pi: None,
            use_q_p: false,
        };
        zones.insert("A".to_string(), composite("B", "B"));
        zones.insert("B".to_string(), composite("A", "A"));
        let err = validate_composites(&zones).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        zones.remove("B");
        let err = validate_composites(&zones).unwrap_err();
        assert!(err.to_string().contains("unknown zone B"));
    }

    #[test]
    fn test_roof_band_selection() {
        let at = |roof_angle: f64| {
            CandCServer::from_options(
                &WindOptions {
                    roof_angle: Some(roof_angle),
                    ..low_rise_options()
                },
                catalog(),
            )
        };

        assert!(at(7.0).unwrap().zone("1_prime+").is_ok());
        assert!(at(7.5).unwrap().zone("1_prime+").is_err());

        // high_gable 3-: -4.4 + 1.2 log10(A)
        let p = at(45.0).unwrap().get_load("3-", SqFt(10.0), &LoadQuery::new()).unwrap();
        assert_relative_eq!(p.0, 27.8 * 0.85 * (-3.2 - 0.18), epsilon = 1e-9);

        let err = at(45.01).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
    }

    #[test]
    fn test_sloped_roof_requires_roof_type() {
        let options = WindOptions {
            roof_type: None,
            roof_angle: Some(15.0),
            ..low_rise_options()
        };
        let err = CandCServer::from_options(&options, catalog()).unwrap_err();
        assert_eq!(err, CalcError::missing_field("roof_type"));

        let flat = WindOptions {
            roof_type: None,
            ..low_rise_options()
        };
        assert!(CandCServer::from_options(&flat, catalog()).is_ok());
    }

    #[test]
    fn test_canopy_zones() {
        let options = WindOptions {
            h_c: Some(Feet(5.0)),
            h_e: Some(Feet(12.0)),
            ..low_rise_options()
        };
        let server = server(&options);

        // Canopy zones carry GC_pi = 0
        let p = server.get_load("C+", SqFt(10.0), &LoadQuery::new()).unwrap();
        assert_relative_eq!(p.0, 27.8 * 0.85 * 0.7, epsilon = 1e-9);

        let too_high = WindOptions {
            h_c: Some(Feet(13.0)),
            h_e: Some(Feet(12.0)),
            ..low_rise_options()
        };
        let err = CandCServer::from_options(&too_high, catalog()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);

        let no_canopy = CandCServer::from_options(&low_rise_options(), catalog()).unwrap();
        assert_eq!(no_canopy.zone("C+").unwrap_err().kind(), ErrorKind::Lookup);
    }

    #[test]
    fn test_open_building_constants() {
        let server = server(&open_options(0.0));

        let p = server.get_load("3+", SqFt(10.0), &LoadQuery::new()).unwrap();
        assert_relative_eq!(p.0, 48.2052, epsilon = 1e-9);

        let p = server.get_load("3+", SqFt(200.0), &LoadQuery::new()).unwrap();
        assert_relative_eq!(p.0, 36.1539, epsilon = 1e-9);

        let p = server.get_load("3+", SqFt(500.0), &LoadQuery::new()).unwrap();
        assert_relative_eq!(p.0, 24.1026, epsilon = 1e-9);
    }

    #[test]
    fn test_open_building_interpolation() {
        let server = server(&open_options(22.5));

        let constants = |zone: &str| match server.zone(zone).unwrap().curve {
            ZoneCurve::Constants { c1, c2, c3 } => (c1, c2, c3),
            ref other => panic!("unexpected curve {:?}", other),
        };

        assert_relative_eq!(constants("3+").0, 4.4, epsilon = 1e-9);
        assert_relative_eq!(constants("3-").0, -4.4, epsilon = 1e-9);
        assert_relative_eq!(constants("2+").1, 3.3, epsilon = 1e-9);
        assert_relative_eq!(constants("2-").1, -3.35, epsilon = 1e-9);
        assert_relative_eq!(constants("1+").2, 2.2, epsilon = 1e-9);
        assert_relative_eq!(constants("1-").2, -2.2, epsilon = 1e-9);

        let err = CandCServer::from_options(&open_options(46.0), catalog()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
    }

    #[test]
    fn test_gust_method() {
        let options = WindOptions {
            g_x: Some(0.8),
            g_y: Some(0.9),
            ..open_options(0.0)
        };
        let server = server(&options);

        let max = server.get_load("1+", SqFt(10.0), &LoadQuery::new()).unwrap();
        let y = server
            .get_load("1+", SqFt(10.0), &LoadQuery::new().with_gust(GustMethod::Y))
            .unwrap();
        let x = server
            .get_load("1+", SqFt(10.0), &LoadQuery::new().with_gust(GustMethod::X))
            .unwrap();
        assert_eq!(max, y);
        assert_relative_eq!(x.0, 27.8 * 0.85 * 0.8 * 1.2, epsilon = 1e-9);
    }

    #[test]
    fn test_unsupported_building_types() {
        let options = WindOptions {
            building_type: Some(BuildingType::MidRise),
            ..low_rise_options()
        };
        let err = CandCServer::from_options(&options, catalog()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSupported);
    }

    #[test]
    fn test_unknown_kind() {
        let record =
            CoefficientRecord::from_json(&serde_json::json!({"9+": {"kind": "triple_log", "c1": 1.0}}), "test").unwrap();
        let err = ZoneCoefficients::from_entry("9+", record.get("9+").unwrap()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("triple_log"));
    }

    #[test]
    fn test_traced_composite() {
        let server = server(&low_rise_options());
        let (p, derivation) = server.get_load_traced("5P-", SqFt(20.0), &LoadQuery::new()).unwrap();
        assert_eq!(
            derivation
                .steps()
                .iter()
                .filter(|s| s.equation == Equation::CandCPressure)
                .count(),
            2
        );
        let step = derivation.find(Equation::CandCCompositePressure).unwrap();
        assert_eq!(step.result.value.abs().max(32.0) * step.result.value.signum(), p.0);

        let step = derivation.find(Equation::CandCPressure).unwrap();
        assert_eq!(step.terms[0].symbol, "q_p");
    }

    #[test]
    fn test_traced_velocity_pressure_source() {
        let low_rise = server(&low_rise_options());
        let (_, derivation) = low_rise.get_load_traced("4+", SqFt(20.0), &LoadQuery::new()).unwrap();
        let step = derivation.find(Equation::CandCPressure).unwrap();
        assert_eq!(step.terms[0].symbol, "q_h");

        let open = server(&open_options(0.0));
        let (_, derivation) = open
            .get_load_traced("3+", SqFt(10.0), &LoadQuery::new().with_q_z(Psf(20.0)))
            .unwrap();
        let step = derivation.find(Equation::OpenBuildingCandCPressure).unwrap();
        assert_eq!(step.terms[0].symbol, "q_z");
        assert_relative_eq!(step.terms[0].value, 20.0, epsilon = 1e-12);
    }
}
