//! # Velocity Pressure Primitives
//!
//! Chapter 26 building blocks. Each function returns a result struct that
//! carries the computed value together with the intermediate values used to
//! reach it, and implements [`Traced`] so the value can be listed in a
//! [`Derivation`](crate::equations::Derivation).
//!
//! | Function | Reference |
//! |----------|-----------|
//! | [`topographic_factor`] | Fig. 26.8-1 |
//! | [`ground_elevation_factor`] | Table 26.9-1 |
//! | [`exposure_coefficient`] | Table 26.10-1 |
//! | [`velocity_pressure`] | Eq. 26.10-1 |
//! | [`turbulence_intensity`] | Eq. 26.11-7 |
//! | [`integral_length_scale`] | Eq. 26.11-9 |
//! | [`background_response`] | Eq. 26.11-8 |
//! | [`gust_effect_factor`] | Eq. 26.11-6 |
//! | [`candc_zone_dimension`] | Section 30.2 (`a`) |
//!
//! ## Example
//!
//! ```rust
//! use wind_core::units::{Feet, Mph};
//! use wind_core::wind::velocity::{exposure_coefficient, velocity_pressure};
//!
//! let k_z = exposure_coefficient(Feet(30.0), Feet(2460.0), 9.8).unwrap();
//! let q_z = velocity_pressure(k_z.k_z, 1.0, 1.0, Mph(115.0));
//! assert!(q_z.q_z.0 > 0.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::equations::{DerivationStep, Equation, Term, Traced};
use crate::errors::{CalcError, CalcResult};
use crate::units::{Feet, Mph, Psf};
use crate::wind::Exposure;

/// Highest elevation covered by Table 26.10-1
pub const MAX_ELEVATION: Feet = Feet(3280.0);

/// Elevation below which K_z is held constant
pub const MIN_ELEVATION: Feet = Feet(15.0);

/// Peak factor for background response and wind speed (g_Q = g_v)
pub const PEAK_FACTOR: f64 = 3.4;

/// Minimum C&C zone dimension
pub const MIN_ZONE_DIMENSION: Feet = Feet(3.0);

// ============================================================================
// Topographic Factor (Fig. 26.8-1)
// ============================================================================

/// Site description for the topographic factor.
///
/// Exposure and location conservatively default to `D` and `"downwind"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopographicSite {
    /// "ridge", "escarpment", or "hill"
    pub feature: String,
    /// Height of the feature relative to the upwind terrain (H)
    pub feature_height: Feet,
    /// Distance upwind of the crest to where the elevation difference is H/2 (L_h)
    pub half_height_distance: Feet,
    /// Distance from the crest to the site (x)
    pub crest_distance: Feet,
    /// Height above ground at the site (z)
    pub height: Feet,
    pub exposure: Exposure,
    /// "upwind" or "downwind" of the crest
    pub location: String,
}

impl TopographicSite {
    pub fn new(
        feature: impl Into<String>,
        feature_height: Feet,
        half_height_distance: Feet,
        crest_distance: Feet,
        height: Feet,
    ) -> Self {
        Self {
            feature: feature.into(),
            feature_height,
            half_height_distance,
            crest_distance,
            height,
            exposure: Exposure::D,
            location: "downwind".to_string(),
        }
    }

    pub fn with_exposure(mut self, exposure: Exposure) -> Self {
        self.exposure = exposure;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }
}

/// Topographic factor with its multipliers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopographicFactor {
    /// max(L_h, 2H)
    pub l_h_bounded: Feet,
    pub k1: f64,
    pub k2: f64,
    pub k3: f64,
    pub k_zt: f64,
}

impl Traced for TopographicFactor {
    fn step(&self) -> DerivationStep {
        DerivationStep::new(
            Equation::TopographicFactor,
            None,
            vec![
                Term::new("L_h", self.l_h_bounded.0, "ft"),
                Term::new("K_1", self.k1, ""),
                Term::new("K_2", self.k2, ""),
                Term::new("K_3", self.k3, ""),
            ],
            Term::new("K_zt", self.k_zt, ""),
        )
    }
}

/// Topographic factor K_zt per Fig. 26.8-1.
///
/// Unknown features, exposures, or locations fail with a lookup error from
/// the catalog. A feature with no height (`H = 0`) gives `K_zt = 1`.
pub fn topographic_factor(catalog: &Catalog, site: &TopographicSite) -> CalcResult<TopographicFactor> {
    let coefficients = catalog.topo_feature(&site.feature)?;
    let k1_ratio = coefficients.k1_ratio(site.exposure.code())?;
    let mu = coefficients.mu(&site.location)?;
    let gamma = coefficients.gamma;

    let h = site.feature_height;
    if h.0 < 0.0 {
        return Err(CalcError::out_of_domain(
            "H",
            format!("{} ft", h.0),
            "Feature height must not be negative",
        ));
    }

    let l_h_bounded = site.half_height_distance.max(h * 2.0);
    if h.0 == 0.0 {
        return Ok(TopographicFactor {
            l_h_bounded,
            k1: 0.0,
            k2: 1.0,
            k3: 1.0,
            k_zt: 1.0,
        });
    }

    let k1 = k1_ratio * (h / l_h_bounded);
    let k2 = 1.0 - site.crest_distance.0.abs() / (mu * l_h_bounded.0);
    let k3 = (-gamma * (site.height / l_h_bounded)).exp();
    let k_zt = (1.0 + k1 * k2 * k3).powi(2);

    Ok(TopographicFactor {
        l_h_bounded,
        k1,
        k2,
        k3,
        k_zt,
    })
}

// ============================================================================
// Ground Elevation Factor (Table 26.9-1)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundElevationFactor {
    pub z_e: Feet,
    pub k_e: f64,
}

impl Traced for GroundElevationFactor {
    fn step(&self) -> DerivationStep {
        DerivationStep::new(
            Equation::GroundElevationFactor,
            None,
            vec![Term::new("z_e", self.z_e.0, "ft")],
            Term::new("K_e", self.k_e, ""),
        )
    }
}

/// Ground elevation factor K_e per Table 26.9-1 note 2
pub fn ground_elevation_factor(z_e: Feet) -> GroundElevationFactor {
    GroundElevationFactor {
        z_e,
        k_e: (-0.0000362 * z_e.0).exp(),
    }
}

// ============================================================================
// Velocity Pressure Exposure Coefficient (Table 26.10-1)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposureCoefficient {
    /// Requested elevation
    pub z: Feet,
    /// Elevation used in the power law, clamped to [15 ft, z_g]
    pub z_used: Feet,
    pub z_g: Feet,
    pub alpha: f64,
    pub k_z: f64,
}

impl Traced for ExposureCoefficient {
    fn step(&self) -> DerivationStep {
        DerivationStep::new(
            Equation::ExposureCoefficient,
            None,
            vec![
                Term::new("z", self.z_used.0, "ft"),
                Term::new("z_g", self.z_g.0, "ft"),
                Term::new("alpha", self.alpha, ""),
            ],
            Term::new("K_z", self.k_z, ""),
        )
    }
}

/// Velocity pressure exposure coefficient K_z per Table 26.10-1 note 1.
///
/// `z` must lie in [0, 3280 ft].
pub fn exposure_coefficient(z: Feet, z_g: Feet, alpha: f64) -> CalcResult<ExposureCoefficient> {
    if !(0.0..=MAX_ELEVATION.0).contains(&z.0) {
        return Err(CalcError::out_of_domain(
            "z",
            format!("{} ft", z.0),
            "z is outside of the bounds supported by ASCE 7-22",
        ));
    }
    if alpha <= 0.0 || z_g.0 <= 0.0 {
        return Err(CalcError::out_of_domain(
            "alpha, z_g",
            format!("{}, {} ft", alpha, z_g.0),
            "terrain exposure constants must be positive",
        ));
    }

    let z_used = z.min(z_g).max(MIN_ELEVATION);
    let k_z = 2.41 * (z_used / z_g).powf(2.0 / alpha);

    Ok(ExposureCoefficient {
        z,
        z_used,
        z_g,
        alpha,
        k_z,
    })
}

// ============================================================================
// Velocity Pressure (Eq. 26.10-1)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityPressure {
    pub k_z: f64,
    pub k_zt: f64,
    pub k_e: f64,
    pub v: Mph,
    pub q_z: Psf,
}

impl Traced for VelocityPressure {
    fn step(&self) -> DerivationStep {
        DerivationStep::new(
            Equation::VelocityPressure,
            None,
            vec![
                Term::new("K_z", self.k_z, ""),
                Term::new("K_zt", self.k_zt, ""),
                Term::new("K_e", self.k_e, ""),
                Term::new("V", self.v.0, "mph"),
            ],
            Term::new("q_z", self.q_z.0, "psf"),
        )
    }
}

/// Velocity pressure q_z per Eq. 26.10-1. `v` is converted to mph.
pub fn velocity_pressure(k_z: f64, k_zt: f64, k_e: f64, v: impl Into<Mph>) -> VelocityPressure {
    let v = v.into();
    VelocityPressure {
        k_z,
        k_zt,
        k_e,
        v,
        q_z: Psf(0.00256 * k_z * k_zt * k_e * v.0 * v.0),
    }
}

// ============================================================================
// Gust Effect Factor (Section 26.11.4)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurbulenceIntensity {
    pub c: f64,
    pub z_bar: Feet,
    pub i_z: f64,
}

impl Traced for TurbulenceIntensity {
    fn step(&self) -> DerivationStep {
        DerivationStep::new(
            Equation::TurbulenceIntensity,
            None,
            vec![Term::new("c", self.c, ""), Term::new("z", self.z_bar.0, "ft")],
            Term::new("I_z", self.i_z, ""),
        )
    }
}

/// Intensity of turbulence at the equivalent height z̄ (Eq. 26.11-7)
pub fn turbulence_intensity(c: f64, z_bar: Feet) -> TurbulenceIntensity {
    TurbulenceIntensity {
        c,
        z_bar,
        i_z: c * (33.0 / z_bar.0).powf(1.0 / 6.0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegralLengthScale {
    pub l: Feet,
    pub z_bar: Feet,
    pub epsilon_bar: f64,
    pub l_z: Feet,
}

impl Traced for IntegralLengthScale {
    fn step(&self) -> DerivationStep {
        DerivationStep::new(
            Equation::IntegralLengthScale,
            None,
            vec![
                Term::new("l", self.l.0, "ft"),
                Term::new("z", self.z_bar.0, "ft"),
                Term::new("epsilon", self.epsilon_bar, ""),
            ],
            Term::new("L_z", self.l_z.0, "ft"),
        )
    }
}

/// Integral length scale of turbulence at z̄ (Eq. 26.11-9)
pub fn integral_length_scale(l: Feet, z_bar: Feet, epsilon_bar: f64) -> IntegralLengthScale {
    IntegralLengthScale {
        l,
        z_bar,
        epsilon_bar,
        l_z: l * (z_bar.0 / 33.0).powf(epsilon_bar),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackgroundResponse {
    /// Dimension normal to the wind
    pub b: Feet,
    pub h: Feet,
    pub l_z: Feet,
    pub q: f64,
}

impl Traced for BackgroundResponse {
    fn step(&self) -> DerivationStep {
        DerivationStep::new(
            Equation::BackgroundResponse,
            None,
            vec![
                Term::new("B", self.b.0, "ft"),
                Term::new("h", self.h.0, "ft"),
                Term::new("L_z", self.l_z.0, "ft"),
            ],
            Term::new("Q", self.q, ""),
        )
    }
}

/// Background response Q (Eq. 26.11-8)
pub fn background_response(b: Feet, h: Feet, l_z: Feet) -> BackgroundResponse {
    let ratio = (b + h) / l_z;
    BackgroundResponse {
        b,
        h,
        l_z,
        q: (1.0 / (1.0 + 0.63 * ratio.powf(0.63))).sqrt(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GustEffectFactor {
    pub i_z: f64,
    pub q: f64,
    pub g_q: f64,
    pub g_v: f64,
    pub g: f64,
}

impl Traced for GustEffectFactor {
    fn step(&self) -> DerivationStep {
        DerivationStep::new(
            Equation::GustEffectFactor,
            None,
            vec![
                Term::new("I_z", self.i_z, ""),
                Term::new("Q", self.q, ""),
                Term::new("g_Q", self.g_q, ""),
                Term::new("g_v", self.g_v, ""),
            ],
            Term::new("G", self.g, ""),
        )
    }
}

/// Gust effect factor for a rigid building (Eq. 26.11-6), g_Q = g_v = 3.4
pub fn gust_effect_factor(i_z: f64, q: f64) -> GustEffectFactor {
    let (g_q, g_v) = (PEAK_FACTOR, PEAK_FACTOR);
    GustEffectFactor {
        i_z,
        q,
        g_q,
        g_v,
        g: 0.925 * ((1.0 + 1.7 * g_q * i_z * q) / (1.0 + 1.7 * g_v * i_z)),
    }
}

// ============================================================================
// C&C Zone Dimension
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneDimension {
    pub l_x: Feet,
    pub l_y: Feet,
    pub h: Feet,
    pub a: Feet,
}

impl Traced for ZoneDimension {
    fn step(&self) -> DerivationStep {
        DerivationStep::new(
            Equation::ZoneDimension,
            None,
            vec![
                Term::new("L_x", self.l_x.0, "ft"),
                Term::new("L_y", self.l_y.0, "ft"),
                Term::new("h", self.h.0, "ft"),
            ],
            Term::new("a", self.a.0, "ft"),
        )
    }
}

/// C&C zone dimension `a`:
/// `max(min(0.1 L_x, 0.1 L_y, 0.4 h), 0.04 min(L_x, L_y), 3 ft)`
pub fn candc_zone_dimension(l_x: Feet, l_y: Feet, h: Feet) -> ZoneDimension {
    let governing = (l_x * 0.1).min(l_y * 0.1).min(h * 0.4);
    let floor = (l_x.min(l_y) * 0.04).max(MIN_ZONE_DIMENSION);
    ZoneDimension {
        l_x,
        l_y,
        h,
        a: governing.max(floor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::units::MetersPerSecond;
    use approx::assert_relative_eq;

    fn catalog() -> &'static Catalog {
        Catalog::shared().unwrap()
    }

    #[test]
    fn test_topographic_factor_escarpment() {
        let site = TopographicSite::new("escarpment", Feet(500.0), Feet(1500.0), Feet(300.0), Feet(50.0))
            .with_exposure(Exposure::B);
        let result = topographic_factor(catalog(), &site).unwrap();
        assert_relative_eq!(result.k1, 0.25, epsilon = 1e-12);
        assert_relative_eq!(result.k2, 0.95, epsilon = 1e-12);
        assert_relative_eq!(result.k_zt, 1.484_767_957, epsilon = 1e-8);
    }

    #[test]
    fn test_topographic_factor_bounds_l_h() {
        // L_h < 2H, so L_h is taken as 2H
        let site = TopographicSite::new("hill", Feet(100.0), Feet(150.0), Feet(0.0), Feet(0.0))
            .with_exposure(Exposure::C)
            .with_location("upwind");
        let result = topographic_factor(catalog(), &site).unwrap();
        assert_eq!(result.l_h_bounded, Feet(200.0));
        assert_relative_eq!(result.k1, 1.05 * 0.5, epsilon = 1e-12);
        assert_relative_eq!(result.k_zt, (1.0_f64 + 0.525).powi(2), epsilon = 1e-12);
    }

    #[test]
    fn test_topographic_factor_flat_ground_is_one() {
        for feature in ["ridge", "escarpment", "hill"] {
            for exposure in [Exposure::B, Exposure::C, Exposure::D] {
                for location in ["upwind", "downwind"] {
                    let site = TopographicSite::new(feature, Feet(0.0), Feet(800.0), Feet(120.0), Feet(30.0))
                        .with_exposure(exposure)
                        .with_location(location);
                    assert_eq!(topographic_factor(catalog(), &site).unwrap().k_zt, 1.0);
                }
            }
        }

        let degenerate = TopographicSite::new("ridge", Feet(0.0), Feet(0.0), Feet(0.0), Feet(0.0));
        assert_eq!(topographic_factor(catalog(), &degenerate).unwrap().k_zt, 1.0);
    }

    #[test]
    fn test_topographic_factor_lookup_errors() {
        let site = TopographicSite::new("mesa", Feet(50.0), Feet(200.0), Feet(0.0), Feet(10.0));
        assert_eq!(topographic_factor(catalog(), &site).unwrap_err().kind(), ErrorKind::Lookup);

        let site = TopographicSite::new("hill", Feet(50.0), Feet(200.0), Feet(0.0), Feet(10.0)).with_location("crest");
        assert_eq!(topographic_factor(catalog(), &site).unwrap_err().kind(), ErrorKind::Lookup);
    }

    #[test]
    fn test_ground_elevation_factor() {
        assert_relative_eq!(ground_elevation_factor(Feet(500.0)).k_e, 0.982_062_821_2, epsilon = 1e-9);
        assert_eq!(ground_elevation_factor(Feet(0.0)).k_e, 1.0);
    }

    #[test]
    fn test_exposure_coefficient_values() {
        let k_10 = exposure_coefficient(Feet(10.0), Feet(2460.0), 9.8).unwrap();
        assert_relative_eq!(k_10.k_z, 0.851_153_901_1, epsilon = 1e-9);
        assert_eq!(k_10.z_used, Feet(15.0));

        let k_100 = exposure_coefficient(Feet(100.0), Feet(2460.0), 9.8).unwrap();
        assert_relative_eq!(k_100.k_z, 1.253_581_964, epsilon = 1e-8);

        let k_top = exposure_coefficient(Feet(3000.0), Feet(2460.0), 9.8).unwrap();
        assert_relative_eq!(k_top.k_z, 2.41, epsilon = 1e-12);
    }

    #[test]
    fn test_exposure_coefficient_constant_below_15_ft() {
        let k_5 = exposure_coefficient(Feet(5.0), Feet(3280.0), 7.5).unwrap();
        let k_15 = exposure_coefficient(Feet(15.0), Feet(3280.0), 7.5).unwrap();
        assert_eq!(k_5.k_z, k_15.k_z);
    }

    #[test]
    fn test_exposure_coefficient_non_decreasing() {
        let mut previous = 0.0;
        for z in (0..=3280).step_by(20) {
            let k_z = exposure_coefficient(Feet(z as f64), Feet(1935.0), 11.5).unwrap().k_z;
            assert!(k_z >= previous, "K_z decreased at z = {}", z);
            previous = k_z;
        }
    }

    #[test]
    fn test_exposure_coefficient_out_of_bounds() {
        let low = exposure_coefficient(Feet(-1.0), Feet(2460.0), 9.8).unwrap_err();
        assert_eq!(low.kind(), ErrorKind::Domain);
        let high = exposure_coefficient(Feet(4000.0), Feet(2460.0), 9.8).unwrap_err();
        assert_eq!(high.kind(), ErrorKind::Domain);
        assert!(exposure_coefficient(Feet(3280.0), Feet(2460.0), 9.8).is_ok());
    }

    #[test]
    fn test_velocity_pressure() {
        let q = velocity_pressure(1.21, 1.0, 0.96, Mph(110.0));
        assert_relative_eq!(q.q_z.0, 35.981_721_6, epsilon = 1e-7);
    }

    #[test]
    fn test_velocity_pressure_scales_with_square_of_speed() {
        let q1 = velocity_pressure(0.85, 1.1, 0.98, Mph(100.0)).q_z.0;
        let q2 = velocity_pressure(0.85, 1.1, 0.98, Mph(200.0)).q_z.0;
        assert_relative_eq!(q2, 4.0 * q1, epsilon = 1e-9);
    }

    #[test]
    fn test_velocity_pressure_converts_speed() {
        let mph = velocity_pressure(1.0, 1.0, 1.0, Mph(111.846_814_6)).q_z.0;
        let mps = velocity_pressure(1.0, 1.0, 1.0, MetersPerSecond(50.0)).q_z.0;
        assert_relative_eq!(mph, mps, epsilon = 1e-6);
    }

    #[test]
    fn test_gust_sub_equations() {
        let i_z = turbulence_intensity(0.3, Feet(45.0));
        assert_relative_eq!(i_z.i_z, 0.284_886_252_5, epsilon = 1e-9);

        let l_z = integral_length_scale(Feet(320.0), Feet(45.0), 1.0 / 3.0);
        assert_relative_eq!(l_z.l_z.0, 354.853_834_9, epsilon = 1e-6);

        let q = background_response(Feet(50.0), Feet(75.0), Feet(355.0));
        assert_relative_eq!(q.q, 0.868_285_927_7, epsilon = 1e-9);

        let g = gust_effect_factor(0.285, 0.868);
        assert_relative_eq!(g.g, 0.849_022_464_4, epsilon = 1e-9);
    }

    #[test]
    fn test_zone_dimension() {
        // 0.1 * min(60, 40) = 4 governs over 0.4 * 15 = 6
        let a = candc_zone_dimension(Feet(60.0), Feet(40.0), Feet(15.0));
        assert_eq!(a.a, Feet(4.0));

        // 3 ft floor
        let a = candc_zone_dimension(Feet(20.0), Feet(20.0), Feet(10.0));
        assert_eq!(a.a, Feet(3.0));

        // 0.04 * min(L_x, L_y) floor
        let a = candc_zone_dimension(Feet(400.0), Feet(300.0), Feet(20.0));
        assert_relative_eq!(a.a.0, 12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_traced_steps() {
        let step = ground_elevation_factor(Feet(500.0)).step();
        assert_eq!(step.equation, Equation::GroundElevationFactor);
        assert_eq!(step.result.symbol, "K_e");
        assert_eq!(step.terms[0].value, 500.0);
    }
}
