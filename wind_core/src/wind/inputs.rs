//! # Wind Server Inputs
//!
//! Chapter 26 quantities shared by [`MainWindServer`](super::mwfrs::MainWindServer)
//! and [`CandCServer`](super::candc::CandCServer): ground elevation factor,
//! velocity pressures at roof and parapet height, gust effect factors for
//! both axes, and the C&C zone dimension `a`.
//!
//! The gust effect factor follows Section 26.11.4 for rigid buildings
//! (fundamental frequency of at least 1 Hz). Low-rise buildings may be
//! treated as rigid per Section 26.11.2; confirming that a rigid analysis
//! applies is left to the caller.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::equations::{Derivation, Traced};
use crate::errors::CalcResult;
use crate::units::{Feet, Mph, Psf};
use crate::wind::config::{DEFAULT_GC_PI, DEFAULT_K_D, DEFAULT_K_ZT, DEFAULT_ROOF_ANGLE, DEFAULT_ROOF_TYPE};
use crate::wind::velocity::{
    background_response, candc_zone_dimension, exposure_coefficient, ground_elevation_factor,
    gust_effect_factor, integral_length_scale, turbulence_intensity, velocity_pressure,
};
use crate::wind::{require_positive, Axis, BuildingType, Exposure};

/// Raw site and geometry inputs.
///
/// Defaults: flat roof at 0°, `K_d = 0.85`, `K_zt = 1`, sea-level ground
/// elevation, and `GC_pi = 0.18` (enclosed building).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteInputs {
    /// Basic wind speed
    #[serde(rename = "V")]
    pub v: Mph,
    pub exposure: Exposure,
    pub building_type: BuildingType,
    /// Maximum plan length along x
    #[serde(rename = "L_x")]
    pub l_x: Feet,
    /// Maximum plan length along y
    #[serde(rename = "L_y")]
    pub l_y: Feet,
    /// Mean roof height
    pub h: Feet,
    pub roof_type: String,
    /// Roof angle in degrees
    pub roof_angle: f64,
    pub ridge_axis: Option<Axis>,
    /// Wind directionality factor (Table 26.6-1)
    #[serde(rename = "K_d")]
    pub k_d: f64,
    /// Topographic factor (Fig. 26.8-1)
    #[serde(rename = "K_zt")]
    pub k_zt: f64,
    /// Ground elevation above sea level
    #[serde(rename = "Z_e")]
    pub z_e: Feet,
    /// Internal pressure coefficient (Table 26.13-1)
    #[serde(rename = "GC_pi")]
    pub gc_pi: f64,
    /// Parapet height, needed for parapet and q_p based loads
    pub h_p: Option<Feet>,
    /// Eave height, needed for canopy loads
    pub h_e: Option<Feet>,
    /// Canopy height, needed for canopy loads
    pub h_c: Option<Feet>,
}

impl SiteInputs {
    pub fn new(v: Mph, exposure: Exposure, building_type: BuildingType, l_x: Feet, l_y: Feet, h: Feet) -> Self {
        Self {
            v,
            exposure,
            building_type,
            l_x,
            l_y,
            h,
            roof_type: DEFAULT_ROOF_TYPE.to_string(),
            roof_angle: DEFAULT_ROOF_ANGLE,
            ridge_axis: None,
            k_d: DEFAULT_K_D,
            k_zt: DEFAULT_K_ZT,
            z_e: Feet(0.0),
            gc_pi: DEFAULT_GC_PI,
            h_p: None,
            h_e: None,
            h_c: None,
        }
    }

    pub fn with_roof(mut self, roof_type: impl Into<String>, roof_angle: f64, ridge_axis: Option<Axis>) -> Self {
        self.roof_type = roof_type.into();
        self.roof_angle = roof_angle;
        self.ridge_axis = ridge_axis;
        self
    }

    pub fn with_parapet(mut self, h_p: Feet) -> Self {
        self.h_p = Some(h_p);
        self
    }

    pub fn with_canopy(mut self, h_e: Feet, h_c: Feet) -> Self {
        self.h_e = Some(h_e);
        self.h_c = Some(h_c);
        self
    }
}

/// Resolved per-building quantities consumed by both servers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindInputs {
    #[serde(rename = "V")]
    pub v: Mph,
    pub exposure: Exposure,
    pub building_type: BuildingType,
    pub roof_type: String,
    pub roof_angle: f64,
    pub ridge_axis: Option<Axis>,
    #[serde(rename = "L_x")]
    pub l_x: Feet,
    #[serde(rename = "L_y")]
    pub l_y: Feet,
    pub h: Feet,
    #[serde(rename = "K_d")]
    pub k_d: f64,
    #[serde(rename = "K_zt")]
    pub k_zt: f64,
    #[serde(rename = "K_e")]
    pub k_e: f64,
    #[serde(rename = "GC_pi")]
    pub gc_pi: f64,
    pub h_e: Option<Feet>,
    pub h_c: Option<Feet>,
    pub z_g: Feet,
    pub alpha: f64,
    /// Velocity pressure at mean roof height
    pub q_h: Psf,
    /// Velocity pressure at parapet height
    pub q_p: Option<Psf>,
    /// Gust effect factor for wind along x
    #[serde(rename = "G_x")]
    pub g_x: f64,
    /// Gust effect factor for wind along y
    #[serde(rename = "G_y")]
    pub g_y: f64,
    /// C&C zone dimension
    pub a: Feet,
    /// Steps that produced these values
    pub derivation: Derivation,
}

/// Derive the inputs for the MWFRS and C&C servers from raw site data
pub fn calc_wind_server_inputs(site: &SiteInputs, catalog: &Catalog) -> CalcResult<WindInputs> {
    require_positive("L_x", site.l_x)?;
    require_positive("L_y", site.l_y)?;
    require_positive("h", site.h)?;

    let constants = catalog.exposure_constants(site.exposure.code())?;
    let mut derivation = Derivation::new();

    // Table 26.9-1
    let k_e = derivation.record(ground_elevation_factor(site.z_e)).k_e;

    // Velocity pressure at the roof and, when given, at the parapet
    let k_h = exposure_coefficient(site.h, constants.z_g, constants.alpha)?;
    derivation.push(k_h.step().with_subscript("h"));
    let q_h = velocity_pressure(k_h.k_z, site.k_zt, k_e, site.v);
    derivation.push(q_h.step().with_subscript("h"));

    let q_p = match site.h_p {
        Some(h_p) => {
            let k_p = exposure_coefficient(h_p, constants.z_g, constants.alpha)?;
            derivation.push(k_p.step().with_subscript("p"));
            let q_p = velocity_pressure(k_p.k_z, site.k_zt, k_e, site.v);
            derivation.push(q_p.step().with_subscript("p"));
            Some(q_p.q_z)
        }
        None => None,
    };

    // Gust effect factor (Section 26.11.4), background response uses the
    // dimension normal to the wind
    let z_bar = (site.h * 0.6).max(constants.z_min);
    let l_z = derivation.record(integral_length_scale(constants.l, z_bar, constants.epsilon_bar)).l_z;
    let i_z = derivation.record(turbulence_intensity(constants.c, z_bar)).i_z;

    let q_x = background_response(site.l_y, site.h, l_z);
    derivation.push(q_x.step().with_subscript("x"));
    let g_x = gust_effect_factor(i_z, q_x.q);
    derivation.push(g_x.step().with_subscript("x"));

    let q_y = background_response(site.l_x, site.h, l_z);
    derivation.push(q_y.step().with_subscript("y"));
    let g_y = gust_effect_factor(i_z, q_y.q);
    derivation.push(g_y.step().with_subscript("y"));

    let a = derivation.record(candc_zone_dimension(site.l_x, site.l_y, site.h)).a;

    tracing::debug!(
        "Wind inputs for {} ({}): q_h = {:.3} psf, G_x = {:.4}, G_y = {:.4}, a = {:.2} ft",
        site.building_type,
        site.exposure,
        q_h.q_z.0,
        g_x.g,
        g_y.g,
        a.0
    );

    Ok(WindInputs {
        v: site.v,
        exposure: site.exposure,
        building_type: site.building_type,
        roof_type: site.roof_type.clone(),
        roof_angle: site.roof_angle,
        ridge_axis: site.ridge_axis,
        l_x: site.l_x,
        l_y: site.l_y,
        h: site.h,
        k_d: site.k_d,
        k_zt: site.k_zt,
        k_e,
        gc_pi: site.gc_pi,
        h_e: site.h_e,
        h_c: site.h_c,
        z_g: constants.z_g,
        alpha: constants.alpha,
        q_h: q_h.q_z,
        q_p,
        g_x: g_x.g,
        g_y: g_y.g,
        a,
        derivation,
    })
}
