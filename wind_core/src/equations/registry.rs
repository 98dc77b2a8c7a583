//! # Equation Registry
//!
//! Central registry of the ASCE 7-22 wind equations used by the derivation
//! engine. Each equation has metadata including its code reference, formula,
//! and variable definitions.
//!
//! ## Architecture
//!
//! The registry provides:
//! - Type-safe equation identification via the `Equation` enum
//! - Full metadata for derivation listings and audit trails
//! - A [`Derivation`] record that primitives append their steps to
//!
//! ## Usage
//!
//! ```rust
//! use wind_core::equations::registry::{Derivation, DerivationStep, Equation, Term};
//!
//! let mut derivation = Derivation::new();
//! derivation.push(DerivationStep::new(
//!     Equation::VelocityPressure,
//!     Some("h"),
//!     vec![Term::new("K_z", 0.85, ""), Term::new("V", 115.0, "mph")],
//!     Term::new("q_h", 24.5, "psf"),
//! ));
//!
//! let meta = Equation::VelocityPressure.metadata();
//! assert_eq!(meta.reference.citation(), "ASCE 7-22 Section 26.10.2");
//! assert!(derivation.to_markdown().contains("q_h = 24.5 psf"));
//! ```

use serde::{Deserialize, Serialize};

// ============================================================================
// Code References
// ============================================================================

/// Reference to the standard an equation comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeReference {
    /// ASCE 7 - Minimum Design Loads for Buildings
    ASCE7 {
        year: u16,
        section: &'static str,
    },
    /// Fundamental mathematics (no specific code reference needed)
    Mathematics,
}

impl CodeReference {
    /// Format the reference for display
    pub fn citation(&self) -> String {
        match self {
            CodeReference::ASCE7 { year, section } => {
                format!("ASCE 7-{} Section {}", year % 100, section)
            }
            CodeReference::Mathematics => "Linear Interpolation".to_string(),
        }
    }

    /// Short form for inline references
    pub fn short_form(&self) -> &'static str {
        match self {
            CodeReference::ASCE7 { .. } => "ASCE 7",
            CodeReference::Mathematics => "Math",
        }
    }
}

const fn asce7(section: &'static str) -> CodeReference {
    CodeReference::ASCE7 { year: 2022, section }
}

// ============================================================================
// Equation Categories
// ============================================================================

/// Categories for grouping equations in a derivation listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquationCategory {
    /// K_zt, K_e, K_z, q_z
    VelocityPressure,
    /// I_z̄, L_z̄, Q, G
    GustEffect,
    /// Zone dimension a
    Geometry,
    /// Interpolated coefficients
    Coefficients,
    /// Final design pressures
    DesignPressures,
}

impl EquationCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            EquationCategory::VelocityPressure => "Velocity Pressure",
            EquationCategory::GustEffect => "Gust Effect Factor",
            EquationCategory::Geometry => "Geometry",
            EquationCategory::Coefficients => "Pressure Coefficients",
            EquationCategory::DesignPressures => "Design Wind Pressures",
        }
    }
}

// ============================================================================
// Variable Definition
// ============================================================================

/// Definition of a variable used in an equation.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Symbol (e.g., "K_z", "V", "q_h")
    pub symbol: &'static str,
    pub description: &'static str,
    /// Units (e.g., "ft", "psf", "mph"), empty when dimensionless
    pub units: &'static str,
}

impl Variable {
    pub const fn new(symbol: &'static str, description: &'static str, units: &'static str) -> Self {
        Self { symbol, description, units }
    }
}

// ============================================================================
// Equation Metadata
// ============================================================================

/// Complete metadata for a wind equation.
#[derive(Debug, Clone)]
pub struct EquationMetadata {
    /// Human-readable name (e.g., "Velocity Pressure")
    pub name: &'static str,
    pub description: &'static str,
    /// The formula in plain text
    pub formula_plain: &'static str,
    /// Code/standard reference
    pub reference: CodeReference,
    pub variables: Vec<Variable>,
    pub category: EquationCategory,
    /// Function name implementing the equation
    pub source_function: &'static str,
}

// ============================================================================
// Equation Enum
// ============================================================================

/// All wind equations used by the derivation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Equation {
    // -------------------------------------------------------------------------
    // Velocity Pressure (Chapter 26)
    // -------------------------------------------------------------------------
    /// K_zt = (1 + K1 K2 K3)^2
    TopographicFactor,
    /// K_e = exp(-0.0000362 z_e)
    GroundElevationFactor,
    /// K_z = 2.41 (z/z_g)^(2/alpha)
    ExposureCoefficient,
    /// q_z = 0.00256 K_z K_zt K_e V^2
    VelocityPressure,

    // -------------------------------------------------------------------------
    // Gust Effect Factor (Section 26.11)
    // -------------------------------------------------------------------------
    /// I_z = c (33/z)^(1/6)
    TurbulenceIntensity,
    /// L_z = l (z/33)^epsilon
    IntegralLengthScale,
    /// Q = sqrt(1 / (1 + 0.63 ((B + h)/L_z)^0.63))
    BackgroundResponse,
    /// G = 0.925 (1 + 1.7 g_Q I_z Q) / (1 + 1.7 g_v I_z)
    GustEffectFactor,

    // -------------------------------------------------------------------------
    // Geometry and Coefficients
    // -------------------------------------------------------------------------
    /// a = max(min(0.1 L_x, 0.1 L_y, 0.4 h), 0.04 min(L_x, L_y), 3 ft)
    ZoneDimension,
    /// y3 = y1 + (y2 - y1)/(x2 - x1) (x3 - x1)
    LinearInterpolation,

    // -------------------------------------------------------------------------
    // Design Pressures
    // -------------------------------------------------------------------------
    /// p = q K_d G C_p + q_h K_d GC_pi
    MwfrsPressure,
    /// p = q_p K_d GC_pn
    MwfrsParapetPressure,
    /// p = q K_d (GC_p + GC_pi)
    CandCPressure,
    /// p = q K_d G C_n
    OpenBuildingCandCPressure,
    /// p = p_positive - p_negative
    CandCCompositePressure,
}

impl Equation {
    /// Get complete metadata for this equation
    pub fn metadata(&self) -> EquationMetadata {
        match self {
            Equation::TopographicFactor => EquationMetadata {
                name: "Topographic Factor",
                description: "Wind speed-up over isolated hills, ridges, and escarpments",
                formula_plain: "K_zt = (1 + K1*K2*K3)^2, K1 = k*H/L_h, K2 = 1 - |x|/(mu*L_h), K3 = exp(-gamma*z/L_h)",
                reference: asce7("26.8.2"),
                variables: vec![
                    Variable::new("H", "Height of hill or escarpment relative to upwind terrain", "ft"),
                    Variable::new("L_h", "Distance upwind of crest to where the difference in ground elevation is H/2", "ft"),
                    Variable::new("x", "Distance from the crest to the site", "ft"),
                    Variable::new("z", "Height above ground surface at the site", "ft"),
                    Variable::new("K_zt", "Topographic factor", ""),
                ],
                category: EquationCategory::VelocityPressure,
                source_function: "topographic_factor",
            },

            Equation::GroundElevationFactor => EquationMetadata {
                name: "Ground Elevation Factor",
                description: "Adjustment for air density at the site elevation",
                formula_plain: "K_e = exp(-0.0000362*z_e)",
                reference: asce7("26.9"),
                variables: vec![
                    Variable::new("z_e", "Ground elevation above sea level", "ft"),
                    Variable::new("K_e", "Ground elevation factor", ""),
                ],
                category: EquationCategory::VelocityPressure,
                source_function: "ground_elevation_factor",
            },

            Equation::ExposureCoefficient => EquationMetadata {
                name: "Velocity Pressure Exposure Coefficient",
                description: "Exposure coefficient at height z, with z taken no less than 15 ft",
                formula_plain: "K_z = 2.41*(z/z_g)^(2/alpha) for 15 ft <= z <= z_g",
                reference: asce7("26.10.1"),
                variables: vec![
                    Variable::new("z", "Height above ground", "ft"),
                    Variable::new("z_g", "Nominal height of the atmospheric boundary layer", "ft"),
                    Variable::new("alpha", "3-s gust speed power law exponent", ""),
                    Variable::new("K_z", "Velocity pressure exposure coefficient", ""),
                ],
                category: EquationCategory::VelocityPressure,
                source_function: "exposure_coefficient",
            },

            Equation::VelocityPressure => EquationMetadata {
                name: "Velocity Pressure",
                description: "Velocity pressure evaluated at height z",
                formula_plain: "q_z = 0.00256*K_z*K_zt*K_e*V^2",
                reference: asce7("26.10.2"),
                variables: vec![
                    Variable::new("K_z", "Velocity pressure exposure coefficient", ""),
                    Variable::new("K_zt", "Topographic factor", ""),
                    Variable::new("K_e", "Ground elevation factor", ""),
                    Variable::new("V", "Basic wind speed", "mph"),
                    Variable::new("q_z", "Velocity pressure", "psf"),
                ],
                category: EquationCategory::VelocityPressure,
                source_function: "velocity_pressure",
            },

            Equation::TurbulenceIntensity => EquationMetadata {
                name: "Intensity of Turbulence",
                description: "Turbulence intensity at the equivalent height of the structure",
                formula_plain: "I_z = c*(33/z)^(1/6)",
                reference: asce7("26.11.4"),
                variables: vec![
                    Variable::new("c", "Turbulence intensity factor from Table 26.11-1", ""),
                    Variable::new("z", "Equivalent height of the structure", "ft"),
                    Variable::new("I_z", "Intensity of turbulence", ""),
                ],
                category: EquationCategory::GustEffect,
                source_function: "turbulence_intensity",
            },

            Equation::IntegralLengthScale => EquationMetadata {
                name: "Integral Length Scale of Turbulence",
                description: "Integral length scale at the equivalent height of the structure",
                formula_plain: "L_z = l*(z/33)^epsilon",
                reference: asce7("26.11.4"),
                variables: vec![
                    Variable::new("l", "Integral length scale factor from Table 26.11-1", "ft"),
                    Variable::new("epsilon", "Integral length scale power law exponent", ""),
                    Variable::new("L_z", "Integral length scale of turbulence", "ft"),
                ],
                category: EquationCategory::GustEffect,
                source_function: "integral_length_scale",
            },

            Equation::BackgroundResponse => EquationMetadata {
                name: "Background Response",
                description: "Background response factor for a rigid building",
                formula_plain: "Q = sqrt(1/(1 + 0.63*((B + h)/L_z)^0.63))",
                reference: asce7("26.11.4"),
                variables: vec![
                    Variable::new("B", "Horizontal dimension normal to the wind direction", "ft"),
                    Variable::new("h", "Mean roof height", "ft"),
                    Variable::new("L_z", "Integral length scale of turbulence", "ft"),
                    Variable::new("Q", "Background response", ""),
                ],
                category: EquationCategory::GustEffect,
                source_function: "background_response",
            },

            Equation::GustEffectFactor => EquationMetadata {
                name: "Gust Effect Factor",
                description: "Gust effect factor for a rigid building or other structure",
                formula_plain: "G = 0.925*(1 + 1.7*g_Q*I_z*Q)/(1 + 1.7*g_v*I_z), g_Q = g_v = 3.4",
                reference: asce7("26.11.4"),
                variables: vec![
                    Variable::new("I_z", "Intensity of turbulence", ""),
                    Variable::new("Q", "Background response", ""),
                    Variable::new("G", "Gust effect factor", ""),
                ],
                category: EquationCategory::GustEffect,
                source_function: "gust_effect_factor",
            },

            Equation::ZoneDimension => EquationMetadata {
                name: "C&C Zone Dimension",
                description: "Width of the edge and corner zones for components and cladding",
                formula_plain: "a = max(min(0.1*L_x, 0.1*L_y, 0.4*h), 0.04*min(L_x, L_y), 3 ft)",
                reference: asce7("30.2"),
                variables: vec![
                    Variable::new("L_x", "Building length along x", "ft"),
                    Variable::new("L_y", "Building length along y", "ft"),
                    Variable::new("h", "Mean roof height", "ft"),
                    Variable::new("a", "Zone dimension", "ft"),
                ],
                category: EquationCategory::Geometry,
                source_function: "candc_zone_dimension",
            },

            Equation::LinearInterpolation => EquationMetadata {
                name: "Linear Interpolation",
                description: "Interpolation between tabulated coefficient values",
                formula_plain: "y3 = y1 + (y2 - y1)/(x2 - x1)*(x3 - x1)",
                reference: CodeReference::Mathematics,
                variables: vec![
                    Variable::new("x", "Tabulated parameter (L/B, h/L, or roof angle)", ""),
                    Variable::new("y", "Coefficient value", ""),
                ],
                category: EquationCategory::Coefficients,
                source_function: "linterp",
            },

            Equation::MwfrsPressure => EquationMetadata {
                name: "MWFRS Design Wind Pressure",
                description: "Design wind pressure on walls and roofs of enclosed buildings",
                formula_plain: "p = q*K_d*G*C_p + q_h*K_d*GC_pi",
                reference: asce7("27.3.1"),
                variables: vec![
                    Variable::new("q", "Velocity pressure (q_z, q_h, or q_p)", "psf"),
                    Variable::new("K_d", "Wind directionality factor", ""),
                    Variable::new("G", "Gust effect factor", ""),
                    Variable::new("C_p", "External pressure coefficient", ""),
                    Variable::new("GC_pi", "Internal pressure coefficient", ""),
                    Variable::new("p", "Design wind pressure", "psf"),
                ],
                category: EquationCategory::DesignPressures,
                source_function: "MainWindServer::get_load",
            },

            Equation::MwfrsParapetPressure => EquationMetadata {
                name: "MWFRS Parapet Pressure",
                description: "Combined net pressure on a parapet",
                formula_plain: "p_p = q_p*K_d*GC_pn",
                reference: asce7("27.3.4"),
                variables: vec![
                    Variable::new("q_p", "Velocity pressure at the top of the parapet", "psf"),
                    Variable::new("K_d", "Wind directionality factor", ""),
                    Variable::new("GC_pn", "Combined net pressure coefficient", ""),
                    Variable::new("p_p", "Parapet pressure", "psf"),
                ],
                category: EquationCategory::DesignPressures,
                source_function: "MainWindServer::get_load",
            },

            Equation::CandCPressure => EquationMetadata {
                name: "C&C Design Wind Pressure",
                description: "Design wind pressure on components and cladding of low-rise buildings",
                formula_plain: "p = q*K_d*(GC_p + GC_pi), GC_p = c1 + c2*log10(A)",
                reference: asce7("30.3.2"),
                variables: vec![
                    Variable::new("q", "Velocity pressure (q_h, q_p, or an explicit q_z)", "psf"),
                    Variable::new("K_d", "Wind directionality factor", ""),
                    Variable::new("GC_p", "External pressure coefficient", ""),
                    Variable::new("GC_pi", "Internal pressure coefficient", ""),
                    Variable::new("A", "Effective wind area", "ft²"),
                    Variable::new("p", "Design wind pressure", "psf"),
                ],
                category: EquationCategory::DesignPressures,
                source_function: "CandCServer::get_load",
            },

            Equation::OpenBuildingCandCPressure => EquationMetadata {
                name: "Open Building C&C Net Pressure",
                description: "Net design wind pressure on components and cladding of open buildings",
                formula_plain: "p = q*K_d*G*C_n",
                reference: asce7("30.7.1"),
                variables: vec![
                    Variable::new("q", "Velocity pressure (q_h unless overridden)", "psf"),
                    Variable::new("K_d", "Wind directionality factor", ""),
                    Variable::new("G", "Gust effect factor", ""),
                    Variable::new("C_n", "Net pressure coefficient", ""),
                    Variable::new("p", "Net design wind pressure", "psf"),
                ],
                category: EquationCategory::DesignPressures,
                source_function: "CandCServer::get_load",
            },

            Equation::CandCCompositePressure => EquationMetadata {
                name: "C&C Combined Pressure",
                description: "Net pressure on an element loaded on both faces (e.g., parapets)",
                formula_plain: "p = p_positive - p_negative",
                reference: asce7("30.8"),
                variables: vec![
                    Variable::new("p_positive", "Pressure on the near face", "psf"),
                    Variable::new("p_negative", "Pressure on the far face", "psf"),
                    Variable::new("p", "Net design wind pressure", "psf"),
                ],
                category: EquationCategory::DesignPressures,
                source_function: "CandCServer::get_load",
            },
        }
    }

    /// Get all equations in a given category
    pub fn in_category(category: EquationCategory) -> Vec<Equation> {
        ALL_EQUATIONS
            .iter()
            .filter(|eq| eq.metadata().category == category)
            .copied()
            .collect()
    }
}

/// All registered equations, in derivation order
pub static ALL_EQUATIONS: &[Equation] = &[
    Equation::TopographicFactor,
    Equation::GroundElevationFactor,
    Equation::ExposureCoefficient,
    Equation::VelocityPressure,
    Equation::TurbulenceIntensity,
    Equation::IntegralLengthScale,
    Equation::BackgroundResponse,
    Equation::GustEffectFactor,
    Equation::ZoneDimension,
    Equation::LinearInterpolation,
    Equation::MwfrsPressure,
    Equation::MwfrsParapetPressure,
    Equation::CandCPressure,
    Equation::OpenBuildingCandCPressure,
    Equation::CandCCompositePressure,
];

// ============================================================================
// Derivation Records
// ============================================================================

/// A named numeric value appearing in a derivation step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub symbol: String,
    pub value: f64,
    /// Unit symbol, empty when dimensionless
    pub units: String,
}

impl Term {
    pub fn new(symbol: impl Into<String>, value: f64, units: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            value,
            units: units.into(),
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.units.is_empty() {
            write!(f, "{} = {}", self.symbol, self.value)
        } else {
            write!(f, "{} = {} {}", self.symbol, self.value, self.units)
        }
    }
}

/// One application of an equation: its inputs and its result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivationStep {
    pub equation: Equation,
    /// Where the equation was applied (e.g., "h", "x-axis windward")
    pub subscript: Option<String>,
    pub terms: Vec<Term>,
    pub result: Term,
}

impl DerivationStep {
    pub fn new(equation: Equation, subscript: Option<&str>, terms: Vec<Term>, result: Term) -> Self {
        Self {
            equation,
            subscript: subscript.map(str::to_string),
            terms,
            result,
        }
    }

    /// Same step, relabelled
    pub fn with_subscript(mut self, subscript: impl Into<String>) -> Self {
        self.subscript = Some(subscript.into());
        self
    }
}

/// Ordered list of steps that produced a set of values.
///
/// Collected by the wind-input aggregator and the pressure servers so a
/// rendering layer can typeset the calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Derivation {
    steps: Vec<DerivationStep>,
}

impl Derivation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a step
    pub fn push(&mut self, step: DerivationStep) {
        self.steps.push(step);
    }

    /// Record the step of a traced result and return the result
    pub fn record<T: Traced>(&mut self, result: T) -> T {
        self.steps.push(result.step());
        result
    }

    pub fn steps(&self) -> &[DerivationStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Append all steps of another derivation
    pub fn merge(&mut self, other: Derivation) {
        self.steps.extend(other.steps);
    }

    /// Last step for the given equation, if any
    pub fn find(&self, equation: Equation) -> Option<&DerivationStep> {
        self.steps.iter().rev().find(|s| s.equation == equation)
    }

    /// Plain-text listing of every step with its formula and reference
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        for step in &self.steps {
            let meta = step.equation.metadata();
            match &step.subscript {
                Some(subscript) => output.push_str(&format!("### {} ({})\n\n", meta.name, subscript)),
                None => output.push_str(&format!("### {}\n\n", meta.name)),
            }
            output.push_str(&format!("**Formula:** `{}`\n\n", meta.formula_plain));
            output.push_str(&format!("**Reference:** {}\n\n", meta.reference.citation()));

            for term in &step.terms {
                output.push_str(&format!("- {}\n", term));
            }
            output.push_str(&format!("- **{}**\n\n", step.result));
        }

        output
    }
}

/// Results that can describe how they were computed
pub trait Traced {
    fn step(&self) -> DerivationStep;
}
