//! # Wind Equations
//!
//! Metadata for every ASCE 7-22 equation the derivation engine applies,
//! plus the [`Derivation`] record that collects how each value was reached.
//! Keeping the equations in one place enables:
//! - Easy verification against the code sections they cite
//! - A consistent derivation listing across primitives and servers
//!
//! ## Modules
//!
//! - [`registry`] - Equation metadata, derivation steps, and the `Traced` trait
//!
//! ## Sign Conventions
//!
//! - **Pressures**: Positive toward the surface, negative (suction) away from it
//! - **GC_pi**: Applied with the sign of the external coefficient, so internal
//!   pressure always increases the magnitude of the net pressure
//!
//! ## References
//!
//! - ASCE 7-22: Minimum Design Loads and Associated Criteria for Buildings
//!   and Other Structures, Chapters 26, 27, and 30

pub mod registry;

pub use registry::{
    CodeReference,
    Derivation,
    DerivationStep,
    Equation,
    EquationCategory,
    EquationMetadata,
    Term,
    Traced,
    Variable,
    ALL_EQUATIONS,
};
