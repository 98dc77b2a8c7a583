//! # wind_core - ASCE 7-22 Wind Load Engine
//!
//! `wind_core` derives design wind pressures per ASCE 7-22 Chapters 26, 27,
//! and 30. Every result type is JSON-serializable, and each calculation can
//! report the equations that produced it.
//!
//! ## Design Philosophy
//!
//! - **Stateless primitives**: velocity-pressure functions take inputs and return results
//! - **Immutable servers**: coefficient tables are resolved once, then only queried
//! - **Rich Errors**: Structured error types, not just strings
//! - **Traceable**: Results carry the derivation steps behind them
//!
//! ## Quick Start
//!
//! ```rust
//! use wind_core::catalog::Catalog;
//! use wind_core::units::{Feet, Mph, SqFt};
//! use wind_core::wind::{Axis, BuildingType, Element, Exposure};
//! use wind_core::wind::candc::{CandCServer, LoadQuery};
//! use wind_core::wind::inputs::{calc_wind_server_inputs, SiteInputs};
//! use wind_core::wind::mwfrs::MainWindServer;
//!
//! let catalog = Catalog::shared().unwrap();
//! let site = SiteInputs::new(Mph(115.0), Exposure::C, BuildingType::LowRise, Feet(60.0), Feet(40.0), Feet(15.0));
//! let inputs = calc_wind_server_inputs(&site, catalog).unwrap();
//!
//! let mwfrs = MainWindServer::from_inputs(&inputs, catalog).unwrap();
//! let side = mwfrs.get_load(Axis::X, Element::Wall, "side").unwrap();
//!
//! let candc = CandCServer::from_inputs(&inputs, catalog).unwrap();
//! let corner = candc.get_load("5-", SqFt(20.0), &LoadQuery::new()).unwrap();
//! assert!(corner.0 < side.p1.0);
//! ```
//!
//! ## Modules
//!
//! - [`wind`] - Velocity pressure, wind inputs, MWFRS and C&C servers
//! - [`catalog`] - Embedded ASCE coefficient tables
//! - [`interpolate`] - Linear interpolation of values and coefficient records
//! - [`equations`] - Equation registry and derivation records
//! - [`units`] - Type-safe unit wrappers and unit-tagged quantities
//! - [`errors`] - Structured error types

pub mod catalog;
pub mod equations;
pub mod errors;
pub mod interpolate;
pub mod units;
pub mod wind;

// Re-export commonly used types at crate root for convenience
pub use catalog::Catalog;
pub use equations::{Derivation, Equation};
pub use errors::{CalcError, CalcResult, ErrorKind};
pub use wind::candc::{CandCServer, LoadQuery};
pub use wind::inputs::{calc_wind_server_inputs, SiteInputs, WindInputs};
pub use wind::mwfrs::{MainWindServer, PressurePair};
