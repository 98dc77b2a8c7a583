//! # Error Types
//!
//! Structured error types for wind_core. Every failure in the wind
//! procedures falls into one of four categories (see [`ErrorKind`]):
//!
//! - **Domain** - an input is outside the range the code procedure covers
//!   (elevation above 3280 ft, roof angle above the tabulated ceiling, ...)
//! - **Configuration** - construction input is missing or contradictory
//! - **NotSupported** - a recognized variant that is not implemented yet
//! - **Lookup** - a catalog key is absent
//!
//! ## Example
//!
//! ```rust
//! use wind_core::errors::{CalcError, CalcResult, ErrorKind};
//!
//! fn validate_angle(roof_angle: f64) -> CalcResult<()> {
//!     if roof_angle > 45.0 {
//!         return Err(CalcError::out_of_domain(
//!             "roof_angle",
//!             roof_angle.to_string(),
//!             "Roof slope greater than 45 degrees",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! let err = validate_angle(50.0).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Domain);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for wind_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for wind load derivations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is outside the range covered by the procedure
    #[error("Out of domain for '{quantity}': {value} - {reason}")]
    OutOfDomain {
        quantity: String,
        value: String,
        reason: String,
    },

    /// Construction input is contradictory or unsupported
    #[error("Configuration error for '{field}': {reason}")]
    Configuration { field: String, reason: String },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Recognized but unimplemented variant
    #[error("Not supported: {feature}")]
    NotSupported { feature: String },

    /// Key not found in a coefficient catalog
    #[error("Key '{key}' not found in {catalog}")]
    KeyNotFound { catalog: String, key: String },

    /// File I/O error while reading a catalog or configuration file
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON/CSV parse error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

/// Error category used by callers deciding how to react to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Input outside the procedure's valid range
    Domain,
    /// Missing or contradictory construction input
    Configuration,
    /// Recognized but unimplemented variant
    NotSupported,
    /// Catalog key absent
    Lookup,
}

impl CalcError {
    /// Create an OutOfDomain error
    pub fn out_of_domain(quantity: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::OutOfDomain {
            quantity: quantity.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a Configuration error
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::Configuration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a NotSupported error
    pub fn not_supported(feature: impl Into<String>) -> Self {
        CalcError::NotSupported {
            feature: feature.into(),
        }
    }

    /// Create a KeyNotFound error
    pub fn key_not_found(catalog: impl Into<String>, key: impl Into<String>) -> Self {
        CalcError::KeyNotFound {
            catalog: catalog.into(),
            key: key.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        CalcError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::OutOfDomain { .. } => ErrorKind::Domain,
            CalcError::Configuration { .. }
            | CalcError::MissingField { .. }
            | CalcError::FileError { .. }
            | CalcError::SerializationError { .. } => ErrorKind::Configuration,
            CalcError::NotSupported { .. } => ErrorKind::NotSupported,
            CalcError::KeyNotFound { .. } => ErrorKind::Lookup,
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::OutOfDomain { .. } => "OUT_OF_DOMAIN",
            CalcError::Configuration { .. } => "CONFIGURATION",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::NotSupported { .. } => "NOT_SUPPORTED",
            CalcError::KeyNotFound { .. } => "KEY_NOT_FOUND",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::serialization(e.to_string())
    }
}
