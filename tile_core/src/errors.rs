//! # Error Types
//!
//! Structured error types for tile_core. Errors carry enough context for a
//! form front end to point the user at the offending field, and serialize to
//! JSON for machine consumers.
//!
//! Two families matter to callers:
//!
//! - **Invalid input** (`InvalidInput`, `UnknownOption`, `MissingField`):
//!   raised while building a [`JobSpec`](crate::job::JobSpec), before any
//!   estimation runs.
//! - **Render errors** (`RenderFailed`, `MissingAsset`): the method statement
//!   could not be produced. No partial document is returned.
//!
//! ## Example
//!
//! ```rust
//! use tile_core::errors::{TileError, TileResult};
//!
//! fn validate_area(area_m2: f64) -> TileResult<()> {
//!     if area_m2 <= 0.0 {
//!         return Err(TileError::InvalidInput {
//!             field: "area_m2".to_string(),
//!             value: area_m2.to_string(),
//!             reason: "Area must be positive".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_area(0.0).unwrap_err().is_invalid_input());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for tile_core operations
pub type TileResult<T> = Result<T, TileError>;

/// Structured error type for estimation and rendering.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum TileError {
    /// An input value is invalid (out of range, not finite, too long)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// An enumerated field received a value outside its recognized set
    #[error("Unknown {field} '{value}' (expected one of: {expected})")]
    UnknownOption {
        field: String,
        value: String,
        expected: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Typst compilation or PDF export failed
    #[error("Render failed during {stage}: {reason}")]
    RenderFailed { stage: String, reason: String },

    /// A font or branding asset required by the template is unavailable
    #[error("Required asset unavailable: {asset}")]
    MissingAsset { asset: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Job file schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl TileError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        TileError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnknownOption error, listing the accepted values
    pub fn unknown_option(field: impl Into<String>, value: impl Into<String>, expected: &[&str]) -> Self {
        TileError::UnknownOption {
            field: field.into(),
            value: value.into(),
            expected: expected.join(", "),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        TileError::MissingField {
            field: field.into(),
        }
    }

    /// Create a RenderFailed error
    pub fn render_failed(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        TileError::RenderFailed {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingAsset error
    pub fn missing_asset(asset: impl Into<String>) -> Self {
        TileError::MissingAsset {
            asset: asset.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        TileError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        TileError::SerializationError {
            reason: reason.into(),
        }
    }

    /// True for errors that reject the job before the core runs
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            TileError::InvalidInput { .. } | TileError::UnknownOption { .. } | TileError::MissingField { .. }
        )
    }

    /// True for errors raised by the document renderer
    pub fn is_render_error(&self) -> bool {
        matches!(self, TileError::RenderFailed { .. } | TileError::MissingAsset { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            TileError::InvalidInput { .. } => "INVALID_INPUT",
            TileError::UnknownOption { .. } => "UNKNOWN_OPTION",
            TileError::MissingField { .. } => "MISSING_FIELD",
            TileError::RenderFailed { .. } => "RENDER_FAILED",
            TileError::MissingAsset { .. } => "MISSING_ASSET",
            TileError::FileError { .. } => "FILE_ERROR",
            TileError::SerializationError { .. } => "SERIALIZATION_ERROR",
            TileError::VersionMismatch { .. } => "VERSION_MISMATCH",
            TileError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = TileError::invalid_input("area_m2", "-5", "Area must be positive");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: TileError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(TileError::missing_field("area_m2").error_code(), "MISSING_FIELD");
        assert_eq!(TileError::missing_asset("logo").error_code(), "MISSING_ASSET");
    }

    #[test]
    fn test_error_families() {
        let unknown = TileError::unknown_option("substrate", "carpet", &["concrete", "plywood"]);
        assert!(unknown.is_invalid_input());
        assert!(!unknown.is_render_error());
        assert_eq!(
            unknown.to_string(),
            "Unknown substrate 'carpet' (expected one of: concrete, plywood)"
        );

        let render = TileError::render_failed("compile", "unexpected token");
        assert!(render.is_render_error());
        assert!(!render.is_invalid_input());
    }
}
