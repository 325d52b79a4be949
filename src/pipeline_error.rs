//! PipelineError: unified error type for grainflow public APIs
//!
//! Library functions return `Result<_, PipelineError>`. Pipeline steps never
//! let these escape the dry-run / execute boundary; they are folded into the
//! polled [`StepStatus`](crate::pipeline::step::StepStatus) as a signed code
//! plus message, see [`PipelineError::code`].

use thiserror::Error;

use crate::data::scalar::ScalarType;

/// Error code recorded when a required path is missing or has the wrong type/shape.
pub const MISSING_PREREQUISITE: i32 = -11001;
/// Error code recorded when a parameter value is outside its valid domain.
pub const INVALID_PARAMETER: i32 = -11002;
/// Error code recorded when co-dependent arrays disagree in tuple count.
pub const TUPLE_COUNT_MISMATCH: i32 = -11003;
/// Error code recorded on registry or group key collision.
pub const DUPLICATE_NAME: i32 = -11004;
/// Error code recorded when a lookup by name or path fails.
pub const NOT_FOUND: i32 = -11005;
/// Error code recorded when typed access disagrees with the stored tag.
pub const TYPE_MISMATCH: i32 = -11006;
/// Error code recorded for impossible array shapes.
pub const INVALID_SHAPE: i32 = -11007;
/// Error code recorded for malformed geometry.
pub const INVALID_GEOMETRY: i32 = -11008;
/// Error code recorded when execution observed a cancellation request.
pub const CANCELLED: i32 = -1;
/// Catch-all code for unexpected internal failures.
pub const GENERIC: i32 = -99_999_999;

/// Unified error type for grainflow operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    /// An array shape cannot be represented (zero components, size overflow,
    /// tuple index out of range).
    #[error("Invalid array shape: {0}")]
    InvalidShape(String),
    /// Typed access requested a different element type than the one stored.
    #[error("Type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch {
        expected: ScalarType,
        found: ScalarType,
    },
    /// Arrays that must co-vary disagree in tuple count.
    #[error("Tuple count mismatch: expected {expected}, found {found} (paths: {paths:?})")]
    TupleCountMismatch {
        expected: usize,
        found: usize,
        paths: Vec<String>,
    },
    /// A required path did not resolve, or resolved to the wrong type/shape.
    #[error("Missing prerequisite `{path}`: {reason}")]
    MissingPrerequisite { path: String, reason: String },
    /// A declared parameter value is outside its valid domain.
    #[error("Invalid parameter `{key}`: {reason}")]
    InvalidParameter { key: String, reason: String },
    /// A container, group or array name is already taken.
    #[error("Duplicate name `{0}`")]
    DuplicateName(String),
    /// A container, group or array lookup failed.
    #[error("Not found: `{0}`")]
    NotFound(String),
    /// Vertex coordinates or connectivity are inconsistent.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    /// Execution stopped after a cancellation request.
    #[error("Cancelled")]
    Cancelled,
    /// Unexpected internal failure.
    #[error("{0}")]
    Generic(String),
}

impl PipelineError {
    /// Signed status code for this error (always negative).
    pub fn code(&self) -> i32 {
        match self {
            PipelineError::InvalidShape(_) => INVALID_SHAPE,
            PipelineError::TypeMismatch { .. } => TYPE_MISMATCH,
            PipelineError::TupleCountMismatch { .. } => TUPLE_COUNT_MISMATCH,
            PipelineError::MissingPrerequisite { .. } => MISSING_PREREQUISITE,
            PipelineError::InvalidParameter { .. } => INVALID_PARAMETER,
            PipelineError::DuplicateName(_) => DUPLICATE_NAME,
            PipelineError::NotFound(_) => NOT_FOUND,
            PipelineError::InvalidGeometry(_) => INVALID_GEOMETRY,
            PipelineError::Cancelled => CANCELLED,
            PipelineError::Generic(_) => GENERIC,
        }
    }

    /// Shorthand for [`PipelineError::InvalidParameter`].
    pub fn invalid_parameter(key: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::InvalidParameter {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`PipelineError::MissingPrerequisite`].
    pub fn missing(path: impl ToString, reason: impl Into<String>) -> Self {
        PipelineError::MissingPrerequisite {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
