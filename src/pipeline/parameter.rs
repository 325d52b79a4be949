//! Parameter declaration surface.
//!
//! Each step lists its parameters as [`FilterParameter`] entries in display
//! order. Front ends read and write values by key without knowing how the
//! step stores them.

use serde::{Deserialize, Serialize};

use crate::data::path::DataArrayPath;
use crate::pipeline_error::PipelineError;

/// Role of a parameter in the step's data flow.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum ParameterCategory {
    /// Plain value that tunes the algorithm.
    Parameter,
    /// Path of an array the step reads.
    RequiredArray,
    /// Path or name of an array the step creates.
    CreatedArray,
    /// Anything else (labels, separators).
    Uncategorized,
}

/// Value of one parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Path(DataArrayPath),
    Vec3([f64; 3]),
}

impl ParameterValue {
    /// Name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParameterValue::Bool(_) => "bool",
            ParameterValue::Int(_) => "int",
            ParameterValue::Float(_) => "float",
            ParameterValue::Text(_) => "text",
            ParameterValue::Path(_) => "path",
            ParameterValue::Vec3(_) => "vec3",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer value; floats with no fractional part are accepted.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParameterValue::Int(i) => Some(*i),
            ParameterValue::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    /// Float value; integers widen.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParameterValue::Float(f) => Some(*f),
            ParameterValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParameterValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&DataArrayPath> {
        match self {
            ParameterValue::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<[f64; 3]> {
        match self {
            ParameterValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }
}

/// One declared parameter: display label, key, category and default value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterParameter {
    pub label: String,
    pub key: String,
    pub category: ParameterCategory,
    pub default: ParameterValue,
}

impl FilterParameter {
    pub fn new(
        label: impl Into<String>,
        key: impl Into<String>,
        category: ParameterCategory,
        default: ParameterValue,
    ) -> Self {
        Self {
            label: label.into(),
            key: key.into(),
            category,
            default,
        }
    }
}

/// Error for a `set_parameter` call with an unknown key.
pub fn unknown_key(key: &str) -> PipelineError {
    PipelineError::invalid_parameter(key, "unknown parameter key")
}

/// Error for a `set_parameter` call whose value has the wrong variant.
pub fn wrong_type(key: &str, expected: &str, value: &ParameterValue) -> PipelineError {
    PipelineError::invalid_parameter(
        key,
        format!("expected a {expected} value, got {}", value.type_name()),
    )
}
