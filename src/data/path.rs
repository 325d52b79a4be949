//! Three-part addresses: container / group / array.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::pipeline_error::PipelineError;

/// Address of an array inside a [`DataContainerRegistry`](crate::data::registry::DataContainerRegistry).
///
/// Displayed and parsed as `container/group/array`. Names may contain
/// spaces and dots, but not `/`.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DataArrayPath {
    pub container: String,
    pub group: String,
    pub array: String,
}

impl DataArrayPath {
    pub fn new(
        container: impl Into<String>,
        group: impl Into<String>,
        array: impl Into<String>,
    ) -> Self {
        Self {
            container: container.into(),
            group: group.into(),
            array: array.into(),
        }
    }

    /// Same container and group, different array name.
    pub fn with_array(&self, array: impl Into<String>) -> Self {
        Self {
            container: self.container.clone(),
            group: self.group.clone(),
            array: array.into(),
        }
    }

    /// True when all three parts are empty.
    pub fn is_empty(&self) -> bool {
        self.container.is_empty() && self.group.is_empty() && self.array.is_empty()
    }

    /// True when container and group are set (the array part may be empty).
    pub fn has_group(&self) -> bool {
        !self.container.is_empty() && !self.group.is_empty()
    }

    /// True when all three parts are set.
    pub fn is_complete(&self) -> bool {
        self.has_group() && !self.array.is_empty()
    }
}

impl fmt::Display for DataArrayPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.container, self.group, self.array)
    }
}

impl FromStr for DataArrayPath {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(c), Some(g), Some(a), None) => Ok(Self::new(c, g, a)),
            _ => Err(PipelineError::invalid_parameter(
                s,
                "expected `container/group/array`",
            )),
        }
    }
}
