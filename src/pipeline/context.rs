//! Borrowed registry views handed to a step for the length of one call.
//!
//! [`DryRunContext`] only exposes shapes: requiring, validating and
//! reserving arrays. It never hands out an array, so a dry run cannot read
//! or write contents. It also remembers which paths the step read and
//! reserved, and refuses a reservation that would land on either. [`ExecuteContext`] grants full registry access plus
//! the status channel and cancellation polling.

use crate::data::attribute_group::GroupKind;
use crate::data::path::DataArrayPath;
use crate::data::registry::DataContainerRegistry;
use crate::data::scalar::ScalarType;
use crate::data::typed_array::ArrayShape;
use crate::geometry::GeometryKind;
use crate::pipeline::observer::{CancellationToken, PipelineObserver, StepMessage};
use crate::pipeline::runner::RunnerConfig;
use crate::pipeline::step::StepWarning;
use crate::pipeline_error::PipelineError;

/// Shape summary of a container's geometry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GeometryShape {
    pub kind: GeometryKind,
    pub vertices: usize,
    pub elements: usize,
}

/// Shape of an attribute group.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GroupShape {
    pub kind: GroupKind,
    pub tuples: usize,
}

/// Shape-only registry access used during a dry run.
pub struct DryRunContext<'a> {
    registry: &'a mut DataContainerRegistry,
    observer: &'a dyn PipelineObserver,
    step: &'a str,
    inputs: Vec<DataArrayPath>,
    outputs: Vec<DataArrayPath>,
    pub(crate) warnings: Vec<StepWarning>,
}

impl<'a> DryRunContext<'a> {
    pub fn new(
        registry: &'a mut DataContainerRegistry,
        observer: &'a dyn PipelineObserver,
        step: &'a str,
    ) -> Self {
        Self {
            registry,
            observer,
            step,
            inputs: Vec::new(),
            outputs: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn note_input(&mut self, path: &DataArrayPath) {
        if !self.inputs.contains(path) {
            self.inputs.push(path.clone());
        }
    }

    /// Record `path` as created by this step.
    ///
    /// # Errors
    /// `InvalidParameter` if the step already read or reserved `path`.
    fn claim_output(&mut self, path: &DataArrayPath) -> Result<(), PipelineError> {
        if self.inputs.contains(path) {
            return Err(PipelineError::invalid_parameter(
                path.to_string(),
                "created array would overwrite an input of the same step",
            ));
        }
        if self.outputs.contains(path) {
            return Err(PipelineError::invalid_parameter(
                path.to_string(),
                "two outputs of the same step share this path",
            ));
        }
        self.outputs.push(path.clone());
        Ok(())
    }

    /// See [`DataContainerRegistry::require_array`].
    pub fn require_array(
        &mut self,
        path: &DataArrayPath,
        scalar_type: ScalarType,
        components: Option<usize>,
    ) -> Result<ArrayShape, PipelineError> {
        self.note_input(path);
        self.registry.require_array(path, scalar_type, components)
    }

    /// Shape of the array at `path` whatever its type.
    pub fn array_shape(&mut self, path: &DataArrayPath) -> Result<ArrayShape, PipelineError> {
        self.note_input(path);
        self.registry
            .resolve(path)
            .map(|a| a.shape())
            .map_err(|e| PipelineError::missing(path, e.to_string()))
    }

    /// Kind and tuple count of the group named by `path`.
    pub fn require_group(&self, path: &DataArrayPath) -> Result<GroupShape, PipelineError> {
        let group = self
            .registry
            .resolve_group(path)
            .map_err(|e| {
                PipelineError::missing(
                    format!("{}/{}", path.container, path.group),
                    e.to_string(),
                )
            })?;
        Ok(GroupShape {
            kind: group.kind(),
            tuples: group.tuple_count(),
        })
    }

    /// See [`DataContainerRegistry::validate_tuple_counts`]; a path that does
    /// not resolve is a missing prerequisite here.
    pub fn validate_tuple_counts(&mut self, paths: &[DataArrayPath]) -> Result<usize, PipelineError> {
        for path in paths {
            self.note_input(path);
        }
        self.registry.validate_tuple_counts(paths).map_err(|e| match e {
            PipelineError::NotFound(p) => PipelineError::missing(p, "path does not resolve"),
            other => other,
        })
    }

    /// See [`DataContainerRegistry::reserve_array`]. Fails with
    /// `InvalidParameter` when `path` was already read or reserved by this
    /// step.
    pub fn reserve_array(
        &mut self,
        path: &DataArrayPath,
        scalar_type: ScalarType,
        components: usize,
    ) -> Result<ArrayShape, PipelineError> {
        self.claim_output(path)?;
        self.registry.reserve_array(path, scalar_type, components)
    }

    /// See [`DataContainerRegistry::reserve_list`]; same collision rule as
    /// [`reserve_array`](Self::reserve_array).
    pub fn reserve_list(&mut self, path: &DataArrayPath) -> Result<usize, PipelineError> {
        self.claim_output(path)?;
        self.registry.reserve_list(path)
    }

    /// Geometry shape of `container`.
    ///
    /// # Errors
    /// `MissingPrerequisite` if the container is absent or has no geometry.
    pub fn geometry_shape(&self, container: &str) -> Result<GeometryShape, PipelineError> {
        let dc = self
            .registry
            .container(container)
            .ok_or_else(|| PipelineError::missing(container, "data container does not exist"))?;
        let geom = dc
            .geometry()
            .ok_or_else(|| PipelineError::missing(container, "data container has no geometry"))?;
        Ok(GeometryShape {
            kind: geom.kind(),
            vertices: geom.number_of_vertices(),
            elements: geom.number_of_elements(),
        })
    }

    /// Record a warning and forward it to the observer.
    pub fn warn(&mut self, code: i32, text: impl Into<String>) {
        let text = text.into();
        self.observer.notify(&StepMessage::Warning {
            step: self.step.to_string(),
            code,
            text: text.clone(),
        });
        self.warnings.push(StepWarning { code, message: text });
    }
}

/// Full registry access for one `execute` call.
pub struct ExecuteContext<'a> {
    registry: &'a mut DataContainerRegistry,
    observer: &'a dyn PipelineObserver,
    cancel: &'a CancellationToken,
    config: &'a RunnerConfig,
    step: &'a str,
    pub(crate) warnings: Vec<StepWarning>,
}

impl<'a> ExecuteContext<'a> {
    pub fn new(
        registry: &'a mut DataContainerRegistry,
        observer: &'a dyn PipelineObserver,
        cancel: &'a CancellationToken,
        config: &'a RunnerConfig,
        step: &'a str,
    ) -> Self {
        Self {
            registry,
            observer,
            cancel,
            config,
            step,
            warnings: Vec::new(),
        }
    }

    pub fn registry(&self) -> &DataContainerRegistry {
        &*self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DataContainerRegistry {
        &mut *self.registry
    }

    /// Elements processed between two cancellation polls.
    pub fn poll_interval(&self) -> usize {
        self.config.poll_interval.max(1)
    }

    pub fn notify_status(&self, text: impl Into<String>) {
        self.observer.notify(&StepMessage::Status {
            step: self.step.to_string(),
            text: text.into(),
        });
    }

    /// Report `done` out of `total` work items.
    pub fn notify_progress(&self, done: usize, total: usize, text: impl Into<String>) {
        let percent = if total == 0 {
            100
        } else {
            ((done.min(total) as u128 * 100) / total as u128) as u8
        };
        self.observer.notify(&StepMessage::Progress {
            step: self.step.to_string(),
            percent,
            text: text.into(),
        });
    }

    /// Record a warning and forward it to the observer.
    pub fn notify_warning(&mut self, code: i32, text: impl Into<String>) {
        let text = text.into();
        self.observer.notify(&StepMessage::Warning {
            step: self.step.to_string(),
            code,
            text: text.clone(),
        });
        self.warnings.push(StepWarning { code, message: text });
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// `Err(Cancelled)` once cancellation was requested.
    pub fn check_cancelled(&self) -> Result<(), PipelineError> {
        if self.cancel.is_cancelled() {
            Err(PipelineError::Cancelled)
        } else {
            Ok(())
        }
    }
}
