//! Drop one component from a multi-component array.
//!
//! The input array is left in place. The remaining components are written to
//! a new array of the same type in the same group; the removed component can
//! optionally be kept as a single-component array.

use crate::data::path::DataArrayPath;
use crate::data::scalar::{Scalar, with_scalar_type};
use crate::pipeline::context::{DryRunContext, ExecuteContext};
use crate::pipeline::parameter::{FilterParameter, ParameterCategory, ParameterValue, unknown_key};
use crate::pipeline::step::{PipelineStep, StepStatus};
use crate::pipeline_error::PipelineError;

use super::{check_distinct_outputs, expect_bool, expect_int, expect_path, expect_text};

#[derive(Clone, Debug)]
pub struct RemoveComponentFromArray {
    comp_number: i64,
    selected_array_path: DataArrayPath,
    save_removed_component: bool,
    new_array_name: String,
    reduced_array_name: String,
    status: StepStatus,
}

impl Default for RemoveComponentFromArray {
    fn default() -> Self {
        Self {
            comp_number: 0,
            selected_array_path: DataArrayPath::default(),
            save_removed_component: false,
            new_array_name: "RemovedComponent".into(),
            reduced_array_name: "ReducedArray".into(),
            status: StepStatus::default(),
        }
    }
}

impl RemoveComponentFromArray {
    pub fn new(selected_array_path: DataArrayPath, comp_number: usize) -> Self {
        Self {
            selected_array_path,
            comp_number: i64::try_from(comp_number).unwrap_or(i64::MAX),
            ..Self::default()
        }
    }

    /// Keep the removed component as a scalar array named `name`.
    pub fn save_removed_as(mut self, name: impl Into<String>) -> Self {
        self.save_removed_component = true;
        self.new_array_name = name.into();
        self
    }

    pub fn reduced_array_name(mut self, name: impl Into<String>) -> Self {
        self.reduced_array_name = name.into();
        self
    }

    fn reduced_path(&self) -> DataArrayPath {
        self.selected_array_path.with_array(&self.reduced_array_name)
    }

    fn removed_path(&self) -> DataArrayPath {
        self.selected_array_path.with_array(&self.new_array_name)
    }
}

/// Split every tuple of `input` (with `components` components) into the
/// tuple without component `comp` and the removed value.
fn split_component<T: Scalar>(
    input: &[T],
    components: usize,
    comp: usize,
    keep_removed: bool,
    ctx: &ExecuteContext<'_>,
) -> Result<(Vec<T>, Vec<T>), PipelineError> {
    let tuples = input.len() / components;
    let poll = ctx.poll_interval();
    let mut reduced = Vec::with_capacity(tuples * (components - 1));
    let mut removed = Vec::with_capacity(if keep_removed { tuples } else { 0 });
    for (i, tuple) in input.chunks_exact(components).enumerate() {
        if i % poll == 0 {
            ctx.check_cancelled()?;
        }
        reduced.extend_from_slice(&tuple[..comp]);
        reduced.extend_from_slice(&tuple[comp + 1..]);
        if keep_removed {
            removed.push(tuple[comp]);
        }
    }
    Ok((reduced, removed))
}

impl PipelineStep for RemoveComponentFromArray {
    fn name(&self) -> &str {
        "RemoveComponentFromArray"
    }

    fn human_label(&self) -> &str {
        "Remove Component From Array"
    }

    fn parameters(&self) -> Vec<FilterParameter> {
        vec![
            FilterParameter::new(
                "Component Number to Remove",
                "CompNumber",
                ParameterCategory::Parameter,
                ParameterValue::Int(0),
            ),
            FilterParameter::new(
                "Multicomponent Attribute Array",
                "SelectedArrayPath",
                ParameterCategory::RequiredArray,
                ParameterValue::Path(DataArrayPath::default()),
            ),
            FilterParameter::new(
                "Save Removed Component",
                "SaveRemovedComponent",
                ParameterCategory::Parameter,
                ParameterValue::Bool(false),
            ),
            FilterParameter::new(
                "Removed Component Attribute Array",
                "NewArrayArrayName",
                ParameterCategory::CreatedArray,
                ParameterValue::Text("RemovedComponent".into()),
            ),
            FilterParameter::new(
                "Reduced Attribute Array",
                "ReducedArrayArrayName",
                ParameterCategory::CreatedArray,
                ParameterValue::Text("ReducedArray".into()),
            ),
        ]
    }

    fn parameter(&self, key: &str) -> Option<ParameterValue> {
        match key {
            "CompNumber" => Some(ParameterValue::Int(self.comp_number)),
            "SelectedArrayPath" => Some(ParameterValue::Path(self.selected_array_path.clone())),
            "SaveRemovedComponent" => Some(ParameterValue::Bool(self.save_removed_component)),
            "NewArrayArrayName" => Some(ParameterValue::Text(self.new_array_name.clone())),
            "ReducedArrayArrayName" => Some(ParameterValue::Text(self.reduced_array_name.clone())),
            _ => None,
        }
    }

    fn set_parameter(&mut self, key: &str, value: ParameterValue) -> Result<(), PipelineError> {
        match key {
            "CompNumber" => self.comp_number = expect_int(key, &value)?,
            "SelectedArrayPath" => self.selected_array_path = expect_path(key, value)?,
            "SaveRemovedComponent" => self.save_removed_component = expect_bool(key, &value)?,
            "NewArrayArrayName" => self.new_array_name = expect_text(key, value)?,
            "ReducedArrayArrayName" => self.reduced_array_name = expect_text(key, value)?,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    fn data_check(&mut self, ctx: &mut DryRunContext<'_>) -> Result<(), PipelineError> {
        if self.reduced_array_name.is_empty() {
            return Err(PipelineError::invalid_parameter(
                "ReducedArrayArrayName",
                "reduced array name must be set",
            ));
        }
        if self.save_removed_component && self.new_array_name.is_empty() {
            return Err(PipelineError::invalid_parameter(
                "NewArrayArrayName",
                "removed component array name must be set",
            ));
        }
        let mut created = vec![("ReducedArrayArrayName", self.reduced_path())];
        if self.save_removed_component {
            created.push(("NewArrayArrayName", self.removed_path()));
        }
        check_distinct_outputs(&[&self.selected_array_path], &created)?;
        let input = ctx.array_shape(&self.selected_array_path)?;
        if input.components < 2 {
            return Err(PipelineError::invalid_parameter(
                "SelectedArrayPath",
                format!(
                    "selected array `{}` must have more than 1 component, it has {}",
                    self.selected_array_path.array, input.components
                ),
            ));
        }
        let comp = usize::try_from(self.comp_number)
            .ok()
            .filter(|&c| c < input.components)
            .ok_or_else(|| {
                PipelineError::invalid_parameter(
                    "CompNumber",
                    format!(
                        "component to remove ({}) is out of range for `{}` with {} components",
                        self.comp_number, self.selected_array_path.array, input.components
                    ),
                )
            })?;
        log::debug!("removing component {comp} of `{}`", self.selected_array_path);
        ctx.reserve_array(&self.reduced_path(), input.scalar_type, input.components - 1)?;
        if self.save_removed_component {
            ctx.reserve_array(&self.removed_path(), input.scalar_type, 1)?;
        }
        Ok(())
    }

    fn run(&mut self, ctx: &mut ExecuteContext<'_>) -> Result<(), PipelineError> {
        let shape = ctx.registry().resolve(&self.selected_array_path)?.shape();
        let comp = usize::try_from(self.comp_number)
            .map_err(|_| PipelineError::invalid_parameter("CompNumber", "must not be negative"))?;
        let keep = self.save_removed_component;
        let reduced_path = self.reduced_path();
        let removed_path = self.removed_path();

        with_scalar_type!(shape.scalar_type, T => {
            let (reduced, removed) = {
                let input = ctx.registry().resolve(&self.selected_array_path)?.as_slice::<T>()?;
                split_component::<T>(input, shape.components, comp, keep, ctx)?
            };
            ctx.registry_mut().resolve_mut(&reduced_path)?.copy_from(&reduced)?;
            if keep {
                ctx.registry_mut().resolve_mut(&removed_path)?.copy_from(&removed)?;
            }
        });
        Ok(())
    }

    fn fresh_instance(&self) -> Box<dyn PipelineStep> {
        Box::new(Self::default())
    }

    fn status(&self) -> &StepStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut StepStatus {
        &mut self.status
    }
}
