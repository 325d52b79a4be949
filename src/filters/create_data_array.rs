//! Create a new array filled with a constant.

use crate::data::path::DataArrayPath;
use crate::data::scalar::{ScalarType, with_scalar_type};
use crate::pipeline::context::{DryRunContext, ExecuteContext};
use crate::pipeline::parameter::{FilterParameter, ParameterCategory, ParameterValue, unknown_key};
use crate::pipeline::step::{PipelineStep, StepStatus};
use crate::pipeline_error::PipelineError;

use super::{expect_float, expect_int, expect_path, expect_text};

/// Adds a constant-valued array of a chosen type and component count to an
/// existing attribute group.
#[derive(Clone, Debug)]
pub struct CreateDataArray {
    scalar_type: String,
    number_of_components: i64,
    initialization_value: f64,
    new_array: DataArrayPath,
    status: StepStatus,
}

impl Default for CreateDataArray {
    fn default() -> Self {
        Self {
            scalar_type: ScalarType::F32.as_str().to_string(),
            number_of_components: 1,
            initialization_value: 0.0,
            new_array: DataArrayPath::default(),
            status: StepStatus::default(),
        }
    }
}

impl CreateDataArray {
    pub fn new(
        scalar_type: ScalarType,
        number_of_components: usize,
        initialization_value: f64,
        new_array: DataArrayPath,
    ) -> Self {
        Self {
            scalar_type: scalar_type.as_str().to_string(),
            number_of_components: i64::try_from(number_of_components).unwrap_or(i64::MAX),
            initialization_value,
            new_array,
            status: StepStatus::default(),
        }
    }

    fn checked_settings(&self) -> Result<(ScalarType, usize), PipelineError> {
        let ty = ScalarType::parse(&self.scalar_type).ok_or_else(|| {
            PipelineError::invalid_parameter(
                "ScalarType",
                format!("unknown element type `{}`", self.scalar_type),
            )
        })?;
        let components = usize::try_from(self.number_of_components)
            .ok()
            .filter(|&c| c >= 1)
            .ok_or_else(|| {
                PipelineError::invalid_parameter(
                    "NumberOfComponents",
                    format!("must be at least 1, got {}", self.number_of_components),
                )
            })?;
        let value = self.initialization_value;
        let representable = value.is_finite() || ty.is_float();
        let fits = with_scalar_type!(ty, T => <T as num_traits::NumCast>::from(value).is_some());
        if !(representable && fits) {
            return Err(PipelineError::invalid_parameter(
                "InitializationValue",
                format!("{value} is not representable as {ty}"),
            ));
        }
        Ok((ty, components))
    }
}

impl PipelineStep for CreateDataArray {
    fn name(&self) -> &str {
        "CreateDataArray"
    }

    fn human_label(&self) -> &str {
        "Create Data Array"
    }

    fn parameters(&self) -> Vec<FilterParameter> {
        vec![
            FilterParameter::new(
                "Scalar Type",
                "ScalarType",
                ParameterCategory::Parameter,
                ParameterValue::Text(ScalarType::F32.as_str().into()),
            ),
            FilterParameter::new(
                "Number of Components",
                "NumberOfComponents",
                ParameterCategory::Parameter,
                ParameterValue::Int(1),
            ),
            FilterParameter::new(
                "Initialization Value",
                "InitializationValue",
                ParameterCategory::Parameter,
                ParameterValue::Float(0.0),
            ),
            FilterParameter::new(
                "Created Attribute Array",
                "NewArray",
                ParameterCategory::CreatedArray,
                ParameterValue::Path(DataArrayPath::default()),
            ),
        ]
    }

    fn parameter(&self, key: &str) -> Option<ParameterValue> {
        match key {
            "ScalarType" => Some(ParameterValue::Text(self.scalar_type.clone())),
            "NumberOfComponents" => Some(ParameterValue::Int(self.number_of_components)),
            "InitializationValue" => Some(ParameterValue::Float(self.initialization_value)),
            "NewArray" => Some(ParameterValue::Path(self.new_array.clone())),
            _ => None,
        }
    }

    fn set_parameter(&mut self, key: &str, value: ParameterValue) -> Result<(), PipelineError> {
        match key {
            "ScalarType" => self.scalar_type = expect_text(key, value)?,
            "NumberOfComponents" => self.number_of_components = expect_int(key, &value)?,
            "InitializationValue" => self.initialization_value = expect_float(key, &value)?,
            "NewArray" => self.new_array = expect_path(key, value)?,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    fn data_check(&mut self, ctx: &mut DryRunContext<'_>) -> Result<(), PipelineError> {
        let (ty, components) = self.checked_settings()?;
        ctx.reserve_array(&self.new_array, ty, components)?;
        Ok(())
    }

    fn run(&mut self, ctx: &mut ExecuteContext<'_>) -> Result<(), PipelineError> {
        let value = self.initialization_value;
        ctx.registry_mut().resolve_mut(&self.new_array)?.fill_f64(value)?;
        ctx.notify_status(format!("Initialized `{}` to {value}", self.new_array));
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::attribute_group::GroupKind;
    use crate::data::registry::DataContainerRegistry;
    use crate::pipeline::observer::{CancellationToken, NullObserver};
    use crate::pipeline::runner::RunnerConfig;
    use crate::pipeline_error::INVALID_PARAMETER;

    fn registry() -> DataContainerRegistry {
        let mut reg = DataContainerRegistry::new();
        reg.create_container("dc")
            .unwrap()
            .create_group("cells", GroupKind::Cell)
            .unwrap()
            .resize_all(5)
            .unwrap();
        reg
    }

    #[test]
    fn creates_and_fills() {
        let mut reg = registry();
        let path = DataArrayPath::new("dc", "cells", "Mask");
        let mut step = CreateDataArray::new(ScalarType::U8, 2, 7.0, path.clone());
        let code = step.execute(
            &mut reg,
            &NullObserver,
            &CancellationToken::new(),
            &RunnerConfig::default(),
        );
        assert_eq!(code, 0);
        let a = reg.resolve(&path).unwrap();
        assert_eq!(a.number_of_tuples(), 5);
        assert_eq!(a.as_slice::<u8>().unwrap(), &[7u8; 10]);
    }

    #[test]
    fn rejects_bad_parameters() {
        let mut reg = registry();
        let path = DataArrayPath::new("dc", "cells", "x");
        let mut step = CreateDataArray::new(ScalarType::U8, 1, -1.0, path.clone());
        assert_eq!(step.dry_run_check(&mut reg, &NullObserver), INVALID_PARAMETER);

        let mut step = CreateDataArray::new(ScalarType::F32, 1, 0.0, path.clone());
        step.set_parameter("NumberOfComponents", ParameterValue::Int(0))
            .unwrap();
        assert_eq!(step.dry_run_check(&mut reg, &NullObserver), INVALID_PARAMETER);

        step.set_parameter("ScalarType", ParameterValue::Text("complex".into()))
            .unwrap();
        assert_eq!(step.dry_run_check(&mut reg, &NullObserver), INVALID_PARAMETER);
        assert!(reg.resolve(&path).is_err());
    }
}
