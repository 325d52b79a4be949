//! Concrete pipeline steps.

pub mod create_data_array;
pub mod find_element_neighbors;
pub mod find_neighborhoods;
pub mod remove_component_from_array;

pub use create_data_array::CreateDataArray;
pub use find_element_neighbors::FindElementNeighbors;
pub use find_neighborhoods::FindNeighborhoods;
pub use remove_component_from_array::RemoveComponentFromArray;

use crate::data::path::DataArrayPath;
use crate::pipeline::parameter::{ParameterValue, wrong_type};
use crate::pipeline::step::PipelineStep;
use crate::pipeline_error::PipelineError;

/// Fresh step for a class name, as stored under `Filter_Name`.
pub fn step_by_name(name: &str) -> Option<Box<dyn PipelineStep>> {
    match name {
        "CreateDataArray" => Some(Box::new(CreateDataArray::default())),
        "RemoveComponentFromArray" => Some(Box::new(RemoveComponentFromArray::default())),
        "FindNeighborhoods" => Some(Box::new(FindNeighborhoods::default())),
        "FindElementNeighbors" => Some(Box::new(FindElementNeighbors::default())),
        _ => None,
    }
}

/// Fails with `InvalidParameter` on the first created output (keyed by its
/// parameter name) that lands on a required input or on an earlier output.
pub(crate) fn check_distinct_outputs(
    required: &[&DataArrayPath],
    created: &[(&str, DataArrayPath)],
) -> Result<(), PipelineError> {
    for (i, (key, path)) in created.iter().enumerate() {
        if required.contains(&path) {
            return Err(PipelineError::invalid_parameter(
                *key,
                format!("`{path}` is also an input of this step"),
            ));
        }
        if let Some((other, _)) = created[..i].iter().find(|(_, p)| p == path) {
            return Err(PipelineError::invalid_parameter(
                *key,
                format!("`{path}` is already the output of `{other}`"),
            ));
        }
    }
    Ok(())
}

pub(crate) fn expect_int(key: &str, value: &ParameterValue) -> Result<i64, PipelineError> {
    value.as_int().ok_or_else(|| wrong_type(key, "int", value))
}

pub(crate) fn expect_float(key: &str, value: &ParameterValue) -> Result<f64, PipelineError> {
    value.as_float().ok_or_else(|| wrong_type(key, "float", value))
}

pub(crate) fn expect_bool(key: &str, value: &ParameterValue) -> Result<bool, PipelineError> {
    value.as_bool().ok_or_else(|| wrong_type(key, "bool", value))
}

pub(crate) fn expect_text(key: &str, value: ParameterValue) -> Result<String, PipelineError> {
    match value {
        ParameterValue::Text(s) => Ok(s),
        other => Err(wrong_type(key, "text", &other)),
    }
}

pub(crate) fn expect_path(key: &str, value: ParameterValue) -> Result<DataArrayPath, PipelineError> {
    match value {
        ParameterValue::Path(p) => Ok(p),
        ParameterValue::Text(s) => s.parse(),
        other => Err(wrong_type(key, "path", &other)),
    }
}

pub(crate) fn expect_vec3(key: &str, value: &ParameterValue) -> Result<[f64; 3], PipelineError> {
    value.as_vec3().ok_or_else(|| wrong_type(key, "vec3", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_knows_every_step() {
        for name in [
            "CreateDataArray",
            "RemoveComponentFromArray",
            "FindNeighborhoods",
            "FindElementNeighbors",
        ] {
            assert_eq!(step_by_name(name).unwrap().name(), name);
        }
        assert!(step_by_name("EMMPM").is_none());
    }

    #[test]
    fn outputs_must_not_collide() {
        let input = DataArrayPath::new("dc", "cells", "rgb");
        let out = |a: &str| input.with_array(a);
        assert!(check_distinct_outputs(&[&input], &[("A", out("x")), ("B", out("y"))]).is_ok());
        let err = check_distinct_outputs(&[&input], &[("A", out("rgb"))]).unwrap_err();
        assert_eq!(err.code(), crate::pipeline_error::INVALID_PARAMETER);
        let err = check_distinct_outputs(&[&input], &[("A", out("x")), ("B", out("x"))]).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParameter { ref key, .. } if key == "B"));
    }

    #[test]
    fn paths_accept_text() {
        let p = expect_path("p", ParameterValue::Text("a/b/c".into())).unwrap();
        assert_eq!(p, DataArrayPath::new("a", "b", "c"));
        assert!(expect_path("p", ParameterValue::Int(1)).is_err());
    }
}
