//! Flat keyed parameter persistence.
//!
//! Steps serialize their declared parameters into one group per pipeline
//! position. [`JsonParameterStore`] keeps the groups in a JSON document of
//! the form
//!
//! ```json
//! {
//!   "0": { "Filter_Name": "CreateDataArray", "NumberOfComponents": 1, ... },
//!   "1": { ... },
//!   "PipelineBuilder": { "Number_Filters": 2 }
//! }
//! ```
//!
//! Array paths are stored as objects with `Data Container Name`,
//! `Attribute Matrix Name` and `Data Array Name` members.

use serde_json::{Map, Value, json};

use crate::data::path::DataArrayPath;
use crate::pipeline::parameter::ParameterValue;
use crate::pipeline_error::PipelineError;

/// Key holding the step's class name inside each group.
pub const FILTER_NAME_KEY: &str = "Filter_Name";
/// Top-level group describing the whole pipeline.
pub const PIPELINE_GROUP_KEY: &str = "PipelineBuilder";
/// Step count inside [`PIPELINE_GROUP_KEY`].
pub const NUMBER_FILTERS_KEY: &str = "Number_Filters";

/// Read side of a keyed parameter store.
pub trait ParameterReader {
    /// Number of step groups in the store.
    fn number_of_steps(&self) -> usize;
    /// Class name stored for the group at `index`.
    fn step_name(&self, index: usize) -> Result<String, PipelineError>;
    /// Value of `key` in group `index`, parsed in the shape of `template`.
    /// `Ok(None)` if the key is absent.
    fn read_value(
        &self,
        index: usize,
        key: &str,
        template: &ParameterValue,
    ) -> Result<Option<ParameterValue>, PipelineError>;
}

/// Write side of a keyed parameter store.
pub trait ParameterWriter {
    /// Start group `index` for a step of class `name`.
    fn begin_step(&mut self, index: usize, name: &str) -> Result<(), PipelineError>;
    fn write_value(
        &mut self,
        index: usize,
        key: &str,
        value: &ParameterValue,
    ) -> Result<(), PipelineError>;
    /// Record the total number of steps.
    fn finish(&mut self, number_of_steps: usize) -> Result<(), PipelineError>;
}

/// In-memory JSON document implementing both store traits.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JsonParameterStore {
    root: Map<String, Value>,
}

impl JsonParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a store from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, PipelineError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| PipelineError::invalid_parameter("pipeline", e.to_string()))?;
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(PipelineError::invalid_parameter(
                "pipeline",
                format!("expected a JSON object, got {other}"),
            )),
        }
    }

    /// Pretty-printed JSON text.
    pub fn to_json_string(&self) -> Result<String, PipelineError> {
        serde_json::to_string_pretty(&self.root).map_err(|e| PipelineError::Generic(e.to_string()))
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    fn group(&self, index: usize) -> Result<&Map<String, Value>, PipelineError> {
        match self.root.get(&index.to_string()) {
            Some(Value::Object(map)) => Ok(map),
            Some(_) => Err(PipelineError::invalid_parameter(
                index.to_string(),
                "step group is not an object",
            )),
            None => Err(PipelineError::NotFound(format!("step group {index}"))),
        }
    }

    fn group_mut(&mut self, index: usize) -> Result<&mut Map<String, Value>, PipelineError> {
        match self.root.get_mut(&index.to_string()) {
            Some(Value::Object(map)) => Ok(map),
            _ => Err(PipelineError::NotFound(format!("step group {index}"))),
        }
    }
}

fn path_to_json(path: &DataArrayPath) -> Value {
    json!({
        "Data Container Name": path.container,
        "Attribute Matrix Name": path.group,
        "Data Array Name": path.array,
    })
}

fn path_from_json(value: &Value) -> Option<DataArrayPath> {
    let part = |k: &str| value.get(k).and_then(Value::as_str).map(str::to_string);
    Some(DataArrayPath {
        container: part("Data Container Name")?,
        group: part("Attribute Matrix Name")?,
        array: part("Data Array Name").unwrap_or_default(),
    })
}

/// JSON encoding of a parameter value.
pub fn value_to_json(value: &ParameterValue) -> Value {
    match value {
        ParameterValue::Bool(b) => json!(b),
        ParameterValue::Int(i) => json!(i),
        ParameterValue::Float(f) => json!(f),
        ParameterValue::Text(s) => json!(s),
        ParameterValue::Path(p) => path_to_json(p),
        ParameterValue::Vec3(v) => json!({ "x": v[0], "y": v[1], "z": v[2] }),
    }
}

/// Decode `value` into the same variant as `template`.
pub fn value_from_json(value: &Value, template: &ParameterValue) -> Option<ParameterValue> {
    Some(match template {
        ParameterValue::Bool(_) => match value {
            Value::Bool(b) => ParameterValue::Bool(*b),
            Value::Number(n) => ParameterValue::Bool(n.as_i64()? != 0),
            _ => return None,
        },
        ParameterValue::Int(_) => ParameterValue::Int(
            value
                .as_i64()
                .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))?,
        ),
        ParameterValue::Float(_) => ParameterValue::Float(value.as_f64()?),
        ParameterValue::Text(_) => ParameterValue::Text(value.as_str()?.to_string()),
        ParameterValue::Path(_) => ParameterValue::Path(path_from_json(value)?),
        ParameterValue::Vec3(_) => {
            let axis = |k: &str| value.get(k).and_then(Value::as_f64);
            ParameterValue::Vec3([axis("x")?, axis("y")?, axis("z")?])
        }
    })
}

impl ParameterReader for JsonParameterStore {
    fn number_of_steps(&self) -> usize {
        self.root
            .get(PIPELINE_GROUP_KEY)
            .and_then(|g| g.get(NUMBER_FILTERS_KEY))
            .and_then(Value::as_u64)
            .map_or_else(
                || (0..).take_while(|i: &usize| self.root.contains_key(&i.to_string())).count(),
                |n| n as usize,
            )
    }

    fn step_name(&self, index: usize) -> Result<String, PipelineError> {
        self.group(index)?
            .get(FILTER_NAME_KEY)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| PipelineError::NotFound(format!("{index}/{FILTER_NAME_KEY}")))
    }

    fn read_value(
        &self,
        index: usize,
        key: &str,
        template: &ParameterValue,
    ) -> Result<Option<ParameterValue>, PipelineError> {
        match self.group(index)?.get(key) {
            None => Ok(None),
            Some(raw) => value_from_json(raw, template).map(Some).ok_or_else(|| {
                PipelineError::invalid_parameter(
                    key,
                    format!("cannot read {raw} as a {} value", template.type_name()),
                )
            }),
        }
    }
}

impl ParameterWriter for JsonParameterStore {
    fn begin_step(&mut self, index: usize, name: &str) -> Result<(), PipelineError> {
        let mut group = Map::new();
        group.insert(FILTER_NAME_KEY.into(), json!(name));
        self.root.insert(index.to_string(), Value::Object(group));
        Ok(())
    }

    fn write_value(
        &mut self,
        index: usize,
        key: &str,
        value: &ParameterValue,
    ) -> Result<(), PipelineError> {
        self.group_mut(index)?.insert(key.to_string(), value_to_json(value));
        Ok(())
    }

    fn finish(&mut self, number_of_steps: usize) -> Result<(), PipelineError> {
        self.root.insert(
            PIPELINE_GROUP_KEY.into(),
            json!({ NUMBER_FILTERS_KEY: number_of_steps }),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_json() {
        let mut store = JsonParameterStore::new();
        store.begin_step(0, "CreateDataArray").unwrap();
        let path = DataArrayPath::new("dc", "Cell Data", "Phases");
        store
            .write_value(0, "NewArray", &ParameterValue::Path(path.clone()))
            .unwrap();
        store
            .write_value(0, "Origin", &ParameterValue::Vec3([1.0, 2.0, 3.0]))
            .unwrap();
        store.finish(1).unwrap();

        let text = store.to_json_string().unwrap();
        let back = JsonParameterStore::from_json_str(&text).unwrap();
        assert_eq!(back.number_of_steps(), 1);
        assert_eq!(back.step_name(0).unwrap(), "CreateDataArray");
        let tmpl = ParameterValue::Path(DataArrayPath::default());
        assert_eq!(
            back.read_value(0, "NewArray", &tmpl).unwrap(),
            Some(ParameterValue::Path(path))
        );
        assert_eq!(
            back.read_value(0, "Origin", &ParameterValue::Vec3([0.0; 3]))
                .unwrap(),
            Some(ParameterValue::Vec3([1.0, 2.0, 3.0]))
        );
        assert_eq!(back.read_value(0, "Missing", &tmpl).unwrap(), None);
    }

    #[test]
    fn wrong_json_type_is_rejected() {
        let store = JsonParameterStore::from_json_str(r#"{"0": {"Filter_Name": "X", "N": "abc"}}"#)
            .unwrap();
        assert!(store.read_value(0, "N", &ParameterValue::Int(0)).is_err());
        assert_eq!(store.number_of_steps(), 1);
    }

    #[test]
    fn non_object_document_is_rejected() {
        assert!(JsonParameterStore::from_json_str("[1, 2]").is_err());
    }
}
