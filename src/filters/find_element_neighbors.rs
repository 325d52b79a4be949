//! Element neighbor counts and lists for a container's geometry.

use crate::algs::element_neighbors::ElementNeighborOpts;
use crate::data::neighbor_list::NeighborList;
use crate::data::path::DataArrayPath;
use crate::data::scalar::ScalarType;
use crate::pipeline::context::{DryRunContext, ExecuteContext};
use crate::pipeline::parameter::{FilterParameter, ParameterCategory, ParameterValue, unknown_key};
use crate::pipeline::step::{PipelineStep, StepStatus};
use crate::pipeline_error::PipelineError;

use super::{check_distinct_outputs, expect_int, expect_path, expect_text};

/// Writes, for every element of the geometry, the number of neighboring
/// elements and their indices into the element attribute group.
#[derive(Clone, Debug)]
pub struct FindElementNeighbors {
    element_group_path: DataArrayPath,
    num_neighbors_name: String,
    neighbor_list_name: String,
    min_shared_vertices: i64,
    status: StepStatus,
}

impl Default for FindElementNeighbors {
    fn default() -> Self {
        Self {
            element_group_path: DataArrayPath::new("DataContainer", "FaceData", ""),
            num_neighbors_name: "NumNeighbors".into(),
            neighbor_list_name: "NeighborList".into(),
            min_shared_vertices: 1,
            status: StepStatus::default(),
        }
    }
}

impl FindElementNeighbors {
    pub fn new(element_group_path: DataArrayPath, min_shared_vertices: usize) -> Self {
        Self {
            element_group_path,
            min_shared_vertices: i64::try_from(min_shared_vertices).unwrap_or(i64::MAX),
            ..Self::default()
        }
    }

    fn num_neighbors_path(&self) -> DataArrayPath {
        self.element_group_path.with_array(&self.num_neighbors_name)
    }

    fn neighbor_list_path(&self) -> DataArrayPath {
        self.element_group_path.with_array(&self.neighbor_list_name)
    }
}

impl PipelineStep for FindElementNeighbors {
    fn name(&self) -> &str {
        "FindElementNeighbors"
    }

    fn human_label(&self) -> &str {
        "Find Element Neighbors"
    }

    fn parameters(&self) -> Vec<FilterParameter> {
        vec![
            FilterParameter::new(
                "Element Attribute Matrix",
                "ElementGroupPath",
                ParameterCategory::RequiredArray,
                ParameterValue::Path(DataArrayPath::default()),
            ),
            FilterParameter::new(
                "Number of Neighbors",
                "NumNeighborsArrayName",
                ParameterCategory::CreatedArray,
                ParameterValue::Text("NumNeighbors".into()),
            ),
            FilterParameter::new(
                "Neighbor List",
                "NeighborListArrayName",
                ParameterCategory::CreatedArray,
                ParameterValue::Text("NeighborList".into()),
            ),
            FilterParameter::new(
                "Minimum Shared Vertices",
                "MinSharedVertices",
                ParameterCategory::Parameter,
                ParameterValue::Int(1),
            ),
        ]
    }

    fn parameter(&self, key: &str) -> Option<ParameterValue> {
        match key {
            "ElementGroupPath" => Some(ParameterValue::Path(self.element_group_path.clone())),
            "NumNeighborsArrayName" => Some(ParameterValue::Text(self.num_neighbors_name.clone())),
            "NeighborListArrayName" => Some(ParameterValue::Text(self.neighbor_list_name.clone())),
            "MinSharedVertices" => Some(ParameterValue::Int(self.min_shared_vertices)),
            _ => None,
        }
    }

    fn set_parameter(&mut self, key: &str, value: ParameterValue) -> Result<(), PipelineError> {
        match key {
            "ElementGroupPath" => self.element_group_path = expect_path(key, value)?,
            "NumNeighborsArrayName" => self.num_neighbors_name = expect_text(key, value)?,
            "NeighborListArrayName" => self.neighbor_list_name = expect_text(key, value)?,
            "MinSharedVertices" => self.min_shared_vertices = expect_int(key, &value)?,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    fn data_check(&mut self, ctx: &mut DryRunContext<'_>) -> Result<(), PipelineError> {
        let geom = ctx.geometry_shape(&self.element_group_path.container)?;
        if geom.elements == 0 {
            return Err(PipelineError::missing(
                &self.element_group_path.container,
                format!("{} has no elements", geom.kind.as_str()),
            ));
        }
        let k = geom.kind.vertices_per_element();
        let shared = self.min_shared_vertices;
        if shared < 1 || shared as u64 > k as u64 {
            return Err(PipelineError::invalid_parameter(
                "MinSharedVertices",
                format!("must be in 1..={k} for {}, got {shared}", geom.kind.as_str()),
            ));
        }
        let group = ctx.require_group(&self.element_group_path)?;
        if group.tuples != geom.elements {
            return Err(PipelineError::TupleCountMismatch {
                expected: geom.elements,
                found: group.tuples,
                paths: vec![format!(
                    "{}/{}",
                    self.element_group_path.container, self.element_group_path.group
                )],
            });
        }
        check_distinct_outputs(
            &[],
            &[
                ("NumNeighborsArrayName", self.num_neighbors_path()),
                ("NeighborListArrayName", self.neighbor_list_path()),
            ],
        )?;
        ctx.reserve_array(&self.num_neighbors_path(), ScalarType::I32, 1)?;
        ctx.reserve_list(&self.neighbor_list_path())?;
        Ok(())
    }

    fn run(&mut self, ctx: &mut ExecuteContext<'_>) -> Result<(), PipelineError> {
        let opts = ElementNeighborOpts {
            min_shared_vertices: usize::try_from(self.min_shared_vertices)
                .map_err(|_| PipelineError::invalid_parameter("MinSharedVertices", "negative"))?,
        };
        let container = self.element_group_path.container.clone();
        ctx.notify_status("Finding vertex links and element neighbors");
        let (counts, lists) = {
            let geom = ctx
                .registry_mut()
                .container_mut(&container)
                .and_then(|dc| dc.geometry_mut())
                .ok_or_else(|| PipelineError::missing(&container, "data container has no geometry"))?;
            let neighbors = geom.find_element_neighbors(opts)?;
            let n = neighbors.number_of_elements();
            let counts: Vec<i32> = (0..n)
                .map(|e| i32::try_from(neighbors.neighbors(e).len()).unwrap_or(i32::MAX))
                .collect();
            let lists: Vec<Vec<i32>> = (0..n)
                .map(|e| neighbors.neighbors(e).iter().map(|&x| x as i32).collect())
                .collect();
            log::debug!("{n} elements, {} neighbor entries", neighbors.adjncy.len());
            (counts, lists)
        };
        ctx.check_cancelled()?;

        let registry = ctx.registry_mut();
        registry
            .resolve_mut(&self.num_neighbors_path())?
            .copy_from(&counts)?;
        let name = self.neighbor_list_name.clone();
        registry
            .resolve_group_mut(&self.element_group_path)?
            .replace_list(&name, NeighborList::from_lists(&name, lists))?;
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
    use crate::geometry::{Geometry, GeometryKind};
    use crate::pipeline::observer::{CancellationToken, NullObserver};
    use crate::pipeline::runner::RunnerConfig;
    use crate::pipeline_error::{INVALID_PARAMETER, MISSING_PREREQUISITE, TUPLE_COUNT_MISMATCH};

    fn registry(face_tuples: usize) -> DataContainerRegistry {
        let mut reg = DataContainerRegistry::new();
        let dc = reg.create_container("tri").unwrap();
        let geom = Geometry::new(
            GeometryKind::Triangle,
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0], [2.0, 0.0, 0.0]],
            vec![0, 1, 2, 0, 2, 3, 1, 4, 2],
        )
        .unwrap();
        dc.set_geometry(geom);
        dc.create_group("faces", GroupKind::Face)
            .unwrap()
            .resize_all(face_tuples)
            .unwrap();
        reg
    }

    fn group() -> DataArrayPath {
        DataArrayPath::new("tri", "faces", "")
    }

    #[test]
    fn shared_edge_neighbors() {
        let mut reg = registry(3);
        let mut step = FindElementNeighbors::new(group(), 2);
        let code = step.execute(
            &mut reg,
            &NullObserver,
            &CancellationToken::new(),
            &RunnerConfig::default(),
        );
        assert_eq!(code, 0, "{}", step.status().message);
        let counts = reg.resolve(&group().with_array("NumNeighbors")).unwrap();
        assert_eq!(counts.as_slice::<i32>().unwrap(), &[2, 1, 1]);
        let list = reg.resolve_list(&group().with_array("NeighborList")).unwrap();
        assert_eq!(list.list(0), Some(&[1, 2][..]));
        assert!(
            reg.container("tri")
                .unwrap()
                .geometry()
                .unwrap()
                .vertex_links()
                .is_some()
        );
    }

    #[test]
    fn dry_run_validation() {
        let mut reg = registry(2);
        let mut step = FindElementNeighbors::new(group(), 1);
        assert_eq!(step.dry_run_check(&mut reg, &NullObserver), TUPLE_COUNT_MISMATCH);

        let mut reg = registry(3);
        let mut step = FindElementNeighbors::new(group(), 4);
        assert_eq!(step.dry_run_check(&mut reg, &NullObserver), INVALID_PARAMETER);

        reg.container_mut("tri").unwrap().take_geometry();
        let mut step = FindElementNeighbors::new(group(), 1);
        assert_eq!(step.dry_run_check(&mut reg, &NullObserver), MISSING_PREREQUISITE);
    }
}
