//! Per-feature neighborhoods from centroids and equivalent diameters.
//!
//! Wraps [`find_neighborhoods_with`] for feature data stored in a registry.
//! Feature 0 is the reserved "no feature" slot: it takes no part in the
//! average diameter and gets an empty neighborhood.

use std::ops::ControlFlow;

use crate::algs::neighborhoods::{NeighborhoodOpts, find_neighborhoods_with};
use crate::data::neighbor_list::NeighborList;
use crate::data::path::DataArrayPath;
use crate::data::scalar::ScalarType;
use crate::pipeline::context::{DryRunContext, ExecuteContext};
use crate::pipeline::parameter::{FilterParameter, ParameterCategory, ParameterValue, unknown_key};
use crate::pipeline::step::{PipelineStep, StepStatus};
use crate::pipeline_error::PipelineError;

use super::{check_distinct_outputs, expect_float, expect_path, expect_text, expect_vec3};

/// Features between two progress messages.
const PROGRESS_STRIDE: usize = 1000;

/// Counts, for every feature, the features whose centroids fall within its
/// critical distance on the binning grid.
///
/// The grid origin comes from the `Origin` parameter, not from the
/// container. It must be the origin of the grid the centroids were computed
/// on, or the bins shift.
#[derive(Clone, Debug)]
pub struct FindNeighborhoods {
    multiples_of_average: f64,
    equivalent_diameters_path: DataArrayPath,
    feature_phases_path: DataArrayPath,
    centroids_path: DataArrayPath,
    neighborhoods_name: String,
    neighborhood_list_name: String,
    origin: [f64; 3],
    status: StepStatus,
}

impl Default for FindNeighborhoods {
    fn default() -> Self {
        let features = |a: &str| DataArrayPath::new("DataContainer", "CellFeatureData", a);
        Self {
            multiples_of_average: 1.0,
            equivalent_diameters_path: features("EquivalentDiameters"),
            feature_phases_path: features("Phases"),
            centroids_path: features("Centroids"),
            neighborhoods_name: "Neighborhoods".into(),
            neighborhood_list_name: "NeighborhoodList".into(),
            origin: [0.0; 3],
            status: StepStatus::default(),
        }
    }
}

impl FindNeighborhoods {
    /// Step reading `EquivalentDiameters`, `Phases` and `Centroids` from the
    /// feature group at `features` (array part ignored).
    pub fn new(features: &DataArrayPath, multiples_of_average: f64) -> Self {
        Self {
            multiples_of_average,
            equivalent_diameters_path: features.with_array("EquivalentDiameters"),
            feature_phases_path: features.with_array("Phases"),
            centroids_path: features.with_array("Centroids"),
            ..Self::default()
        }
    }

    /// Origin of the grid the centroids are expressed on.
    pub fn with_origin(mut self, origin: [f64; 3]) -> Self {
        self.origin = origin;
        self
    }

    fn neighborhoods_path(&self) -> DataArrayPath {
        self.equivalent_diameters_path.with_array(&self.neighborhoods_name)
    }

    fn neighborhood_list_path(&self) -> DataArrayPath {
        self.equivalent_diameters_path
            .with_array(&self.neighborhood_list_name)
    }
}

impl PipelineStep for FindNeighborhoods {
    fn name(&self) -> &str {
        "FindNeighborhoods"
    }

    fn human_label(&self) -> &str {
        "Find Feature Neighborhoods"
    }

    fn parameters(&self) -> Vec<FilterParameter> {
        let path = || ParameterValue::Path(DataArrayPath::default());
        vec![
            FilterParameter::new(
                "Multiples of Average Diameter",
                "MultiplesOfAverage",
                ParameterCategory::Parameter,
                ParameterValue::Float(1.0),
            ),
            FilterParameter::new(
                "Equivalent Diameters",
                "EquivalentDiametersArrayPath",
                ParameterCategory::RequiredArray,
                path(),
            ),
            FilterParameter::new(
                "Phases",
                "FeaturePhasesArrayPath",
                ParameterCategory::RequiredArray,
                path(),
            ),
            FilterParameter::new(
                "Centroids",
                "CentroidsArrayPath",
                ParameterCategory::RequiredArray,
                path(),
            ),
            FilterParameter::new(
                "Neighborhoods",
                "NeighborhoodsArrayName",
                ParameterCategory::CreatedArray,
                ParameterValue::Text("Neighborhoods".into()),
            ),
            FilterParameter::new(
                "Neighborhood List",
                "NeighborhoodListArrayName",
                ParameterCategory::CreatedArray,
                ParameterValue::Text("NeighborhoodList".into()),
            ),
            FilterParameter::new(
                "Origin",
                "Origin",
                ParameterCategory::Parameter,
                ParameterValue::Vec3([0.0; 3]),
            ),
        ]
    }

    fn parameter(&self, key: &str) -> Option<ParameterValue> {
        Some(match key {
            "MultiplesOfAverage" => ParameterValue::Float(self.multiples_of_average),
            "EquivalentDiametersArrayPath" => {
                ParameterValue::Path(self.equivalent_diameters_path.clone())
            }
            "FeaturePhasesArrayPath" => ParameterValue::Path(self.feature_phases_path.clone()),
            "CentroidsArrayPath" => ParameterValue::Path(self.centroids_path.clone()),
            "NeighborhoodsArrayName" => ParameterValue::Text(self.neighborhoods_name.clone()),
            "NeighborhoodListArrayName" => {
                ParameterValue::Text(self.neighborhood_list_name.clone())
            }
            "Origin" => ParameterValue::Vec3(self.origin),
            _ => return None,
        })
    }

    fn set_parameter(&mut self, key: &str, value: ParameterValue) -> Result<(), PipelineError> {
        match key {
            "MultiplesOfAverage" => self.multiples_of_average = expect_float(key, &value)?,
            "EquivalentDiametersArrayPath" => {
                self.equivalent_diameters_path = expect_path(key, value)?
            }
            "FeaturePhasesArrayPath" => self.feature_phases_path = expect_path(key, value)?,
            "CentroidsArrayPath" => self.centroids_path = expect_path(key, value)?,
            "NeighborhoodsArrayName" => self.neighborhoods_name = expect_text(key, value)?,
            "NeighborhoodListArrayName" => self.neighborhood_list_name = expect_text(key, value)?,
            "Origin" => self.origin = expect_vec3(key, &value)?,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    fn data_check(&mut self, ctx: &mut DryRunContext<'_>) -> Result<(), PipelineError> {
        let mult = self.multiples_of_average;
        if !(mult.is_finite() && mult > 0.0) {
            return Err(PipelineError::invalid_parameter(
                "MultiplesOfAverage",
                format!("must be finite and positive, got {mult}"),
            ));
        }
        check_distinct_outputs(
            &[
                &self.equivalent_diameters_path,
                &self.feature_phases_path,
                &self.centroids_path,
            ],
            &[
                ("NeighborhoodsArrayName", self.neighborhoods_path()),
                ("NeighborhoodListArrayName", self.neighborhood_list_path()),
            ],
        )?;
        ctx.require_array(&self.equivalent_diameters_path, ScalarType::F32, Some(1))?;
        ctx.require_array(&self.feature_phases_path, ScalarType::I32, Some(1))?;
        ctx.require_array(&self.centroids_path, ScalarType::F32, Some(3))?;
        ctx.validate_tuple_counts(&[
            self.equivalent_diameters_path.clone(),
            self.feature_phases_path.clone(),
            self.centroids_path.clone(),
        ])?;
        ctx.reserve_array(&self.neighborhoods_path(), ScalarType::I32, 1)?;
        ctx.reserve_list(&self.neighborhood_list_path())?;
        Ok(())
    }

    fn run(&mut self, ctx: &mut ExecuteContext<'_>) -> Result<(), PipelineError> {
        let opts = NeighborhoodOpts {
            multiples_of_average: self.multiples_of_average,
            origin: self.origin,
            skip_first: true,
            ..NeighborhoodOpts::default()
        };
        let poll = ctx.poll_interval();
        let result = {
            let registry = ctx.registry();
            let diameters = registry
                .resolve(&self.equivalent_diameters_path)?
                .as_slice::<f32>()?;
            let centroids: Vec<[f32; 3]> = registry
                .resolve(&self.centroids_path)?
                .as_slice::<f32>()?
                .chunks_exact(3)
                .map(|c| [c[0], c[1], c[2]])
                .collect();
            find_neighborhoods_with(&centroids, diameters, opts, |i, n| {
                if i % PROGRESS_STRIDE == 0 {
                    ctx.notify_progress(i, n, format!("Working on Feature {i} of {n}"));
                }
                if i % poll == 0 && ctx.is_cancelled() {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })?
        };
        log::debug!(
            "neighborhoods of {} features, bin size {}",
            result.lists.len(),
            result.average_diameter
        );

        let counts: Vec<i32> = result
            .lists
            .iter()
            .map(|l| i32::try_from(l.len()).unwrap_or(i32::MAX))
            .collect();
        let lists: Vec<Vec<i32>> = result
            .lists
            .iter()
            .map(|l| l.iter().map(|&j| j as i32).collect())
            .collect();

        let registry = ctx.registry_mut();
        registry
            .resolve_mut(&self.neighborhoods_path())?
            .copy_from(&counts)?;
        let name = self.neighborhood_list_name.clone();
        registry
            .resolve_group_mut(&self.equivalent_diameters_path)?
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
