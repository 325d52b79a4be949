//! DataContainerRegistry: the root store addressed by [`DataArrayPath`].
//!
//! Lookups resolve `container/group/array`; the dry-run helpers
//! ([`require_array`](DataContainerRegistry::require_array),
//! [`validate_tuple_counts`](DataContainerRegistry::validate_tuple_counts),
//! [`reserve_array`](DataContainerRegistry::reserve_array)) only look at or
//! change shapes, never array contents.

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::data::attribute_group::AttributeGroup;
use crate::data::container::DataContainer;
use crate::data::neighbor_list::NeighborList;
use crate::data::path::DataArrayPath;
use crate::data::scalar::ScalarType;
use crate::data::typed_array::{ArrayShape, TypedArray};
use crate::pipeline_error::PipelineError;

/// Owner of every data container taking part in a pipeline run.
#[derive(Clone, Debug, Default)]
pub struct DataContainerRegistry {
    containers: BTreeMap<String, DataContainer>,
}

impl DataContainerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty container.
    ///
    /// # Errors
    /// `DuplicateName` if `name` is taken.
    pub fn create_container(&mut self, name: &str) -> Result<&mut DataContainer, PipelineError> {
        self.add_container(DataContainer::new(name))
    }

    /// Insert a container under its own name.
    pub fn add_container(
        &mut self,
        container: DataContainer,
    ) -> Result<&mut DataContainer, PipelineError> {
        use std::collections::btree_map::Entry;
        match self.containers.entry(container.name().to_string()) {
            Entry::Occupied(e) => Err(PipelineError::DuplicateName(e.key().clone())),
            Entry::Vacant(e) => Ok(e.insert(container)),
        }
    }

    pub fn container(&self, name: &str) -> Option<&DataContainer> {
        self.containers.get(name)
    }

    pub fn container_mut(&mut self, name: &str) -> Option<&mut DataContainer> {
        self.containers.get_mut(name)
    }

    pub fn remove_container(&mut self, name: &str) -> Option<DataContainer> {
        self.containers.remove(name)
    }

    /// Rename a container; fails if `to` is taken or `from` is absent.
    pub fn rename_container(&mut self, from: &str, to: &str) -> Result<(), PipelineError> {
        if self.containers.contains_key(to) {
            return Err(PipelineError::DuplicateName(to.to_string()));
        }
        let mut dc = self
            .containers
            .remove(from)
            .ok_or_else(|| PipelineError::NotFound(from.to_string()))?;
        dc.set_name(to);
        self.containers.insert(to.to_string(), dc);
        Ok(())
    }

    /// Container names, sorted.
    pub fn container_names(&self) -> Vec<String> {
        self.containers.keys().cloned().collect()
    }

    /// Number of containers.
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// The group addressed by the first two parts of `path`.
    pub fn resolve_group(&self, path: &DataArrayPath) -> Result<&AttributeGroup, PipelineError> {
        self.containers
            .get(&path.container)
            .ok_or_else(|| PipelineError::NotFound(path.container.clone()))?
            .group(&path.group)
            .ok_or_else(|| PipelineError::NotFound(format!("{}/{}", path.container, path.group)))
    }

    pub fn resolve_group_mut(
        &mut self,
        path: &DataArrayPath,
    ) -> Result<&mut AttributeGroup, PipelineError> {
        self.containers
            .get_mut(&path.container)
            .ok_or_else(|| PipelineError::NotFound(path.container.clone()))?
            .group_mut(&path.group)
            .ok_or_else(|| PipelineError::NotFound(format!("{}/{}", path.container, path.group)))
    }

    /// The typed array at `path`.
    ///
    /// # Errors
    /// `NotFound` naming the first missing part of the path.
    pub fn resolve(&self, path: &DataArrayPath) -> Result<&TypedArray, PipelineError> {
        self.resolve_group(path)?
            .get(&path.array)
            .ok_or_else(|| PipelineError::NotFound(path.to_string()))
    }

    pub fn resolve_mut(&mut self, path: &DataArrayPath) -> Result<&mut TypedArray, PipelineError> {
        self.resolve_group_mut(path)?
            .get_mut(&path.array)
            .ok_or_else(|| PipelineError::NotFound(path.to_string()))
    }

    /// The neighbor list at `path`.
    pub fn resolve_list(&self, path: &DataArrayPath) -> Result<&NeighborList, PipelineError> {
        self.resolve_group(path)?
            .list(&path.array)
            .ok_or_else(|| PipelineError::NotFound(path.to_string()))
    }

    pub fn resolve_list_mut(
        &mut self,
        path: &DataArrayPath,
    ) -> Result<&mut NeighborList, PipelineError> {
        self.resolve_group_mut(path)?
            .list_mut(&path.array)
            .ok_or_else(|| PipelineError::NotFound(path.to_string()))
    }

    /// Check that `path` holds an array of `scalar_type` with `components`
    /// components, and return its shape.
    ///
    /// `components == None` accepts any component count.
    ///
    /// # Errors
    /// `MissingPrerequisite` if the path does not resolve or the array has
    /// the wrong type or component count.
    pub fn require_array(
        &self,
        path: &DataArrayPath,
        scalar_type: ScalarType,
        components: Option<usize>,
    ) -> Result<ArrayShape, PipelineError> {
        let array = self
            .resolve(path)
            .map_err(|e| PipelineError::missing(path, e.to_string()))?;
        let shape = array.shape();
        if shape.scalar_type != scalar_type {
            return Err(PipelineError::missing(
                path,
                format!("expected `{scalar_type}` array, found `{}`", shape.scalar_type),
            ));
        }
        if let Some(c) = components {
            if shape.components != c {
                return Err(PipelineError::missing(
                    path,
                    format!("expected {c} component(s), found {}", shape.components),
                ));
            }
        }
        Ok(shape)
    }

    /// Check that every path resolves to an array and that they all share one
    /// tuple count, returned on success.
    ///
    /// # Errors
    /// - `NotFound` if a path does not resolve.
    /// - `TupleCountMismatch` listing every path whose count differs from the
    ///   first path's.
    pub fn validate_tuple_counts(&self, paths: &[DataArrayPath]) -> Result<usize, PipelineError> {
        let counts: Vec<usize> = paths
            .iter()
            .map(|p| self.tuple_count_at(p))
            .collect::<Result<_, _>>()?;
        let Some(&expected) = counts.first() else {
            return Ok(0);
        };
        let offending: Vec<&DataArrayPath> = paths
            .iter()
            .zip(&counts)
            .filter(|&(_, &c)| c != expected)
            .map(|(p, _)| p)
            .collect();
        if let Some(&first_bad) = offending.first() {
            let found = self.tuple_count_at(first_bad)?;
            log::debug!(
                "tuple count mismatch against {}: {}",
                paths[0],
                offending.iter().join(", ")
            );
            let mut listed = vec![paths[0].to_string()];
            listed.extend(offending.iter().map(ToString::to_string));
            return Err(PipelineError::TupleCountMismatch {
                expected,
                found,
                paths: listed,
            });
        }
        Ok(expected)
    }

    fn tuple_count_at(&self, path: &DataArrayPath) -> Result<usize, PipelineError> {
        let group = self.resolve_group(path)?;
        if let Some(a) = group.get(&path.array) {
            Ok(a.number_of_tuples())
        } else if let Some(l) = group.list(&path.array) {
            Ok(l.number_of_tuples())
        } else {
            Err(PipelineError::NotFound(path.to_string()))
        }
    }

    /// Make sure `path` names an array of the given type and component
    /// count, creating it with the group's tuple count if needed.
    ///
    /// An existing array of the right type and component count is left as
    /// is, so repeated reservations do not change the registry. An existing
    /// array of another type or shape is replaced.
    ///
    /// # Errors
    /// - `MissingPrerequisite` if the container or group does not exist.
    /// - `InvalidParameter` if the array name is empty.
    /// - `DuplicateName` if a neighbor list already uses the name.
    /// - `InvalidShape` if `components == 0`.
    pub fn reserve_array(
        &mut self,
        path: &DataArrayPath,
        scalar_type: ScalarType,
        components: usize,
    ) -> Result<ArrayShape, PipelineError> {
        if path.array.is_empty() {
            return Err(PipelineError::invalid_parameter(
                "array name",
                format!("created array under `{}/{}` needs a name", path.container, path.group),
            ));
        }
        let group = self
            .resolve_group_mut(path)
            .map_err(|e| PipelineError::missing(path, e.to_string()))?;
        if let Some(existing) = group.get(&path.array) {
            let shape = existing.shape();
            if shape.scalar_type == scalar_type && shape.components == components {
                return Ok(shape);
            }
            log::warn!(
                "replacing reserved array `{path}`: {} x {} -> {scalar_type} x {components}",
                shape.scalar_type,
                shape.components
            );
        }
        let array = TypedArray::new(scalar_type, group.tuple_count(), components, &path.array)?;
        let shape = array.shape();
        group.replace(&path.array, array)?;
        Ok(shape)
    }

    /// Make sure `path` names a neighbor list, creating an empty one with the
    /// group's tuple count if needed.
    pub fn reserve_list(&mut self, path: &DataArrayPath) -> Result<usize, PipelineError> {
        if path.array.is_empty() {
            return Err(PipelineError::invalid_parameter(
                "list name",
                format!("created list under `{}/{}` needs a name", path.container, path.group),
            ));
        }
        let group = self
            .resolve_group_mut(path)
            .map_err(|e| PipelineError::missing(path, e.to_string()))?;
        if let Some(list) = group.list(&path.array) {
            return Ok(list.number_of_tuples());
        }
        let tuples = group.tuple_count();
        group.add_list(&path.array, NeighborList::new(&path.array, tuples))?;
        Ok(tuples)
    }

    /// Iterate containers in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataContainer)> {
        self.containers.iter().map(|(k, c)| (k.as_str(), c))
    }
}
