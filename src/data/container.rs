//! DataContainer: an optional geometry plus named attribute groups.

use std::collections::BTreeMap;

use crate::data::attribute_group::{AttributeGroup, GroupKind};
use crate::geometry::Geometry;
use crate::pipeline_error::PipelineError;

/// Named collection of attribute groups, optionally carrying a geometry.
#[derive(Clone, Debug, Default)]
pub struct DataContainer {
    name: String,
    geometry: Option<Geometry>,
    groups: BTreeMap<String, AttributeGroup>,
}

impl DataContainer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Create an empty group and return it.
    ///
    /// # Errors
    /// `DuplicateName` if a group named `name` exists.
    pub fn create_group(
        &mut self,
        name: &str,
        kind: GroupKind,
    ) -> Result<&mut AttributeGroup, PipelineError> {
        self.add_group(AttributeGroup::new(name, kind))
    }

    /// Insert an existing group under its own name.
    pub fn add_group(
        &mut self,
        group: AttributeGroup,
    ) -> Result<&mut AttributeGroup, PipelineError> {
        use std::collections::btree_map::Entry;
        match self.groups.entry(group.name().to_string()) {
            Entry::Occupied(e) => Err(PipelineError::DuplicateName(format!(
                "{}/{}",
                self.name,
                e.key()
            ))),
            Entry::Vacant(e) => Ok(e.insert(group)),
        }
    }

    pub fn group(&self, name: &str) -> Option<&AttributeGroup> {
        self.groups.get(name)
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut AttributeGroup> {
        self.groups.get_mut(name)
    }

    pub fn remove_group(&mut self, name: &str) -> Option<AttributeGroup> {
        self.groups.remove(name)
    }

    /// Group names, sorted.
    pub fn group_names(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    pub fn iter_groups(&self) -> impl Iterator<Item = (&str, &AttributeGroup)> {
        self.groups.iter().map(|(k, g)| (k.as_str(), g))
    }

    /// Attach a geometry, returning the previous one.
    pub fn set_geometry(&mut self, geometry: Geometry) -> Option<Geometry> {
        self.geometry.replace(geometry)
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn geometry_mut(&mut self) -> Option<&mut Geometry> {
        self.geometry.as_mut()
    }

    pub fn take_geometry(&mut self) -> Option<Geometry> {
        self.geometry.take()
    }
}
