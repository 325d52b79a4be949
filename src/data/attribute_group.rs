//! AttributeGroup: named arrays sharing one tuple count.
//!
//! A group owns its arrays outright. Every member, typed array or neighbor
//! list, has exactly [`AttributeGroup::tuple_count`] tuples. An empty group
//! adopts the tuple count of the first array added to it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::neighbor_list::NeighborList;
use crate::data::typed_array::TypedArray;
use crate::debug_invariants::DebugInvariants;
use crate::pipeline_error::PipelineError;

/// Declared granularity of a group's tuples.
///
/// This is metadata for callers; the group does not check it against any
/// geometry.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum GroupKind {
    /// One tuple per geometry vertex.
    Vertex,
    /// One tuple per geometry edge.
    Edge,
    /// One tuple per surface element.
    Face,
    /// One tuple per volume element or image cell.
    Cell,
    /// One tuple per feature (grain).
    Feature,
    /// One tuple per ensemble (phase).
    Ensemble,
    /// Anything else.
    #[default]
    Generic,
}

/// Named mapping from array name to array, with a shared tuple count.
#[derive(Clone, Debug, Default)]
pub struct AttributeGroup {
    name: String,
    kind: GroupKind,
    tuple_count: usize,
    arrays: BTreeMap<String, TypedArray>,
    lists: BTreeMap<String, NeighborList>,
}

impl AttributeGroup {
    /// Empty group with a tuple count of zero.
    pub fn new(name: impl Into<String>, kind: GroupKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    /// Empty group with a pre-declared tuple count.
    pub fn with_tuple_count(name: impl Into<String>, kind: GroupKind, tuple_count: usize) -> Self {
        Self {
            tuple_count,
            ..Self::new(name, kind)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    pub fn tuple_count(&self) -> usize {
        self.tuple_count
    }

    /// Number of members (typed arrays plus neighbor lists).
    pub fn len(&self) -> usize {
        self.arrays.len() + self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty() && self.lists.is_empty()
    }

    /// True if `name` is taken by an array or a neighbor list.
    pub fn contains(&self, name: &str) -> bool {
        self.arrays.contains_key(name) || self.lists.contains_key(name)
    }

    /// Insert `array` under `name`.
    ///
    /// # Errors
    /// - `DuplicateName` if `name` is already present.
    /// - `TupleCountMismatch` if the group is non-empty and the array's tuple
    ///   count differs from [`tuple_count`](Self::tuple_count).
    pub fn add(&mut self, name: &str, array: TypedArray) -> Result<(), PipelineError> {
        if self.contains(name) {
            return Err(PipelineError::DuplicateName(format!("{}/{name}", self.name)));
        }
        self.insert_array(name, array)
    }

    /// Insert or overwrite `array` under `name`, with the same tuple-count
    /// rule as [`add`](Self::add). Returns the replaced array, if any.
    pub fn replace(
        &mut self,
        name: &str,
        array: TypedArray,
    ) -> Result<Option<TypedArray>, PipelineError> {
        if self.lists.contains_key(name) {
            return Err(PipelineError::DuplicateName(format!("{}/{name}", self.name)));
        }
        let old = self.arrays.remove(name);
        if let Err(e) = self.insert_array(name, array) {
            if let Some(old) = old {
                self.arrays.insert(name.to_string(), old);
            }
            return Err(e);
        }
        Ok(old)
    }

    fn insert_array(&mut self, name: &str, mut array: TypedArray) -> Result<(), PipelineError> {
        self.adopt_or_check(name, array.number_of_tuples())?;
        if array.name() != name {
            log::warn!(
                "Adding array with different array name than key name to `{}`: key={name} array={}",
                self.name,
                array.name()
            );
            array.set_name(name);
        }
        self.arrays.insert(name.to_string(), array);
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        Ok(())
    }

    fn adopt_or_check(&mut self, name: &str, tuples: usize) -> Result<(), PipelineError> {
        if self.is_empty() {
            self.tuple_count = tuples;
        } else if tuples != self.tuple_count {
            return Err(PipelineError::TupleCountMismatch {
                expected: self.tuple_count,
                found: tuples,
                paths: vec![format!("{}/{name}", self.name)],
            });
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TypedArray> {
        self.arrays.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TypedArray> {
        self.arrays.get_mut(name)
    }

    /// Remove and return the array stored under `name`.
    pub fn remove(&mut self, name: &str) -> Option<TypedArray> {
        self.arrays.remove(name)
    }

    /// Names of all typed arrays, sorted.
    pub fn array_names(&self) -> Vec<String> {
        self.arrays.keys().cloned().collect()
    }

    /// Iterate `(name, array)` in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedArray)> {
        self.arrays.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Insert a neighbor list, with the same rules as [`add`](Self::add).
    pub fn add_list(&mut self, name: &str, list: NeighborList) -> Result<(), PipelineError> {
        if self.contains(name) {
            return Err(PipelineError::DuplicateName(format!("{}/{name}", self.name)));
        }
        self.insert_list(name, list)
    }

    /// Insert or overwrite a neighbor list.
    pub fn replace_list(
        &mut self,
        name: &str,
        list: NeighborList,
    ) -> Result<Option<NeighborList>, PipelineError> {
        if self.arrays.contains_key(name) {
            return Err(PipelineError::DuplicateName(format!("{}/{name}", self.name)));
        }
        let old = self.lists.remove(name);
        if let Err(e) = self.insert_list(name, list) {
            if let Some(old) = old {
                self.lists.insert(name.to_string(), old);
            }
            return Err(e);
        }
        Ok(old)
    }

    fn insert_list(&mut self, name: &str, mut list: NeighborList) -> Result<(), PipelineError> {
        self.adopt_or_check(name, list.number_of_tuples())?;
        if list.name() != name {
            log::warn!(
                "Adding neighbor list with different name than key name to `{}`: key={name} list={}",
                self.name,
                list.name()
            );
            list.set_name(name);
        }
        self.lists.insert(name.to_string(), list);
        Ok(())
    }

    pub fn list(&self, name: &str) -> Option<&NeighborList> {
        self.lists.get(name)
    }

    pub fn list_mut(&mut self, name: &str) -> Option<&mut NeighborList> {
        self.lists.get_mut(name)
    }

    pub fn remove_list(&mut self, name: &str) -> Option<NeighborList> {
        self.lists.remove(name)
    }

    /// Iterate `(name, list)` in name order.
    pub fn iter_lists(&self) -> impl Iterator<Item = (&str, &NeighborList)> {
        self.lists.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Resize every member to `tuples` and record the new tuple count.
    pub fn resize_all(&mut self, tuples: usize) -> Result<(), PipelineError> {
        for array in self.arrays.values_mut() {
            array.resize(tuples)?;
        }
        for list in self.lists.values_mut() {
            list.resize(tuples);
        }
        self.tuple_count = tuples;
        Ok(())
    }

    /// Drop every member. The tuple count is kept.
    pub fn clear(&mut self) {
        self.arrays.clear();
        self.lists.clear();
    }
}

impl DebugInvariants for AttributeGroup {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "AttributeGroup");
    }

    fn validate_invariants(&self) -> Result<(), PipelineError> {
        let counts = self
            .arrays
            .iter()
            .map(|(k, a)| (k, a.number_of_tuples()))
            .chain(self.lists.iter().map(|(k, l)| (k, l.number_of_tuples())));
        for (name, tuples) in counts {
            if tuples != self.tuple_count {
                return Err(PipelineError::TupleCountMismatch {
                    expected: self.tuple_count,
                    found: tuples,
                    paths: vec![format!("{}/{name}", self.name)],
                });
            }
        }
        for array in self.arrays.values() {
            array.validate_invariants()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::scalar::ScalarType;

    fn arr(name: &str, tuples: usize) -> TypedArray {
        TypedArray::new(ScalarType::F32, tuples, 1, name).unwrap()
    }

    #[test]
    fn empty_group_adopts_first_tuple_count() {
        let mut g = AttributeGroup::new("Grain Data", GroupKind::Feature);
        g.add("EquivalentDiameters", arr("EquivalentDiameters", 5)).unwrap();
        assert_eq!(g.tuple_count(), 5);
    }

    #[test]
    fn mismatched_tuple_count_is_rejected() {
        let mut g = AttributeGroup::new("Grain Data", GroupKind::Feature);
        g.add("a", arr("a", 5)).unwrap();
        let err = g.add("b", arr("b", 4)).unwrap_err();
        assert_eq!(err.code(), crate::pipeline_error::TUPLE_COUNT_MISMATCH);
        assert!(!g.contains("b"));
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let mut g = AttributeGroup::new("g", GroupKind::Generic);
        g.add("a", arr("a", 2)).unwrap();
        assert!(matches!(
            g.add("a", arr("a", 2)),
            Err(PipelineError::DuplicateName(_))
        ));
        assert!(matches!(
            g.add_list("a", NeighborList::new("a", 2)),
            Err(PipelineError::DuplicateName(_))
        ));
    }

    #[test]
    fn add_renames_array_to_key() {
        let mut g = AttributeGroup::new("g", GroupKind::Generic);
        g.add("Phases", arr("tmp", 3)).unwrap();
        assert_eq!(g.get("Phases").unwrap().name(), "Phases");
    }

    #[test]
    fn replace_keeps_old_on_failure() {
        let mut g = AttributeGroup::new("g", GroupKind::Generic);
        g.add("a", arr("a", 2)).unwrap();
        g.add("b", arr("b", 2)).unwrap();
        assert!(g.replace("a", arr("a", 3)).is_err());
        assert_eq!(g.get("a").unwrap().number_of_tuples(), 2);
        let old = g.replace("a", arr("a", 2)).unwrap();
        assert!(old.is_some());
    }

    #[test]
    fn sole_member_replace_may_change_tuple_count() {
        let mut g = AttributeGroup::new("g", GroupKind::Generic);
        g.add("a", arr("a", 2)).unwrap();
        g.replace("a", arr("a", 7)).unwrap();
        assert_eq!(g.tuple_count(), 7);
    }

    #[test]
    fn resize_all_propagates() {
        let mut g = AttributeGroup::new("g", GroupKind::Cell);
        g.add("a", arr("a", 2)).unwrap();
        g.add_list("n", NeighborList::new("n", 2)).unwrap();
        g.resize_all(6).unwrap();
        assert_eq!(g.get("a").unwrap().number_of_tuples(), 6);
        assert_eq!(g.list("n").unwrap().number_of_tuples(), 6);
        assert!(g.validate_invariants().is_ok());
    }

    #[test]
    fn remove_and_iterate() {
        let mut g = AttributeGroup::new("g", GroupKind::Cell);
        g.add("b", arr("b", 1)).unwrap();
        g.add("a", arr("a", 1)).unwrap();
        let names: Vec<_> = g.iter().map(|(n, _)| n.to_string()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(g.remove("a").is_some());
        assert!(g.get("a").is_none());
        assert_eq!(g.len(), 1);
    }
}
