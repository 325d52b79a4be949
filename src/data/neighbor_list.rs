//! Ragged per-tuple index lists (one `Vec<i32>` per tuple).

/// Variable-length list of indices for each tuple of an attribute group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NeighborList {
    name: String,
    lists: Vec<Vec<i32>>,
}

impl NeighborList {
    /// `tuples` empty lists.
    pub fn new(name: impl Into<String>, tuples: usize) -> Self {
        Self {
            name: name.into(),
            lists: vec![Vec::new(); tuples],
        }
    }

    pub fn from_lists(name: impl Into<String>, lists: Vec<Vec<i32>>) -> Self {
        Self {
            name: name.into(),
            lists,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn number_of_tuples(&self) -> usize {
        self.lists.len()
    }

    /// Resize to `tuples`; existing lists are kept, new ones are empty.
    pub fn resize(&mut self, tuples: usize) {
        self.lists.resize_with(tuples, Vec::new);
    }

    pub fn list(&self, i: usize) -> Option<&[i32]> {
        self.lists.get(i).map(Vec::as_slice)
    }

    /// Replace the list at tuple `i`. Returns `false` if `i` is out of range.
    pub fn set_list(&mut self, i: usize, list: Vec<i32>) -> bool {
        match self.lists.get_mut(i) {
            Some(slot) => {
                *slot = list;
                true
            }
            None => false,
        }
    }

    /// Sum of all list lengths.
    pub fn total_len(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[i32]> {
        self.lists.iter().map(Vec::as_slice)
    }
}
