//! Element-to-element neighbor lists built from vertex links.
//!
//! Two elements are neighbors when they share at least
//! [`ElementNeighborOpts::min_shared_vertices`] vertices. For each element the
//! element lists of its vertices are merged with a shared-vertex count, the
//! element itself is dropped and the threshold applied. Typical cost is
//! O(E·k²).
//!
//! Determinism:
//! - Neighbor lists are sorted ascending and self-free.
//! - With `min_shared_vertices` held fixed the relation is symmetric.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::algs::vertex_links::VertexLinks;
use crate::pipeline_error::PipelineError;

/// Options for building element neighbor lists.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ElementNeighborOpts {
    /// Minimum number of shared vertices for two elements to be neighbors.
    /// - `1` => any shared vertex (default)
    /// - `2` => shared edge
    /// - `3`/`4` => shared triangle/quad face
    pub min_shared_vertices: usize,
}

impl Default for ElementNeighborOpts {
    fn default() -> Self {
        Self {
            min_shared_vertices: 1,
        }
    }
}

/// CSR neighbor lists, one per element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementNeighbors {
    /// CSR offsets into `adjncy` for each element.
    pub xadj: Vec<usize>,
    /// Concatenated neighbor lists.
    pub adjncy: Vec<usize>,
}

impl ElementNeighbors {
    /// Build neighbor lists for the elements of `connectivity`.
    ///
    /// `links` must have been built from the same connectivity.
    pub fn build(
        connectivity: &[usize],
        vertices_per_element: usize,
        links: &VertexLinks,
        opts: ElementNeighborOpts,
    ) -> Result<Self, PipelineError> {
        let k = vertices_per_element;
        if opts.min_shared_vertices == 0 {
            return Err(PipelineError::invalid_parameter(
                "min_shared_vertices",
                "must be at least 1",
            ));
        }
        if k == 0 || connectivity.len() % k != 0 {
            return Err(PipelineError::InvalidGeometry(format!(
                "connectivity length {} is not a multiple of {k}",
                connectivity.len()
            )));
        }
        let n = connectivity.len() / k;
        let threshold = opts.min_shared_vertices;

        let neighbors_of = |e: usize| -> Vec<usize> {
            let element = &connectivity[e * k..(e + 1) * k];
            let mut shared: HashMap<usize, usize> = HashMap::with_capacity(4 * k);
            for (j, &v) in element.iter().enumerate() {
                if element[..j].contains(&v) {
                    continue;
                }
                for &other in links.elements_of(v) {
                    if other != e {
                        *shared.entry(other).or_insert(0) += 1;
                    }
                }
            }
            let mut out: Vec<usize> = shared
                .into_iter()
                .filter(|&(_, count)| count >= threshold)
                .map(|(other, _)| other)
                .collect();
            out.sort_unstable();
            out
        };

        #[cfg(feature = "rayon")]
        let lists: Vec<Vec<usize>> = (0..n).into_par_iter().map(neighbors_of).collect();
        #[cfg(not(feature = "rayon"))]
        let lists: Vec<Vec<usize>> = (0..n).map(neighbors_of).collect();

        let total: usize = lists.iter().map(Vec::len).sum();
        let mut xadj = Vec::with_capacity(n + 1);
        let mut adjncy = Vec::with_capacity(total);
        xadj.push(0);
        for list in &lists {
            adjncy.extend_from_slice(list);
            xadj.push(adjncy.len());
        }
        Ok(Self { xadj, adjncy })
    }

    /// Build vertex links internally, then the neighbor lists.
    pub fn from_connectivity(
        num_vertices: usize,
        connectivity: &[usize],
        vertices_per_element: usize,
        opts: ElementNeighborOpts,
    ) -> Result<Self, PipelineError> {
        let links = VertexLinks::build(num_vertices, connectivity, vertices_per_element)?;
        Self::build(connectivity, vertices_per_element, &links, opts)
    }

    /// Neighbor slice for element `e`; empty if `e` is out of range.
    #[inline]
    pub fn neighbors(&self, e: usize) -> &[usize] {
        match (self.xadj.get(e), self.xadj.get(e + 1)) {
            (Some(&start), Some(&end)) => &self.adjncy[start..end],
            _ => &[],
        }
    }

    pub fn number_of_elements(&self) -> usize {
        self.xadj.len().saturating_sub(1)
    }
}
