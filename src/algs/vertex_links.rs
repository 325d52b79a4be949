//! Vertex-to-element links.
//!
//! For a geometry of `E` elements with `k` vertices each, records for every
//! vertex the elements that reference it, in CSR form. Construction is two
//! linear sweeps over the connectivity (count, then fill), O(E·k) time and
//! space. Element lists come out in ascending element order.

use crate::pipeline_error::PipelineError;

/// CSR map from vertex index to the indices of elements using it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VertexLinks {
    /// `offsets[v] .. offsets[v + 1]` indexes `elements` for vertex `v`.
    pub offsets: Vec<usize>,
    /// Concatenated element lists.
    pub elements: Vec<usize>,
}

impl VertexLinks {
    /// Build links from flat element-to-vertex connectivity.
    ///
    /// A vertex listed twice by the same (degenerate) element is linked once.
    ///
    /// # Errors
    /// - `InvalidParameter` if `vertices_per_element == 0`.
    /// - `InvalidGeometry` if the connectivity length is not a multiple of
    ///   `vertices_per_element` or references a vertex `>= num_vertices`.
    pub fn build(
        num_vertices: usize,
        connectivity: &[usize],
        vertices_per_element: usize,
    ) -> Result<Self, PipelineError> {
        let k = vertices_per_element;
        if k == 0 {
            return Err(PipelineError::invalid_parameter(
                "vertices_per_element",
                "must be at least 1",
            ));
        }
        if connectivity.len() % k != 0 {
            return Err(PipelineError::InvalidGeometry(format!(
                "connectivity length {} is not a multiple of {k}",
                connectivity.len()
            )));
        }

        // 1. count
        let mut counts = vec![0usize; num_vertices];
        for element in connectivity.chunks_exact(k) {
            for (j, &v) in element.iter().enumerate() {
                if v >= num_vertices {
                    return Err(PipelineError::InvalidGeometry(format!(
                        "vertex index {v} out of range for {num_vertices} vertices"
                    )));
                }
                if !element[..j].contains(&v) {
                    counts[v] += 1;
                }
            }
        }

        // 2. offsets
        let mut offsets = Vec::with_capacity(num_vertices + 1);
        offsets.push(0);
        for c in &counts {
            let last = offsets[offsets.len() - 1];
            offsets.push(last + c);
        }

        // 3. fill
        let mut cursor: Vec<usize> = offsets[..num_vertices].to_vec();
        let mut elements = vec![0usize; offsets[num_vertices]];
        for (e, element) in connectivity.chunks_exact(k).enumerate() {
            for (j, &v) in element.iter().enumerate() {
                if !element[..j].contains(&v) {
                    elements[cursor[v]] = e;
                    cursor[v] += 1;
                }
            }
        }

        Ok(Self { offsets, elements })
    }

    /// Elements referencing vertex `v`; empty if `v` is out of range.
    #[inline]
    pub fn elements_of(&self, v: usize) -> &[usize] {
        match (self.offsets.get(v), self.offsets.get(v + 1)) {
            (Some(&start), Some(&end)) => &self.elements[start..end],
            _ => &[],
        }
    }

    pub fn number_of_vertices(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Total number of (vertex, element) links.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 3---2
    // | / |
    // 0---1   triangles (0,1,2) and (0,2,3)
    fn quad_as_triangles() -> Vec<usize> {
        vec![0, 1, 2, 0, 2, 3]
    }

    #[test]
    fn shared_vertices_link_both_triangles() {
        let links = VertexLinks::build(4, &quad_as_triangles(), 3).unwrap();
        assert_eq!(links.elements_of(0), &[0, 1]);
        assert_eq!(links.elements_of(2), &[0, 1]);
        assert_eq!(links.elements_of(1), &[0]);
        assert_eq!(links.elements_of(3), &[1]);
        assert_eq!(links.len(), 6);
    }

    #[test]
    fn isolated_vertex_has_no_links() {
        let links = VertexLinks::build(5, &quad_as_triangles(), 3).unwrap();
        assert!(links.elements_of(4).is_empty());
        assert!(links.elements_of(99).is_empty());
        assert_eq!(links.number_of_vertices(), 5);
    }

    #[test]
    fn degenerate_element_links_once() {
        let links = VertexLinks::build(2, &[0, 0, 1], 3).unwrap();
        assert_eq!(links.elements_of(0), &[0]);
    }

    #[test]
    fn rejects_bad_connectivity() {
        assert!(matches!(
            VertexLinks::build(3, &[0, 1, 2, 0], 3),
            Err(PipelineError::InvalidGeometry(_))
        ));
        assert!(matches!(
            VertexLinks::build(2, &[0, 1, 2], 3),
            Err(PipelineError::InvalidGeometry(_))
        ));
        assert!(VertexLinks::build(2, &[], 0).is_err());
    }
}
