//! Geometry descriptors attached to data containers.
//!
//! A [`Geometry`] holds vertex coordinates and flat element-to-vertex
//! connectivity for one [`GeometryKind`]. Vertex links and element neighbor
//! lists are derived on request and cached until the topology changes.

pub mod cache;
pub mod kind;
pub mod metrics;

pub use cache::InvalidateCache;
pub use kind::GeometryKind;

use crate::algs::edges;
use crate::algs::element_neighbors::{ElementNeighborOpts, ElementNeighbors};
use crate::algs::vertex_links::VertexLinks;
use crate::debug_invariants::DebugInvariants;
use crate::pipeline_error::PipelineError;

/// Vertices plus element connectivity of a single element kind.
#[derive(Clone, Debug)]
pub struct Geometry {
    kind: GeometryKind,
    vertices: Vec<[f32; 3]>,
    connectivity: Vec<usize>,
    vertex_links: Option<VertexLinks>,
    element_neighbors: Option<ElementNeighbors>,
}

impl Geometry {
    /// Build a geometry, checking that `connectivity` is a whole number of
    /// elements and only references existing vertices.
    pub fn new(
        kind: GeometryKind,
        vertices: Vec<[f32; 3]>,
        connectivity: Vec<usize>,
    ) -> Result<Self, PipelineError> {
        let geom = Self {
            kind,
            vertices,
            connectivity,
            vertex_links: None,
            element_neighbors: None,
        };
        geom.validate_invariants()?;
        Ok(geom)
    }

    /// Point cloud where vertex `i` is element `i`.
    pub fn vertex_cloud(vertices: Vec<[f32; 3]>) -> Self {
        let connectivity = (0..vertices.len()).collect();
        Self {
            kind: GeometryKind::Vertex,
            vertices,
            connectivity,
            vertex_links: None,
            element_neighbors: None,
        }
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    pub fn number_of_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn number_of_elements(&self) -> usize {
        self.connectivity.len() / self.kind.vertices_per_element()
    }

    pub fn vertices(&self) -> &[[f32; 3]] {
        &self.vertices
    }

    /// Flat connectivity, `vertices_per_element` indices per element.
    pub fn connectivity(&self) -> &[usize] {
        &self.connectivity
    }

    pub fn vertex(&self, i: usize) -> Option<[f32; 3]> {
        self.vertices.get(i).copied()
    }

    /// Vertex indices of element `e`.
    pub fn element(&self, e: usize) -> Option<&[usize]> {
        let k = self.kind.vertices_per_element();
        self.connectivity.get(e * k..(e + 1) * k)
    }

    /// Replace the vertex coordinates. The vertex count may only change if
    /// the connectivity still fits.
    pub fn set_vertices(&mut self, vertices: Vec<[f32; 3]>) -> Result<(), PipelineError> {
        let old = std::mem::replace(&mut self.vertices, vertices);
        if let Err(e) = self.validate_invariants() {
            self.vertices = old;
            return Err(e);
        }
        self.invalidate_cache();
        Ok(())
    }

    /// Replace the element connectivity.
    pub fn set_connectivity(&mut self, connectivity: Vec<usize>) -> Result<(), PipelineError> {
        let old = std::mem::replace(&mut self.connectivity, connectivity);
        if let Err(e) = self.validate_invariants() {
            self.connectivity = old;
            return Err(e);
        }
        self.invalidate_cache();
        Ok(())
    }

    /// Build the vertex links unless they are already cached.
    pub fn find_vertex_links(&mut self) -> Result<&VertexLinks, PipelineError> {
        if self.vertex_links.is_none() {
            let links = VertexLinks::build(
                self.vertices.len(),
                &self.connectivity,
                self.kind.vertices_per_element(),
            )?;
            log::debug!(
                "built vertex links for {} ({} vertices)",
                self.kind.as_str(),
                links.number_of_vertices()
            );
            self.vertex_links = Some(links);
        }
        self.vertex_links
            .as_ref()
            .ok_or_else(|| PipelineError::Generic("vertex links missing after build".into()))
    }

    /// Build element neighbors with `opts`, building vertex links first if
    /// needed. A cached result is rebuilt, since `opts` may differ.
    pub fn find_element_neighbors(
        &mut self,
        opts: ElementNeighborOpts,
    ) -> Result<&ElementNeighbors, PipelineError> {
        self.find_vertex_links()?;
        let links = self
            .vertex_links
            .as_ref()
            .ok_or_else(|| PipelineError::Generic("vertex links missing after build".into()))?;
        let neighbors = ElementNeighbors::build(
            &self.connectivity,
            self.kind.vertices_per_element(),
            links,
            opts,
        )?;
        Ok(self.element_neighbors.insert(neighbors))
    }

    /// Cached vertex links, if built.
    pub fn vertex_links(&self) -> Option<&VertexLinks> {
        self.vertex_links.as_ref()
    }

    /// Cached element neighbors, if built.
    pub fn element_neighbors(&self) -> Option<&ElementNeighbors> {
        self.element_neighbors.as_ref()
    }

    /// Centroid of every element.
    pub fn element_centroids(&self) -> Vec<[f32; 3]> {
        let k = self.kind.vertices_per_element();
        self.connectivity
            .chunks_exact(k)
            .map(|element| {
                let c = metrics::centroid(&self.corners(element));
                [c[0] as f32, c[1] as f32, c[2] as f32]
            })
            .collect()
    }

    /// Length, area or volume of every element.
    pub fn element_sizes(&self) -> Result<Vec<f32>, PipelineError> {
        let k = self.kind.vertices_per_element();
        self.connectivity
            .chunks_exact(k)
            .map(|element| metrics::element_size(self.kind, &self.corners(element)).map(|s| s as f32))
            .collect()
    }

    /// Distinct edges as ascending vertex pairs.
    pub fn unique_edges(&self) -> Result<Vec<[usize; 2]>, PipelineError> {
        edges::unique_edges(self.kind, &self.connectivity)
    }

    /// Edges owned by a single surface element.
    pub fn boundary_edges(&self) -> Result<Vec<[usize; 2]>, PipelineError> {
        edges::boundary_edges(self.kind, &self.connectivity)
    }

    fn corners(&self, element: &[usize]) -> Vec<[f64; 3]> {
        element
            .iter()
            .map(|&v| {
                let p = self.vertices[v];
                [f64::from(p[0]), f64::from(p[1]), f64::from(p[2])]
            })
            .collect()
    }
}

impl InvalidateCache for Geometry {
    fn invalidate_cache(&mut self) {
        self.vertex_links = None;
        self.element_neighbors = None;
    }
}

impl DebugInvariants for Geometry {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Geometry");
    }

    fn validate_invariants(&self) -> Result<(), PipelineError> {
        let k = self.kind.vertices_per_element();
        if self.connectivity.len() % k != 0 {
            return Err(PipelineError::InvalidGeometry(format!(
                "{}: connectivity length {} is not a multiple of {k}",
                self.kind.as_str(),
                self.connectivity.len()
            )));
        }
        let n = self.vertices.len();
        if let Some(&v) = self.connectivity.iter().find(|&&v| v >= n) {
            return Err(PipelineError::InvalidGeometry(format!(
                "{}: vertex index {v} out of range for {n} vertices",
                self.kind.as_str()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_as_triangles() -> Geometry {
        Geometry::new(
            GeometryKind::Triangle,
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            vec![0, 1, 2, 0, 2, 3],
        )
        .unwrap()
    }

    #[test]
    fn rejects_bad_connectivity() {
        let v = vec![[0.0; 3]; 3];
        assert!(Geometry::new(GeometryKind::Triangle, v.clone(), vec![0, 1]).is_err());
        assert!(Geometry::new(GeometryKind::Triangle, v, vec![0, 1, 3]).is_err());
    }

    #[test]
    fn links_are_cached_until_topology_changes() {
        let mut g = quad_as_triangles();
        assert!(g.vertex_links().is_none());
        assert_eq!(g.find_vertex_links().unwrap().elements_of(0), &[0, 1]);
        g.find_element_neighbors(Default::default()).unwrap();
        assert!(g.vertex_links().is_some());
        assert_eq!(g.element_neighbors().unwrap().neighbors(0), &[1]);

        g.set_connectivity(vec![0, 1, 2]).unwrap();
        assert!(g.vertex_links().is_none());
        assert!(g.element_neighbors().is_none());
        assert_eq!(g.number_of_elements(), 1);
    }

    #[test]
    fn failed_mutation_keeps_old_state() {
        let mut g = quad_as_triangles();
        g.find_vertex_links().unwrap();
        assert!(g.set_vertices(vec![[0.0; 3]; 2]).is_err());
        assert_eq!(g.number_of_vertices(), 4);
        assert!(g.vertex_links().is_some());
    }

    #[test]
    fn centroids_and_sizes() {
        let g = quad_as_triangles();
        let sizes = g.element_sizes().unwrap();
        assert!((sizes[0] - 0.5).abs() < 1e-6 && (sizes[1] - 0.5).abs() < 1e-6);
        let c = g.element_centroids();
        assert!((c[0][0] - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(g.element(1), Some(&[0usize, 2, 3][..]));
        assert_eq!(g.boundary_edges().unwrap().len(), 4);
    }

    #[test]
    fn vertex_cloud_elements_are_vertices() {
        let g = Geometry::vertex_cloud(vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(g.number_of_elements(), 2);
        assert_eq!(g.element_centroids()[1], [4.0, 5.0, 6.0]);
        assert_eq!(g.element_sizes().unwrap(), vec![0.0, 0.0]);
    }
}
