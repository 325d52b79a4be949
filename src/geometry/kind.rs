//! Geometry kind metadata.

use serde::{Deserialize, Serialize};

/// Element topology of a container's geometry.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum GeometryKind {
    /// Point cloud; every vertex is its own element.
    Vertex,
    /// Line segments.
    Edge,
    /// Triangle surface mesh.
    Triangle,
    /// Quadrilateral surface mesh.
    Quad,
    /// Tetrahedral volume mesh.
    Tetrahedral,
    /// Hexahedral volume mesh.
    Hexahedral,
}

impl GeometryKind {
    /// Returns the topological dimension of one element.
    pub fn dimension(self) -> u8 {
        match self {
            GeometryKind::Vertex => 0,
            GeometryKind::Edge => 1,
            GeometryKind::Triangle | GeometryKind::Quad => 2,
            GeometryKind::Tetrahedral | GeometryKind::Hexahedral => 3,
        }
    }

    /// Number of vertices referenced by one element.
    pub fn vertices_per_element(self) -> usize {
        match self {
            GeometryKind::Vertex => 1,
            GeometryKind::Edge => 2,
            GeometryKind::Triangle => 3,
            GeometryKind::Quad | GeometryKind::Tetrahedral => 4,
            GeometryKind::Hexahedral => 8,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GeometryKind::Vertex => "VertexGeometry",
            GeometryKind::Edge => "EdgeGeometry",
            GeometryKind::Triangle => "TriangleGeometry",
            GeometryKind::Quad => "QuadGeometry",
            GeometryKind::Tetrahedral => "TetrahedralGeometry",
            GeometryKind::Hexahedral => "HexahedralGeometry",
        }
    }
}
