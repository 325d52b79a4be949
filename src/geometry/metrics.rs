//! Element centroids and sizes.
//!
//! The elements use the following vertex ordering:
//! - Edge: `[v0, v1]`.
//! - Triangle: `[v0, v1, v2]`.
//! - Quad: `[v0, v1, v2, v3]` counter-clockwise.
//! - Tetrahedral: `[v0, v1, v2, v3]`.
//! - Hexahedral: bottom face `[v0, v1, v2, v3]`, top face `[v4, v5, v6, v7]`
//!   with `v4` above `v0`.

use crate::geometry::GeometryKind;
use crate::pipeline_error::PipelineError;

/// Length, area or volume of one element, according to its dimension.
///
/// Vertex elements have size 0. Surface areas are unsigned; volumes are
/// absolute values of the signed volume.
pub fn element_size(kind: GeometryKind, vertices: &[[f64; 3]]) -> Result<f64, PipelineError> {
    let expected = kind.vertices_per_element();
    if vertices.len() != expected {
        return Err(PipelineError::InvalidGeometry(format!(
            "vertex count mismatch: expected {expected}, got {}",
            vertices.len()
        )));
    }
    Ok(match kind {
        GeometryKind::Vertex => 0.0,
        GeometryKind::Edge => norm(sub(vertices[1], vertices[0])),
        GeometryKind::Triangle => triangle_area(vertices[0], vertices[1], vertices[2]),
        GeometryKind::Quad => {
            triangle_area(vertices[0], vertices[1], vertices[2])
                + triangle_area(vertices[0], vertices[2], vertices[3])
        }
        GeometryKind::Tetrahedral => {
            signed_volume(vertices[0], vertices[1], vertices[2], vertices[3]).abs()
        }
        GeometryKind::Hexahedral => hex_volume(vertices).abs(),
    })
}

/// Arithmetic mean of the vertices.
pub fn centroid(vertices: &[[f64; 3]]) -> [f64; 3] {
    if vertices.is_empty() {
        return [0.0; 3];
    }
    let mut c = [0.0; 3];
    for v in vertices {
        c[0] += v[0];
        c[1] += v[1];
        c[2] += v[2];
    }
    let n = vertices.len() as f64;
    [c[0] / n, c[1] / n, c[2] / n]
}

fn triangle_area(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> f64 {
    0.5 * norm(cross(sub(b, a), sub(c, a)))
}

fn signed_volume(a: [f64; 3], b: [f64; 3], c: [f64; 3], d: [f64; 3]) -> f64 {
    let ab = sub(b, a);
    let ac = sub(c, a);
    let ad = sub(d, a);
    dot(ab, cross(ac, ad)) / 6.0
}

fn hex_volume(vertices: &[[f64; 3]]) -> f64 {
    signed_volume(vertices[0], vertices[1], vertices[3], vertices[4])
        + signed_volume(vertices[1], vertices[2], vertices[3], vertices[6])
        + signed_volume(vertices[1], vertices[3], vertices[4], vertices[6])
        + signed_volume(vertices[1], vertices[4], vertices[5], vertices[6])
        + signed_volume(vertices[3], vertices[4], vertices[6], vertices[7])
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    #[test]
    fn edge_and_triangle() {
        let e = [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        assert!(approx(element_size(GeometryKind::Edge, &e).unwrap(), 2.0));
        let t = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        assert!(approx(element_size(GeometryKind::Triangle, &t).unwrap(), 0.5));
    }

    #[test]
    fn quad_area() {
        let q = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        assert!(approx(element_size(GeometryKind::Quad, &q).unwrap(), 1.0));
    }

    #[test]
    fn tet_and_hex_volume() {
        let t = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ];
        assert!(approx(element_size(GeometryKind::Tetrahedral, &t).unwrap(), 1.0 / 6.0));
        let h = [
            [0.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [2.0, 2.0, 0.0],
            [0.0, 2.0, 0.0],
            [0.0, 0.0, 2.0],
            [2.0, 0.0, 2.0],
            [2.0, 2.0, 2.0],
            [0.0, 2.0, 2.0],
        ];
        assert!(approx(element_size(GeometryKind::Hexahedral, &h).unwrap(), 8.0));
        assert_eq!(centroid(&h), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn wrong_vertex_count() {
        assert!(element_size(GeometryKind::Triangle, &[[0.0; 3]; 2]).is_err());
    }
}
