//! Edge extraction from element connectivity.

use hashbrown::HashMap;
use itertools::Itertools;

use crate::geometry::GeometryKind;
use crate::pipeline_error::PipelineError;

const SEGMENT_EDGES: &[[usize; 2]] = &[[0, 1]];
const TRIANGLE_EDGES: &[[usize; 2]] = &[[0, 1], [1, 2], [2, 0]];
const QUAD_EDGES: &[[usize; 2]] = &[[0, 1], [1, 2], [2, 3], [3, 0]];
const TET_EDGES: &[[usize; 2]] = &[[0, 1], [1, 2], [2, 0], [0, 3], [1, 3], [2, 3]];
const HEX_EDGES: &[[usize; 2]] = &[
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 0],
    [4, 5],
    [5, 6],
    [6, 7],
    [7, 4],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// Local vertex pairs forming the edges of one element of `kind`.
pub fn element_edges(kind: GeometryKind) -> &'static [[usize; 2]] {
    match kind {
        GeometryKind::Vertex => &[],
        GeometryKind::Edge => SEGMENT_EDGES,
        GeometryKind::Triangle => TRIANGLE_EDGES,
        GeometryKind::Quad => QUAD_EDGES,
        GeometryKind::Tetrahedral => TET_EDGES,
        GeometryKind::Hexahedral => HEX_EDGES,
    }
}

fn global_edges<'a>(
    kind: GeometryKind,
    connectivity: &'a [usize],
) -> Result<impl Iterator<Item = [usize; 2]> + 'a, PipelineError> {
    let k = kind.vertices_per_element();
    if connectivity.len() % k != 0 {
        return Err(PipelineError::InvalidGeometry(format!(
            "connectivity length {} is not a multiple of {k}",
            connectivity.len()
        )));
    }
    let local = element_edges(kind);
    Ok(connectivity.chunks_exact(k).flat_map(move |element| {
        local.iter().filter_map(move |&[a, b]| {
            let (u, v) = (element[a], element[b]);
            (u != v).then(|| [u.min(v), u.max(v)])
        })
    }))
}

/// Every distinct edge as an ascending vertex pair, sorted.
pub fn unique_edges(
    kind: GeometryKind,
    connectivity: &[usize],
) -> Result<Vec<[usize; 2]>, PipelineError> {
    Ok(global_edges(kind, connectivity)?.sorted_unstable().dedup().collect())
}

/// Edges used by exactly one surface element (the unshared edges), sorted.
///
/// # Errors
/// `InvalidGeometry` unless `kind` is `Triangle` or `Quad`.
pub fn boundary_edges(
    kind: GeometryKind,
    connectivity: &[usize],
) -> Result<Vec<[usize; 2]>, PipelineError> {
    if !matches!(kind, GeometryKind::Triangle | GeometryKind::Quad) {
        return Err(PipelineError::InvalidGeometry(format!(
            "boundary edges need a surface geometry, got {}",
            kind.as_str()
        )));
    }
    let mut uses: HashMap<[usize; 2], usize> = HashMap::new();
    for edge in global_edges(kind, connectivity)? {
        *uses.entry(edge).or_insert(0) += 1;
    }
    Ok(uses
        .into_iter()
        .filter_map(|(edge, count)| (count == 1).then_some(edge))
        .sorted_unstable()
        .collect())
}
