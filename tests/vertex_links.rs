use grainflow::algs::edges::unique_edges;
use grainflow::prelude::*;
use proptest::prelude::*;

/// Unit square split along the 0-2 diagonal.
fn two_triangle_quad() -> Geometry {
    Geometry::new(
        GeometryKind::Triangle,
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        vec![0, 1, 2, 0, 2, 3],
    )
    .unwrap()
}

#[test]
fn shared_vertices_link_both_triangles() {
    let mut quad = two_triangle_quad();
    let links = quad.find_vertex_links().unwrap();
    assert_eq!(links.number_of_vertices(), 4);
    // 0 and 2 lie on the shared edge
    assert_eq!(links.elements_of(0), &[0, 1]);
    assert_eq!(links.elements_of(2), &[0, 1]);
    assert_eq!(links.elements_of(1), &[0]);
    assert_eq!(links.elements_of(3), &[1]);
    assert!(links.elements_of(4).is_empty());
}

#[test]
fn neighbors_by_vertex_and_by_edge() {
    let mut quad = two_triangle_quad();
    let by_vertex = quad.find_element_neighbors(Default::default()).unwrap().clone();
    assert_eq!(by_vertex.neighbors(0), &[1]);
    assert_eq!(by_vertex.neighbors(1), &[0]);
    let by_edge = quad
        .find_element_neighbors(ElementNeighborOpts {
            min_shared_vertices: 2,
        })
        .unwrap();
    assert_eq!(by_edge.neighbors(0), &[1]);
    let by_face = ElementNeighbors::from_connectivity(
        4,
        quad.connectivity(),
        3,
        ElementNeighborOpts {
            min_shared_vertices: 3,
        },
    )
    .unwrap();
    assert!(by_face.neighbors(0).is_empty());
}

#[test]
fn hex_pair_shares_a_face() {
    // two unit cubes stacked along x
    let mut vertices = Vec::new();
    for x in 0..3 {
        for (y, z) in [(0, 0), (1, 0), (1, 1), (0, 1)] {
            vertices.push([x as f32, y as f32, z as f32]);
        }
    }
    let v = |x: usize, k: usize| x * 4 + k;
    let hex = |x: usize| {
        vec![
            v(x, 0),
            v(x + 1, 0),
            v(x + 1, 1),
            v(x, 1),
            v(x, 3),
            v(x + 1, 3),
            v(x + 1, 2),
            v(x, 2),
        ]
    };
    let mut conn = hex(0);
    conn.extend(hex(1));
    let mut g = Geometry::new(GeometryKind::Hexahedral, vertices, conn).unwrap();
    let nb = g
        .find_element_neighbors(ElementNeighborOpts {
            min_shared_vertices: 4,
        })
        .unwrap();
    assert_eq!(nb.neighbors(0), &[1]);
    let sizes = g.element_sizes().unwrap();
    assert!(sizes.iter().all(|s| (s - 1.0).abs() < 1e-6));
    assert_eq!(g.unique_edges().unwrap().len(), 20);
}

fn random_triangles() -> impl Strategy<Value = (usize, Vec<usize>)> {
    (3usize..30).prop_flat_map(|nv| {
        (
            Just(nv),
            proptest::collection::vec(0..nv, 0..40).prop_map(|mut c| {
                c.truncate(c.len() / 3 * 3);
                c
            }),
        )
    })
}

proptest! {
    #[test]
    fn links_match_connectivity((nv, conn) in random_triangles()) {
        let links = VertexLinks::build(nv, &conn, 3).unwrap();
        for (e, tri) in conn.chunks_exact(3).enumerate() {
            for &v in tri {
                prop_assert!(links.elements_of(v).contains(&e));
            }
        }
        for v in 0..nv {
            for &e in links.elements_of(v) {
                prop_assert!(conn[e * 3..e * 3 + 3].contains(&v));
            }
            prop_assert!(links.elements_of(v).windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn neighbors_are_symmetric_and_sorted((nv, conn) in random_triangles(), shared in 1usize..4) {
        let opts = ElementNeighborOpts { min_shared_vertices: shared };
        let nb = ElementNeighbors::from_connectivity(nv, &conn, 3, opts).unwrap();
        for e in 0..nb.number_of_elements() {
            let list = nb.neighbors(e);
            prop_assert!(list.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(!list.contains(&e));
            for &o in list {
                prop_assert!(nb.neighbors(o).contains(&e));
            }
        }
    }

    #[test]
    fn unique_edges_are_sorted_pairs((_nv, conn) in random_triangles()) {
        let edges = unique_edges(GeometryKind::Triangle, &conn).unwrap();
        prop_assert!(edges.iter().all(|[a, b]| a < b));
        prop_assert!(edges.windows(2).all(|w| w[0] < w[1]));
    }
}
