#![allow(dead_code)]
use grainflow::data::typed_array::ArrayShape;
use grainflow::prelude::*;

pub fn path(s: &str) -> DataArrayPath {
    s.parse().unwrap()
}

/// Feature group `dc/features` with the reserved feature 0 followed by one
/// feature per centroid.
pub fn feature_registry(centroids: &[[f32; 3]], diameters: &[f32]) -> DataContainerRegistry {
    assert_eq!(centroids.len(), diameters.len());
    let mut reg = DataContainerRegistry::new();
    let g = reg
        .create_container("dc")
        .unwrap()
        .create_group("features", GroupKind::Feature)
        .unwrap();
    let mut diam = vec![0.0f32];
    diam.extend_from_slice(diameters);
    let mut cent = vec![0.0f32; 3];
    cent.extend(centroids.iter().flatten().copied());
    let n = diam.len();
    g.add(
        "EquivalentDiameters",
        TypedArray::from_vec("EquivalentDiameters", 1, diam).unwrap(),
    )
    .unwrap();
    g.add("Phases", TypedArray::from_vec("Phases", 1, vec![1i32; n]).unwrap())
        .unwrap();
    g.add("Centroids", TypedArray::from_vec("Centroids", 3, cent).unwrap())
        .unwrap();
    reg
}

/// `dc/cells` with `tuples` tuples and no arrays.
pub fn cell_registry(tuples: usize) -> DataContainerRegistry {
    let mut reg = DataContainerRegistry::new();
    reg.create_container("dc")
        .unwrap()
        .create_group("cells", GroupKind::Cell)
        .unwrap()
        .resize_all(tuples)
        .unwrap();
    reg
}

/// Every array and list in the registry with its shape, in path order.
pub fn shape_snapshot(reg: &DataContainerRegistry) -> Vec<(String, Option<ArrayShape>, usize)> {
    let mut out = Vec::new();
    for (c, dc) in reg.iter() {
        for (g, group) in dc.iter_groups() {
            for (a, array) in group.iter() {
                out.push((format!("{c}/{g}/{a}"), Some(array.shape()), group.tuple_count()));
            }
            for (l, list) in group.iter_lists() {
                out.push((format!("{c}/{g}/{l}"), None, list.number_of_tuples()));
            }
        }
    }
    out
}

/// Every array's raw bytes, in path order.
pub fn content_snapshot(reg: &DataContainerRegistry) -> Vec<(String, Vec<u8>)> {
    let mut out = Vec::new();
    for (c, dc) in reg.iter() {
        for (g, group) in dc.iter_groups() {
            for (a, array) in group.iter() {
                out.push((format!("{c}/{g}/{a}"), array.as_bytes().to_vec()));
            }
        }
    }
    out
}
