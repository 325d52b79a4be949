use grainflow::pipeline_error::TUPLE_COUNT_MISMATCH;
use grainflow::prelude::*;

fn arr(name: &str, tuples: usize) -> TypedArray {
    TypedArray::new(ScalarType::I32, tuples, 1, name).unwrap()
}

#[test]
fn empty_group_adopts_then_enforces() {
    let mut g = AttributeGroup::new("CellData", GroupKind::Cell);
    assert_eq!(g.tuple_count(), 0);
    g.add("FeatureIds", arr("FeatureIds", 100)).unwrap();
    assert_eq!(g.tuple_count(), 100);

    let err = g.add("Phases", arr("Phases", 99)).unwrap_err();
    assert_eq!(err.code(), TUPLE_COUNT_MISMATCH);
    match err {
        PipelineError::TupleCountMismatch {
            expected, found, ..
        } => assert_eq!((expected, found), (100, 99)),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(g.len(), 1);
}

#[test]
fn emptied_group_adopts_again() {
    let mut g = AttributeGroup::new("g", GroupKind::Generic);
    g.add("a", arr("a", 3)).unwrap();
    g.remove("a").unwrap();
    g.add("b", arr("b", 7)).unwrap();
    assert_eq!(g.tuple_count(), 7);
}

#[test]
fn resize_all_then_add_at_new_count() {
    let mut g = AttributeGroup::new("g", GroupKind::Feature);
    g.add("a", arr("a", 3)).unwrap();
    g.add_list("n", NeighborList::new("n", 3)).unwrap();
    g.resize_all(10).unwrap();
    g.add("b", arr("b", 10)).unwrap();
    assert!(g.add("c", arr("c", 3)).is_err());
    assert!(g.validate_invariants().is_ok());
}

#[test]
fn rename_on_insert_is_observable() {
    let mut g = AttributeGroup::new("g", GroupKind::Generic);
    g.add("Key", arr("declared", 1)).unwrap();
    assert_eq!(g.get("Key").unwrap().name(), "Key");
    assert!(g.get("declared").is_none());
}
