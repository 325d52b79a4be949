use grainflow::data::typed_array::ResizeMode;
use grainflow::pipeline_error::{INVALID_SHAPE, TYPE_MISMATCH};
use grainflow::prelude::*;
use proptest::prelude::*;

fn any_scalar_type() -> impl Strategy<Value = ScalarType> {
    proptest::sample::select(ScalarType::ALL.to_vec())
}

proptest! {
    #[test]
    fn resize_keeps_length_invariant(
        ty in any_scalar_type(),
        tuples in 0usize..200,
        components in 1usize..6,
        resizes in proptest::collection::vec(0usize..300, 1..8),
    ) {
        let mut a = TypedArray::new(ty, tuples, components, "a").unwrap();
        for t in resizes {
            a.resize(t).unwrap();
            prop_assert_eq!(a.number_of_tuples(), t);
            prop_assert_eq!(a.number_of_components(), components);
            prop_assert_eq!(a.len(), t * components);
            prop_assert_eq!(a.byte_len(), t * components * ty.size());
            prop_assert_eq!(a.as_bytes().len(), a.byte_len());
        }
    }

    #[test]
    fn resize_preserves_prefix(
        values in proptest::collection::vec(-1000i32..1000, 0..120),
        new_tuples in 0usize..80,
    ) {
        let components = 2;
        let mut data = values;
        data.truncate(data.len() / components * components);
        let old_tuples = data.len() / components;
        let mut a = TypedArray::from_vec("a", components, data.clone()).unwrap();
        a.resize(new_tuples).unwrap();
        let s = a.as_slice::<i32>().unwrap();
        let keep = old_tuples.min(new_tuples) * components;
        prop_assert_eq!(&s[..keep], &data[..keep]);
        prop_assert!(s[keep..].iter().all(|&x| x == 0));
    }
}

#[test]
fn reinitialize_zeroes_everything() {
    let mut a = TypedArray::from_vec("a", 1, vec![1.5f64, 2.5, 3.5]).unwrap();
    a.resize_with(5, ResizeMode::Reinitialize).unwrap();
    assert_eq!(a.as_slice::<f64>().unwrap(), &[0.0; 5]);
}

#[test]
fn typed_access_checks_the_tag() {
    let a = TypedArray::new(ScalarType::U16, 3, 2, "a").unwrap();
    assert_eq!(a.tuple::<u16>(2).unwrap().len(), 2);
    assert_eq!(a.tuple::<f32>(0).unwrap_err().code(), TYPE_MISMATCH);
    assert_eq!(a.tuple::<u16>(3).unwrap_err().code(), INVALID_SHAPE);
    assert_eq!(
        TypedArray::new(ScalarType::U16, 3, 0, "z").unwrap_err().code(),
        INVALID_SHAPE
    );
    assert!(TypedArray::new(ScalarType::F64, usize::MAX, 2, "big").is_err());
}
