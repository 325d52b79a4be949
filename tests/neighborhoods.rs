mod util;
use grainflow::prelude::*;
use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use util::*;

#[test]
fn near_pair_far_third() {
    let centroids = [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [10.0, 0.0, 0.0]];
    let diameters = [1.0f32; 3];
    let opts = NeighborhoodOpts {
        multiples_of_average: 2.0,
        ..Default::default()
    };
    let nh = find_neighborhoods(&centroids, &diameters, opts).unwrap();
    assert!(nh.lists[0].contains(&1));
    assert!(nh.lists[1].contains(&0));
    assert!(!nh.lists[0].contains(&2) && !nh.lists[1].contains(&2));
    assert!(nh.lists[2].is_empty());
}

#[test]
fn near_pair_far_third_through_the_pipeline() {
    let mut reg = feature_registry(
        &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [10.0, 0.0, 0.0]],
        &[1.0, 1.0, 1.0],
    );
    let mut pipeline = Pipeline::new("neighborhoods");
    pipeline.push(Box::new(FindNeighborhoods::new(&path("dc/features/x"), 2.0)));
    PipelineRunner::default()
        .run(&mut pipeline, &mut reg, &NullObserver)
        .unwrap();
    let list = reg.resolve_list(&path("dc/features/NeighborhoodList")).unwrap();
    assert_eq!(list.list(1), Some(&[2][..]));
    assert_eq!(list.list(2), Some(&[1][..]));
    assert_eq!(list.list(3), Some(&[][..]));
}

#[test]
fn relation_may_be_asymmetric() {
    let centroids = [[0.0f64, 0.0, 0.0], [3.0, 0.0, 0.0]];
    let diameters = [5.0f64, 1.0];
    let nh = find_neighborhoods(&centroids, &diameters, Default::default()).unwrap();
    assert_eq!(nh.lists[0], vec![1]);
    assert!(nh.lists[1].is_empty());
}

#[test]
fn progress_is_reported_every_thousand_features() {
    use std::cell::RefCell;
    let mut rng = SmallRng::seed_from_u64(7);
    let n = 2500;
    let centroids: Vec<[f32; 3]> = (0..n)
        .map(|_| [rng.gen_range(0.0..50.0), rng.gen_range(0.0..50.0), rng.gen_range(0.0..50.0)])
        .collect();
    let diameters: Vec<f32> = (0..n).map(|_| rng.gen_range(0.5..2.0)).collect();
    let mut reg = feature_registry(&centroids, &diameters);

    let texts = RefCell::new(Vec::new());
    let observer = |m: &StepMessage| {
        if let StepMessage::Progress { text, .. } = m {
            texts.borrow_mut().push(text.clone());
        }
    };
    let mut pipeline = Pipeline::new("p");
    pipeline.push(Box::new(FindNeighborhoods::new(&path("dc/features/x"), 1.0)));
    PipelineRunner::default()
        .run(&mut pipeline, &mut reg, &observer)
        .unwrap();
    // feature 0 is skipped, so features 1000 and 2000 report
    assert_eq!(
        texts.into_inner(),
        vec!["Working on Feature 1000 of 2501", "Working on Feature 2000 of 2501"]
    );
}

fn brute_force(centroids: &[[f32; 3]], diameters: &[f32], mult: f64) -> Vec<Vec<usize>> {
    let n = diameters.len();
    let avg = diameters.iter().map(|&d| f64::from(d)).sum::<f64>() / n as f64;
    let bin = |c: f32| (f64::from(c) / avg).floor() as i64;
    (0..n)
        .map(|i| {
            let crit = f64::from(diameters[i]) * mult / avg;
            (0..n)
                .filter(|&j| {
                    j != i && (0..3).all(|a| ((bin(centroids[i][a]) - bin(centroids[j][a])).abs() as f64) < crit)
                })
                .collect()
        })
        .collect()
}

fn features() -> impl Strategy<Value = (Vec<[f32; 3]>, Vec<f32>)> {
    (1usize..60).prop_flat_map(|n| {
        (
            proptest::collection::vec(
                [-20.0f32..20.0, -20.0f32..20.0, -20.0f32..20.0],
                n,
            ),
            proptest::collection::vec(0.2f32..4.0, n),
        )
    })
}

proptest! {
    #[test]
    fn bucketed_matches_pairwise((centroids, diameters) in features(), mult in 0.25f64..4.0) {
        let pairwise = find_neighborhoods(&centroids, &diameters, NeighborhoodOpts {
            multiples_of_average: mult,
            strategy: BinningStrategy::Pairwise,
            ..Default::default()
        }).unwrap();
        let bucketed = find_neighborhoods(&centroids, &diameters, NeighborhoodOpts {
            multiples_of_average: mult,
            strategy: BinningStrategy::Bucketed,
            ..Default::default()
        }).unwrap();
        prop_assert_eq!(&pairwise.lists, &bucketed.lists);
        prop_assert_eq!(&pairwise.lists, &brute_force(&centroids, &diameters, mult));
    }
}

#[test]
fn bucketed_matches_pairwise_on_a_large_seeded_cloud() {
    let mut rng = SmallRng::seed_from_u64(42);
    let n = 3000;
    let centroids: Vec<[f32; 3]> = (0..n)
        .map(|_| [rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)])
        .collect();
    let diameters: Vec<f32> = (0..n).map(|_| rng.gen_range(0.5..6.0)).collect();
    let run = |strategy| {
        find_neighborhoods(&centroids, &diameters, NeighborhoodOpts {
            multiples_of_average: 1.5,
            strategy,
            ..Default::default()
        })
        .unwrap()
    };
    assert_eq!(run(BinningStrategy::Pairwise), run(BinningStrategy::Bucketed));
}
