use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use grainflow::algs::element_neighbors::{ElementNeighborOpts, ElementNeighbors};
use grainflow::algs::neighborhoods::{BinningStrategy, NeighborhoodOpts, find_neighborhoods};

// Uniform features in a cube whose side grows with n, so density stays fixed.
fn random_features(n: usize, seed: u64) -> (Vec<[f32; 3]>, Vec<f32>) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let side = (n as f32).cbrt() * 2.0;
    let centroids = (0..n)
        .map(|_| {
            [
                rng.gen_range(0.0..side),
                rng.gen_range(0.0..side),
                rng.gen_range(0.0..side),
            ]
        })
        .collect();
    let diameters = (0..n).map(|_| rng.gen_range(0.5..3.0)).collect();
    (centroids, diameters)
}

fn bench_neighborhoods(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighborhoods");
    for &n in &[1_000usize, 5_000, 20_000] {
        let (centroids, diameters) = random_features(n, 42);
        for strategy in [BinningStrategy::Pairwise, BinningStrategy::Bucketed] {
            if strategy == BinningStrategy::Pairwise && n > 5_000 {
                continue;
            }
            let opts = NeighborhoodOpts {
                multiples_of_average: 1.5,
                strategy,
                ..Default::default()
            };
            group.bench_with_input(
                BenchmarkId::new(format!("{strategy:?}"), n),
                &n,
                |b, _| b.iter(|| find_neighborhoods(&centroids, &diameters, opts).unwrap()),
            );
        }
    }
    group.finish();
}

// Structured tet mesh: each unit cube of an m^3 grid split into 5 tets.
fn tet_grid(m: usize) -> (usize, Vec<usize>) {
    let id = |x: usize, y: usize, z: usize| (z * (m + 1) + y) * (m + 1) + x;
    let mut conn = Vec::with_capacity(m * m * m * 20);
    for z in 0..m {
        for y in 0..m {
            for x in 0..m {
                let v = [
                    id(x, y, z),
                    id(x + 1, y, z),
                    id(x + 1, y + 1, z),
                    id(x, y + 1, z),
                    id(x, y, z + 1),
                    id(x + 1, y, z + 1),
                    id(x + 1, y + 1, z + 1),
                    id(x, y + 1, z + 1),
                ];
                for t in [[0, 1, 3, 4], [1, 2, 3, 6], [1, 3, 4, 6], [1, 4, 5, 6], [3, 4, 6, 7]] {
                    conn.extend(t.iter().map(|&k| v[k]));
                }
            }
        }
    }
    ((m + 1).pow(3), conn)
}

fn bench_element_neighbors(c: &mut Criterion) {
    let mut group = c.benchmark_group("element_neighbors");
    for &m in &[8usize, 16] {
        let (nv, conn) = tet_grid(m);
        for shared in [1usize, 3] {
            let opts = ElementNeighborOpts {
                min_shared_vertices: shared,
            };
            group.bench_with_input(
                BenchmarkId::new(format!("shared>={shared}"), conn.len() / 4),
                &m,
                |b, _| b.iter(|| ElementNeighbors::from_connectivity(nv, &conn, 4, opts).unwrap()),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_neighborhoods, bench_element_neighbors);
criterion_main!(benches);
