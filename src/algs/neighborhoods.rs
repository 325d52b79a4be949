//! Feature neighborhoods by uniform spatial binning.
//!
//! Given `N` features with centroids and equivalent diameters:
//!
//! * the average diameter `D` is the sum of the participating diameters
//!   divided by `N`, so a reserved feature 0 still counts in the divisor;
//! * each feature gets a critical distance
//!   `crit[i] = diameter[i] * multiples_of_average / D`;
//! * each centroid is binned on a grid of cell size `D`:
//!   `bin = floor((centroid - origin) / D)` per axis;
//! * `j` is in `i`'s neighborhood iff `|bin[j] - bin[i]| < crit[i]` on all
//!   three axes.
//!
//! Every feature tests with its own threshold, so the relation is not
//! symmetric in general: a large feature can reach a small one that does not
//! reach back.
//!
//! [`BinningStrategy::Pairwise`] compares all pairs (O(N²)).
//! [`BinningStrategy::Bucketed`] indexes the occupied bins and only visits
//! bins within each feature's reach; both produce identical, ascending lists.

use std::ops::ControlFlow;

use hashbrown::HashMap;
use num_traits::Float;
use serde::{Deserialize, Serialize};

use crate::pipeline_error::PipelineError;

/// How candidate pairs are enumerated.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum BinningStrategy {
    /// Test every pair `i < j`.
    Pairwise,
    /// Visit only bins within each feature's reach.
    #[default]
    Bucketed,
}

/// Options for [`find_neighborhoods`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodOpts {
    /// Multiplier applied to each feature's diameter before normalization.
    pub multiples_of_average: f64,
    /// Grid origin.
    pub origin: [f64; 3],
    /// Treat feature 0 as a reserved placeholder: its diameter is left out of
    /// the average's sum (the divisor stays `N`) and it gets an empty
    /// neighborhood.
    pub skip_first: bool,
    pub strategy: BinningStrategy,
}

impl Default for NeighborhoodOpts {
    fn default() -> Self {
        Self {
            multiples_of_average: 1.0,
            origin: [0.0; 3],
            skip_first: false,
            strategy: BinningStrategy::default(),
        }
    }
}

/// Result of a neighborhood search.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Neighborhoods {
    /// Ascending neighbor indices per feature.
    pub lists: Vec<Vec<usize>>,
    /// Per-feature critical distance in bin units.
    pub critical_distances: Vec<f64>,
    /// Average equivalent diameter (the bin size).
    pub average_diameter: f64,
}

impl Neighborhoods {
    /// Number of neighbors of feature `i`.
    pub fn count(&self, i: usize) -> usize {
        self.lists.get(i).map_or(0, Vec::len)
    }
}

/// Compute neighborhoods without progress reporting.
pub fn find_neighborhoods<T: Float>(
    centroids: &[[T; 3]],
    diameters: &[T],
    opts: NeighborhoodOpts,
) -> Result<Neighborhoods, PipelineError> {
    find_neighborhoods_with(centroids, diameters, opts, |_, _| ControlFlow::Continue(()))
}

/// Compute neighborhoods, calling `progress(i, n)` before feature `i` is
/// processed. Returning `ControlFlow::Break` stops the search with
/// [`PipelineError::Cancelled`].
pub fn find_neighborhoods_with<T, F>(
    centroids: &[[T; 3]],
    diameters: &[T],
    opts: NeighborhoodOpts,
    mut progress: F,
) -> Result<Neighborhoods, PipelineError>
where
    T: Float,
    F: FnMut(usize, usize) -> ControlFlow<()>,
{
    let n = diameters.len();
    if centroids.len() != n {
        return Err(PipelineError::TupleCountMismatch {
            expected: n,
            found: centroids.len(),
            paths: vec!["diameters".into(), "centroids".into()],
        });
    }
    let mult = opts.multiples_of_average;
    if !(mult.is_finite() && mult > 0.0) {
        return Err(PipelineError::invalid_parameter(
            "multiples_of_average",
            format!("must be finite and positive, got {mult}"),
        ));
    }
    let first = usize::from(opts.skip_first).min(n);
    let mut out = Neighborhoods {
        lists: vec![Vec::new(); n],
        critical_distances: vec![0.0; n],
        average_diameter: 0.0,
    };
    if first == n {
        return Ok(out);
    }

    let to_f64 = |x: T| x.to_f64().unwrap_or(f64::NAN);
    let sum: f64 = diameters[first..].iter().map(|&d| to_f64(d)).sum();
    let average = sum / n as f64;
    if !(average.is_finite() && average > 0.0) {
        return Err(PipelineError::invalid_parameter(
            "equivalent_diameters",
            format!("average diameter must be finite and positive, got {average}"),
        ));
    }
    out.average_diameter = average;

    let mut bins = vec![[0i64; 3]; n];
    for i in first..n {
        out.critical_distances[i] = to_f64(diameters[i]) * mult / average;
        for axis in 0..3 {
            let c = to_f64(centroids[i][axis]);
            if !c.is_finite() {
                return Err(PipelineError::invalid_parameter(
                    "centroids",
                    format!("feature {i} has a non-finite centroid"),
                ));
            }
            bins[i][axis] = ((c - opts.origin[axis]) / average).floor() as i64;
        }
    }

    match opts.strategy {
        BinningStrategy::Pairwise => {
            pairwise(&bins, &out.critical_distances, first, &mut out.lists, &mut progress)?
        }
        BinningStrategy::Bucketed => {
            bucketed(&bins, &out.critical_distances, first, &mut out.lists, &mut progress)?
        }
    }
    Ok(out)
}

#[inline]
fn within(a: &[i64; 3], b: &[i64; 3], crit: f64) -> bool {
    (0..3).all(|axis| ((a[axis] - b[axis]).abs() as f64) < crit)
}

fn pairwise<F>(
    bins: &[[i64; 3]],
    crit: &[f64],
    first: usize,
    lists: &mut [Vec<usize>],
    progress: &mut F,
) -> Result<(), PipelineError>
where
    F: FnMut(usize, usize) -> ControlFlow<()>,
{
    let n = bins.len();
    for i in first..n {
        if progress(i, n).is_break() {
            return Err(PipelineError::Cancelled);
        }
        for j in (i + 1)..n {
            if within(&bins[i], &bins[j], crit[i]) {
                lists[i].push(j);
            }
            if within(&bins[i], &bins[j], crit[j]) {
                lists[j].push(i);
            }
        }
    }
    Ok(())
}

fn bucketed<F>(
    bins: &[[i64; 3]],
    crit: &[f64],
    first: usize,
    lists: &mut [Vec<usize>],
    progress: &mut F,
) -> Result<(), PipelineError>
where
    F: FnMut(usize, usize) -> ControlFlow<()>,
{
    let n = bins.len();
    let mut grid: HashMap<[i64; 3], Vec<usize>> = HashMap::new();
    for i in first..n {
        grid.entry(bins[i]).or_default().push(i);
    }

    for i in first..n {
        if progress(i, n).is_break() {
            return Err(PipelineError::Cancelled);
        }
        if crit[i] <= 0.0 {
            continue;
        }
        // largest integer offset strictly below crit[i]
        let reach = (crit[i].ceil() - 1.0).max(0.0);
        let span = 2.0 * reach + 1.0;
        let list = &mut lists[i];
        if span * span * span <= grid.len() as f64 {
            let r = reach as i64;
            let b = bins[i];
            for dx in -r..=r {
                for dy in -r..=r {
                    for dz in -r..=r {
                        if let Some(members) = grid.get(&[b[0] + dx, b[1] + dy, b[2] + dz]) {
                            list.extend(members.iter().copied().filter(|&j| j != i));
                        }
                    }
                }
            }
        } else {
            for (cell, members) in &grid {
                if within(&bins[i], cell, crit[i]) {
                    list.extend(members.iter().copied().filter(|&j| j != i));
                }
            }
        }
        list.sort_unstable();
    }
    Ok(())
}
