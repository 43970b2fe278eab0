//! The two interchangeable median algorithms over the current degree
//! multiset, grounded on `naiveMedian`/`fastMedian` in
//! `original_source/src/main.c`.

use crate::data_structures::degree_histogram::DegreeHistogram;
use std::str::FromStr;

/// Exact-half tolerance from the original `fastMedian`: `fabs(sum - halfTot)
/// < 0.00001`. Kept at the same tightness per spec §9. It only ever fires
/// on an even vertex count, where `half` lands exactly on an integer bucket
/// boundary; on an odd count `half` is always `x.5` and this branch is
/// unreachable by construction, which is intentional, not a bug to paper
/// over.
const EXACT_HALF_TOLERANCE: f64 = 0.00001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MedianAlgorithm {
    Naive,
    Fast,
}

impl FromStr for MedianAlgorithm {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(Self::Naive),
            "2" => Ok(Self::Fast),
            other => anyhow::bail!("invalid median algorithm {other:?}; set 1 or 2"),
        }
    }
}

/// Materializes every active degree, sorts, and picks the middle (or the
/// average of the two middle entries for an even count). Returns 0 when
/// there are no vertices.
pub fn naive_median(active_lengths: impl Iterator<Item = u32>) -> f64 {
    let mut degrees: Vec<u32> = active_lengths.collect();
    let n = degrees.len();
    if n == 0 {
        return 0.0;
    }
    degrees.sort_unstable();
    if n % 2 == 1 {
        f64::from(degrees[(n - 1) / 2])
    } else {
        let hi = n / 2;
        (f64::from(degrees[hi]) + f64::from(degrees[hi - 1])) / 2.0
    }
}

/// Walks `DegreeHistogram` from the smallest degree upward, accumulating a
/// running count until the bucket containing the median is found. Returns 0
/// if no bucket yields a decision (empty histogram).
pub fn fast_median(histogram: &DegreeHistogram, vertex_count: usize) -> f64 {
    let half = vertex_count as f64 / 2.0;
    let buckets = histogram.buckets();
    let mut sum = 0.0;
    for (i, &count) in buckets.iter().enumerate() {
        if count == 0 {
            continue;
        }
        sum += count as f64;
        if (sum - half).abs() < EXACT_HALF_TOLERANCE {
            let next_nonempty = buckets[i + 1..]
                .iter()
                .position(|&c| c > 0)
                .map(|offset| i + 1 + offset);
            if let Some(j) = next_nonempty {
                return ((i + j + 2) as f64) / 2.0;
            }
        }
        if sum > half {
            return (i + 1) as f64;
        }
    }
    0.0
}
