//! Isolation forest on a single feature.
//!
//! Each tree isolates a sub-sample drawn without replacement by splitting at
//! uniform random thresholds until the depth limit. Values isolated quickly
//! get a high anomaly score `2^(-E[h] / c(psi))`.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Score above which a value is anomalous.
const SCORE_THRESHOLD: f64 = 0.5;

enum Node {
    Leaf {
        size: usize,
    },
    Split {
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn grow(values: Vec<f64>, depth: usize, depth_limit: usize, rng: &mut StdRng) -> Node {
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });
        if depth >= depth_limit || values.len() <= 1 || min >= max {
            return Node::Leaf { size: values.len() };
        }

        let threshold = rng.random_range(min..max);
        let (left, right): (Vec<f64>, Vec<f64>) =
            values.into_iter().partition(|value| *value <= threshold);
        Node::Split {
            threshold,
            left: Box::new(Node::grow(left, depth + 1, depth_limit, rng)),
            right: Box::new(Node::grow(right, depth + 1, depth_limit, rng)),
        }
    }

    fn path_length(&self, value: f64) -> f64 {
        let mut node = self;
        let mut depth = 0.0;
        loop {
            match node {
                Node::Leaf { size } => return depth + average_path_length(*size),
                Node::Split {
                    threshold,
                    left,
                    right,
                } => {
                    node = if value <= *threshold { left } else { right };
                    depth += 1.0;
                }
            }
        }
    }
}

/// Average path length of an unsuccessful search in a binary search tree of
/// `n` nodes.
pub(crate) fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Flag values whose anomaly score exceeds 0.5.
///
/// Groups with fewer than two values are never flagged. The same seed gives
/// the same flags.
pub fn isolation_forest_outliers(
    values: &[f64],
    trees: usize,
    max_samples: usize,
    seed: u64,
) -> Vec<bool> {
    let n = values.len();
    if n < 2 || trees == 0 {
        return vec![false; n];
    }

    let sample_size = max_samples.clamp(1, n);
    let depth_limit = (sample_size as f64).log2().ceil() as usize;
    let mut rng = StdRng::seed_from_u64(seed);

    let forest: Vec<Node> = (0..trees)
        .map(|_| {
            let subsample = sample(&mut rng, n, sample_size)
                .into_iter()
                .map(|idx| values[idx])
                .collect();
            Node::grow(subsample, 0, depth_limit, &mut rng)
        })
        .collect();

    let normalizer = average_path_length(sample_size);
    if normalizer == 0.0 {
        return vec![false; n];
    }
    values
        .iter()
        .map(|value| {
            let mean_depth =
                forest.iter().map(|tree| tree.path_length(*value)).sum::<f64>() / trees as f64;
            2f64.powf(-mean_depth / normalizer) > SCORE_THRESHOLD
        })
        .collect()
}
