// Classical MDS over Jaccard distances between author term sets.
//
// D[i][j] = 1 - |Si ∩ Sj| / |Si ∪ Sj| (two empty sets are distance 1).
// B = -½·J·D²·J via row, column and grand means of D², then the top two
// eigenpairs of B give coordinates V[d][i]·sqrt(max(λd, 0)).
//
// Eigenpairs are recomputed for every call; nothing is reused across
// datasets.

use std::collections::BTreeSet;

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;

use super::linalg::top_eigenpairs;
use super::traits::{Embedder, Projection};

/// Power-iteration rounds per component.
pub const MDS_ITERATIONS: usize = 120;

#[derive(Debug, Clone, Copy, Default)]
pub struct MdsEmbedder;

/// Jaccard distance between two term sets.
pub fn jaccard_distance(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 1.0;
    }
    1.0 - intersection as f64 / union as f64
}

/// Full pairwise distance matrix. The diagonal is always 0.
pub fn distance_matrix(term_sets: &[&BTreeSet<String>]) -> Array2<f64> {
    let n = term_sets.len();
    Array2::from_shape_fn((n, n), |(i, j)| {
        if i == j {
            0.0
        } else {
            jaccard_distance(term_sets[i], term_sets[j])
        }
    })
}

/// Double-center the squared distances.
pub fn double_center(d: &Array2<f64>) -> Array2<f64> {
    let mut b = d.mapv(|v| v * v);
    let (Some(row_mean), Some(col_mean), Some(total_mean)) =
        (b.mean_axis(Axis(1)), b.mean_axis(Axis(0)), b.mean())
    else {
        return b;
    };

    b -= &row_mean.insert_axis(Axis(1));
    b -= &col_mean.insert_axis(Axis(0));
    b += total_mean;
    b *= -0.5;
    b
}

impl Embedder for MdsEmbedder {
    fn project(&self, term_sets: &[&BTreeSet<String>], rng: &mut StdRng) -> Projection {
        let vocabulary_size = term_sets
            .iter()
            .flat_map(|s| s.iter())
            .collect::<BTreeSet<_>>()
            .len();

        let b = double_center(&distance_matrix(term_sets));
        let apply = |v: &Array1<f64>| b.dot(v);

        let pairs = top_eigenpairs(apply, term_sets.len(), 2, MDS_ITERATIONS, rng);
        let x = &pairs[0].vector * pairs[0].value.max(0.0).sqrt();
        let y = &pairs[1].vector * pairs[1].value.max(0.0).sqrt();
        let coords = x.iter().zip(y.iter()).map(|(&x, &y)| (x, y)).collect();

        Projection {
            coords,
            vocabulary_size,
        }
    }
}
