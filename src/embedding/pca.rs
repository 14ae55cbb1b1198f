// PCA over a binary author-by-term matrix.
//
// Rows are authors, columns are terms in first-seen order, cells are 1 when
// the author used the term. Columns are mean-centered, then the top two
// eigenvectors of M·Mᵀ (computed as M·(Mᵀ·v)) give each author's x and y.

use std::collections::{BTreeSet, HashMap};

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;

use super::linalg::top_eigenpairs;
use super::traits::{Embedder, Projection};

/// Power-iteration rounds per component.
pub const PCA_ITERATIONS: usize = 25;

#[derive(Debug, Clone, Copy, Default)]
pub struct PcaEmbedder;

/// Column index for every term, in first-seen order.
fn vocabulary<'a>(term_sets: &[&'a BTreeSet<String>]) -> HashMap<&'a str, usize> {
    let mut index = HashMap::new();
    for set in term_sets {
        for term in set.iter() {
            let next = index.len();
            index.entry(term.as_str()).or_insert(next);
        }
    }
    index
}

/// Dense, column-centered binary matrix (authors x terms).
fn centered_matrix(term_sets: &[&BTreeSet<String>], index: &HashMap<&str, usize>) -> Array2<f64> {
    let mut matrix = Array2::<f64>::zeros((term_sets.len(), index.len()));
    for (i, set) in term_sets.iter().enumerate() {
        for term in set.iter() {
            if let Some(&j) = index.get(term.as_str()) {
                matrix[[i, j]] = 1.0;
            }
        }
    }

    if let Some(mean) = matrix.mean_axis(Axis(0)) {
        matrix -= &mean;
    }
    matrix
}

impl Embedder for PcaEmbedder {
    fn project(&self, term_sets: &[&BTreeSet<String>], rng: &mut StdRng) -> Projection {
        let index = vocabulary(term_sets);
        let matrix = centered_matrix(term_sets, &index);

        let apply = |v: &Array1<f64>| matrix.dot(&matrix.t().dot(v));

        let pairs = top_eigenpairs(apply, term_sets.len(), 2, PCA_ITERATIONS, rng);
        let coords = pairs[0]
            .vector
            .iter()
            .zip(pairs[1].vector.iter())
            .map(|(&x, &y)| (x, y))
            .collect();

        Projection {
            coords,
            vocabulary_size: index.len(),
        }
    }
}
