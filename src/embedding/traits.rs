// Embedder trait — swap-ready projection abstraction.
//
// The comparison only needs "author term sets in, 2-D coordinates out".
// PCA and classical MDS both implement this, and the session picks one per
// request without the rest of the pipeline caring which.

use std::collections::BTreeSet;

use rand::rngs::StdRng;

/// Raw output of a projection, one coordinate pair per input set.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub coords: Vec<(f64, f64)>,
    /// Distinct terms across all input sets.
    pub vocabulary_size: usize,
}

/// Trait for projecting author term sets onto a plane.
pub trait Embedder {
    /// Project each term set to a 2-D point. `term_sets` has at least one
    /// entry; randomness is drawn only from `rng`.
    fn project(&self, term_sets: &[&BTreeSet<String>], rng: &mut StdRng) -> Projection;
}
