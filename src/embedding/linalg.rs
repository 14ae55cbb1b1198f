// Power iteration for the 2-D projections.
//
// Both projections only need the top two eigenvectors of a symmetric
// positive semi-definite operator, so a deflated power iteration is enough.
// The operator is passed as a closure; PCA never materializes its
// author-by-author Gram matrix.

use ndarray::Array1;
use rand::Rng;

/// Vectors shorter than this are treated as zero when normalizing.
const NORM_FLOOR: f64 = 1e-12;

/// Scale `v` to unit length. A zero vector is left unchanged.
pub fn normalize(v: &mut Array1<f64>) {
    let n = v.dot(v).sqrt();
    if n > NORM_FLOOR {
        *v /= n;
    }
}

/// Remove the components of `v` along each (unit) vector in `basis`.
pub fn orthogonalize(v: &mut Array1<f64>, basis: &[Array1<f64>]) {
    for b in basis {
        let proj = v.dot(b);
        v.scaled_add(-proj, b);
    }
}

/// An eigenvector with its Rayleigh-quotient eigenvalue.
#[derive(Debug, Clone)]
pub struct EigenPair {
    pub vector: Array1<f64>,
    pub value: f64,
}

/// Top `k` eigenpairs of the symmetric operator `apply` on `R^n`.
///
/// Each vector starts from a random point drawn from `rng`, is kept
/// orthogonal to the vectors already found, and runs `iterations` rounds of
/// multiply-and-normalize.
pub fn top_eigenpairs<F, R>(
    apply: F,
    n: usize,
    k: usize,
    iterations: usize,
    rng: &mut R,
) -> Vec<EigenPair>
where
    F: Fn(&Array1<f64>) -> Array1<f64>,
    R: Rng,
{
    let mut found: Vec<Array1<f64>> = Vec::with_capacity(k);
    let mut pairs = Vec::with_capacity(k);

    for _ in 0..k {
        let mut v = Array1::from_shape_fn(n, |_| rng.random::<f64>());
        orthogonalize(&mut v, &found);
        normalize(&mut v);

        for _ in 0..iterations {
            let mut w = apply(&v);
            orthogonalize(&mut w, &found);
            normalize(&mut w);
            v = w;
        }

        // Rayleigh quotient
        let value = v.dot(&apply(&v));
        found.push(v.clone());
        pairs.push(EigenPair { vector: v, value });
    }

    pairs
}
