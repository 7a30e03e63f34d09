//! Matrix square root of a covariance product
//!
//! Computes `sqrt(sigma1 · sigma2)` for symmetric positive-semidefinite
//! factors via the whitening factorization
//! `sqrt(AB) = A^{1/2} (A^{1/2} B A^{1/2})^{1/2} A^{-1/2}`, so only
//! symmetric eigendecompositions are needed. Finite-sample covariance
//! estimates are frequently near-singular; in tolerant mode a singular
//! factor surfaces as non-finite entries in the result instead of an error,
//! which is the signal the caller uses to regularize and retry.
//!
//! Floating-point noise can push inner eigenvalues slightly negative even
//! though the exact values are real and non-negative for this matrix class.
//! Those take the principal complex square root, so the result carries a
//! (normally negligible) imaginary part.

use ndarray::{Array1, Array2, ArrayView2};
use num_complex::Complex64;

use chemfcd_core::{Error, Result};

/// Eigendecomposition of a symmetric matrix by the cyclic Jacobi method.
///
/// Returns `(eigenvalues, eigenvectors)` with orthonormal eigenvector
/// columns, so `a ≈ v · diag(λ) · vᵀ`. Convergence is quadratic once the
/// off-diagonal mass is small; the sweep count is bounded so non-finite
/// input cannot loop forever.
pub(crate) fn symmetric_eigen(a: &ArrayView2<'_, f64>) -> (Array1<f64>, Array2<f64>) {
    let n = a.nrows();
    let mut m = a.to_owned();
    let mut v = Array2::<f64>::eye(n);

    const MAX_SWEEPS: usize = 64;
    let scale: f64 = m.iter().map(|x| x * x).sum::<f64>().sqrt().max(1.0);

    for _ in 0..MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|p| (0..n).filter(move |&q| q != p).map(move |q| (p, q)))
            .map(|(p, q)| m[[p, q]] * m[[p, q]])
            .sum::<f64>()
            .sqrt();
        if off <= 1e-14 * scale {
            break;
        }

        for p in 0..n.saturating_sub(1) {
            for q in (p + 1)..n {
                let apq = m[[p, q]];
                if apq.abs() <= 1e-300 {
                    continue;
                }
                let theta = (m[[q, q]] - m[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                // m ← Gᵀ m G, v ← v G for the (p, q) rotation G
                for k in 0..n {
                    let mkp = m[[k, p]];
                    let mkq = m[[k, q]];
                    m[[k, p]] = c * mkp - s * mkq;
                    m[[k, q]] = s * mkp + c * mkq;
                }
                for k in 0..n {
                    let mpk = m[[p, k]];
                    let mqk = m[[q, k]];
                    m[[p, k]] = c * mpk - s * mqk;
                    m[[q, k]] = s * mpk + c * mqk;
                }
                for k in 0..n {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    (m.diag().to_owned(), v)
}

fn promote(m: &Array2<f64>) -> Array2<Complex64> {
    m.mapv(|x| Complex64::new(x, 0.0))
}

fn all_finite(m: &Array2<f64>) -> bool {
    m.iter().all(|x| x.is_finite())
}

/// `sqrt(sigma1 · sigma2)` as a complex matrix.
///
/// In tolerant mode a singular `sigma1` yields non-finite entries without
/// erroring, mirroring a square-root routine that reports failure through
/// its result. In strict mode (used after diagonal regularization, where the
/// factors are positive definite by construction) singularity is an error.
///
/// The singularity signal is one-sided: only `sigma1` is factorized, so a
/// singular `sigma2` paired with a well-conditioned `sigma1` produces a
/// finite (possibly complex) root with no signal raised. The product of two
/// positive semi-definite matrices has non-negative eigenvalues, so that
/// root is still well defined; callers that want singular inputs flagged
/// regardless of argument order must check both factors themselves.
pub(crate) fn sqrtm_product(
    sigma1: &ArrayView2<'_, f64>,
    sigma2: &ArrayView2<'_, f64>,
    tolerant: bool,
) -> Result<Array2<Complex64>> {
    let (d, v) = symmetric_eigen(sigma1);

    // A^{1/2} and A^{-1/2}; zero or slightly negative eigenvalues make these
    // non-finite, which is exactly the singular-product signal.
    let sqrt_a = v
        .dot(&Array2::from_diag(&d.mapv(f64::sqrt)))
        .dot(&v.t());
    let inv_sqrt_a = v
        .dot(&Array2::from_diag(&d.mapv(|x| 1.0 / x.sqrt())))
        .dot(&v.t());

    if !tolerant && (!all_finite(&sqrt_a) || !all_finite(&inv_sqrt_a)) {
        return Err(Error::Numerical(
            "covariance factor is singular; matrix square root does not exist".into(),
        ));
    }

    let mut inner = sqrt_a.dot(sigma2).dot(&sqrt_a);
    // kill the asymmetry noise introduced by the two multiplications
    inner = (&inner + &inner.t()) / 2.0;

    let (e, w) = symmetric_eigen(&inner.view());
    let sqrt_e = e.mapv(|x| Complex64::new(x, 0.0).sqrt());
    let wc = promote(&w);
    let sqrt_inner = wc.dot(&Array2::from_diag(&sqrt_e)).dot(&wc.t());

    Ok(promote(&sqrt_a)
        .dot(&sqrt_inner)
        .dot(&promote(&inv_sqrt_a)))
}
