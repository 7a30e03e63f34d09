//! The Fréchet distance between two embedding distributions
//!
//! The closed-form Wasserstein-2 distance between two Gaussians
//! `N(mu1, sigma1)` and `N(mu2, sigma2)`:
//!
//! ```text
//! d² = ||mu1 - mu2||² + tr(sigma1 + sigma2 - 2·sqrt(sigma1·sigma2))
//! ```
//!
//! Stabilized for finite-sample covariance estimates: a singular covariance
//! product is retried with a small diagonal offset (advisory, not a
//! failure), while a square root that keeps a non-negligible imaginary
//! component aborts, since that points at statistics computed on too few
//! samples.

use ndarray::{Array2, ArrayView1, ArrayView2};
use tracing::warn;

use chemfcd_core::{Error, Result};

use crate::sqrtm::sqrtm_product;
use crate::stats::DistributionStats;

/// Default diagonal offset used when the covariance product is singular.
pub const DEFAULT_EPS: f64 = 1e-6;

/// Absolute tolerance for the imaginary part of the square root's diagonal.
const IMAG_DIAG_ATOL: f64 = 1e-3;

/// Outcome of a Fréchet distance computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrechetResult {
    /// The distance value
    pub distance: f64,
    /// Whether the singular-product regularization path was taken
    pub regularized: bool,
}

/// Fréchet distance between two summarized distributions, with the default
/// regularization constant.
pub fn frechet_distance_between(
    a: &DistributionStats,
    b: &DistributionStats,
) -> Result<FrechetResult> {
    frechet_distance(
        a.mean.view(),
        a.cov.view(),
        b.mean.view(),
        b.cov.view(),
        DEFAULT_EPS,
    )
}

/// Fréchet distance between Gaussians `N(mu1, sigma1)` and `N(mu2, sigma2)`.
///
/// All shape preconditions are checked before any numerical work: the mean
/// vectors must have equal length, the covariance matrices equal square
/// shape matching that length.
///
/// If `sqrt(sigma1 · sigma2)` comes back non-finite, `eps` is added to both
/// covariance diagonals and the root is recomputed; this is surfaced through
/// a warning and the `regularized` flag, not as an error. A square root
/// whose diagonal keeps an imaginary part above `1e-3` aborts with
/// [`Error::ComplexResidual`]; smaller imaginary parts are discarded.
///
/// The swap-symmetry of the result relies on `tr(sqrt(AB)) == tr(sqrt(BA))`,
/// which holds for real covariance estimates but only up to floating-point
/// noise; callers comparing swapped results should use a tolerance.
pub fn frechet_distance(
    mu1: ArrayView1<'_, f64>,
    sigma1: ArrayView2<'_, f64>,
    mu2: ArrayView1<'_, f64>,
    sigma2: ArrayView2<'_, f64>,
    eps: f64,
) -> Result<FrechetResult> {
    if mu1.len() != mu2.len() {
        return Err(Error::ShapeMismatch {
            what: "mean vectors",
            left: vec![mu1.len()],
            right: vec![mu2.len()],
        });
    }
    if sigma1.dim() != sigma2.dim() {
        return Err(Error::ShapeMismatch {
            what: "covariance matrices",
            left: sigma1.shape().to_vec(),
            right: sigma2.shape().to_vec(),
        });
    }
    if sigma1.nrows() != sigma1.ncols() || sigma1.nrows() != mu1.len() {
        return Err(Error::ShapeMismatch {
            what: "mean vector and covariance matrix",
            left: vec![mu1.len()],
            right: sigma1.shape().to_vec(),
        });
    }

    let diff = &mu1 - &mu2;

    // the product of two finite-sample covariance estimates might be almost
    // singular
    let mut covmean = sqrtm_product(&sigma1, &sigma2, true)?;

    let regularized = covmean.iter().any(|c| !c.re.is_finite() || !c.im.is_finite());
    if regularized {
        warn!(
            "FCD covariance product is singular; adding {} to the diagonal of both covariance estimates",
            eps
        );
        let offset = Array2::<f64>::eye(sigma1.nrows()) * eps;
        let sigma1_r = &sigma1 + &offset;
        let sigma2_r = &sigma2 + &offset;
        covmean = sqrtm_product(&sigma1_r.view(), &sigma2_r.view(), false)?;
        if covmean.iter().any(|c| !c.re.is_finite() || !c.im.is_finite()) {
            return Err(Error::Numerical(
                "covariance square root is non-finite even after regularization".into(),
            ));
        }
    }

    // numerical error might give a slight imaginary component
    if covmean.iter().any(|c| c.im != 0.0) {
        let max_diag_imag = covmean
            .diag()
            .iter()
            .map(|c| c.im.abs())
            .fold(0.0_f64, f64::max);
        if max_diag_imag > IMAG_DIAG_ATOL {
            let magnitude = covmean
                .iter()
                .map(|c| c.im.abs())
                .fold(0.0_f64, f64::max);
            return Err(Error::ComplexResidual { magnitude });
        }
    }
    let covmean_real = covmean.mapv(|c| c.re);

    let tr1: f64 = sigma1.diag().sum();
    let tr2: f64 = sigma2.diag().sum();
    let tr_covmean: f64 = covmean_real.diag().sum();

    Ok(FrechetResult {
        distance: diff.dot(&diff) + tr1 + tr2 - 2.0 * tr_covmean,
        regularized,
    })
}
