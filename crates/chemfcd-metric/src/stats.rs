//! Summary statistics of an embedding population
//!
//! A population of embedding vectors is summarized by its mean vector and
//! sample covariance matrix; the Fréchet distance is computed between two
//! such summaries. Reference statistics (e.g. for a baseline ChEMBL sample)
//! can be persisted to JSON and reloaded read-only.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use chemfcd_core::{Error, Result};

/// Mean vector and covariance matrix of one embedding population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionStats {
    /// Mean of the embedding vectors
    pub mean: Array1<f64>,
    /// Sample covariance matrix (`n - 1` normalization)
    pub cov: Array2<f64>,
}

impl DistributionStats {
    /// Estimate statistics from a matrix of embedding vectors, one row per
    /// molecule.
    ///
    /// Uses the unbiased sample covariance (divides by `n - 1`), matching
    /// how the reference statistics are produced. At least two vectors are
    /// required for a covariance estimate.
    pub fn from_embeddings(embeddings: ArrayView2<'_, f32>) -> Result<Self> {
        let n = embeddings.nrows();
        if n < 2 {
            return Err(Error::Stats(format!(
                "need at least 2 embedding vectors to estimate a covariance, got {}",
                n
            )));
        }

        let x = embeddings.mapv(f64::from);
        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| Error::Stats("empty embedding matrix".into()))?;
        let centered = &x - &mean;
        let cov = centered.t().dot(&centered) / (n as f64 - 1.0);

        Ok(Self { mean, cov })
    }

    /// Embedding dimension these statistics describe.
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Load persisted statistics from a JSON file, validating the shape
    /// invariants.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading distribution statistics from {:?}", path);
        let file = File::open(path).map_err(|e| {
            Error::FileSystem(format!("Failed to open statistics file {:?}: {}", path, e))
        })?;
        let stats: Self = serde_json::from_reader(BufReader::new(file))?;
        stats.validate()?;
        Ok(stats)
    }

    /// Persist statistics to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.validate()?;
        let file = File::create(path).map_err(|e| {
            Error::FileSystem(format!("Failed to create statistics file {:?}: {}", path, e))
        })?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let (rows, cols) = self.cov.dim();
        if rows != cols || rows != self.mean.len() {
            return Err(Error::ShapeMismatch {
                what: "mean vector and covariance matrix",
                left: vec![self.mean.len()],
                right: vec![rows, cols],
            });
        }
        Ok(())
    }
}
