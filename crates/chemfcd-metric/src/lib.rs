//! ChemFCD Metric - distribution statistics and the stabilized Fréchet
//! distance
//!
//! Consumes two sets of summary statistics (mean vector, covariance matrix),
//! one from reference data and one from freshly extracted embeddings, and
//! produces a single scalar distance. The square-root term is stabilized
//! against near-singular covariance products and residual complex noise.

pub mod frechet;
mod sqrtm;
pub mod stats;

pub use frechet::{frechet_distance, frechet_distance_between, FrechetResult, DEFAULT_EPS};
pub use stats::DistributionStats;
