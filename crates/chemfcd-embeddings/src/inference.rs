//! Embedding extraction using ONNX Runtime
//!
//! Drives an external embedding model over the batch feeder's output and
//! collects penultimate-layer activations for every input molecule.

use std::fs;
use std::path::Path;

use ndarray::{Array2, ArrayView3, Ix2};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use tracing::{debug, info};

use chemfcd_core::{Error, Result};

use crate::feeder::BatchFeeder;
use crate::model::ModelConfig;
use crate::vocab::VOCAB_SIZE;

/// Capability exposed by an embedding model.
///
/// The model is consumed read-only for inference; this pipeline never alters
/// its structure. Exporting it so that the graph output already is the
/// penultimate representation is the model owner's responsibility.
pub trait EmbeddingModel {
    /// Input shape the model expects, as `(pad_len, vocabulary size)`.
    fn input_shape(&self) -> (usize, usize);

    /// Penultimate-layer activations for one batch.
    ///
    /// `batch` has shape `(group_len, pad_len, vocab)`; the output must have
    /// one row per batch row.
    fn predict_batch(&mut self, batch: ArrayView3<'_, f32>) -> Result<Array2<f32>>;
}

/// Extract one embedding vector per input molecule, in input order.
///
/// Computes `steps = ceil(len / batch_size)` and drives the otherwise
/// infinite [`BatchFeeder`] exactly that many steps. Fails fast if the
/// model's expected input shape disagrees with `(pad_len, 35)` rather than
/// silently truncating or padding.
pub fn extract_embeddings<M: EmbeddingModel + ?Sized>(
    molecules: &[String],
    model: &mut M,
    batch_size: usize,
    pad_len: usize,
) -> Result<Array2<f32>> {
    let expected = (pad_len, VOCAB_SIZE);
    let declared = model.input_shape();
    if declared != expected {
        return Err(Error::ShapeMismatch {
            what: "model input",
            left: vec![declared.0, declared.1],
            right: vec![expected.0, expected.1],
        });
    }

    if molecules.is_empty() {
        return Ok(Array2::zeros((0, 0)));
    }

    let steps = molecules.len().div_ceil(batch_size.max(1));
    let feeder = BatchFeeder::new(molecules, batch_size, pad_len)?;
    debug!(
        "extracting embeddings for {} molecules in {} batches",
        molecules.len(),
        steps
    );

    let mut data: Vec<f32> = Vec::new();
    let mut dim: Option<usize> = None;

    for batch in feeder.take(steps) {
        let rows_in = batch.shape()[0];
        let activations = model.predict_batch(batch.view())?;

        if activations.nrows() != rows_in {
            return Err(Error::Embedding(format!(
                "model returned {} activation rows for a batch of {}",
                activations.nrows(),
                rows_in
            )));
        }
        match dim {
            None => dim = Some(activations.ncols()),
            Some(d) if d != activations.ncols() => {
                return Err(Error::Embedding(format!(
                    "inconsistent embedding dimension across batches: {} vs {}",
                    d,
                    activations.ncols()
                )));
            }
            Some(_) => {}
        }
        data.extend(activations.iter());
    }

    let dim = dim.unwrap_or(0);
    Array2::from_shape_vec((molecules.len(), dim), data).map_err(|e| {
        Error::Embedding(format!("failed to assemble embedding matrix: {}", e))
    })
}

/// Embedding engine backed by an ONNX Runtime session.
pub struct EmbeddingEngine {
    config: ModelConfig,
    session: Option<Session>,
}

impl std::fmt::Debug for EmbeddingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingEngine")
            .field("config", &self.config)
            .field("session", &self.session.is_some())
            .finish()
    }
}

impl EmbeddingEngine {
    /// Create a new embedding engine, loading the ONNX model from the path
    /// in the config.
    pub fn new(config: ModelConfig) -> Result<Self> {
        if config.model_path.is_empty() {
            return Ok(Self {
                config,
                session: None,
            });
        }

        let model_path = Path::new(&config.model_path);
        if !model_path.exists() {
            return Err(Error::Embedding(format!(
                "Model file not found: {}",
                config.model_path
            )));
        }

        info!("Loading ONNX model from {}", config.model_path);

        let model_bytes = fs::read(&config.model_path)
            .map_err(|e| Error::Embedding(format!("Failed to read model file: {}", e)))?;

        let session = Session::builder()
            .map_err(|e| Error::Embedding(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::Embedding(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(4)
            .map_err(|e| Error::Embedding(format!("Failed to set thread count: {}", e)))?
            .commit_from_memory(&model_bytes)
            .map_err(|e| Error::Embedding(format!("Failed to load ONNX model: {}", e)))?;

        debug!("ONNX model loaded successfully");

        Ok(Self {
            config,
            session: Some(session),
        })
    }

    /// Create an embedding engine without a model (for testing)
    pub fn without_model() -> Self {
        Self {
            config: ModelConfig::default(),
            session: None,
        }
    }

    /// Check if the model is loaded
    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    /// Get the configured embedding dimension
    pub fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }

    /// Extract embeddings for a molecule list using the configured batch
    /// size and padded length.
    pub fn extract(&mut self, molecules: &[String]) -> Result<Array2<f32>> {
        let batch_size = self.config.batch_size;
        let pad_len = self.config.pad_len;
        extract_embeddings(molecules, self, batch_size, pad_len)
    }
}

impl EmbeddingModel for EmbeddingEngine {
    fn input_shape(&self) -> (usize, usize) {
        (self.config.pad_len, VOCAB_SIZE)
    }

    fn predict_batch(&mut self, batch: ArrayView3<'_, f32>) -> Result<Array2<f32>> {
        let rows_in = batch.shape()[0];
        let session = self.session.as_mut().ok_or_else(|| {
            Error::Embedding("Model not loaded; configure an ONNX model path first".into())
        })?;

        let batch_tensor = Tensor::from_array(batch.to_owned())
            .map_err(|e| Error::Embedding(format!("Failed to create batch tensor: {}", e)))?;

        let inputs = ort::inputs![batch_tensor]
            .map_err(|e| Error::Embedding(format!("Failed to create inputs: {}", e)))?;

        let outputs = session
            .run(inputs)
            .map_err(|e| Error::Embedding(format!("ONNX inference failed: {}", e)))?;

        let output_value = outputs
            .iter()
            .next()
            .ok_or_else(|| Error::Embedding("No output tensor found".into()))?;

        let tensor_view = output_value
            .1
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::Embedding(format!("Failed to extract output tensor: {}", e)))?;

        let shape = tensor_view.shape();
        if shape.len() != 2 {
            return Err(Error::Embedding(format!(
                "Expected 2D activations, got {}D with shape {:?}",
                shape.len(),
                shape
            )));
        }
        if shape[0] != rows_in || shape[1] != self.config.embedding_dim {
            return Err(Error::Embedding(format!(
                "Unexpected activation shape {:?}, expected [{}, {}]",
                shape, rows_in, self.config.embedding_dim
            )));
        }

        tensor_view
            .to_owned()
            .into_dimensionality::<Ix2>()
            .map_err(|e| Error::Embedding(format!("Failed to reshape activations: {}", e)))
    }
}
