//! Model configuration
//!
//! The embedding model itself is an external collaborator: it is exported by
//! its owner with the final layers removed, so the ONNX graph already emits
//! penultimate-layer activations. This module only describes where to find
//! it and how to feed it. The model location is always an explicit,
//! caller-supplied path; there is no working-directory or module-path
//! lookup.

use std::path::Path;

/// Default number of molecules per batch.
pub const DEFAULT_BATCH_SIZE: usize = 128;

/// Default padded sequence length the model was trained with.
pub const DEFAULT_PAD_LEN: usize = 350;

/// Default dimension of the penultimate-layer activations.
pub const DEFAULT_EMBEDDING_DIM: usize = 512;

/// Embedding model configuration
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Path to the ONNX model file
    pub model_path: String,
    /// Dimension of the penultimate-layer activations
    pub embedding_dim: usize,
    /// Padded sequence length fed to the model
    pub pad_len: usize,
    /// Number of molecules per batch
    pub batch_size: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: String::new(),
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            pad_len: DEFAULT_PAD_LEN,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ModelConfig {
    /// Create config with a specific model path
    pub fn with_path(model_path: impl AsRef<Path>) -> Self {
        Self {
            model_path: model_path.as_ref().to_string_lossy().to_string(),
            ..Default::default()
        }
    }

    /// Set the number of molecules per batch (at least 1)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set the padded sequence length
    pub fn with_pad_len(mut self, pad_len: usize) -> Self {
        self.pad_len = pad_len;
        self
    }

    /// Set the embedding dimension the model emits
    pub fn with_embedding_dim(mut self, embedding_dim: usize) -> Self {
        self.embedding_dim = embedding_dim;
        self
    }

    /// Check if the model file exists
    pub fn model_exists(&self) -> bool {
        !self.model_path.is_empty() && Path::new(&self.model_path).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.batch_size, 128);
        assert_eq!(config.pad_len, 350);
        assert_eq!(config.embedding_dim, 512);
        assert!(config.model_path.is_empty());
        assert!(!config.model_exists());
    }

    #[test]
    fn test_with_path() {
        let config = ModelConfig::with_path("/tmp/chemnet.onnx");
        assert_eq!(config.model_path, "/tmp/chemnet.onnx");
    }

    #[test]
    fn test_batch_size_floor() {
        let config = ModelConfig::default().with_batch_size(0);
        assert_eq!(config.batch_size, 1);
    }
}
