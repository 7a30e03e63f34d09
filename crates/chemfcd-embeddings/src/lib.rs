//! ChemFCD Embeddings - SMILES encoding and ChemNet activation extraction
//!
//! This crate turns raw SMILES strings into the fixed-width one-hot tensors
//! the ChemNet embedding model consumes, feeds them through the model in
//! memory-bounded batches, and collects the penultimate-layer activations
//! that the Fréchet distance is computed over.
//!
//! Data flows strictly left to right: raw strings → encoded tensors →
//! batches → embedding vectors.

pub mod encoder;
pub mod feeder;
pub mod inference;
pub mod model;
pub mod vocab;

pub use encoder::one_hot;
pub use feeder::{BatchFeeder, BATCH_SCALE};
pub use inference::{extract_embeddings, EmbeddingEngine, EmbeddingModel};
pub use model::{ModelConfig, DEFAULT_BATCH_SIZE, DEFAULT_EMBEDDING_DIM, DEFAULT_PAD_LEN};
pub use vocab::{VOCAB, VOCAB_SIZE};
