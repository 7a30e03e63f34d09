//! Cyclic batch feeder for model consumption
//!
//! Groups a molecule list into contiguous batches of encoded tensors, scaled
//! the way the embedding model was trained. The sequence restarts from the
//! beginning after each full pass and never terminates on its own; this
//! mirrors the generator-driven prediction loop the model expects.
//!
//! Because the iterator is infinite, every consumer MUST bound it
//! explicitly, e.g. `feeder.take(steps)` with
//! `steps = molecules.len().div_ceil(batch_size)`. Forgetting the bound is a
//! caller error, not a library error.

use ndarray::{s, Array3};

use chemfcd_core::{Error, Result};

use crate::encoder::one_hot;
use crate::vocab::VOCAB_SIZE;

/// Fixed normalization constant applied to every batch element.
///
/// Matches the preprocessing the embedding model was trained with; the value
/// equals the vocabulary size.
pub const BATCH_SCALE: f32 = 35.0;

/// An infinite, restartable sequence of encoded molecule batches.
///
/// Each item has shape `(group_len, pad_len, 35)` where `group_len` equals
/// `batch_size` except possibly for the final group of a pass. Elements are
/// divided by [`BATCH_SCALE`].
#[derive(Debug)]
pub struct BatchFeeder<'a> {
    molecules: &'a [String],
    batch_size: usize,
    pad_len: usize,
    groups: usize,
    cursor: usize,
}

impl<'a> BatchFeeder<'a> {
    /// Create a feeder over `molecules` in their given order.
    ///
    /// Fails if `batch_size` is zero or `pad_len` cannot hold a token and a
    /// terminator.
    pub fn new(molecules: &'a [String], batch_size: usize, pad_len: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".into()));
        }
        if pad_len < 2 {
            return Err(Error::Config(format!(
                "pad_len must be at least 2, got {}",
                pad_len
            )));
        }
        Ok(Self {
            molecules,
            batch_size,
            pad_len,
            groups: molecules.len().div_ceil(batch_size),
            cursor: 0,
        })
    }

    /// Number of groups in one full pass over the molecule list.
    pub fn groups_per_pass(&self) -> usize {
        self.groups
    }
}

impl Iterator for BatchFeeder<'_> {
    type Item = Array3<f32>;

    fn next(&mut self) -> Option<Array3<f32>> {
        if self.groups == 0 {
            return None;
        }

        let group = self.cursor % self.groups;
        self.cursor += 1;

        let start = group * self.batch_size;
        let end = (start + self.batch_size).min(self.molecules.len());

        let mut batch = Array3::<f32>::zeros((end - start, self.pad_len, VOCAB_SIZE));
        for (k, smiles) in self.molecules[start..end].iter().enumerate() {
            let encoded = one_hot(smiles, Some(self.pad_len))
                .expect("pad_len validated in BatchFeeder::new");
            batch.slice_mut(s![k, .., ..]).assign(&encoded);
        }
        batch /= BATCH_SCALE;

        Some(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn molecules(n: usize) -> Vec<String> {
        (0..n).map(|i| "C".repeat(i % 7 + 1)).collect()
    }

    #[test]
    fn test_group_shapes_and_short_tail() {
        let mols = molecules(5);
        let feeder = BatchFeeder::new(&mols, 2, 10).unwrap();
        assert_eq!(feeder.groups_per_pass(), 3);

        let batches: Vec<_> = BatchFeeder::new(&mols, 2, 10).unwrap().take(3).collect();
        assert_eq!(batches[0].shape(), &[2, 10, 35]);
        assert_eq!(batches[1].shape(), &[2, 10, 35]);
        assert_eq!(batches[2].shape(), &[1, 10, 35]);
    }

    #[test]
    fn test_restarts_after_full_pass() {
        let mols = molecules(5);
        let batches: Vec<_> = BatchFeeder::new(&mols, 2, 10).unwrap().take(7).collect();
        // 3 groups per pass; items 3 and 4 repeat items 0 and 1.
        assert_eq!(batches[3], batches[0]);
        assert_eq!(batches[4], batches[1]);
        assert_eq!(batches[6], batches[0]);
    }

    #[test]
    fn test_elements_are_scaled() {
        let mols = vec!["CCO".to_string()];
        let batch = BatchFeeder::new(&mols, 1, 5).unwrap().next().unwrap();
        let expected = 1.0 / BATCH_SCALE;
        for &v in batch.iter() {
            assert!(v == 0.0 || (v - expected).abs() < 1e-7);
        }
        // four hot entries: C, C, O, terminator
        let hot = batch.iter().filter(|&&v| v != 0.0).count();
        assert_eq!(hot, 4);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let mols: Vec<String> = vec![];
        let mut feeder = BatchFeeder::new(&mols, 4, 10).unwrap();
        assert_eq!(feeder.groups_per_pass(), 0);
        assert!(feeder.next().is_none());
    }

    #[test]
    fn test_unrecognized_characters_pass_through_as_wildcard() {
        // Molecules with out-of-vocabulary characters still produce a batch;
        // the encoder absorbs them into the wildcard token.
        let mols = vec!["Cλ".to_string(), "C€C".to_string()];
        let batch = BatchFeeder::new(&mols, 2, 6).unwrap().next().unwrap();
        assert_eq!(batch.shape(), &[2, 6, 35]);
        let hot: usize = batch.iter().filter(|&&v| v != 0.0).count();
        // row 0: C, wildcard, terminator; row 1: C, wildcard, C, terminator
        assert_eq!(hot, 7);
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        let mols = molecules(3);
        assert!(BatchFeeder::new(&mols, 0, 10).is_err());
        assert!(BatchFeeder::new(&mols, 2, 1).is_err());
    }
}
