//! One-hot encoding of SMILES strings
//!
//! Converts a single SMILES string into a fixed-width one-hot tensor over
//! the closed vocabulary in [`crate::vocab`]. Encoding is a pure function of
//! the input string and the padded length; identical calls produce
//! bit-identical tensors.

use ndarray::Array2;

use chemfcd_core::{Error, Result};

use crate::vocab::{is_two_char_tail, token_index, TERMINATOR_INDEX, VOCAB_SIZE};

/// Encode one SMILES string as a one-hot tensor of shape `(rows, 35)`.
///
/// With `pad_len = Some(n)` the output has exactly `n` rows; scanning stops
/// at row `n - 1` at the latest, where the terminator is forcibly emitted
/// and any remaining input is truncated. With `pad_len = None` the output
/// has `input length + 1` rows and no truncation occurs.
///
/// The scan appends a `.` sentinel and consumes one token per row: two
/// characters when the lookahead is `r`, `i` or `l` (the two-letter atoms
/// `Cl`, `Br`, `Si`), otherwise one. The first `.` encountered, whether a
/// molecule separator in the input or the sentinel, writes the terminator
/// row and ends the scan. Rows past the terminator stay zero. Unknown
/// symbols, non-ASCII characters included, map to the wildcard token and
/// never fail.
///
/// `pad_len` values below 2 cannot hold a token and a terminator and are
/// rejected as a configuration error.
pub fn one_hot(smiles: &str, pad_len: Option<usize>) -> Result<Array2<f32>> {
    if let Some(n) = pad_len {
        if n < 2 {
            return Err(Error::Config(format!(
                "pad_len must be at least 2 to hold a token and a terminator, got {}",
                n
            )));
        }
    }
    let mut sentinel: Vec<char> = smiles.chars().collect();
    sentinel.push('.');

    let rows = pad_len.unwrap_or(sentinel.len());
    let mut onehot = Array2::<f32>::zeros((rows, VOCAB_SIZE));

    let mut sym = String::with_capacity(2);
    let mut i = 0;
    let mut j = 0;
    loop {
        // The sentinel guarantees sentinel[i] exists; the first '.' ends
        // the molecule.
        if sentinel[i] == '.' {
            onehot[[j, TERMINATOR_INDEX]] = 1.0;
            break;
        }

        sym.clear();
        sym.push(sentinel[i]);
        if i + 1 < sentinel.len() && is_two_char_tail(sentinel[i + 1]) {
            sym.push(sentinel[i + 1]);
            i += 2;
        } else {
            i += 1;
        }
        onehot[[j, token_index(&sym)]] = 1.0;
        j += 1;

        // Forced truncation: the last padded row is reserved for the
        // terminator.
        if pad_len.is_some() && j == rows - 1 {
            onehot[[j, TERMINATOR_INDEX]] = 1.0;
            break;
        }
    }

    Ok(onehot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::WILDCARD_INDEX;

    fn hot_indices(enc: &Array2<f32>) -> Vec<Option<usize>> {
        enc.rows()
            .into_iter()
            .map(|row| row.iter().position(|&v| v == 1.0))
            .collect()
    }

    #[test]
    fn test_cco_padded_to_five() {
        let enc = one_hot("CCO", Some(5)).unwrap();
        assert_eq!(enc.shape(), &[5, 35]);

        let hot = hot_indices(&enc);
        assert_eq!(hot[0], Some(0)); // C
        assert_eq!(hot[1], Some(0)); // C
        assert_eq!(hot[2], Some(2)); // O
        assert_eq!(hot[3], Some(TERMINATOR_INDEX));
        assert_eq!(hot[4], None); // zero padding row
    }

    #[test]
    fn test_unpadded_length_is_input_plus_one() {
        let enc = one_hot("CCO", None).unwrap();
        assert_eq!(enc.shape(), &[4, 35]);
        let hot = hot_indices(&enc);
        assert_eq!(hot[3], Some(TERMINATOR_INDEX));
    }

    #[test]
    fn test_deterministic() {
        let a = one_hot("c1ccccc1N(=O)[O-]", Some(40)).unwrap();
        let b = one_hot("c1ccccc1N(=O)[O-]", Some(40)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_two_letter_atoms() {
        let enc = one_hot("CClBrSi", Some(10)).unwrap();
        let hot = hot_indices(&enc);
        assert_eq!(hot[0], Some(0)); // C
        assert_eq!(hot[1], Some(5)); // Cl
        assert_eq!(hot[2], Some(8)); // Br
        assert_eq!(hot[3], Some(11)); // Si
        assert_eq!(hot[4], Some(TERMINATOR_INDEX));
    }

    #[test]
    fn test_two_letter_atom_at_end_of_string() {
        // "Cl" ends exactly at the sentinel boundary; the scan must not read
        // past the sentinel-extended string.
        let enc = one_hot("CCl", Some(4)).unwrap();
        let hot = hot_indices(&enc);
        assert_eq!(hot[0], Some(0));
        assert_eq!(hot[1], Some(5));
        assert_eq!(hot[2], Some(TERMINATOR_INDEX));
        assert_eq!(hot[3], None);
    }

    #[test]
    fn test_unknown_symbols_map_to_wildcard() {
        let enc = one_hot("CZz", Some(6)).unwrap();
        let hot = hot_indices(&enc);
        assert_eq!(hot[0], Some(0));
        assert_eq!(hot[1], Some(WILDCARD_INDEX));
        assert_eq!(hot[2], Some(WILDCARD_INDEX));
        assert_eq!(hot[3], Some(TERMINATOR_INDEX));
    }

    #[test]
    fn test_truncation_forces_terminator_on_last_row() {
        let enc = one_hot("CCCCCCCC", Some(4)).unwrap();
        assert_eq!(enc.shape(), &[4, 35]);
        let hot = hot_indices(&enc);
        assert_eq!(hot[0], Some(0));
        assert_eq!(hot[1], Some(0));
        assert_eq!(hot[2], Some(0));
        assert_eq!(hot[3], Some(TERMINATOR_INDEX));
    }

    #[test]
    fn test_exactly_one_terminator_row() {
        for smiles in ["", "C", "CCO", "C.C", "CCCCCCCCCC", "Cl"] {
            for pad in [2, 3, 5, 8, 20] {
                let enc = one_hot(smiles, Some(pad)).unwrap();
                assert_eq!(enc.shape(), &[pad, 35]);
                let terminators = enc
                    .rows()
                    .into_iter()
                    .filter(|row| row[TERMINATOR_INDEX] == 1.0)
                    .count();
                assert_eq!(
                    terminators, 1,
                    "smiles {:?} pad {} should have one terminator row",
                    smiles, pad
                );
            }
        }
    }

    #[test]
    fn test_dot_separator_terminates_scan() {
        // '.' separates disconnected fragments in SMILES; the encoder treats
        // the first one as end-of-sequence, like the model's preprocessing.
        let enc = one_hot("CC.OO", Some(8)).unwrap();
        let hot = hot_indices(&enc);
        assert_eq!(hot[0], Some(0));
        assert_eq!(hot[1], Some(0));
        assert_eq!(hot[2], Some(TERMINATOR_INDEX));
        assert_eq!(hot[3], None);
    }

    #[test]
    fn test_empty_string_is_just_terminator() {
        let enc = one_hot("", Some(3)).unwrap();
        let hot = hot_indices(&enc);
        assert_eq!(hot[0], Some(TERMINATOR_INDEX));
        assert_eq!(hot[1], None);
        assert_eq!(hot[2], None);
    }

    #[test]
    fn test_pad_len_below_two_rejected() {
        assert!(one_hot("CCO", Some(1)).is_err());
        assert!(one_hot("CCO", Some(0)).is_err());
    }

    #[test]
    fn test_non_ascii_maps_to_wildcard() {
        // Characters outside the vocabulary are absorbed by the wildcard
        // token regardless of their byte width.
        let enc = one_hot("Cλ", Some(5)).unwrap();
        let hot = hot_indices(&enc);
        assert_eq!(hot[0], Some(0));
        assert_eq!(hot[1], Some(WILDCARD_INDEX));
        assert_eq!(hot[2], Some(TERMINATOR_INDEX));
        assert_eq!(hot[3], None);
    }

    #[test]
    fn test_non_ascii_before_two_letter_tail() {
        // A multi-byte character followed by a two-letter lookahead ('l')
        // consumes both as one unknown token.
        let enc = one_hot("λlC", Some(5)).unwrap();
        let hot = hot_indices(&enc);
        assert_eq!(hot[0], Some(WILDCARD_INDEX));
        assert_eq!(hot[1], Some(0));
        assert_eq!(hot[2], Some(TERMINATOR_INDEX));
    }

    #[test]
    fn test_non_ascii_unpadded_row_count_is_char_based() {
        let enc = one_hot("Cλλ", None).unwrap();
        assert_eq!(enc.shape(), &[4, 35]);
        let hot = hot_indices(&enc);
        assert_eq!(hot[3], Some(TERMINATOR_INDEX));
    }

    #[test]
    fn test_rows_are_at_most_one_hot() {
        let enc = one_hot("c1ccccc1", Some(12)).unwrap();
        for row in enc.rows() {
            let ones = row.iter().filter(|&&v| v == 1.0).count();
            let zeros = row.iter().filter(|&&v| v == 0.0).count();
            assert!(ones <= 1);
            assert_eq!(ones + zeros, 35);
        }
    }
}
