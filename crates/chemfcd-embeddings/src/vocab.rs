//! The fixed SMILES token vocabulary of the ChemNet embedding model
//!
//! The order of the tokens defines the one-hot axis and matches the
//! preprocessing the embedding model was trained with. It must never be
//! reordered.

/// The 35 tokens the encoder recognizes, in one-hot axis order.
///
/// Atoms (including the two-letter `Cl`, `Br`, `Si`), bond and ring symbols,
/// charge signs, brackets, aromatic atoms, the wildcard `X` for anything
/// out of vocabulary, and the terminator `.`.
pub const VOCAB: [&str; 35] = [
    "C", "N", "O", "H", "F", "Cl", "P", "B", "Br", "S", "I", "Si", "#", "(",
    ")", "+", "-", "1", "2", "3", "4", "5", "6", "7", "8", "=", "[", "]", "@",
    "c", "n", "o", "s", "X", ".",
];

/// Number of tokens in the vocabulary, i.e. the width of the one-hot axis.
pub const VOCAB_SIZE: usize = VOCAB.len();

/// Index of the wildcard token `X` that absorbs unknown symbols.
pub const WILDCARD_INDEX: usize = 33;

/// Index of the terminator token `.` that marks end-of-sequence.
pub const TERMINATOR_INDEX: usize = 34;

/// Look up a token's one-hot index, falling back to the wildcard.
///
/// Out-of-vocabulary symbols are mapped to `X` rather than rejected; this is
/// an intentional lossy-encoding policy of the upstream model.
pub fn token_index(token: &str) -> usize {
    VOCAB
        .iter()
        .position(|&t| t == token)
        .unwrap_or(WILDCARD_INDEX)
}

/// Whether `c` is a valid second character of a two-letter token.
///
/// The scanner consumes two characters whenever the lookahead is one of
/// these; pairs that do not form `Cl`, `Br` or `Si` fall through to the
/// wildcard in `token_index`.
pub fn is_two_char_tail(c: char) -> bool {
    matches!(c, 'r' | 'i' | 'l')
}
