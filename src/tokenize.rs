//! Reference tokenization: split on single spaces, drop empty tokens.
//!
//! No case folding, stemming or punctuation handling happens here. Callers that want a
//! different analyzer tokenize themselves and hand term streams to `build_index`.

/// Split `text` on `' '`, skipping the empty tokens produced by repeated spaces.
pub fn split_terms(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.split(' ').filter(|t| !t.is_empty())
}
