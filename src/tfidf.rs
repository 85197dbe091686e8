//! TF-IDF scoring over the shared inverted index.
//!
//! Uses the same postings and length table as BM25, so both models can be compared on
//! identical tokenization and corpus stats.
//!
//! - `tf(d, t) = ln(1 + f_{t,d} / |d|)`
//! - `relevance(d, Q) = Σ_{t ∈ Q} tf(d, t) / df_t` over query term occurrences, so a term
//!   repeated in the query counts once per repetition; terms with `df_t = 0` are skipped

use crate::index::{DocumentLengths, InvertedIndex};
use crate::rank::{Query, Scorer};
use crate::Error;

/// TF-IDF view over a built corpus.
#[derive(Debug, Clone, Copy)]
pub struct TfIdfScorer<'a> {
    index: &'a InvertedIndex,
    lengths: &'a DocumentLengths,
}

impl<'a> TfIdfScorer<'a> {
    /// Create a scorer over an index and its length table.
    pub fn new(index: &'a InvertedIndex, lengths: &'a DocumentLengths) -> Self {
        Self { index, lengths }
    }

    /// Length-normalized log term frequency of `term` in `doc_id`.
    pub fn tf(&self, doc_id: &str, term: &str) -> Result<f64, Error> {
        let doc_len = self
            .lengths
            .get(doc_id)
            .ok_or_else(|| Error::UnknownDocument(doc_id.to_owned()))?;
        Ok(self.tf_in(doc_id, doc_len, term))
    }

    fn tf_in(&self, doc_id: &str, doc_len: u32, term: &str) -> f64 {
        let f = self.index.term_frequency(term, doc_id);
        if f == 0 || doc_len == 0 {
            return 0.0;
        }
        (f64::from(f) / f64::from(doc_len)).ln_1p()
    }

    /// Relevance of `doc_id` to a raw query string.
    pub fn relevance(&self, doc_id: &str, query: &str) -> Result<f64, Error> {
        self.score_query(doc_id, &Query::parse(query))
    }
}

impl Scorer for TfIdfScorer<'_> {
    fn name(&self) -> &'static str {
        "tfidf"
    }

    fn index(&self) -> &InvertedIndex {
        self.index
    }

    fn score_query(&self, doc_id: &str, query: &Query) -> Result<f64, Error> {
        let doc_len = self
            .lengths
            .get(doc_id)
            .ok_or_else(|| Error::UnknownDocument(doc_id.to_owned()))?;

        let mut score = 0.0;
        for (term, qf) in query.terms() {
            let df = self.index.doc_frequency(term);
            if df == 0 {
                continue;
            }
            score += f64::from(qf) * self.tf_in(doc_id, doc_len, term) / df as f64;
        }
        Ok(score)
    }
}
