//! Okapi BM25 over the shared inverted index.
//!
//! For a query `Q` and document `d`:
//!
//! \( \sum_{t \in Q} qf_t \cdot \mathrm{idf}(t) \cdot \frac{(k_1+1) f_{t,d}}{k_1(1-b) + b\,|d|/\overline{|d|} + f_{t,d}}
//!    \cdot \frac{(k_2+1) qf_t}{k_2 + qf_t} \)
//!
//! with \( \mathrm{idf}(t) = \ln\frac{N - df_t + 0.5}{df_t + 0.5} \).
//!
//! Notes:
//! - the IDF is the classic Robertson/Spärck Jones form and goes negative for terms in more
//!   than half the corpus; it is not clamped
//! - terms absent from the index contribute nothing
//! - the sum runs over query term occurrences: a term repeated `qf_t` times contributes
//!   `qf_t` times, each occurrence also scaled by the query saturation of `qf_t`
//!
//! References:
//! - Robertson & Walker (1994). "Some simple effective approximations to the 2-Poisson model..."
//! - Robertson & Zaragoza (2009). "The Probabilistic Relevance Framework: BM25 and Beyond."

use crate::index::{CorpusStats, DocumentLengths, InvertedIndex};
use crate::rank::{Query, Scorer};
use crate::Error;

/// BM25 parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f64,
    /// Length normalization weight, in `[0, 1]`.
    pub b: f64,
    /// Query-term-frequency saturation.
    pub k2: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: 1.2,
            b: 0.75,
            k2: 500.0,
        }
    }
}

impl Bm25Params {
    /// Create validated parameters.
    pub fn new(k1: f64, b: f64, k2: f64) -> Result<Self, Error> {
        let params = Self { k1, b, k2 };
        params.validate()?;
        Ok(params)
    }

    /// Check every parameter is finite and in range.
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.k1.is_finite() && self.b.is_finite() && self.k2.is_finite()) {
            return Err(Error::InvalidParams("parameters must be finite"));
        }
        if self.k1 < 0.0 {
            return Err(Error::InvalidParams("k1 must be >= 0"));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(Error::InvalidParams("b must be in [0, 1]"));
        }
        if self.k2 < 0.0 {
            return Err(Error::InvalidParams("k2 must be >= 0"));
        }
        Ok(())
    }
}

/// BM25 view over a built corpus.
#[derive(Debug, Clone, Copy)]
pub struct Bm25Scorer<'a> {
    index: &'a InvertedIndex,
    lengths: &'a DocumentLengths,
    stats: &'a CorpusStats,
    params: Bm25Params,
}

impl<'a> Bm25Scorer<'a> {
    /// Create a scorer. Fails with [`Error::InvalidParams`] for out-of-range parameters.
    pub fn new(
        index: &'a InvertedIndex,
        lengths: &'a DocumentLengths,
        stats: &'a CorpusStats,
        params: Bm25Params,
    ) -> Result<Self, Error> {
        params.validate()?;
        Ok(Self {
            index,
            lengths,
            stats,
            params,
        })
    }

    /// Parameters this scorer was built with.
    pub fn params(&self) -> Bm25Params {
        self.params
    }

    /// `ln((N - df + 0.5) / (df + 0.5))` for `term`'s document frequency.
    pub fn idf(&self, term: &str) -> f64 {
        self.idf_for_df(self.index.doc_frequency(term))
    }

    fn idf_for_df(&self, df: usize) -> f64 {
        let n = self.stats.num_docs as f64;
        let df = df as f64;
        ((n - df + 0.5) / (df + 0.5)).ln()
    }

    /// Saturated, length-normalized term frequency for a document of `doc_len` tokens.
    pub fn tf_saturation(&self, term_frequency: u32, doc_len: u32) -> f64 {
        if term_frequency == 0 {
            return 0.0;
        }
        let Bm25Params { k1, b, .. } = self.params;
        let f = f64::from(term_frequency);
        let rel_len = f64::from(doc_len) / self.stats.avg_doc_len;
        ((k1 + 1.0) * f) / (k1 * (1.0 - b) + b * rel_len + f)
    }

    /// Saturated query-term frequency.
    pub fn query_saturation(&self, query_frequency: u32) -> f64 {
        if query_frequency == 0 {
            return 0.0;
        }
        let k2 = self.params.k2;
        let qf = f64::from(query_frequency);
        ((k2 + 1.0) * qf) / (k2 + qf)
    }

    /// BM25 score of `doc_id` for a raw query string.
    pub fn score(&self, query: &str, doc_id: &str) -> Result<f64, Error> {
        self.score_query(doc_id, &Query::parse(query))
    }
}

impl Scorer for Bm25Scorer<'_> {
    fn name(&self) -> &'static str {
        "bm25"
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
            let f = self.index.term_frequency(term, doc_id);
            if f == 0 {
                continue;
            }
            score += f64::from(qf)
                * self.idf_for_df(df)
                * self.tf_saturation(f, doc_len)
                * self.query_saturation(qf);
        }
        Ok(score)
    }
}
