//! `lexrank`: classical lexical ranking over an in-memory inverted index.
//!
//! A corpus is indexed once and then ranked against many queries:
//! - `index` builds the inverted index, the document length table and corpus statistics.
//! - `bm25` and `tfidf` score documents against a query over that shared, immutable state.
//! - `rank` holds the query model, the `Scorer` trait and the shared top-k routine.
//!
//! Scope:
//! - In-memory, build-once indexes
//! - Deterministic ranking (score desc, tie-break by doc id asc)
//! - Caller-provided token streams, with a reference whitespace tokenizer in `tokenize`
//!
//! Non-goals:
//! - Stemming, stop words, phrase/boolean queries
//! - Incremental updates and persistence
//!
//! References:
//! - Robertson & Zaragoza (2009): BM25 and beyond
//! - Spärck Jones (1972): term specificity / IDF motivation
//!
//! ```
//! use lexrank::{build_index_from_text, Bm25Params, Bm25Scorer, Scorer};
//!
//! let (index, lengths, stats) = build_index_from_text([
//!     ("d1", "cat dog cat"),
//!     ("d2", "dog dog bird"),
//!     ("d3", "fish bird"),
//! ])
//! .unwrap();
//! let bm25 = Bm25Scorer::new(&index, &lengths, &stats, Bm25Params::default()).unwrap();
//! let hits = bm25.rank("cat", 5);
//! assert_eq!(hits.len(), 1);
//! assert_eq!(&*hits[0].0, "d1");
//! ```

pub mod bm25;
pub mod index;
pub mod rank;
pub mod tfidf;
pub mod tokenize;

pub use bm25::{Bm25Params, Bm25Scorer};
pub use error::Error;
pub use index::{
    build_index, build_index_from_text, CorpusStats, DocId, DocumentLengths, InvertedIndex,
    Posting,
};
pub use rank::{Query, Scorer};
pub use tfidf::TfIdfScorer;

mod error {
    /// Errors for index construction and scoring.
    #[derive(thiserror::Error, Debug, Clone, PartialEq)]
    pub enum Error {
        /// No documents were supplied to the builder.
        #[error("empty corpus")]
        EmptyCorpus,
        /// The corpus violates an input contract (duplicate id, empty term).
        #[error("malformed corpus: document {doc_id:?}: {reason}")]
        MalformedCorpus {
            /// Offending document id.
            doc_id: String,
            /// What was wrong with it.
            reason: &'static str,
        },
        /// A per-document operation named an id that is not indexed.
        #[error("unknown document: {0:?}")]
        UnknownDocument(String),
        /// Scoring parameters were outside their domain.
        #[error("invalid parameters: {0}")]
        InvalidParams(&'static str),
    }
}
