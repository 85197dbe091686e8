//! Query model, the `Scorer` trait and the shared top-k routine.
//!
//! Both relevance models rank the same way:
//! - candidates are the documents appearing in at least one query term's postings
//!   (documents with zero overlap are never scored)
//! - non-finite and non-positive scores are discarded
//! - order is deterministic: score desc, then doc id asc

use crate::index::{DocId, InvertedIndex};
use crate::tokenize::split_terms;
use crate::Error;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// A parsed query: distinct terms in first-occurrence order with their query frequency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    terms: Vec<(String, u32)>,
    positions: HashMap<String, usize>,
}

impl Query {
    /// Tokenize `text` with the reference tokenizer.
    pub fn parse(text: &str) -> Self {
        Self::from_terms(split_terms(text))
    }

    /// Build from caller-tokenized terms. Empty terms are ignored.
    pub fn from_terms<I>(terms: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut query = Self::default();
        for term in terms {
            let term = term.as_ref();
            if term.is_empty() {
                continue;
            }
            match query.positions.get(term) {
                Some(&at) => {
                    let qf = &mut query.terms[at].1;
                    *qf = qf.saturating_add(1);
                }
                None => {
                    query.positions.insert(term.to_owned(), query.terms.len());
                    query.terms.push((term.to_owned(), 1));
                }
            }
        }
        query
    }

    /// Iterate `(term, qf)` over distinct terms.
    pub fn terms(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.terms.iter().map(|(t, qf)| (t.as_str(), *qf))
    }

    /// Occurrences of `term` in the query (0 if absent).
    pub fn frequency(&self, term: &str) -> u32 {
        self.positions
            .get(term)
            .map_or(0, |&at| self.terms[at].1)
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True when the query has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// A relevance model over a built index.
///
/// Implementors only provide per-document scoring; candidate generation and top-k selection
/// are shared so every model ranks with the same contract.
pub trait Scorer: Sync {
    /// Short model name, used in trace events.
    fn name(&self) -> &'static str;

    /// The index candidates are drawn from.
    fn index(&self) -> &InvertedIndex;

    /// Score one document against a parsed query.
    ///
    /// Fails with [`Error::UnknownDocument`] if `doc_id` is not part of the corpus.
    fn score_query(&self, doc_id: &str, query: &Query) -> Result<f64, Error>;

    /// Rank documents for a raw query string (reference tokenization).
    fn rank(&self, query: &str, k: usize) -> Vec<(DocId, f64)> {
        self.rank_query(&Query::parse(query), k)
    }

    /// Rank documents for a parsed query; at most `k` hits, best first.
    fn rank_query(&self, query: &Query, k: usize) -> Vec<(DocId, f64)> {
        if k == 0 || query.is_empty() {
            return Vec::new();
        }
        let candidates = candidates(self.index(), query);
        let num_candidates = candidates.len();
        let hits = top_k(score_candidates(self, &candidates, query), k);
        tracing::trace!(
            model = self.name(),
            candidates = num_candidates,
            hits = hits.len(),
            k,
            "ranked query"
        );
        hits
    }
}

/// Documents sharing at least one term with `query`, in doc id order.
pub fn candidates<'a>(index: &'a InvertedIndex, query: &Query) -> Vec<&'a DocId> {
    let set: BTreeSet<&DocId> = query
        .terms()
        .flat_map(|(term, _)| index.postings(term))
        .map(|p| &p.doc_id)
        .collect();
    set.into_iter().collect()
}

/// Keep positive finite scores, order by (score desc, doc id asc), truncate to `k`.
pub fn top_k(mut scored: Vec<(DocId, f64)>, k: usize) -> Vec<(DocId, f64)> {
    scored.retain(|(_, score)| score.is_finite() && *score > 0.0);
    scored.sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scored.truncate(k);
    scored
}

#[cfg(not(feature = "parallel"))]
fn score_candidates<S: Scorer + ?Sized>(
    scorer: &S,
    candidates: &[&DocId],
    query: &Query,
) -> Vec<(DocId, f64)> {
    candidates
        .iter()
        .filter_map(|doc_id| score_one(scorer, doc_id, query))
        .collect()
}

#[cfg(feature = "parallel")]
fn score_candidates<S: Scorer + ?Sized>(
    scorer: &S,
    candidates: &[&DocId],
    query: &Query,
) -> Vec<(DocId, f64)> {
    use rayon::prelude::*;
    candidates
        .par_iter()
        .filter_map(|doc_id| score_one(scorer, doc_id, query))
        .collect()
}

fn score_one<S: Scorer + ?Sized>(
    scorer: &S,
    doc_id: &DocId,
    query: &Query,
) -> Option<(DocId, f64)> {
    match scorer.score_query(doc_id, query) {
        Ok(score) => Some((Arc::clone(doc_id), score)),
        Err(e) => {
            // Only reachable when the length table does not match the index.
            tracing::warn!(model = scorer.name(), error = %e, "skipping candidate");
            None
        }
    }
}
