//! Inverted index, document length table and corpus statistics.
//!
//! Everything here is built exactly once by [`build_index`] and is read-only afterwards.
//! Scorers borrow these structures; nothing in the crate mutates them after construction,
//! so they can be shared across threads without locking.

use crate::tokenize::split_terms;
use crate::Error;
use std::collections::HashMap;
use std::sync::Arc;

/// Document identifier, shared between posting lists and the length table.
pub type DocId = Arc<str>;

/// One document's occurrence count for a term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    /// Document containing the term.
    pub doc_id: DocId,
    /// Number of occurrences of the term in `doc_id` (always `>= 1`).
    pub term_frequency: u32,
}

/// Postings for a single term.
///
/// `postings` is ordered by term frequency descending; among equal frequencies the most
/// recently inserted posting comes first. `by_doc` mirrors it for O(1) frequency lookups.
#[derive(Debug, Default)]
struct PostingList {
    postings: Vec<Posting>,
    by_doc: HashMap<DocId, u32>,
}

impl PostingList {
    fn insert(&mut self, posting: Posting) {
        let at = self
            .postings
            .partition_point(|p| p.term_frequency > posting.term_frequency);
        self.by_doc
            .insert(Arc::clone(&posting.doc_id), posting.term_frequency);
        self.postings.insert(at, posting);
    }
}

/// Term -> postings.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    terms: HashMap<String, PostingList>,
}

impl InvertedIndex {
    fn insert(&mut self, term: String, posting: Posting) {
        self.terms.entry(term).or_default().insert(posting);
    }

    /// Postings for `term`, ordered by term frequency descending. Empty if not indexed.
    pub fn postings(&self, term: &str) -> &[Posting] {
        self.terms
            .get(term)
            .map(|list| list.postings.as_slice())
            .unwrap_or(&[])
    }

    /// Number of documents containing `term` (0 if not indexed).
    pub fn doc_frequency(&self, term: &str) -> usize {
        self.terms.get(term).map_or(0, |list| list.postings.len())
    }

    /// Occurrences of `term` in `doc_id` (0 if either is unknown).
    pub fn term_frequency(&self, term: &str, doc_id: &str) -> u32 {
        self.terms
            .get(term)
            .and_then(|list| list.by_doc.get(doc_id).copied())
            .unwrap_or(0)
    }

    /// Whether `term` occurs anywhere in the corpus.
    pub fn contains_term(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    /// Number of distinct terms.
    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// Iterate distinct terms (arbitrary order).
    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        self.terms.keys().map(String::as_str)
    }
}

/// Document id -> total token count (duplicates included).
#[derive(Debug, Default)]
pub struct DocumentLengths {
    order: Vec<DocId>,
    lengths: HashMap<DocId, u32>,
}

impl DocumentLengths {
    fn insert(&mut self, doc_id: DocId, len: u32) {
        self.order.push(Arc::clone(&doc_id));
        self.lengths.insert(doc_id, len);
    }

    /// Length of `doc_id`, or `None` if it is not part of the corpus.
    pub fn get(&self, doc_id: &str) -> Option<u32> {
        self.lengths.get(doc_id).copied()
    }

    /// Whether `doc_id` is part of the corpus.
    pub fn contains(&self, doc_id: &str) -> bool {
        self.lengths.contains_key(doc_id)
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no documents are recorded.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Sum of all document lengths.
    pub fn total(&self) -> u64 {
        self.lengths.values().map(|&len| u64::from(len)).sum()
    }

    /// Iterate `(doc_id, length)` in corpus order.
    pub fn iter(&self) -> impl Iterator<Item = (&DocId, u32)> + '_ {
        self.order.iter().map(move |id| (id, self.lengths[id]))
    }
}

/// Corpus-wide statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorpusStats {
    /// Number of documents (`N`).
    pub num_docs: usize,
    /// Sum of all document lengths.
    pub total_len: u64,
    /// Arithmetic mean of document lengths.
    pub avg_doc_len: f64,
}

impl CorpusStats {
    /// Derive statistics from a length table.
    ///
    /// The mean is taken from integer totals, so the same corpus always yields the same bits.
    pub fn from_lengths(lengths: &DocumentLengths) -> Result<Self, Error> {
        if lengths.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        let num_docs = lengths.len();
        let total_len = lengths.total();
        Ok(Self {
            num_docs,
            total_len,
            avg_doc_len: total_len as f64 / num_docs as f64,
        })
    }
}

/// Build the inverted index, length table and statistics from tokenized documents.
///
/// Documents are `(id, terms)` pairs; terms must be non-empty. Fails with
/// [`Error::EmptyCorpus`] for zero documents and [`Error::MalformedCorpus`] for a repeated
/// id or an empty term. No partial index is returned on failure.
pub fn build_index<I, D, T>(
    documents: I,
) -> Result<(InvertedIndex, DocumentLengths, CorpusStats), Error>
where
    I: IntoIterator<Item = (D, T)>,
    D: AsRef<str>,
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    build(documents).inspect_err(|e| tracing::debug!(error = %e, "rejected corpus"))
}

fn build<I, D, T>(documents: I) -> Result<(InvertedIndex, DocumentLengths, CorpusStats), Error>
where
    I: IntoIterator<Item = (D, T)>,
    D: AsRef<str>,
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut index = InvertedIndex::default();
    let mut lengths = DocumentLengths::default();

    for (doc_id, terms) in documents {
        let doc_id = doc_id.as_ref();
        if lengths.contains(doc_id) {
            return Err(malformed(doc_id, "duplicate document id"));
        }

        let mut counts: HashMap<String, u32> = HashMap::new();
        let mut total: u32 = 0;
        for term in terms {
            let term = term.as_ref();
            if term.is_empty() {
                return Err(malformed(doc_id, "empty term"));
            }
            // Per-term counts never exceed `total`, so only `total` needs checking.
            total = next_len(total, doc_id)?;
            match counts.get_mut(term) {
                Some(count) => *count += 1,
                None => {
                    counts.insert(term.to_owned(), 1);
                }
            }
        }

        let id: DocId = Arc::from(doc_id);
        for (term, term_frequency) in counts {
            index.insert(
                term,
                Posting {
                    doc_id: Arc::clone(&id),
                    term_frequency,
                },
            );
        }
        lengths.insert(id, total);
    }

    let stats = CorpusStats::from_lengths(&lengths)?;
    tracing::debug!(
        num_docs = stats.num_docs,
        num_terms = index.num_terms(),
        avg_doc_len = stats.avg_doc_len,
        "built index"
    );
    Ok((index, lengths, stats))
}

/// Build from `(id, text)` records using the reference tokenizer ([`split_terms`]).
pub fn build_index_from_text<I, D, S>(
    records: I,
) -> Result<(InvertedIndex, DocumentLengths, CorpusStats), Error>
where
    I: IntoIterator<Item = (D, S)>,
    D: AsRef<str>,
    S: AsRef<str>,
{
    build_index(records.into_iter().map(|(id, text)| {
        let terms: Vec<String> = split_terms(text.as_ref()).map(str::to_owned).collect();
        (id, terms)
    }))
}

fn next_len(len: u32, doc_id: &str) -> Result<u32, Error> {
    len.checked_add(1)
        .ok_or_else(|| malformed(doc_id, "document exceeds u32::MAX tokens"))
}

fn malformed(doc_id: &str, reason: &'static str) -> Error {
    Error::MalformedCorpus {
        doc_id: doc_id.to_owned(),
        reason,
    }
}
