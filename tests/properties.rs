//! Property tests for ranking contracts shared by BM25 and TF-IDF.

use lexrank::{build_index, Bm25Params, Bm25Scorer, Query, Scorer, TfIdfScorer};
use proptest::prelude::*;

fn corpus() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec("[a-f]{1,2}", 0..12), 1..16)
}

fn with_ids(docs: &[Vec<String>]) -> Vec<(String, Vec<String>)> {
    docs.iter()
        .enumerate()
        .map(|(i, terms)| (format!("d{i:02}"), terms.clone()))
        .collect()
}

proptest! {
    #[test]
    fn rank_is_deterministic(docs in corpus(), query in prop::collection::vec("[a-f]{1,2}", 1..4)) {
        let (ix, lens, stats) = build_index(with_ids(&docs)).unwrap();
        let q = Query::from_terms(&query);
        let bm25 = Bm25Scorer::new(&ix, &lens, &stats, Bm25Params::default()).unwrap();
        let tfidf = TfIdfScorer::new(&ix, &lens);
        for scorer in [&bm25 as &dyn Scorer, &tfidf] {
            prop_assert_eq!(scorer.rank_query(&q, 10), scorer.rank_query(&q, 10));
        }
    }

    #[test]
    fn top_k_is_a_sorted_prefix(docs in corpus(), query in prop::collection::vec("[a-f]{1,2}", 1..4)) {
        let (ix, lens, stats) = build_index(with_ids(&docs)).unwrap();
        let q = Query::from_terms(&query);
        let bm25 = Bm25Scorer::new(&ix, &lens, &stats, Bm25Params::default()).unwrap();
        let tfidf = TfIdfScorer::new(&ix, &lens);
        for scorer in [&bm25 as &dyn Scorer, &tfidf] {
            let all = scorer.rank_query(&q, docs.len() + 1);
            for w in all.windows(2) {
                prop_assert!(w[0].1 >= w[1].1);
                if w[0].1 == w[1].1 {
                    prop_assert!(w[0].0 < w[1].0);
                }
            }
            for (_, score) in &all {
                prop_assert!(*score > 0.0);
            }
            for k in 0..=docs.len() {
                let top = scorer.rank_query(&q, k);
                prop_assert!(top.len() <= k);
                prop_assert_eq!(&top[..], &all[..top.len()]);
            }
        }
    }

    #[test]
    fn hits_share_a_query_term(docs in corpus(), query in prop::collection::vec("[a-f]{1,2}", 1..4)) {
        let (ix, lens, _) = build_index(with_ids(&docs)).unwrap();
        let q = Query::from_terms(&query);
        let tfidf = TfIdfScorer::new(&ix, &lens);
        for (doc_id, _) in tfidf.rank_query(&q, docs.len()) {
            prop_assert!(q.terms().any(|(t, _)| ix.term_frequency(t, &doc_id) > 0));
        }
    }

    #[test]
    fn unknown_terms_never_match(docs in corpus(), query in prop::collection::vec("[x-z]{3}", 1..4)) {
        let ids = with_ids(&docs);
        let (ix, lens, stats) = build_index(ids.clone()).unwrap();
        let q = Query::from_terms(&query);
        let bm25 = Bm25Scorer::new(&ix, &lens, &stats, Bm25Params::default()).unwrap();
        let tfidf = TfIdfScorer::new(&ix, &lens);
        for scorer in [&bm25 as &dyn Scorer, &tfidf] {
            prop_assert!(scorer.rank_query(&q, 10).is_empty());
            for (id, _) in &ids {
                prop_assert_eq!(scorer.score_query(id, &q).unwrap(), 0.0);
            }
        }
    }

    #[test]
    fn avg_doc_len_is_reproducible_mean(docs in corpus()) {
        let (_, lens, stats) = build_index(with_ids(&docs)).unwrap();
        let total: u64 = docs.iter().map(|d| d.len() as u64).sum();
        prop_assert_eq!(stats.num_docs, docs.len());
        prop_assert_eq!(stats.total_len, total);
        prop_assert_eq!(stats.avg_doc_len, total as f64 / docs.len() as f64);
        prop_assert_eq!(lens.len(), docs.len());

        let (_, _, again) = build_index(with_ids(&docs)).unwrap();
        prop_assert_eq!(stats.avg_doc_len.to_bits(), again.avg_doc_len.to_bits());
    }

    #[test]
    fn postings_are_frequency_ordered(docs in corpus()) {
        let (ix, _, _) = build_index(with_ids(&docs)).unwrap();
        for term in ix.terms() {
            let postings = ix.postings(term);
            prop_assert_eq!(postings.len(), ix.doc_frequency(term));
            for w in postings.windows(2) {
                prop_assert!(w[0].term_frequency >= w[1].term_frequency);
            }
        }
    }

    #[test]
    fn bm25_tf_saturation_increases_with_frequency(f in 1u32..500, doc_len in 1u32..500) {
        let (ix, lens, stats) = build_index([("a", vec!["x", "y", "z"])]).unwrap();
        let bm25 = Bm25Scorer::new(&ix, &lens, &stats, Bm25Params::default()).unwrap();
        prop_assert!(bm25.tf_saturation(f + 1, doc_len) > bm25.tf_saturation(f, doc_len));
    }
}

#[cfg(feature = "parallel")]
fn sequential_rank(
    scorer: &dyn Scorer,
    ix: &lexrank::InvertedIndex,
    q: &Query,
    k: usize,
) -> Vec<(lexrank::DocId, f64)> {
    use lexrank::rank::{candidates, top_k};
    use std::sync::Arc;

    let scored = candidates(ix, q)
        .into_iter()
        .map(|id| (Arc::clone(id), scorer.score_query(id, q).unwrap()))
        .collect();
    top_k(scored, k)
}

#[cfg(feature = "parallel")]
proptest! {
    #[test]
    fn parallel_rank_matches_sequential(docs in corpus(), query in prop::collection::vec("[a-f]{1,2}", 1..6)) {
        let (ix, lens, stats) = build_index(with_ids(&docs)).unwrap();
        let q = Query::from_terms(&query);
        let bm25 = Bm25Scorer::new(&ix, &lens, &stats, Bm25Params::default()).unwrap();
        let tfidf = TfIdfScorer::new(&ix, &lens);
        for scorer in [&bm25 as &dyn Scorer, &tfidf] {
            for k in [1, 3, docs.len() + 1] {
                prop_assert_eq!(scorer.rank_query(&q, k), sequential_rank(scorer, &ix, &q, k));
            }
        }
    }
}
