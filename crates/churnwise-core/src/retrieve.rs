//! Top-1 BM25 retrieval.
//!
//! ```text
//! score(d,q) = Σ_{t in q} IDF(t) · f(t,d)·(k1+1) / (f(t,d) + k1·(1 - b + b·|d|/avgdl))
//! IDF(t)     = ln((N - df(t) + 0.5) / (df(t) + 0.5) + 1)
//! ```
//!
//! Only documents sharing at least one query term are scored. The best
//! document wins; equal scores go to the lowest document id (see
//! [`compare_ids`]). A query with no shared terms, or an empty corpus,
//! yields `None`.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::index::DocumentIndex;
use crate::models::Document;
use crate::tokenize::tokenize;

/// BM25 tuning constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f64,
    /// Length normalization weight in `[0, 1]`.
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

/// The winning document and its score.
#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    pub document: &'a Document,
    pub score: f64,
}

/// Return the single best document for `query`, if any shares a term.
pub fn retrieve<'a>(
    query: &str,
    index: &'a DocumentIndex,
    params: &Bm25Params,
) -> Option<Match<'a>> {
    if index.is_empty() {
        return None;
    }
    let terms = tokenize(query);
    if terms.is_empty() {
        return None;
    }

    let candidates: BTreeSet<usize> = terms
        .iter()
        .filter_map(|t| index.postings(t))
        .flat_map(|postings| postings.keys().copied())
        .collect();

    let mut best: Option<Match<'a>> = None;
    for slot in candidates {
        let Some(document) = index.document(slot) else {
            continue;
        };
        let candidate = Match {
            document,
            score: score(index, slot, &terms, params),
        };
        best = match best {
            Some(current) if !outranks(&candidate, &current) => Some(current),
            _ => Some(candidate),
        };
    }
    best
}

fn outranks(a: &Match<'_>, b: &Match<'_>) -> bool {
    match a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => compare_ids(&a.document.id, &b.document.id) == Ordering::Less,
    }
}

/// Total order on document ids.
///
/// Integer ids order by value and sort before all other ids, so `"9"` is
/// lower than `"10"`. Remaining ids, and integers of equal value such as
/// `"7"` and `"07"`, order as strings.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// BM25 score of the document in `slot` for already-tokenized query terms.
pub fn score(index: &DocumentIndex, slot: usize, terms: &[String], params: &Bm25Params) -> f64 {
    let n = index.len() as f64;
    let avgdl = index.avg_doc_length();
    let doc_len = index.doc_length(slot) as f64;

    terms
        .iter()
        .map(|term| {
            let tf = index.term_frequency(term, slot) as f64;
            if tf == 0.0 || avgdl == 0.0 {
                return 0.0;
            }
            let norm = params.k1 * (1.0 - params.b + params.b * doc_len / avgdl);
            idf(n, index.doc_freq(term) as f64) * (tf * (params.k1 + 1.0)) / (tf + norm)
        })
        .sum()
}

pub fn idf(n: f64, df: f64) -> f64 {
    ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(docs: &[(&str, &str)]) -> DocumentIndex {
        DocumentIndex::build(
            docs.iter()
                .map(|(id, content)| Document::new(*id, *content))
                .collect(),
        )
    }

    #[test]
    fn test_selects_only_document_with_term() {
        let index = index_of(&[("1", "churn risk high"), ("2", "billing question")]);
        let m = retrieve("churn", &index, &Bm25Params::default()).unwrap();
        assert_eq!(m.document.id, "1");
        assert!(m.score > 0.0);
    }

    #[test]
    fn test_no_shared_terms_is_no_match() {
        let index = index_of(&[("1", "churn risk high"), ("2", "billing question")]);
        assert!(retrieve("router firmware", &index, &Bm25Params::default()).is_none());
        assert!(retrieve("", &index, &Bm25Params::default()).is_none());
    }

    #[test]
    fn test_empty_corpus_is_no_match() {
        let index = DocumentIndex::build(Vec::new());
        assert!(retrieve("churn", &index, &Bm25Params::default()).is_none());
    }

    #[test]
    fn test_ties_go_to_lowest_id() {
        let index = index_of(&[("b", "fiber outage"), ("a", "fiber outage"), ("c", "fiber outage")]);
        for _ in 0..5 {
            let m = retrieve("fiber", &index, &Bm25Params::default()).unwrap();
            assert_eq!(m.document.id, "a");
        }
    }

    #[test]
    fn test_numeric_ids_tie_by_value() {
        let index = index_of(&[("10", "fiber outage"), ("9", "fiber outage"), ("100", "fiber outage")]);
        let m = retrieve("fiber", &index, &Bm25Params::default()).unwrap();
        assert_eq!(m.document.id, "9");
    }

    #[test]
    fn test_compare_ids_is_consistent_across_kinds() {
        assert_eq!(compare_ids("9", "10"), Ordering::Less);
        assert_eq!(compare_ids("10", "1a"), Ordering::Less);
        assert_eq!(compare_ids("1a", "9"), Ordering::Greater);
        assert_eq!(compare_ids("07", "7"), Ordering::Less);
        assert_eq!(compare_ids("b", "a"), Ordering::Greater);

        let mut ids = vec!["doc-b", "10", "1a", "9", "doc-a"];
        ids.sort_by(|a, b| compare_ids(a, b));
        assert_eq!(ids, vec!["9", "10", "1a", "doc-a", "doc-b"]);
    }

    #[test]
    fn test_higher_term_frequency_wins() {
        let index = index_of(&[
            ("1", "contract contract renewal"),
            ("2", "contract renewal offer"),
        ]);
        let m = retrieve("contract", &index, &Bm25Params::default()).unwrap();
        assert_eq!(m.document.id, "1");
    }

    #[test]
    fn test_rarer_term_weighs_more() {
        let index = index_of(&[
            ("1", "monthly charges discount"),
            ("2", "monthly charges tenure"),
            ("3", "monthly plan"),
        ]);
        let m = retrieve("monthly discount", &index, &Bm25Params::default()).unwrap();
        assert_eq!(m.document.id, "1");
    }

    #[test]
    fn test_score_matches_formula() {
        let index = index_of(&[("1", "churn risk high"), ("2", "billing question")]);
        let params = Bm25Params::default();
        // N=2, df=1, tf=1, |d|=3, avgdl=2.5
        let expected_idf = ((2.0 - 1.0 + 0.5) / (1.0 + 0.5) + 1.0_f64).ln();
        let expected = expected_idf * (1.0 * 2.2) / (1.0 + 1.2 * (0.25 + 0.75 * 3.0 / 2.5));
        let got = score(&index, 0, &["churn".to_string()], &params);
        assert!((got - expected).abs() < 1e-12);
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let index = index_of(&[("1", "Paperless Billing"), ("2", "fiber optic")]);
        let m = retrieve("PAPERLESS", &index, &Bm25Params::default()).unwrap();
        assert_eq!(m.document.id, "1");
    }
}
