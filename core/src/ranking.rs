//! TF-IDF ranking over the inverted index.

use crate::document::{Document, DocumentId, DocumentStatus};
use crate::error::Result;
use crate::index::SearchServer;
use crate::query::Query;
use std::collections::BTreeMap;

/// Decides whether a document may appear in ranked results.
pub trait DocumentPredicate {
    fn matches(&self, document_id: DocumentId, status: DocumentStatus, rating: i32) -> bool;
}

impl<F> DocumentPredicate for F
where
    F: Fn(DocumentId, DocumentStatus, i32) -> bool,
{
    fn matches(&self, document_id: DocumentId, status: DocumentStatus, rating: i32) -> bool {
        self(document_id, status, rating)
    }
}

/// Predicate accepting only documents with the given status.
pub fn with_status(status: DocumentStatus) -> impl Fn(DocumentId, DocumentStatus, i32) -> bool {
    move |_, document_status, _| document_status == status
}

impl SearchServer {
    /// Top documents with status `ACTUAL`.
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_by_status(raw_query, DocumentStatus::Actual)
    }

    pub fn find_top_documents_by_status(&self, raw_query: &str, status: DocumentStatus) -> Result<Vec<Document>> {
        self.find_top_documents_with(raw_query, with_status(status))
    }

    /// Ranks documents accepted by `predicate`, most relevant first, capped at
    /// the configured result count.
    pub fn find_top_documents_with<P: DocumentPredicate>(&self, raw_query: &str, predicate: P) -> Result<Vec<Document>> {
        let query = Query::parse(raw_query, &self.stop_words)?;
        let mut matched = self.find_all_documents(&query, &predicate);
        sort_by_relevance(&mut matched, self.config.relevance_epsilon);
        matched.truncate(self.config.max_result_count);
        Ok(matched)
    }

    fn find_all_documents<P: DocumentPredicate>(&self, query: &Query, predicate: &P) -> Vec<Document> {
        let mut document_to_relevance: BTreeMap<DocumentId, f64> = BTreeMap::new();
        for word in &query.plus_words {
            let Some(postings) = self.word_to_document_freqs.get(word) else { continue };
            let idf = self.compute_inverse_document_freq(postings.len());
            for (&document_id, &term_freq) in postings {
                let Some(data) = self.documents.get(&document_id) else { continue };
                if predicate.matches(document_id, data.status, data.rating) {
                    *document_to_relevance.entry(document_id).or_insert(0.0) += term_freq * idf;
                }
            }
        }

        for word in &query.minus_words {
            let Some(postings) = self.word_to_document_freqs.get(word) else { continue };
            for document_id in postings.keys() {
                document_to_relevance.remove(document_id);
            }
        }

        document_to_relevance
            .into_iter()
            .filter_map(|(id, relevance)| self.documents.get(&id).map(|data| Document::new(id, relevance, data.rating)))
            .collect()
    }

    fn compute_inverse_document_freq(&self, documents_with_word: usize) -> f64 {
        (self.document_count() as f64 / documents_with_word as f64).ln()
    }
}

/// Relevance descending. Documents whose relevances are within `epsilon` of
/// each other count as tied and are ordered by rating descending.
pub(crate) fn sort_by_relevance(documents: &mut [Document], epsilon: f64) {
    documents.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));

    // Rating order inside runs anchored at each run's first document.
    let mut start = 0;
    while start < documents.len() {
        let head = documents[start].relevance;
        let end = documents[start..]
            .iter()
            .position(|d| head - d.relevance > epsilon)
            .map_or(documents.len(), |offset| start + offset.max(1));
        documents[start..end].sort_by(|a, b| b.rating.cmp(&a.rating));
        start = end;
    }

    // Near-ties that straddle a run boundary: move each document left past
    // tied predecessors with a lower rating.
    for i in 1..documents.len() {
        let mut j = i;
        while j > 0 {
            let (prev, cur) = (documents[j - 1], documents[j]);
            if (prev.relevance - cur.relevance).abs() > epsilon || prev.rating >= cur.rating {
                break;
            }
            documents.swap(j - 1, j);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::stop_words::StopWords;

    fn ids(docs: &[Document]) -> Vec<DocumentId> {
        docs.iter().map(|d| d.id).collect()
    }

    fn pets() -> SearchServer {
        let mut s = SearchServer::from_stop_words_text("and in at").unwrap();
        s.add_document(1, "curly cat curly tail", DocumentStatus::Actual, &[7, 2, 7]).unwrap();
        s.add_document(2, "curly dog and fancy collar", DocumentStatus::Actual, &[1, 2, 3]).unwrap();
        s.add_document(3, "big cat fancy collar", DocumentStatus::Actual, &[1, 2, 8]).unwrap();
        s.add_document(4, "big dog sparrow Eugene", DocumentStatus::Actual, &[1, 3, 2]).unwrap();
        s.add_document(5, "big dog sparrow Vasiliy", DocumentStatus::Actual, &[1, 1, 1]).unwrap();
        s
    }

    #[test]
    fn scores_with_tf_idf() {
        let s = pets();
        let found = s.find_top_documents("curly").unwrap();
        assert_eq!(ids(&found), vec![1, 2]);
        let idf = (5.0f64 / 2.0).ln();
        assert!((found[0].relevance - 0.5 * idf).abs() < 1e-12);
        assert!((found[1].relevance - 0.25 * idf).abs() < 1e-12);
    }

    #[test]
    fn ties_are_broken_by_rating() {
        let s = pets();
        let found = s.find_top_documents("big dog").unwrap();
        assert_eq!(ids(&found), vec![4, 5, 3, 2]);
        assert_eq!(found[0].relevance, found[1].relevance);
    }

    #[test]
    fn minus_words_exclude_documents() {
        let s = pets();
        assert_eq!(ids(&s.find_top_documents("big dog -sparrow").unwrap()), vec![3, 2]);
        assert!(s.find_top_documents("-dog").unwrap().is_empty());
        assert!(s.find_top_documents("dog -dog").unwrap().is_empty());
    }

    #[test]
    fn unknown_words_are_skipped() {
        let s = pets();
        assert!(s.find_top_documents("empty request").unwrap().is_empty());
        assert_eq!(ids(&s.find_top_documents("cat -unicorn").unwrap()), vec![1, 3]);
    }

    #[test]
    fn filters_by_status_and_predicate() {
        let mut s = pets();
        s.add_document(6, "big parrot", DocumentStatus::Banned, &[9]).unwrap();
        assert!(!ids(&s.find_top_documents("big").unwrap()).contains(&6));
        assert_eq!(ids(&s.find_top_documents_by_status("big", DocumentStatus::Banned).unwrap()), vec![6]);
        let even = s.find_top_documents_with("big curly", |id: DocumentId, _: DocumentStatus, _: i32| id % 2 == 0).unwrap();
        assert_eq!(ids(&even), vec![2, 6, 4]);
        let rated = s.find_top_documents_with("big", |_: DocumentId, _: DocumentStatus, rating: i32| rating >= 3).unwrap();
        assert_eq!(ids(&rated), vec![6, 3]);
    }

    #[test]
    fn results_are_capped() {
        let mut s = SearchServer::new(StopWords::new());
        for id in 0..10 {
            s.add_document(id, "same words here", DocumentStatus::Actual, &[id]).unwrap();
        }
        s.add_document(10, "unrelated", DocumentStatus::Actual, &[]).unwrap();
        let found = s.find_top_documents("words").unwrap();
        assert_eq!(ids(&found), vec![9, 8, 7, 6, 5]);

        let mut wide = SearchServer::with_config(StopWords::new(), SearchConfig::default().with_max_result_count(8));
        for id in 0..10 {
            wide.add_document(id, "same words here", DocumentStatus::Actual, &[id]).unwrap();
        }
        wide.add_document(10, "unrelated", DocumentStatus::Actual, &[]).unwrap();
        assert_eq!(wide.find_top_documents("words").unwrap().len(), 8);
    }

    #[test]
    fn propagates_parse_errors() {
        let s = pets();
        assert!(s.find_top_documents("cat --dog").is_err());
        assert!(s.find_top_documents("cat -").is_err());
    }

    #[test]
    fn sort_treats_near_equal_relevance_as_tie() {
        let mut docs = vec![
            Document::new(1, 0.5, 1),
            Document::new(2, 0.5 + 1e-7, 0),
            Document::new(3, 0.5 - 2e-7, 9),
            Document::new(4, 0.9, -1),
            Document::new(5, 0.1, 100),
        ];
        sort_by_relevance(&mut docs, 1e-6);
        assert_eq!(ids(&docs), vec![4, 3, 1, 2, 5]);
    }

    #[test]
    fn sort_orders_near_tie_chain_by_rating() {
        let mut docs = vec![
            Document::new(1, 1.0, 5),
            Document::new(2, 1.0 - 0.9e-6, 0),
            Document::new(3, 1.0 - 1.1e-6, 10),
        ];
        sort_by_relevance(&mut docs, 1e-6);
        assert_eq!(ids(&docs), vec![1, 3, 2]);
        for (i, a) in docs.iter().enumerate() {
            for b in &docs[i + 1..] {
                let tied = (a.relevance - b.relevance).abs() <= 1e-6;
                assert!(a.relevance > b.relevance + 1e-6 || (tied && a.rating >= b.rating), "{a} before {b}");
            }
        }
    }

    #[test]
    fn sort_keeps_equal_ratings_stable() {
        let mut docs = vec![Document::new(1, 0.3, 2), Document::new(2, 0.3, 2), Document::new(3, 0.3, 2)];
        sort_by_relevance(&mut docs, 1e-6);
        assert_eq!(ids(&docs), vec![1, 2, 3]);
    }
}
