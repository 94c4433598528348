use crate::document::{DocumentId, DocumentStatus};
use crate::error::{Result, SearchError};
use crate::index::SearchServer;
use crate::query::Query;

impl SearchServer {
    /// Plus words of `raw_query` found in the document, in lexicographic
    /// order, together with the document's status. Any matching minus word
    /// empties the list.
    pub fn match_document(&self, raw_query: &str, document_id: DocumentId) -> Result<(Vec<String>, DocumentStatus)> {
        let query = Query::parse(raw_query, &self.stop_words)?;
        let data = self.documents.get(&document_id).ok_or(SearchError::DocumentNotFound(document_id))?;

        let contains = |word: &str| {
            self.word_to_document_freqs
                .get(word)
                .is_some_and(|postings| postings.contains_key(&document_id))
        };

        if query.minus_words.iter().any(|w| contains(w.as_str())) {
            return Ok((Vec::new(), data.status));
        }
        let matched_words: Vec<String> = query.plus_words.iter().filter(|w| contains(w.as_str())).cloned().collect();
        Ok((matched_words, data.status))
    }
}
