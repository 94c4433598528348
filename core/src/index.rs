use crate::config::SearchConfig;
use crate::document::{compute_average_rating, DocumentData, DocumentId, DocumentStatus};
use crate::error::{Result, SearchError};
use crate::stop_words::StopWords;
use crate::tokenizer::{is_valid_word, tokenize};
use std::collections::{BTreeMap, HashMap};

/// The search index: term postings plus the document table.
///
/// All mutation goes through [`SearchServer::add_document`], which validates
/// its input before touching any container.
#[derive(Debug, Clone, Default)]
pub struct SearchServer {
    pub(crate) stop_words: StopWords,
    pub(crate) config: SearchConfig,
    /// term -> document -> term frequency
    pub(crate) word_to_document_freqs: HashMap<String, BTreeMap<DocumentId, f64>>,
    /// document -> term -> term frequency
    pub(crate) document_to_word_freqs: HashMap<DocumentId, BTreeMap<String, f64>>,
    pub(crate) documents: HashMap<DocumentId, DocumentData>,
    /// insertion order
    pub(crate) document_ids: Vec<DocumentId>,
}

impl SearchServer {
    pub fn new(stop_words: StopWords) -> Self {
        Self::with_config(stop_words, SearchConfig::default())
    }

    /// A `max_result_count` of 0 is treated as 1.
    pub fn with_config(stop_words: StopWords, mut config: SearchConfig) -> Self {
        config.max_result_count = config.max_result_count.max(1);
        Self { stop_words, config, ..Self::default() }
    }

    /// Shorthand for `SearchServer::new(StopWords::from_text(stop_words)?)`.
    pub fn from_stop_words_text(stop_words: &str) -> Result<Self> {
        Ok(Self::new(StopWords::from_text(stop_words)?))
    }

    /// Checks that [`SearchServer::add_document`] would accept this id and
    /// text, without changing the index.
    pub fn check_document(&self, document_id: DocumentId, document: &str) -> Result<()> {
        if document_id < 0 {
            return Err(SearchError::InvalidDocumentId(document_id));
        }
        if self.documents.contains_key(&document_id) {
            return Err(SearchError::DuplicateDocumentId(document_id));
        }
        if !is_valid_word(document) {
            return Err(SearchError::InvalidCharacters(document.to_string()));
        }
        Ok(())
    }

    pub fn add_document(&mut self, document_id: DocumentId, document: &str, status: DocumentStatus, ratings: &[i32]) -> Result<()> {
        self.check_document(document_id, document)?;

        let words = self.split_into_words_no_stop(document);
        let mut freqs: BTreeMap<String, f64> = BTreeMap::new();
        if !words.is_empty() {
            let inv_word_count = 1.0 / words.len() as f64;
            for word in words {
                *freqs.entry(word.to_string()).or_insert(0.0) += inv_word_count;
            }
        }
        for (word, tf) in &freqs {
            self.word_to_document_freqs.entry(word.clone()).or_default().insert(document_id, *tf);
        }
        self.document_to_word_freqs.insert(document_id, freqs);
        self.documents.insert(document_id, DocumentData { rating: compute_average_rating(ratings), status });
        self.document_ids.push(document_id);
        Ok(())
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn document_id_at(&self, position: usize) -> Result<DocumentId> {
        self.document_ids
            .get(position)
            .copied()
            .ok_or(SearchError::PositionOutOfRange { position, count: self.document_ids.len() })
    }

    /// Document ids in insertion order.
    pub fn document_ids(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.document_ids.iter().copied()
    }

    pub fn document(&self, document_id: DocumentId) -> Option<&DocumentData> {
        self.documents.get(&document_id)
    }

    /// Term frequencies of one document, keyed by term. Empty for a document
    /// made only of stop words; `None` for an unknown id.
    pub fn word_frequencies(&self, document_id: DocumentId) -> Option<&BTreeMap<String, f64>> {
        self.document_to_word_freqs.get(&document_id)
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn split_into_words_no_stop<'a>(&self, text: &'a str) -> Vec<&'a str> {
        tokenize(text).into_iter().filter(|w| !self.stop_words.contains(w)).collect()
    }
}
