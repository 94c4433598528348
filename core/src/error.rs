use crate::document::DocumentId;

pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors surfaced by the search engine. Nothing is retried or partially
/// applied: a failed call leaves the index exactly as it was.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("invalid document id: {0}")]
    InvalidDocumentId(DocumentId),
    #[error("document already exists: {0}")]
    DuplicateDocumentId(DocumentId),
    #[error("control characters are not allowed: {0:?}")]
    InvalidCharacters(String),
    #[error("empty query word")]
    EmptyQueryWord,
    #[error("double minus in query word: {0:?}")]
    DoubleMinus(String),
    #[error("position {position} is out of range for {count} documents")]
    PositionOutOfRange { position: usize, count: usize },
    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),
}

impl SearchError {
    /// True for failures caused by malformed client input (bad text or
    /// query), as opposed to lookups of something that is not there.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SearchError::InvalidDocumentId(_)
                | SearchError::InvalidCharacters(_)
                | SearchError::EmptyQueryWord
                | SearchError::DoubleMinus(_)
        )
    }
}
