//! In-memory TF-IDF document search.
//!
//! Documents are ingested into a [`SearchServer`], which keeps an inverted
//! index of term frequencies alongside per-document rating and status.
//! Queries support required ("plus") and excluded ("minus", prefixed with
//! `-`) words and are ranked by TF-IDF relevance, with near-equal relevance
//! broken by rating.

pub mod config;
pub mod document;
pub mod error;
pub mod index;
pub mod matching;
pub mod paginate;
pub mod query;
pub mod ranking;
pub mod request_queue;
pub mod source;
pub mod stop_words;
pub mod tokenizer;

pub use config::SearchConfig;
pub use document::{Document, DocumentId, DocumentStatus};
pub use error::{Result, SearchError};
pub use index::SearchServer;
pub use paginate::{paginate, Paginator};
pub use query::Query;
pub use ranking::DocumentPredicate;
pub use request_queue::{RequestHistory, RequestQueue};
pub use stop_words::StopWords;
