use crate::error::{Result, SearchError};
use crate::stop_words::StopWords;
use crate::tokenizer::{is_valid_word, tokenize};
use std::collections::BTreeSet;

/// A parsed query: words a result must contain and words it must not.
///
/// The same literal word may land in both sets; ranking and matching then
/// treat it as excluded, since exclusion is always applied last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub plus_words: BTreeSet<String>,
    pub minus_words: BTreeSet<String>,
}

/// One classified query word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryWord<'a> {
    pub data: &'a str,
    pub is_minus: bool,
    pub is_stop: bool,
}

pub fn parse_query_word<'a>(word: &'a str, stop_words: &StopWords) -> Result<QueryWord<'a>> {
    if word.is_empty() {
        return Err(SearchError::EmptyQueryWord);
    }
    let (data, is_minus) = match word.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (word, false),
    };
    if data.is_empty() {
        return Err(SearchError::EmptyQueryWord);
    }
    if data.starts_with('-') {
        return Err(SearchError::DoubleMinus(word.to_string()));
    }
    if !is_valid_word(data) {
        return Err(SearchError::InvalidCharacters(word.to_string()));
    }
    Ok(QueryWord { data, is_minus, is_stop: stop_words.contains(data) })
}

impl Query {
    pub fn parse(raw_query: &str, stop_words: &StopWords) -> Result<Self> {
        let mut query = Query::default();
        for word in tokenize(raw_query) {
            let word = parse_query_word(word, stop_words)?;
            if word.is_stop {
                continue;
            }
            if word.is_minus {
                query.minus_words.insert(word.data.to_string());
            } else {
                query.plus_words.insert(word.data.to_string());
            }
        }
        Ok(query)
    }

    pub fn is_empty(&self) -> bool {
        self.plus_words.is_empty() && self.minus_words.is_empty()
    }
}
