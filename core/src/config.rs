use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_RESULT_COUNT: usize = 5;
pub const DEFAULT_RELEVANCE_EPSILON: f64 = 1e-6;

/// Construction-time settings of a [`crate::SearchServer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Upper bound on the number of documents a ranked search returns.
    pub max_result_count: usize,
    /// Relevances closer than this are ranked as ties and ordered by rating.
    pub relevance_epsilon: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_result_count: DEFAULT_MAX_RESULT_COUNT, relevance_epsilon: DEFAULT_RELEVANCE_EPSILON }
    }
}

impl SearchConfig {
    /// A `max_result_count` of 0 is treated as 1.
    pub fn with_max_result_count(mut self, max_result_count: usize) -> Self {
        self.max_result_count = max_result_count.max(1);
        self
    }
}
