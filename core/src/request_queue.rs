//! Trailing-window bookkeeping of search requests that found nothing.

use crate::document::{Document, DocumentStatus};
use crate::error::Result;
use crate::index::SearchServer;
use crate::ranking::DocumentPredicate;
use serde::Serialize;
use std::collections::VecDeque;

/// Minutes in a day: one request per minute over the last day.
pub const DEFAULT_WINDOW: usize = 1440;

/// Remembers, for the most recent `window` requests, whether each one came
/// back empty.
#[derive(Debug, Clone)]
pub struct RequestHistory {
    window: usize,
    requests: VecDeque<bool>,
    no_result_requests: usize,
}

impl Default for RequestHistory {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl RequestHistory {
    /// `window` of 0 is treated as 1.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self { window, requests: VecDeque::with_capacity(window), no_result_requests: 0 }
    }

    pub fn record(&mut self, result_count: usize) {
        if self.requests.len() == self.window {
            if let Some(true) = self.requests.pop_front() {
                self.no_result_requests -= 1;
            }
        }
        let empty = result_count == 0;
        if empty {
            self.no_result_requests += 1;
        }
        self.requests.push_back(empty);
    }

    pub fn no_result_requests(&self) -> usize {
        self.no_result_requests
    }

    /// Requests currently inside the window.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn stats(&self) -> HistoryStats {
        HistoryStats { window: self.window, requests: self.len(), no_result_requests: self.no_result_requests }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    pub window: usize,
    pub requests: usize,
    pub no_result_requests: usize,
}

/// Runs searches against a borrowed [`SearchServer`] and records each one in
/// a [`RequestHistory`]. Queries that fail to parse are not recorded.
pub struct RequestQueue<'a> {
    server: &'a SearchServer,
    history: RequestHistory,
}

impl<'a> RequestQueue<'a> {
    pub fn new(server: &'a SearchServer) -> Self {
        Self::with_history(server, RequestHistory::default())
    }

    pub fn with_history(server: &'a SearchServer, history: RequestHistory) -> Self {
        Self { server, history }
    }

    pub fn add_find_request(&mut self, raw_query: &str) -> Result<Vec<Document>> {
        let found = self.server.find_top_documents(raw_query)?;
        self.history.record(found.len());
        Ok(found)
    }

    pub fn add_find_request_by_status(&mut self, raw_query: &str, status: DocumentStatus) -> Result<Vec<Document>> {
        let found = self.server.find_top_documents_by_status(raw_query, status)?;
        self.history.record(found.len());
        Ok(found)
    }

    pub fn add_find_request_with<P: DocumentPredicate>(&mut self, raw_query: &str, predicate: P) -> Result<Vec<Document>> {
        let found = self.server.find_top_documents_with(raw_query, predicate)?;
        self.history.record(found.len());
        Ok(found)
    }

    pub fn no_result_requests(&self) -> usize {
        self.history.no_result_requests()
    }

    pub fn history(&self) -> &RequestHistory {
        &self.history
    }
}
