//! Mock source for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::{BookInfo, RawRecord, RetractionRecord};
use crate::sources::{
    BibliographicSource, BookSource, RetractionRegistry, SourceCapabilities, SourceError,
};

/// A mock source that returns predefined responses.
///
/// Implements every source trait, so one instance can stand in for the
/// primary, secondary, retraction registry or book source.
#[derive(Debug, Default)]
pub struct MockSource {
    id: String,
    records: HashMap<String, RawRecord>,
    search_results: Vec<RawRecord>,
    retractions: Vec<RetractionRecord>,
    books: HashMap<String, BookInfo>,
    failing: bool,
    capabilities: Option<SourceCapabilities>,
    calls: Mutex<Vec<String>>,
}

impl MockSource {
    /// Create a new mock source with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Return `record` for lookups of `doi`.
    pub fn with_record(mut self, doi: impl Into<String>, record: RawRecord) -> Self {
        self.records.insert(doi.into(), record);
        self
    }

    /// Return `records` for every title search.
    pub fn with_search_results(mut self, records: Vec<RawRecord>) -> Self {
        self.search_results = records;
        self
    }

    /// Return `records` for every retraction search.
    pub fn with_retractions(mut self, records: Vec<RetractionRecord>) -> Self {
        self.retractions = records;
        self
    }

    /// Return `book` for lookups of its ISBN.
    pub fn with_book(mut self, book: BookInfo) -> Self {
        self.books.insert(book.isbn.clone(), book);
        self
    }

    /// Advertise only `capabilities` instead of every lookup.
    pub fn with_capabilities(mut self, capabilities: SourceCapabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Fail every call with a network error.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Every call made so far, as `operation:argument`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record_call(&self, operation: &str, argument: &str) -> Result<(), SourceError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(format!("{}:{}", operation, argument));
        }
        if self.failing {
            return Err(SourceError::Network(format!("{} is unavailable", self.id)));
        }
        Ok(())
    }
}

#[async_trait]
impl BibliographicSource for MockSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    fn capabilities(&self) -> SourceCapabilities {
        self.capabilities
            .unwrap_or(SourceCapabilities::DOI_LOOKUP | SourceCapabilities::TITLE_SEARCH)
    }

    async fn get_by_doi(&self, doi: &str) -> Result<RawRecord, SourceError> {
        self.record_call("doi", doi)?;
        self.records
            .get(doi)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(doi.to_string()))
    }

    async fn search_by_title(
        &self,
        title: &str,
        limit: usize,
    ) -> Result<Vec<RawRecord>, SourceError> {
        self.record_call("search", title)?;
        Ok(self.search_results.iter().take(limit).cloned().collect())
    }
}

#[async_trait]
impl RetractionRegistry for MockSource {
    async fn search_retracted(&self, title: &str) -> Result<Vec<RetractionRecord>, SourceError> {
        self.record_call("retracted", title)?;
        Ok(self.retractions.clone())
    }
}

#[async_trait]
impl BookSource for MockSource {
    async fn get_by_isbn(&self, isbn: &str) -> Result<BookInfo, SourceError> {
        self.record_call("isbn", isbn)?;
        self.books
            .get(isbn)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(isbn.to_string()))
    }
}
