//! External bibliographic capabilities behind async traits.
//!
//! Three seams are defined here:
//!
//! - [`BibliographicSource`]: fetch a raw record by DOI, or search by title
//! - [`RetractionRegistry`]: list retraction notices matching a title
//! - [`BookSource`]: resolve an ISBN to book metadata
//!
//! CrossRef is the primary (rich) source and also serves as the retraction
//! registry. Semantic Scholar is the secondary (fallback) source; arXiv is
//! search-only and Open Library resolves ISBNs. [`MockSource`] implements all
//! three traits for tests.

mod arxiv;
mod crossref;
pub mod mock;
mod openlibrary;
mod semantic;

pub use arxiv::ArxivSource;
pub use crossref::CrossRefSource;
pub use mock::MockSource;
pub use openlibrary::OpenLibrarySource;
pub use semantic::SemanticScholarSource;

use async_trait::async_trait;

use crate::models::{BookInfo, RawRecord, RetractionRecord};

bitflags::bitflags! {
    /// Capabilities that a source can support
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SourceCapabilities: u32 {
        const DOI_LOOKUP = 1 << 0;
        const TITLE_SEARCH = 1 << 1;
    }
}

/// A source of bibliographic records
///
/// Implementors override the lookups named in [`capabilities`]; the rest
/// keep the default `NotImplemented` bodies.
///
/// [`capabilities`]: BibliographicSource::capabilities
#[async_trait]
pub trait BibliographicSource: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g. "crossref")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::TITLE_SEARCH
    }

    fn supports_doi_lookup(&self) -> bool {
        self.capabilities().contains(SourceCapabilities::DOI_LOOKUP)
    }

    fn supports_title_search(&self) -> bool {
        self.capabilities()
            .contains(SourceCapabilities::TITLE_SEARCH)
    }

    /// Fetch the record for a DOI
    async fn get_by_doi(&self, _doi: &str) -> Result<RawRecord, SourceError> {
        Err(SourceError::NotImplemented)
    }

    /// Search works by title, best match first
    async fn search_by_title(
        &self,
        _title: &str,
        _limit: usize,
    ) -> Result<Vec<RawRecord>, SourceError> {
        Err(SourceError::NotImplemented)
    }
}

/// A registry of retraction notices
#[async_trait]
pub trait RetractionRegistry: Send + Sync + std::fmt::Debug {
    /// Retraction notices whose title matches `title`
    async fn search_retracted(&self, title: &str) -> Result<Vec<RetractionRecord>, SourceError>;
}

/// A source of book metadata
#[async_trait]
pub trait BookSource: Send + Sync + std::fmt::Debug {
    /// Resolve a normalized ISBN-10 or ISBN-13
    async fn get_by_isbn(&self, isbn: &str) -> Result<BookInfo, SourceError>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The requested operation is not implemented for this source
    #[error("Operation not implemented for this source")]
    NotImplemented,

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (JSON, Atom)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Work not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// API error from the source
    #[error("API error: {0}")]
    Api(String),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Network(format!("Request timed out: {}", err))
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}

/// Join a base URL and a path without doubling the slash
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
