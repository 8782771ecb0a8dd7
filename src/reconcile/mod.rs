//! Metadata reconciliation across a primary and a secondary source.
//!
//! The primary source is the rich one (structured authors, nested reference
//! list). The secondary only fills gaps, following per-field rules in
//! [`merge_records`]. Either fetch may fail without aborting the other.

mod sanitize;

pub use sanitize::{
    current_year, find_doi, is_valid_doi, normalize_identifier, normalize_isbn,
    sanitize_reference, sanitize_references, sanitize_year, validated_doi, SanitizeError,
    FUTURE_YEAR_SLACK, MIN_YEAR,
};

use std::sync::Arc;

use crate::models::{PaperMetadata, RawRecord};
use crate::sources::{BibliographicSource, SourceError};
use crate::verifier::VerifyError;

/// Merge two raw records for the same work
///
/// Each field is decided on its own:
///
/// - `title`: secondary wins if non-empty and strictly longer (in chars)
/// - `authors`: secondary wins if non-empty and at least as many
/// - `abstract`: secondary fills in only when the primary has none
/// - `year`: secondary wins whenever it has one
/// - `references`: always the primary's
///
/// A missing primary makes the secondary the result, with no references.
pub fn merge_records(primary: Option<RawRecord>, secondary: Option<RawRecord>) -> Option<RawRecord> {
    let (mut merged, secondary) = match (primary, secondary) {
        (Some(primary), Some(secondary)) => (primary, secondary),
        (Some(primary), None) => return Some(primary),
        (None, Some(mut secondary)) => {
            secondary.references.clear();
            return Some(secondary);
        }
        (None, None) => return None,
    };

    if !secondary.title.is_empty()
        && secondary.title.chars().count() > merged.title.chars().count()
    {
        merged.title = secondary.title;
    }

    if !secondary.authors.is_empty() && secondary.authors.len() >= merged.authors.len() {
        merged.authors = secondary.authors;
    }

    if merged.abstract_text.is_empty() && !secondary.abstract_text.is_empty() {
        merged.abstract_text = secondary.abstract_text;
    }

    // Unlike title and authors, a secondary year always overrides, even when
    // the primary already had one. Kept as-is; it may be unintentional.
    if !secondary.year.is_empty() {
        merged.year = secondary.year;
    }

    Some(merged)
}

/// Convert a merged record into paper metadata, sanitizing its references
///
/// The DOI comes only from the requested identifier, and only when it passes
/// the syntax check.
pub fn into_metadata(record: RawRecord, identifier: &str, current_year: i32) -> PaperMetadata {
    let references = sanitize_references(&record.references, current_year);
    let non_empty = |s: String| {
        let s = s.trim().to_string();
        (!s.is_empty()).then_some(s)
    };

    PaperMetadata {
        title: record.title.trim().to_string(),
        authors: record.authors,
        year: non_empty(record.year),
        doi: validated_doi(identifier),
        abstract_text: non_empty(record.abstract_text),
        keywords: Vec::new(),
        references,
    }
}

/// Resolves an identifier against a primary and a secondary source
#[derive(Debug, Clone)]
pub struct Reconciler {
    primary: Arc<dyn BibliographicSource>,
    secondary: Arc<dyn BibliographicSource>,
}

impl Reconciler {
    pub fn new(
        primary: Arc<dyn BibliographicSource>,
        secondary: Arc<dyn BibliographicSource>,
    ) -> Self {
        Self { primary, secondary }
    }

    pub fn primary(&self) -> &Arc<dyn BibliographicSource> {
        &self.primary
    }

    /// Reconcile `identifier` using today's year for reference sanitization
    pub async fn reconcile(&self, identifier: &str) -> Result<PaperMetadata, VerifyError> {
        self.reconcile_at(identifier, current_year()).await
    }

    /// Reconcile `identifier` with an explicit current year
    pub async fn reconcile_at(
        &self,
        identifier: &str,
        current_year: i32,
    ) -> Result<PaperMetadata, VerifyError> {
        let id = normalize_identifier(identifier);
        if id.is_empty() {
            return Err(VerifyError::MalformedIdentifier("empty identifier".to_string()));
        }
        if !is_valid_doi(&id) {
            tracing::warn!(identifier = %id, "Identifier fails DOI syntax check, querying anyway");
        }

        let (primary, secondary) = tokio::join!(
            self.primary.get_by_doi(&id),
            self.secondary.get_by_doi(&id)
        );

        let unavailable = matches!(
            (&primary, &secondary),
            (Err(a), Err(b)) if is_transport_error(a) && is_transport_error(b)
        );

        let primary = Self::degrade(self.primary.as_ref(), primary);
        let secondary = Self::degrade(self.secondary.as_ref(), secondary);

        match merge_records(primary, secondary) {
            Some(record) => Ok(into_metadata(record, &id, current_year)),
            None if !is_valid_doi(&id) => Err(VerifyError::MalformedIdentifier(id)),
            None if unavailable => Err(VerifyError::SourceUnavailable(id)),
            None => Err(VerifyError::PaperNotFound(id)),
        }
    }

    /// Treat a failed fetch as "no data from that source"
    fn degrade(
        source: &dyn BibliographicSource,
        result: Result<RawRecord, SourceError>,
    ) -> Option<RawRecord> {
        match result {
            Ok(record) => Some(record),
            Err(SourceError::NotFound(_)) => {
                tracing::debug!(source = source.id(), "Work not found");
                None
            }
            Err(e) => {
                tracing::warn!(source = source.id(), error = %e, "Fetch failed, continuing without it");
                None
            }
        }
    }
}

/// Errors that say nothing about whether the work exists
pub(crate) fn is_transport_error(err: &SourceError) -> bool {
    matches!(
        err,
        SourceError::Network(_) | SourceError::RateLimit | SourceError::Api(_)
    )
}
