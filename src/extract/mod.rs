//! Structural extraction from raw document text.
//!
//! Recovers the reference list ([`references`]), front-matter metadata
//! ([`metadata`]) and the dominant in-text citation style ([`style`]). Every
//! heuristic is a pure function over the text; a heuristic that finds nothing
//! leaves its field empty.

pub mod metadata;
pub mod references;
pub mod style;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ExtractionConfig;
use crate::models::{CitationStyleReport, DocumentText, PaperMetadata, Reference};
use crate::reconcile::{find_doi, sanitize_year};

pub use metadata::{extract_metadata, ExtractedMetadata};
pub use references::extract_references;
pub use style::detect_citation_style;

static LEADING_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:\[(\d{1,3})\]|(\d{1,3})\.\s)").unwrap());

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(1[89]\d{2}|2\d{3})\b").unwrap());

/// Everything the extractor recovers from one document
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralExtraction {
    /// Metadata fields with `references` built from the raw entries
    pub metadata: PaperMetadata,

    /// Normalized reference entries in extraction order
    pub raw_references: Vec<String>,

    pub citation_style: CitationStyleReport,
}

/// Run every extraction heuristic over `document`
pub fn extract_structure(
    document: &DocumentText,
    config: &ExtractionConfig,
    current_year: i32,
) -> StructuralExtraction {
    let text = document.text.as_str();

    let raw_references = extract_references(text);
    let fields = extract_metadata(text, config);
    let citation_style = detect_citation_style(text);

    let references = raw_references
        .iter()
        .map(|entry| reference_from_entry(entry, current_year))
        .collect();

    tracing::debug!(
        format = %document.format,
        references = raw_references.len(),
        title_found = fields.title.is_some(),
        style = %citation_style.style,
        "Structural extraction finished"
    );

    StructuralExtraction {
        metadata: PaperMetadata {
            title: fields.title.unwrap_or_default(),
            authors: fields.authors,
            year: None,
            doi: find_doi(text),
            abstract_text: fields.abstract_text,
            keywords: fields.keywords,
            references,
        },
        raw_references,
        citation_style,
    }
}

/// Build a [`Reference`] from one extracted entry
///
/// The entry text is both title and raw form. The leading `[n]` or `n.`
/// marker becomes the ordinal; a DOI or a plausible year in the text is kept.
pub fn reference_from_entry(entry: &str, current_year: i32) -> Reference {
    let ordinal_or_key = LEADING_MARKER
        .captures(entry)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string());

    let year = YEAR
        .find_iter(entry)
        .find_map(|m| sanitize_year(m.as_str(), current_year));

    Reference {
        ordinal_or_key,
        doi: find_doi(entry),
        title: entry.to_string(),
        year,
        raw_unstructured: Some(entry.to_string()),
        ..Reference::default()
    }
}

/// `entry` without its leading `[n]` or `n.` marker
pub fn strip_leading_marker(entry: &str) -> &str {
    match LEADING_MARKER.find(entry) {
        Some(marker) => entry[marker.end()..].trim_start(),
        None => entry.trim_start(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CitationStyle, DocumentFormat, VerificationStatus};

    fn document(text: &str) -> DocumentText {
        DocumentText::new(text, DocumentFormat::Txt)
    }

    #[test]
    fn test_reference_from_bracketed_entry() {
        let reference = reference_from_entry(
            "[12] Smith, J. Deep things. 2019. doi:10.1000/xyz123.",
            2024,
        );
        assert_eq!(reference.ordinal_or_key.as_deref(), Some("12"));
        assert_eq!(reference.doi.as_deref(), Some("10.1000/xyz123"));
        assert_eq!(reference.year.as_deref(), Some("2019"));
        assert_eq!(reference.title, reference.raw_unstructured.clone().unwrap());
        assert_eq!(reference.verification_status, VerificationStatus::Pending);
    }

    #[test]
    fn test_reference_from_period_entry_skips_future_year() {
        let reference = reference_from_entry("3. Doe, K. Time travel, 2999 and 2015.", 2024);
        assert_eq!(reference.ordinal_or_key.as_deref(), Some("3"));
        assert_eq!(reference.year.as_deref(), Some("2015"));
        assert!(reference.doi.is_none());
    }

    #[test]
    fn test_reference_without_marker() {
        let reference = reference_from_entry("Smith, J. (2019). A long title here.", 2024);
        assert!(reference.ordinal_or_key.is_none());
        assert_eq!(reference.year.as_deref(), Some("2019"));
    }

    #[test]
    fn test_extract_structure_bracketed_document() {
        let doc = document("References\n[1] Smith, J. Title A.\n[2] Doe, K. Title B.\n");
        let extraction = extract_structure(&doc, &ExtractionConfig::default(), 2024);

        // "[2] Doe, K. Title B." is under the noise floor; the author-year
        // pass contributes the second entry
        assert_eq!(
            extraction.raw_references,
            vec!["[1] Smith, J. Title A.", "Smith, J. Title A. [2]"]
        );
        assert_eq!(extraction.metadata.references.len(), 2);
        assert_eq!(extraction.citation_style.style, CitationStyle::NumberedBrackets);
        assert!(extraction.citation_style.count >= 1);
    }

    #[test]
    fn test_strip_leading_marker() {
        assert_eq!(strip_leading_marker("[12] Smith, J. Title."), "Smith, J. Title.");
        assert_eq!(strip_leading_marker("3. Doe, K. Title."), "Doe, K. Title.");
        assert_eq!(strip_leading_marker("Roe, R. 3.5 percent."), "Roe, R. 3.5 percent.");
    }

    #[test]
    fn test_extract_structure_finds_doi_in_text() {
        let doc = document("A Paper\n\nDOI: 10.5555/abc.def\n\nBody.");
        let extraction = extract_structure(&doc, &ExtractionConfig::default(), 2024);
        assert_eq!(extraction.metadata.doi.as_deref(), Some("10.5555/abc.def"));
    }

    #[test]
    fn test_extract_structure_empty_text() {
        let extraction = extract_structure(&document(""), &ExtractionConfig::default(), 2024);
        assert!(extraction.raw_references.is_empty());
        assert!(extraction.metadata.title.is_empty());
        assert_eq!(extraction.citation_style.style, CitationStyle::Unknown);
    }
}
