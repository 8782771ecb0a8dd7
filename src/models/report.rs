//! Output records handed to the CLI or any other caller.
//!
//! Field names here are a stable contract: every caller consumes them as JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{
    BookInfo, CitationStyleReport, DocumentFormat, PaperMetadata, RankedReference, Reference,
    RetractionRecord, VerificationStatus,
};

/// Paper metadata with its references ranked by relevance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPaper {
    pub title: String,
    pub authors: Vec<String>,
    pub year: Option<String>,
    pub doi: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub keywords: Vec<String>,
    pub references: Vec<RankedReference>,
}

impl RankedPaper {
    /// Combine paper fields with an already-ranked reference list
    pub fn new(metadata: PaperMetadata, references: Vec<RankedReference>) -> Self {
        Self {
            title: metadata.title,
            authors: metadata.authors,
            year: metadata.year,
            doi: metadata.doi,
            abstract_text: metadata.abstract_text,
            keywords: metadata.keywords,
            references,
        }
    }
}

/// Result of one verification request
///
/// Either `success` with best-effort fields, or a failure carrying a
/// machine-readable `error_code` and a human-readable `error`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper: Option<RankedPaper>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<BookInfo>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation_style: Option<CitationStyleReport>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_format: Option<DocumentFormat>,

    pub is_retracted: bool,

    pub retraction_info: Vec<RetractionRecord>,
}

impl VerificationReport {
    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_code: Some(code.into()),
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn success() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }
}

/// Outcome of verifying one reference against the search sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCheck {
    /// The reference with its updated verification status
    pub reference: Reference,

    /// Titles returned by each source, keyed by source id
    pub matches: BTreeMap<String, Vec<String>>,

    pub retracted: Vec<RetractionRecord>,
}

/// Tally of verification outcomes across a reference list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationStats {
    pub verified: usize,
    pub unverifiable: usize,
    pub retracted: usize,
    pub pending: usize,
    pub unverifiable_titles: Vec<String>,
}

impl VerificationStats {
    pub fn from_references<'a>(references: impl IntoIterator<Item = &'a Reference>) -> Self {
        let mut stats = Self::default();
        for reference in references {
            match reference.verification_status {
                VerificationStatus::Verified => stats.verified += 1,
                VerificationStatus::Retracted => stats.retracted += 1,
                VerificationStatus::Pending => stats.pending += 1,
                VerificationStatus::Unverifiable => {
                    stats.unverifiable += 1;
                    stats
                        .unverifiable_titles
                        .push(reference.display_text().to_string());
                }
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.verified + self.unverifiable + self.retracted + self.pending
    }
}

/// Per-reference checks for one paper with their tally
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceReport {
    pub checks: Vec<ReferenceCheck>,
    pub stats: VerificationStats,
}

impl ReferenceReport {
    pub fn new(checks: Vec<ReferenceCheck>) -> Self {
        let stats = VerificationStats::from_references(checks.iter().map(|c| &c.reference));
        Self { checks, stats }
    }
}

/// Free-text lookup of a paper across the search sources
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperCheck {
    pub query: String,

    /// Search hits keyed by source id
    pub results: BTreeMap<String, Vec<SearchHit>>,

    pub retracted: Vec<RetractionRecord>,
}

/// Minimal search hit shown for a free-text query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub doi: Option<String>,
    pub year: Option<String>,
}
