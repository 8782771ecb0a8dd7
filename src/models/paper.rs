//! Paper, reference and citation-style models shared by every stage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Format a document's text was extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Detect the format from a file extension (case-insensitive, without the dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "txt" => Some(DocumentFormat::Txt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Txt => "txt",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw text of a document plus the format it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentText {
    pub text: String,
    pub format: DocumentFormat,
}

impl DocumentText {
    pub fn new(text: impl Into<String>, format: DocumentFormat) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }
}

/// Verification state of a single reference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Verified,
    Unverifiable,
    Retracted,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Unverifiable => "unverifiable",
            VerificationStatus::Retracted => "retracted",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of a paper's outgoing reference list
///
/// A reference always carries a non-empty `title` or `raw_unstructured`.
/// `doi`, when present, has passed the DOI syntax check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    /// Ordinal marker (`[3]`, `3.`) or the source's reference key
    pub ordinal_or_key: Option<String>,

    pub doi: Option<String>,

    pub title: String,

    /// Authors in publication order
    pub authors: Vec<String>,

    pub year: Option<String>,

    /// The reference as it appeared in the source, before any structuring
    pub raw_unstructured: Option<String>,

    pub verification_status: VerificationStatus,
}

impl Reference {
    /// Title used when a reference could not be sanitized
    pub const PLACEHOLDER_TITLE: &'static str = "Error processing reference";

    /// Safe stand-in for a reference whose sanitization failed
    pub fn placeholder() -> Self {
        Self {
            title: Self::PLACEHOLDER_TITLE.to_string(),
            ..Self::default()
        }
    }

    /// Text that best describes this reference (title, else the raw entry)
    pub fn display_text(&self) -> &str {
        if !self.title.is_empty() {
            &self.title
        } else {
            self.raw_unstructured.as_deref().unwrap_or("")
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.title == Self::PLACEHOLDER_TITLE
    }
}

/// Canonical metadata for one paper
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperMetadata {
    pub title: String,

    /// Authors in publication order
    pub authors: Vec<String>,

    pub year: Option<String>,

    pub doi: Option<String>,

    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,

    /// Keywords without duplicates, in first-seen order
    pub keywords: Vec<String>,

    /// Extraction order until the ranker reorders them
    pub references: Vec<Reference>,
}

impl PaperMetadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Abstract text, empty when absent
    pub fn abstract_or_empty(&self) -> &str {
        self.abstract_text.as_deref().unwrap_or("")
    }
}

/// A reference annotated with its relevance to the citing paper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedReference {
    #[serde(flatten)]
    pub reference: Reference,

    /// Weighted similarity in `[0, 1]`
    pub similarity_score: f64,

    /// `similarity_score * 100`, rounded to 2 decimal places
    pub similarity_percentage: f64,
}

/// A work listed by the retraction registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetractionRecord {
    pub title: String,
    pub doi: String,
}

/// In-text citation style families, in tie-break order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationStyle {
    NumberedBrackets,
    NumberedParentheses,
    AuthorYear,
    Superscript,
    Unknown,
}

impl CitationStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CitationStyle::NumberedBrackets => "numbered_brackets",
            CitationStyle::NumberedParentheses => "numbered_parentheses",
            CitationStyle::AuthorYear => "author_year",
            CitationStyle::Superscript => "superscript",
            CitationStyle::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CitationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dominant in-text citation style with the per-family counts behind it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationStyleReport {
    pub style: CitationStyle,
    pub count: usize,
    pub all_counts: BTreeMap<CitationStyle, usize>,
}

/// Book metadata resolved from an ISBN
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInfo {
    pub isbn: String,
    pub title: String,
    pub authors: Vec<String>,
    pub publish_date: String,
    pub publisher: String,
}

impl BookInfo {
    /// View the book as paper metadata so it can be rendered as a citation
    pub fn to_metadata(&self) -> PaperMetadata {
        let year = self
            .publish_date
            .split(|c: char| !c.is_ascii_digit())
            .find(|part| part.len() == 4)
            .map(str::to_string);

        PaperMetadata {
            title: self.title.clone(),
            authors: self.authors.clone(),
            year,
            ..PaperMetadata::default()
        }
    }
}
