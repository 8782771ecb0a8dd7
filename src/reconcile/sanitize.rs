//! Identifier normalization and per-reference sanitization.
//!
//! Nothing in here rejects a whole record: a bad DOI or year is cleared, and a
//! reference that cannot be salvaged becomes a placeholder.

use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{RawReference, Reference, VerificationStatus};

/// Earliest publication year accepted on a reference
pub const MIN_YEAR: i32 = 1800;

/// How far past the current year a reference year may point
pub const FUTURE_YEAR_SLACK: i32 = 5;

static DOI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^10\.\d{4,9}/[-._;()/:A-Z0-9]+$").unwrap());

static DOI_IN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b10\.\d{4,9}/[-._;()/:A-Z0-9]+").unwrap());

static RESOLVER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:https?://(?:dx\.)?doi\.org/|doi:\s*)").unwrap());

static ISBN_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^isbn(?:-1[03])?:?\s*").unwrap());

/// Reasons a single reference cannot be trusted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanitizeError {
    #[error("reference has neither a title nor unstructured text")]
    Empty,
}

/// Strip a resolver URL prefix and surrounding whitespace
pub fn normalize_identifier(identifier: &str) -> String {
    let trimmed = identifier.trim();
    RESOLVER_PREFIX.replace(trimmed, "").trim().to_string()
}

pub fn is_valid_doi(doi: &str) -> bool {
    DOI.is_match(doi)
}

/// The trimmed DOI if it passes the syntax check
pub fn validated_doi(doi: &str) -> Option<String> {
    let doi = doi.trim();
    is_valid_doi(doi).then(|| doi.to_string())
}

/// First syntactically valid DOI mentioned anywhere in `text`
pub fn find_doi(text: &str) -> Option<String> {
    DOI_IN_TEXT
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':']))
        .find_map(validated_doi)
}

/// Remove hyphens and spaces; accept 10 chars (final `X` allowed) or 13 digits
pub fn normalize_isbn(isbn: &str) -> Option<String> {
    let stripped = ISBN_PREFIX.replace(isbn.trim(), "");
    let isbn: String = stripped
        .chars()
        .filter(|c| !matches!(c, '-' | ' '))
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let valid = match isbn.chars().count() {
        10 => isbn
            .chars()
            .enumerate()
            .all(|(i, c)| c.is_ascii_digit() || (i == 9 && c == 'X')),
        13 => isbn.chars().all(|c| c.is_ascii_digit()),
        _ => false,
    };

    valid.then_some(isbn)
}

pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// Keep `year` only if it is an integer in `MIN_YEAR..=current_year + 5`
pub fn sanitize_year(year: &str, current_year: i32) -> Option<String> {
    let parsed: i32 = year.trim().parse().ok()?;
    (MIN_YEAR..=current_year + FUTURE_YEAR_SLACK)
        .contains(&parsed)
        .then(|| parsed.to_string())
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Turn one untrusted raw reference into a [`Reference`]
///
/// The title prefers the article title and falls back to the unstructured text.
pub fn sanitize_reference(
    raw: &RawReference,
    current_year: i32,
) -> Result<Reference, SanitizeError> {
    let unstructured = non_empty(&raw.unstructured);
    let title = non_empty(&raw.article_title)
        .or_else(|| unstructured.clone())
        .ok_or(SanitizeError::Empty)?;

    Ok(Reference {
        ordinal_or_key: non_empty(&raw.key),
        doi: validated_doi(&raw.doi),
        title,
        authors: raw.authors.to_list(),
        year: sanitize_year(&raw.year, current_year),
        raw_unstructured: unstructured,
        verification_status: VerificationStatus::Pending,
    })
}

/// Sanitize each reference independently; failures become placeholders
pub fn sanitize_references(raws: &[RawReference], current_year: i32) -> Vec<Reference> {
    raws.iter()
        .enumerate()
        .map(|(index, raw)| {
            sanitize_reference(raw, current_year).unwrap_or_else(|e| {
                tracing::warn!(index, key = %raw.key, error = %e, "Replacing reference with placeholder");
                Reference::placeholder()
            })
        })
        .collect()
}
