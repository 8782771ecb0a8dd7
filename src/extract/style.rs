//! Dominant in-text citation style detection.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use crate::models::{CitationStyle, CitationStyleReport};

static NUMBERED_BRACKETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\d+(?:\s*[,\-–]\s*\d+)*\]").unwrap());

static NUMBERED_PARENTHESES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\d{1,3}(?:\s*[,\-–]\s*\d{1,3})*\)").unwrap());

static AUTHOR_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\([A-Z][A-Za-z'\-]+(?:\s+et\s+al\.)?,\s*\d{4}[a-z]?\)").unwrap()
});

static SUPERSCRIPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]\d{1,3}\b").unwrap());

/// Families in tie-break order
static FAMILIES: [(CitationStyle, &Lazy<Regex>); 4] = [
    (CitationStyle::NumberedBrackets, &NUMBERED_BRACKETS),
    (CitationStyle::NumberedParentheses, &NUMBERED_PARENTHESES),
    (CitationStyle::AuthorYear, &AUTHOR_YEAR),
    (CitationStyle::Superscript, &SUPERSCRIPT),
];

/// Count every citation family in `text` and report the most frequent
///
/// Ties go to the family listed first; all-zero counts report `Unknown`.
pub fn detect_citation_style(text: &str) -> CitationStyleReport {
    let mut all_counts = BTreeMap::new();
    let mut style = CitationStyle::Unknown;
    let mut count = 0;

    for &(family, pattern) in FAMILIES.iter() {
        let n = pattern.find_iter(text).count();
        all_counts.insert(family, n);
        if n > count {
            style = family;
            count = n;
        }
    }

    CitationStyleReport {
        style,
        count,
        all_counts,
    }
}
