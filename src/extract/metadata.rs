//! Title, author, abstract and keyword heuristics.
//!
//! Title and authors are only looked for near the start of the document, where
//! the front matter lives; abstract and keywords are searched in the full text.
//! A heuristic that finds nothing yields `None` or an empty list.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ExtractionConfig;

static TITLE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^[ \t]*title[ \t]*:[ \t]*(\S.*)$").unwrap());

static AUTHORS_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^[ \t]*(?:authors?|by)[ \t]*:[ \t]*(\S.*)$").unwrap());

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n").unwrap());

/// Two or more comma-separated names, each 2-4 capitalized tokens
static AUTHOR_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Z][\w.'\-]*(?:[ \t]+[A-Z][\w.'\-]*){1,3}(?:[ \t]*,[ \t]*(?:and[ \t]+)?[A-Z][\w.'\-]*(?:[ \t]+[A-Z][\w.'\-]*){1,3})+$",
    )
    .unwrap()
});

static ABSTRACT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)(?:Abstract|ABSTRACT)[ \t]*:[ \t]*(.*?)(?:\n[ \t]*\n|\n[ \t]*[A-Z][A-Z0-9 \t]{2,}\n|Keywords[ \t]*:|KEYWORDS[ \t]*:|\z)",
    )
    .unwrap()
});

static KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(?:Keywords|KEYWORDS)[ \t]*:[ \t]*(.*?)(?:\n[ \t]*\n|\z)").unwrap()
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Metadata fields recovered from document text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedMetadata {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub abstract_text: Option<String>,
    pub keywords: Vec<String>,
}

/// First `max_chars` characters of `text`, cut on a char boundary
fn window(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn collapse(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

fn paragraphs(text: &str) -> impl Iterator<Item = String> + '_ {
    PARAGRAPH_BREAK
        .split(text)
        .map(collapse)
        .filter(|p| !p.is_empty())
}

/// A short paragraph of mostly capitalized words with no closing period
fn looks_like_title(paragraph: &str) -> bool {
    let words: Vec<&str> = paragraph.split_whitespace().collect();
    if !(2..=30).contains(&words.len()) || paragraph.ends_with('.') || paragraph.contains(':') {
        return false;
    }
    if !paragraph.starts_with(|c: char| c.is_uppercase()) {
        return false;
    }
    if AUTHOR_LINE.is_match(paragraph) {
        return false;
    }

    let significant: Vec<&str> = words
        .iter()
        .copied()
        .filter(|w| w.chars().count() > 3)
        .collect();
    let capitalized = significant
        .iter()
        .filter(|w| w.starts_with(char::is_uppercase))
        .count();
    !significant.is_empty() && capitalized * 2 >= significant.len()
}

pub fn extract_title(text: &str, config: &ExtractionConfig) -> Option<String> {
    let head = window(text, config.title_window);

    if let Some(caps) = TITLE_MARKER.captures(head) {
        let title = collapse(&caps[1]);
        if !title.is_empty() {
            return Some(title);
        }
    }

    paragraphs(head).find(|p| looks_like_title(p))
}

pub fn extract_authors(text: &str, config: &ExtractionConfig) -> Vec<String> {
    let head = window(text, config.authors_window);

    let line = AUTHORS_MARKER
        .captures(head)
        .map(|caps| caps[1].to_string())
        .or_else(|| paragraphs(head).find(|p| AUTHOR_LINE.is_match(p)));

    line.map(|l| split_authors(&l)).unwrap_or_default()
}

/// Split a comma-separated author line, dropping empty entries and a leading "and"
pub fn split_authors(line: &str) -> Vec<String> {
    line.split(',')
        .map(|s| s.trim())
        .map(|s| s.strip_prefix("and ").unwrap_or(s).trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn extract_abstract(text: &str) -> Option<String> {
    ABSTRACT
        .captures(text)
        .map(|caps| collapse(&caps[1]))
        .filter(|a| !a.is_empty())
}

pub fn extract_keywords(text: &str) -> Vec<String> {
    let Some(caps) = KEYWORDS.captures(text) else {
        return Vec::new();
    };

    let mut keywords: Vec<String> = Vec::new();
    for keyword in caps[1].split([',', ';']).map(collapse) {
        if !keyword.is_empty() && !keywords.contains(&keyword) {
            keywords.push(keyword);
        }
    }
    keywords
}

pub fn extract_metadata(text: &str, config: &ExtractionConfig) -> ExtractedMetadata {
    ExtractedMetadata {
        title: extract_title(text, config),
        authors: extract_authors(text, config),
        abstract_text: extract_abstract(text),
        keywords: extract_keywords(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRONT_MATTER: &str = "Deep Learning for Reference Verification\n\nAlice Smith, Bob Jones, Carol White\n\nAbstract: We study how references\ncan be verified automatically.\n\nKeywords: citations; verification, references\n\n1 Introduction\nBody text.";

    fn config() -> ExtractionConfig {
        ExtractionConfig::default()
    }

    #[test]
    fn test_title_from_leading_paragraph() {
        assert_eq!(
            extract_title(FRONT_MATTER, &config()).as_deref(),
            Some("Deep Learning for Reference Verification")
        );
    }

    #[test]
    fn test_title_marker_wins() {
        let text = "Journal of Things\n\nTitle: A Marked Title\nAuthors: A. Person, B. Person\n";
        assert_eq!(extract_title(text, &config()).as_deref(), Some("A Marked Title"));
    }

    #[test]
    fn test_title_outside_window_ignored() {
        let text = format!("{}\n\nTitle: Too Late To Count", "x".repeat(1200));
        assert_eq!(extract_title(&text, &config()), None);
    }

    #[test]
    fn test_authors_from_isolated_paragraph() {
        assert_eq!(
            extract_authors(FRONT_MATTER, &config()),
            vec!["Alice Smith", "Bob Jones", "Carol White"]
        );
    }

    #[test]
    fn test_authors_marker() {
        let text = "Some Title Here\nBY: Jane Roe, , John Doe\n";
        assert_eq!(extract_authors(text, &config()), vec!["Jane Roe", "John Doe"]);
    }

    #[test]
    fn test_authors_missing() {
        assert!(extract_authors("no names in here at all.", &config()).is_empty());
    }

    #[test]
    fn test_abstract_stops_at_blank_line() {
        assert_eq!(
            extract_abstract(FRONT_MATTER).as_deref(),
            Some("We study how references can be verified automatically.")
        );
    }

    #[test]
    fn test_abstract_stops_at_keywords_marker() {
        let text = "ABSTRACT: Short summary. Keywords: a, b";
        assert_eq!(extract_abstract(text).as_deref(), Some("Short summary."));
    }

    #[test]
    fn test_abstract_stops_at_heading_line() {
        let text = "Abstract: First line of the abstract\nINTRODUCTION\nBody.";
        assert_eq!(
            extract_abstract(text).as_deref(),
            Some("First line of the abstract")
        );
    }

    #[test]
    fn test_keywords_split_on_commas_and_semicolons() {
        assert_eq!(
            extract_keywords(FRONT_MATTER),
            vec!["citations", "verification", "references"]
        );
    }

    #[test]
    fn test_keywords_deduplicated() {
        assert_eq!(extract_keywords("KEYWORDS: a; b, a"), vec!["a", "b"]);
    }

    #[test]
    fn test_nothing_found() {
        let meta = extract_metadata("", &config());
        assert_eq!(meta, ExtractedMetadata::default());
    }
}
