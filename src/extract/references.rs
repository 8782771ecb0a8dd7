//! Reference-list recovery from raw document text.
//!
//! Three independent passes each return candidate entries; [`merge_candidates`]
//! concatenates them (bracketed, period-numbered, author-year) and drops noise
//! and duplicates.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Normalized entries shorter than this are not real citations
pub const MIN_REFERENCE_CHARS: usize = 21;

static BRACKET_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*\[\d{1,3}\]").unwrap());

static PERIOD_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*\d{1,3}\.\s").unwrap());

static BIBLIOGRAPHY_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:R(?i:eferences)|B(?i:ibliography)|W(?i:orks\s+cited)|L(?i:iterature\s+cited))\b")
        .unwrap()
});

static SECTION_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?mi)^[ \t]*(?:[A-Z]?\d{0,2}(?:\.\d+)*\.?[ \t]+)?(?:Appendix|Appendices|Acknowledge?ments?|Supplementary(?:[ \t]+Materials?)?|Introduction|Background|Related[ \t]+Work|Methods?|Methodology|Results|Discussion|Conclusions?|Funding|Author[ \t]+Contributions|Conflicts?[ \t]+of[ \t]+Interest|Data[ \t]+Availability|Ethics[ \t]+Statement|Footnotes|Tables|Figures)[ \t]*:?[ \t]*$",
    )
    .unwrap()
});

static SURNAME_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z][A-Za-z'\-]+,").unwrap());

/// `(YYYY)` opening an entry, optionally after a numeric marker
static LEADING_YEAR_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:\[\d{1,3}\][ \t]*|\d{1,3}\.[ \t]+)?(\(\d{4}\))").unwrap()
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse whitespace runs to a single space and trim
pub fn normalize_entry(entry: &str) -> String {
    WHITESPACE.replace_all(entry.trim(), " ").into_owned()
}

/// Replace internal line breaks with a single space
fn flatten(entry: &str) -> String {
    entry.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// Cut `text` into entries, each running from one marker to the next (or the end)
fn split_at_markers(text: &str, marker: &Regex) -> Vec<String> {
    let starts: Vec<usize> = marker.find_iter(text).map(|m| m.start()).collect();

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            flatten(text[start..end].trim())
        })
        .collect()
}

/// Pass A: entries introduced by a line starting with `[n]`
pub fn bracketed_entries(text: &str) -> Vec<String> {
    split_at_markers(text, &BRACKET_MARKER)
}

/// Pass B: entries introduced by a line starting with `n.`
pub fn period_numbered_entries(text: &str) -> Vec<String> {
    split_at_markers(text, &PERIOD_MARKER)
}

/// Locate the bibliography span, preferring the longest candidate
///
/// Every heading occurrence opens a span that runs to the next non-bibliography
/// section heading or the end of the text. A forward mention of "References" in
/// the body is cut short by the next section; the real list usually is not.
pub fn bibliography_span(text: &str) -> Option<&str> {
    let mut best: Option<&str> = None;

    for heading in BIBLIOGRAPHY_HEADING.find_iter(text) {
        let rest = &text[heading.end()..];
        let end = SECTION_HEADING
            .find(rest)
            .map(|m| m.start())
            .unwrap_or(rest.len());
        let span = &rest[..end];

        if best.map_or(true, |b| span.len() > b.len()) {
            best = Some(span);
        }
    }

    best
}

/// True when `before` ends inside an author list (`Smith, J., & Doe,`)
fn continues_author_list(before: &str) -> bool {
    let before = before.trim_end();
    before.ends_with(',') || before.ends_with('&') || before.ends_with(" and")
}

/// Offsets in `span` where an author-year entry starts
///
/// A `Lastname,` token anywhere opens an entry unless it continues the
/// previous author list. A `(YYYY)` token opens one only at the head of a
/// line, since mid-line it follows its own authors.
fn author_year_cuts(span: &str) -> Vec<usize> {
    let surnames = SURNAME_TOKEN
        .find_iter(span)
        .map(|m| m.start())
        .filter(|&start| !continues_author_list(&span[..start]));
    let years = LEADING_YEAR_TOKEN
        .captures_iter(span)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.start());

    let mut cuts: Vec<usize> = std::iter::once(0).chain(surnames).chain(years).collect();
    cuts.sort_unstable();
    cuts.dedup();
    cuts
}

/// Pass C: author-year entries inside the bibliography block
///
/// The block is split immediately before each token that looks like the
/// start of an author-year entry.
pub fn author_year_entries(text: &str) -> Vec<String> {
    let Some(span) = bibliography_span(text) else {
        return Vec::new();
    };

    let cuts = author_year_cuts(span);

    cuts.iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = cuts.get(i + 1).copied().unwrap_or(span.len());
            flatten(&span[start..end])
        })
        .filter(|entry| !entry.trim().is_empty())
        .collect()
}

/// Merge candidate lists in order, dropping noise and normalized duplicates
pub fn merge_candidates<I>(passes: I) -> Vec<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for candidate in passes.into_iter().flatten() {
        let normalized = normalize_entry(&candidate);
        if normalized.chars().count() < MIN_REFERENCE_CHARS {
            continue;
        }
        if seen.insert(normalized.clone()) {
            merged.push(normalized);
        }
    }

    merged
}

/// Run all three passes over `text` and merge the results
pub fn extract_references(text: &str) -> Vec<String> {
    let bracketed = bracketed_entries(text);
    let numbered = period_numbered_entries(text);
    let author_year = author_year_entries(text);

    tracing::debug!(
        bracketed = bracketed.len(),
        numbered = numbered.len(),
        author_year = author_year.len(),
        "Reference candidates found"
    );

    merge_candidates([bracketed, numbered, author_year])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracketed_entries_in_order() {
        let text = "\n[1] Smith, J. A study of things. 2020.\n[2] Doe, K. Another study of stuff.\n";
        let refs = extract_references(text);
        assert_eq!(
            refs,
            vec![
                "[1] Smith, J. A study of things. 2020.",
                "[2] Doe, K. Another study of stuff.",
            ]
        );
    }

    #[test]
    fn test_bracketed_multiline_flattened() {
        let text = "[1] Smith, J. A very long title that\nwraps onto the next line. 2019.\n[2] Doe, K. Short enough title here.";
        let refs = bracketed_entries(text);
        assert_eq!(refs.len(), 2);
        assert_eq!(
            refs[0],
            "[1] Smith, J. A very long title that wraps onto the next line. 2019."
        );
    }

    #[test]
    fn test_bracket_marker_must_start_line() {
        let text = "As shown in [1] and [2], results vary.";
        assert!(bracketed_entries(text).is_empty());
    }

    #[test]
    fn test_period_numbered_entries() {
        let text = "1. Smith, J. Learning representations. 2018.\n2. Doe, K. Graph methods\nfor everything. 2019.\n";
        let refs = period_numbered_entries(text);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1], "2. Doe, K. Graph methods for everything. 2019.");
    }

    #[test]
    fn test_decimal_numbers_are_not_markers() {
        let text = "3.5 percent of samples failed.\n";
        assert!(period_numbered_entries(text).is_empty());
    }

    #[test]
    fn test_short_entries_dropped() {
        let refs = merge_candidates([vec!["[1] A".to_string(), "[2] B".to_string()]]);
        assert!(refs.is_empty());
    }

    #[test]
    fn test_duplicates_removed_keeping_first() {
        let refs = merge_candidates([
            vec!["[1] Smith, J.   A study of things.".to_string()],
            vec!["[1] Smith, J. A study\nof things.".to_string()],
        ]);
        assert_eq!(refs, vec!["[1] Smith, J. A study of things."]);
    }

    #[test]
    fn test_extraction_idempotent() {
        let text = "Intro text.\nReferences\n[1] Smith, J. A study of things. 2020.\n[2] Doe, K. Another study of stuff.\n";
        assert_eq!(extract_references(text), extract_references(text));
    }

    #[test]
    fn test_bibliography_span_prefers_longest() {
        let text = "Introduction\nSee the References for details.\nMethods\nWe did things.\nReferences\nSmith, J. (2019). A long title here.\nDoe, K. (2020). Another long title here.\n";
        let span = bibliography_span(text).unwrap();
        assert!(span.contains("Smith, J. (2019)"));
        assert!(!span.contains("We did things"));
    }

    #[test]
    fn test_bibliography_span_stops_at_appendix() {
        let text = "References\nSmith, J. (2019). A long title here.\nAppendix\nExtra tables.";
        let span = bibliography_span(text).unwrap();
        assert!(span.contains("Smith"));
        assert!(!span.contains("Extra tables"));
    }

    #[test]
    fn test_heading_requires_capital_first_letter() {
        assert!(bibliography_span("the references below\nSmith, J. (2019). Title.").is_none());
        assert!(bibliography_span("REFERENCES\nSmith, J. (2019). Title.").is_some());
    }

    #[test]
    fn test_author_year_entries_split() {
        let text = "Bibliography\nSmith, J. (2019). Deep nets for everything.\nDoe, K. (2020). Graphs all the way down.\n";
        let refs = merge_candidates([author_year_entries(text)]);
        assert!(refs.iter().any(|r| r.starts_with("Smith,")));
        assert!(refs.iter().any(|r| r.starts_with("Doe,")));
        assert!(refs.iter().all(|r| r.chars().count() >= MIN_REFERENCE_CHARS));
    }

    #[test]
    fn test_author_year_split_mid_line() {
        let text = "References\nSmith, J. (2019). Deep nets for everything. Doe, K. (2020). Graphs all the way down.";
        let refs = merge_candidates([author_year_entries(text)]);
        assert_eq!(
            refs,
            vec![
                "Smith, J. (2019). Deep nets for everything.",
                "Doe, K. (2020). Graphs all the way down.",
            ]
        );
    }

    #[test]
    fn test_author_list_not_split() {
        let text = "References\nSmith, J., & Doe, K. (2019). Deep nets for everything.\n";
        let refs = merge_candidates([author_year_entries(text)]);
        assert_eq!(refs, vec!["Smith, J., & Doe, K. (2019). Deep nets for everything."]);
    }

    #[test]
    fn test_numbered_bibliography_split_at_surnames() {
        let text = "References\n[1] Smith, J. Title A.\n[2] Doe, K. Title B.\n";
        assert_eq!(
            author_year_entries(text)
                .iter()
                .map(|e| normalize_entry(e))
                .collect::<Vec<_>>(),
            vec!["[1]", "Smith, J. Title A. [2]", "Doe, K. Title B."]
        );
    }

    #[test]
    fn test_leading_year_token_splits() {
        let text = "References\n(2019) Anonymous report on deep nets.\n(2020) Another anonymous report.\n";
        let refs = merge_candidates([author_year_entries(text)]);
        assert_eq!(
            refs,
            vec![
                "(2019) Anonymous report on deep nets.",
                "(2020) Another anonymous report.",
            ]
        );
    }

    #[test]
    fn test_no_bibliography_no_author_year_entries() {
        assert!(author_year_entries("Just some body text, nothing else.").is_empty());
    }
}
