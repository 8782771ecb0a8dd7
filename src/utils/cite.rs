//! Citation rendering in various styles.
//!
//! Supports IEEE, APA 7th, MLA 9th, Chicago 17th (author-date) and BibTeX.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::PaperMetadata;

/// Citation output format
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CitationFormat {
    #[default]
    Ieee,
    Apa,
    Mla,
    Chicago,
    Bibtex,
}

impl fmt::Display for CitationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CitationFormat::Ieee => write!(f, "IEEE"),
            CitationFormat::Apa => write!(f, "APA 7th"),
            CitationFormat::Mla => write!(f, "MLA 9th"),
            CitationFormat::Chicago => write!(f, "Chicago 17th"),
            CitationFormat::Bibtex => write!(f, "BibTeX"),
        }
    }
}

/// Renders a citation string for a paper
pub trait CitationRenderer: Send + Sync + std::fmt::Debug {
    fn render(&self, paper: &PaperMetadata, format: CitationFormat) -> String;
}

/// Deterministic string-template renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRenderer;

impl CitationRenderer for TemplateRenderer {
    fn render(&self, paper: &PaperMetadata, format: CitationFormat) -> String {
        format_citation(paper, format)
    }
}

/// Format a paper citation in the specified format
pub fn format_citation(paper: &PaperMetadata, format: CitationFormat) -> String {
    match format {
        CitationFormat::Ieee => format_ieee(paper),
        CitationFormat::Apa => format_apa(paper),
        CitationFormat::Mla => format_mla(paper),
        CitationFormat::Chicago => format_chicago(paper),
        CitationFormat::Bibtex => format_bibtex(paper),
    }
}

/// Split a name into (given, family), accepting "Last, First" or "First Last"
fn split_name(author: &str) -> (String, String) {
    if let Some((family, given)) = author.split_once(',') {
        return (given.trim().to_string(), family.trim().to_string());
    }
    let words: Vec<&str> = author.split_whitespace().collect();
    match words.split_last() {
        Some((family, given)) => (given.join(" "), family.to_string()),
        None => (String::new(), String::new()),
    }
}

/// "Ada Maria" -> "A. M."
fn initials(given: &str) -> String {
    given
        .split(|c: char| c.is_whitespace() || c == '.' || c == '-')
        .filter_map(|part| part.chars().next())
        .map(|c| format!("{}.", c))
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_with_final(items: &[String], sep: &str, final_sep: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [rest @ .., last] => format!("{}{}{}", rest.join(sep), final_sep, last),
    }
}

fn year_or_nd(paper: &PaperMetadata) -> &str {
    paper.year.as_deref().unwrap_or("n.d.")
}

fn doi_url(paper: &PaperMetadata) -> Option<String> {
    paper.doi.as_ref().map(|doi| format!("https://doi.org/{}", doi))
}

/// "A. Lovelace, C. Babbage, and D. E. Knuth"; more than six becomes "et al."
fn format_authors_ieee(authors: &[String]) -> String {
    let names: Vec<String> = authors
        .iter()
        .map(|a| {
            let (given, family) = split_name(a);
            let initials = initials(&given);
            if initials.is_empty() {
                family
            } else {
                format!("{} {}", initials, family)
            }
        })
        .collect();

    match names.len() {
        0 => String::new(),
        1 => names[0].clone(),
        2 => format!("{} and {}", names[0], names[1]),
        3..=6 => join_with_final(&names, ", ", ", and "),
        _ => format!("{} et al.", names[0]),
    }
}

/// IEEE: A. Author and B. Author, "Title," Year, doi: DOI.
fn format_ieee(paper: &PaperMetadata) -> String {
    let authors = format_authors_ieee(&paper.authors);
    let mut out = if authors.is_empty() {
        format!("\"{},\"", paper.title)
    } else {
        format!("{}, \"{},\"", authors, paper.title)
    };

    out.push_str(&format!(" {}", year_or_nd(paper)));
    match &paper.doi {
        Some(doi) => out.push_str(&format!(", doi: {}.", doi)),
        None => out.push('.'),
    }
    out
}

/// "Last, F. M., & Last, F. M."; over 20 authors elides the middle
fn format_authors_apa(authors: &[String]) -> String {
    let names: Vec<String> = authors
        .iter()
        .map(|a| {
            let (given, family) = split_name(a);
            let initials = initials(&given);
            if initials.is_empty() {
                family
            } else {
                format!("{}, {}", family, initials)
            }
        })
        .collect();

    match names.len() {
        0 => "Anonymous".to_string(),
        1 => names[0].clone(),
        2..=20 => join_with_final(&names, ", ", ", & "),
        n => format!("{}, ... {}", names[..19].join(", "), names[n - 1]),
    }
}

/// APA 7th: Author, A. A., & Author, B. B. (Year). Title. DOI
fn format_apa(paper: &PaperMetadata) -> String {
    let base = format!(
        "{} ({}). {}.",
        format_authors_apa(&paper.authors),
        year_or_nd(paper),
        paper.title
    );
    match doi_url(paper) {
        Some(url) => format!("{} {}", base, url),
        None => base,
    }
}

/// "Last, First", "Last, First, and First Last", or "Last, First, et al."
fn format_authors_mla(authors: &[String]) -> String {
    let inverted = |a: &str| {
        let (given, family) = split_name(a);
        if given.is_empty() {
            family
        } else {
            format!("{}, {}", family, given)
        }
    };
    let natural = |a: &str| {
        let (given, family) = split_name(a);
        format!("{} {}", given, family).trim().to_string()
    };

    match authors {
        [] => "Anonymous".to_string(),
        [only] => inverted(only),
        [first, second] => format!("{}, and {}", inverted(first), natural(second)),
        [first, ..] => format!("{}, et al", inverted(first)),
    }
}

/// MLA 9th: Author. "Title." Year, DOI.
fn format_mla(paper: &PaperMetadata) -> String {
    let base = format!(
        "{}. \"{}.\" {}",
        format_authors_mla(&paper.authors),
        paper.title.trim_end_matches('.'),
        year_or_nd(paper)
    );
    match doi_url(paper) {
        Some(url) => format!("{}, {}.", base, url),
        None if base.ends_with('.') => base,
        None => format!("{}.", base),
    }
}

/// "Last, First", "Last, First, and First Last" up to three, else "et al."
fn format_authors_chicago(authors: &[String]) -> String {
    let (given, family) = authors.first().map(|a| split_name(a)).unwrap_or_default();
    let first = if given.is_empty() {
        family
    } else {
        format!("{}, {}", family, given)
    };

    let rest: Vec<String> = authors
        .iter()
        .skip(1)
        .map(|a| {
            let (given, family) = split_name(a);
            format!("{} {}", given, family).trim().to_string()
        })
        .collect();

    match authors.len() {
        0 => "Anonymous".to_string(),
        1 => first,
        2 => format!("{} and {}", first, rest[0]),
        3 => format!("{}, {}, and {}", first, rest[0], rest[1]),
        _ => format!("{} et al.", first),
    }
}

/// Chicago 17th (author-date): Author. Year. "Title." DOI.
fn format_chicago(paper: &PaperMetadata) -> String {
    let base = format!(
        "{}. {}. \"{}.\"",
        format_authors_chicago(&paper.authors),
        year_or_nd(paper),
        paper.title.trim_end_matches('.')
    );
    match doi_url(paper) {
        Some(url) => format!("{} {}.", base, url),
        None => base,
    }
}

/// BibTeX `@article` entry keyed FirstAuthorFamilyYearFirstWords
fn format_bibtex(paper: &PaperMetadata) -> String {
    let family = paper
        .authors
        .first()
        .map(|a| split_name(a).1)
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    let year = paper.year.as_deref().unwrap_or("");
    let title_key: String = paper
        .title
        .split_whitespace()
        .take(3)
        .flat_map(|w| w.chars().filter(|c| c.is_alphanumeric()))
        .collect();
    let key: String = format!("{}{}{}", family, year, title_key)
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();

    let authors = paper
        .authors
        .iter()
        .map(|a| {
            let (given, family) = split_name(a);
            if given.is_empty() {
                family
            } else {
                format!("{}, {}", family, given)
            }
        })
        .collect::<Vec<_>>()
        .join(" and ");

    let mut fields = vec![
        format!("  author = {{{}}}", authors),
        format!("  title = {{{}}}", paper.title),
    ];
    if !year.is_empty() {
        fields.push(format!("  year = {{{}}}", year));
    }
    if let Some(doi) = &paper.doi {
        fields.push(format!("  doi = {{{}}}", doi));
    }

    format!("@article{{{},\n{}\n}}", key, fields.join(",\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper() -> PaperMetadata {
        PaperMetadata {
            title: "Attention Is All You Need".to_string(),
            authors: vec!["Ashish Vaswani".to_string(), "Noam Shazeer".to_string()],
            year: Some("2017".to_string()),
            doi: Some("10.48550/arXiv.1706.03762".to_string()),
            ..PaperMetadata::default()
        }
    }

    #[test]
    fn test_ieee() {
        assert_eq!(
            format_citation(&paper(), CitationFormat::Ieee),
            "A. Vaswani and N. Shazeer, \"Attention Is All You Need,\" 2017, doi: 10.48550/arXiv.1706.03762."
        );
    }

    #[test]
    fn test_ieee_three_authors_and_no_doi() {
        let mut p = paper();
        p.authors.push("Knuth, Donald Ervin".to_string());
        p.doi = None;
        assert_eq!(
            format_citation(&p, CitationFormat::Ieee),
            "A. Vaswani, N. Shazeer, and D. E. Knuth, \"Attention Is All You Need,\" 2017."
        );
    }

    #[test]
    fn test_apa() {
        assert_eq!(
            format_citation(&paper(), CitationFormat::Apa),
            "Vaswani, A., & Shazeer, N. (2017). Attention Is All You Need. https://doi.org/10.48550/arXiv.1706.03762"
        );
    }

    #[test]
    fn test_mla_without_authors() {
        let p = PaperMetadata::new("Untitled Work");
        assert_eq!(
            format_citation(&p, CitationFormat::Mla),
            "Anonymous. \"Untitled Work.\" n.d."
        );
    }

    #[test]
    fn test_chicago() {
        assert_eq!(
            format_citation(&paper(), CitationFormat::Chicago),
            "Vaswani, Ashish and Noam Shazeer. 2017. \"Attention Is All You Need.\" https://doi.org/10.48550/arXiv.1706.03762."
        );
    }

    #[test]
    fn test_bibtex() {
        let bib = format_citation(&paper(), CitationFormat::Bibtex);
        assert!(bib.starts_with("@article{Vaswani2017AttentionIsAll,\n"));
        assert!(bib.contains("  author = {Vaswani, Ashish and Shazeer, Noam}"));
        assert!(bib.contains("  doi = {10.48550/arXiv.1706.03762}"));
        assert!(bib.ends_with("\n}"));
    }

    #[test]
    fn test_renderer_trait() {
        let renderer: Box<dyn CitationRenderer> = Box::new(TemplateRenderer);
        assert_eq!(
            renderer.render(&paper(), CitationFormat::default()),
            format_ieee(&paper())
        );
    }
}
