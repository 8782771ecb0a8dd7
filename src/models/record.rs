//! As-fetched bibliographic records, prior to reconciliation.

use serde::{Deserialize, Serialize};

/// Author field of a raw reference
///
/// Some sources hand back a structured list, others a single comma-joined string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAuthors {
    List(Vec<String>),
    Joined(String),
}

impl Default for RawAuthors {
    fn default() -> Self {
        RawAuthors::List(Vec::new())
    }
}

impl RawAuthors {
    /// Split into trimmed, non-empty author names
    pub fn to_list(&self) -> Vec<String> {
        match self {
            RawAuthors::List(names) => names
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            RawAuthors::Joined(joined) => joined
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// One entry of a source's nested reference list, untrusted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReference {
    pub key: String,
    pub doi: String,
    pub article_title: String,
    pub unstructured: String,
    pub authors: RawAuthors,
    pub year: String,
}

/// Record for one work as returned by a single bibliographic source
///
/// Empty strings mean the source did not supply the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Id of the source that produced this record
    pub source: String,
    pub title: String,
    pub authors: Vec<String>,
    pub year: String,
    pub doi: String,
    pub abstract_text: String,
    pub references: Vec<RawReference>,
}

impl RawRecord {
    pub fn new(source: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn authors(mut self, authors: Vec<String>) -> Self {
        self.authors = authors;
        self
    }

    pub fn year(mut self, year: impl Into<String>) -> Self {
        self.year = year.into();
        self
    }

    pub fn doi(mut self, doi: impl Into<String>) -> Self {
        self.doi = doi.into();
        self
    }

    pub fn abstract_text(mut self, abstract_text: impl Into<String>) -> Self {
        self.abstract_text = abstract_text.into();
        self
    }

    pub fn references(mut self, references: Vec<RawReference>) -> Self {
        self.references = references;
        self
    }
}
