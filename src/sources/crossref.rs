//! CrossRef source: primary metadata and retraction notices.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::config::{HttpConfig, SourcesConfig};
use crate::models::{RawAuthors, RawRecord, RawReference, RetractionRecord};
use crate::sources::{
    join_url, BibliographicSource, RetractionRegistry, SourceCapabilities, SourceError,
};
use crate::utils::{HttpClient, USER_AGENT};

static MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// CrossRef source
///
/// Uses the CrossRef REST API for DOI lookup, title search, and the
/// `type:retraction` filter for retraction notices.
#[derive(Debug, Clone)]
pub struct CrossRefSource {
    client: HttpClient,
    base_url: String,
    mailto: Option<String>,
}

impl CrossRefSource {
    pub fn new(sources: &SourcesConfig, http: &HttpConfig) -> Result<Self, SourceError> {
        let user_agent = match &sources.mailto {
            Some(mailto) => format!("{} (mailto:{})", USER_AGENT, mailto),
            None => USER_AGENT.to_string(),
        };

        Ok(Self {
            client: HttpClient::from_config(&user_agent, http)?,
            base_url: sources.crossref_base_url.clone(),
            mailto: sources.mailto.clone(),
        })
    }

    /// Point the source at another server (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::new()?,
            base_url: base_url.into(),
            mailto: None,
        })
    }

    fn url(&self, path: &str) -> String {
        let url = join_url(&self.base_url, path);
        match &self.mailto {
            Some(mailto) => {
                let sep = if url.contains('?') { '&' } else { '?' };
                format!("{}{}mailto={}", url, sep, urlencoding::encode(mailto))
            }
            None => url,
        }
    }

    fn parse_work(work: CRWork, doi: Option<&str>) -> RawRecord {
        let authors = work
            .author
            .iter()
            .map(|a| {
                format!(
                    "{} {}",
                    a.given.as_deref().unwrap_or(""),
                    a.family.as_deref().unwrap_or("")
                )
                .trim()
                .to_string()
            })
            .filter(|name| !name.is_empty())
            .collect();

        let year = work
            .published_print
            .as_ref()
            .or(work.issued.as_ref())
            .and_then(CRDate::year)
            .map(|y| y.to_string())
            .unwrap_or_default();

        let references = work.reference.into_iter().map(CRReference::from_value).collect();

        RawRecord::new("crossref", work.title.into_iter().next().unwrap_or_default())
            .authors(authors)
            .year(year)
            .doi(doi.map(str::to_string).or(work.doi).unwrap_or_default())
            .abstract_text(work.abstract_text.as_deref().map(strip_markup).unwrap_or_default())
            .references(references)
    }
}

/// `works/` path for a DOI, each segment percent-encoded
fn work_path(doi: &str) -> String {
    let segments: Vec<_> = doi.split('/').map(urlencoding::encode).collect();
    format!("works/{}", segments.join("/"))
}

/// Remove JATS tags from an abstract and collapse whitespace
fn strip_markup(text: &str) -> String {
    let plain = MARKUP.replace_all(text, " ");
    WHITESPACE.replace_all(plain.trim(), " ").into_owned()
}

#[async_trait]
impl BibliographicSource for CrossRefSource {
    fn id(&self) -> &str {
        "crossref"
    }

    fn name(&self) -> &str {
        "CrossRef"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::DOI_LOOKUP | SourceCapabilities::TITLE_SEARCH
    }

    async fn get_by_doi(&self, doi: &str) -> Result<RawRecord, SourceError> {
        let url = self.url(&work_path(doi));
        let data: CRWorkResponse = self.client.get_json(&url, |req| req).await?;
        Ok(Self::parse_work(data.message, Some(doi)))
    }

    async fn search_by_title(
        &self,
        title: &str,
        limit: usize,
    ) -> Result<Vec<RawRecord>, SourceError> {
        let url = self.url(&format!(
            "works?query.title={}&rows={}",
            urlencoding::encode(title),
            limit
        ));
        let data: CRListResponse = self.client.get_json(&url, |req| req).await?;

        Ok(data
            .message
            .items
            .into_iter()
            .map(|work| Self::parse_work(work, None))
            .filter(|record| !record.title.is_empty())
            .collect())
    }
}

#[async_trait]
impl RetractionRegistry for CrossRefSource {
    async fn search_retracted(&self, title: &str) -> Result<Vec<RetractionRecord>, SourceError> {
        let url = self.url(&format!(
            "works?query.title={}&filter=type:retraction",
            urlencoding::encode(title)
        ));
        let data: CRListResponse = self.client.get_json(&url, |req| req).await?;

        Ok(data
            .message
            .items
            .into_iter()
            .filter_map(|work| {
                let title = work.title.into_iter().next()?;
                let doi = work.doi?;
                Some(RetractionRecord { title, doi })
            })
            .collect())
    }
}

// ===== CrossRef API Types =====

#[derive(Debug, Deserialize)]
struct CRWorkResponse {
    message: CRWork,
}

#[derive(Debug, Deserialize)]
struct CRListResponse {
    message: CRList,
}

#[derive(Debug, Deserialize)]
struct CRList {
    #[serde(default)]
    items: Vec<CRWork>,
}

#[derive(Debug, Deserialize)]
struct CRWork {
    #[serde(default)]
    title: Vec<String>,
    #[serde(rename = "DOI")]
    doi: Option<String>,
    #[serde(default)]
    author: Vec<CRAuthor>,
    #[serde(rename = "published-print")]
    published_print: Option<CRDate>,
    issued: Option<CRDate>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(default)]
    reference: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CRAuthor {
    given: Option<String>,
    family: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CRDate {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<Option<i64>>>,
}

impl CRDate {
    fn year(&self) -> Option<i64> {
        self.date_parts.first()?.first().copied().flatten()
    }
}

#[derive(Debug, Deserialize)]
struct CRReference {
    key: Option<String>,
    #[serde(rename = "DOI")]
    doi: Option<String>,
    #[serde(rename = "article-title")]
    article_title: Option<String>,
    unstructured: Option<String>,
    author: Option<String>,
    year: Option<String>,
}

impl CRReference {
    /// Convert one entry of a work's reference list; a malformed entry
    /// becomes an empty reference instead of failing the whole work
    fn from_value(value: serde_json::Value) -> RawReference {
        match serde_json::from_value::<CRReference>(value) {
            Ok(reference) => reference.into_raw(),
            Err(e) => {
                tracing::warn!("Skipping malformed CrossRef reference: {}", e);
                RawReference::default()
            }
        }
    }

    fn into_raw(self) -> RawReference {
        RawReference {
            key: self.key.unwrap_or_default(),
            doi: self.doi.unwrap_or_default(),
            article_title: self.article_title.unwrap_or_default(),
            unstructured: self.unstructured.unwrap_or_default(),
            authors: RawAuthors::Joined(self.author.unwrap_or_default()),
            year: self.year.unwrap_or_default(),
        }
    }
}
