//! Semantic Scholar source: secondary metadata and title search.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::{HttpConfig, SourcesConfig};
use crate::models::RawRecord;
use crate::sources::{join_url, BibliographicSource, SourceCapabilities, SourceError};
use crate::utils::{HttpClient, USER_AGENT};

const LOOKUP_FIELDS: &str = "title,authors,year,abstract";
const SEARCH_FIELDS: &str = "title,authors,year,abstract,externalIds";

/// Semantic Scholar source
///
/// Uses the Graph API. Records carry no reference list.
#[derive(Debug, Clone)]
pub struct SemanticScholarSource {
    client: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl SemanticScholarSource {
    pub fn new(
        sources: &SourcesConfig,
        http: &HttpConfig,
        api_key: Option<String>,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::from_config(USER_AGENT, http)?,
            base_url: sources.semantic_scholar_base_url.clone(),
            api_key,
        })
    }

    /// Point the source at another server (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::new()?,
            base_url: base_url.into(),
            api_key: None,
        })
    }

    /// Create with an API key (optional, for higher rate limits)
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Add API key to request headers if available
    fn add_api_key_if_present(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref key) = self.api_key {
            builder.header("x-api-key", key)
        } else {
            builder
        }
    }

    fn parse_paper(data: S2Paper, doi: Option<&str>) -> RawRecord {
        let authors = data
            .authors
            .into_iter()
            .filter_map(|a| a.name)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        let doi = doi
            .map(str::to_string)
            .or_else(|| data.external_ids.and_then(|ids| ids.doi))
            .unwrap_or_default();

        RawRecord::new("semantic_scholar", data.title.unwrap_or_default())
            .authors(authors)
            .year(data.year.map(|y| y.to_string()).unwrap_or_default())
            .doi(doi)
            .abstract_text(data.r#abstract.unwrap_or_default())
    }
}

#[async_trait]
impl BibliographicSource for SemanticScholarSource {
    fn id(&self) -> &str {
        "semantic_scholar"
    }

    fn name(&self) -> &str {
        "Semantic Scholar"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::DOI_LOOKUP | SourceCapabilities::TITLE_SEARCH
    }

    async fn get_by_doi(&self, doi: &str) -> Result<RawRecord, SourceError> {
        let url = join_url(
            &self.base_url,
            &format!("paper/DOI:{}?fields={}", doi, LOOKUP_FIELDS),
        );
        let data: S2Paper = self
            .client
            .get_json(&url, |req| self.add_api_key_if_present(req))
            .await?;

        Ok(Self::parse_paper(data, Some(doi)))
    }

    async fn search_by_title(
        &self,
        title: &str,
        limit: usize,
    ) -> Result<Vec<RawRecord>, SourceError> {
        let url = join_url(
            &self.base_url,
            &format!(
                "paper/search?query={}&limit={}&fields={}",
                urlencoding::encode(title),
                limit,
                SEARCH_FIELDS
            ),
        );
        let data: S2SearchResponse = self
            .client
            .get_json(&url, |req| self.add_api_key_if_present(req))
            .await?;

        Ok(data
            .data
            .into_iter()
            .map(|paper| Self::parse_paper(paper, None))
            .filter(|record| !record.title.is_empty())
            .collect())
    }
}

// ===== Semantic Scholar API Types =====

#[derive(Debug, Deserialize)]
struct S2Paper {
    title: Option<String>,
    r#abstract: Option<String>,
    year: Option<i32>,
    #[serde(default)]
    authors: Vec<S2Author>,
    #[serde(rename = "externalIds")]
    external_ids: Option<S2ExternalIds>,
}

#[derive(Debug, Deserialize)]
struct S2Author {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2ExternalIds {
    #[serde(rename = "DOI")]
    doi: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2SearchResponse {
    #[serde(default)]
    data: Vec<S2Paper>,
}
