//! arXiv source: title search over the Atom API.

use async_trait::async_trait;
use feed_rs::parser;

use crate::config::{HttpConfig, SourcesConfig};
use crate::models::RawRecord;
use crate::sources::{join_url, BibliographicSource, SourceCapabilities, SourceError};
use crate::utils::{HttpClient, USER_AGENT};

/// arXiv source
///
/// Search only; arXiv has no DOI lookup for arbitrary works.
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: HttpClient,
    base_url: String,
}

impl ArxivSource {
    pub fn new(sources: &SourcesConfig, http: &HttpConfig) -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::from_config(USER_AGENT, http)?,
            base_url: sources.arxiv_base_url.clone(),
        })
    }

    /// Point the source at another server (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::new()?,
            base_url: base_url.into(),
        })
    }

    /// Parse an Atom feed body into records
    fn parse_feed(body: &str) -> Result<Vec<RawRecord>, SourceError> {
        let feed = parser::parse(body.as_bytes())
            .map_err(|e| SourceError::Parse(format!("Failed to parse arXiv feed: {}", e)))?;

        Ok(feed
            .entries
            .iter()
            .map(Self::parse_entry)
            .filter(|record| !record.title.is_empty())
            .collect())
    }

    fn parse_entry(entry: &feed_rs::model::Entry) -> RawRecord {
        let title = entry
            .title
            .as_ref()
            .map(|t| t.content.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();

        let authors = entry.authors.iter().map(|a| a.name.trim().to_string()).collect();

        let year = entry
            .published
            .map(|d| d.format("%Y").to_string())
            .unwrap_or_default();

        let abstract_text = entry
            .summary
            .as_ref()
            .map(|s| s.content.trim().to_string())
            .unwrap_or_default();

        RawRecord::new("arxiv", title)
            .authors(authors)
            .year(year)
            .abstract_text(abstract_text)
    }
}

#[async_trait]
impl BibliographicSource for ArxivSource {
    fn id(&self) -> &str {
        "arxiv"
    }

    fn name(&self) -> &str {
        "arXiv"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::TITLE_SEARCH
    }

    async fn search_by_title(
        &self,
        title: &str,
        limit: usize,
    ) -> Result<Vec<RawRecord>, SourceError> {
        let url = join_url(
            &self.base_url,
            &format!(
                "query?search_query={}&start=0&max_results={}",
                urlencoding::encode(&format!("ti:\"{}\"", title)),
                limit
            ),
        );

        let body = self.client.get_text(&url).await?;
        Self::parse_feed(&body)
    }
}
