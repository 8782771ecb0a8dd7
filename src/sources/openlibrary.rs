//! Open Library source: book metadata by ISBN.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

use crate::config::{HttpConfig, SourcesConfig};
use crate::models::BookInfo;
use crate::sources::{join_url, BookSource, SourceError};
use crate::utils::{HttpClient, USER_AGENT};

#[derive(Debug, Clone)]
pub struct OpenLibrarySource {
    client: HttpClient,
    base_url: String,
}

impl OpenLibrarySource {
    pub fn new(sources: &SourcesConfig, http: &HttpConfig) -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::from_config(USER_AGENT, http)?,
            base_url: sources.openlibrary_base_url.clone(),
        })
    }

    /// Point the source at another server (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::new()?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl BookSource for OpenLibrarySource {
    async fn get_by_isbn(&self, isbn: &str) -> Result<BookInfo, SourceError> {
        let key = format!("ISBN:{}", isbn);
        let url = join_url(
            &self.base_url,
            &format!("api/books?bibkeys={}&format=json&jscmd=data", key),
        );

        let mut data: HashMap<String, OLBook> = self.client.get_json(&url, |req| req).await?;
        let book = data
            .remove(&key)
            .ok_or_else(|| SourceError::NotFound(format!("ISBN {}", isbn)))?;

        Ok(BookInfo {
            isbn: isbn.to_string(),
            title: book.title,
            authors: book.authors.into_iter().map(|a| a.name).collect(),
            publish_date: book.publish_date,
            publisher: book
                .publishers
                .into_iter()
                .next()
                .map(|p| p.name)
                .unwrap_or_default(),
        })
    }
}

// ===== Open Library API Types =====

#[derive(Debug, Deserialize)]
struct OLBook {
    #[serde(default)]
    title: String,
    #[serde(default)]
    authors: Vec<OLNamed>,
    #[serde(default)]
    publish_date: String,
    #[serde(default)]
    publishers: Vec<OLNamed>,
}

#[derive(Debug, Deserialize)]
struct OLNamed {
    name: String,
}
