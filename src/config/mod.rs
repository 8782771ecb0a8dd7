//! Configuration management.
//!
//! Defaults are valid on their own. A TOML file and `VERIFAI__*` environment
//! variables are layered on top, in that order.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::CitationFormat;

/// Environment variable prefix, e.g. `VERIFAI__HTTP__TIMEOUT_SECONDS=10`
pub const ENV_PREFIX: &str = "VERIFAI";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Bibliographic source endpoints
    #[serde(default)]
    pub sources: SourcesConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeys,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Structural extraction windows
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Citation rendering
    #[serde(default)]
    pub citation: CitationConfig,
}

/// Base URLs and query settings for each bibliographic source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_crossref_base_url")]
    pub crossref_base_url: String,

    #[serde(default = "default_semantic_scholar_base_url")]
    pub semantic_scholar_base_url: String,

    #[serde(default = "default_arxiv_base_url")]
    pub arxiv_base_url: String,

    #[serde(default = "default_openlibrary_base_url")]
    pub openlibrary_base_url: String,

    /// Contact address sent to CrossRef for its polite pool
    #[serde(default)]
    pub mailto: Option<String>,

    /// Maximum hits requested per title search
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            crossref_base_url: default_crossref_base_url(),
            semantic_scholar_base_url: default_semantic_scholar_base_url(),
            arxiv_base_url: default_arxiv_base_url(),
            openlibrary_base_url: default_openlibrary_base_url(),
            mailto: None,
            search_limit: default_search_limit(),
        }
    }
}

fn default_crossref_base_url() -> String {
    "https://api.crossref.org".to_string()
}

fn default_semantic_scholar_base_url() -> String {
    "https://api.semanticscholar.org/graph/v1".to_string()
}

fn default_arxiv_base_url() -> String {
    "https://export.arxiv.org/api".to_string()
}

fn default_openlibrary_base_url() -> String {
    "https://openlibrary.org".to_string()
}

fn default_search_limit() -> usize {
    5
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeys {
    /// Semantic Scholar API key (optional, for higher rate limits)
    #[serde(default)]
    pub semantic_scholar: Option<String>,
}

impl Default for ApiKeys {
    fn default() -> Self {
        Self {
            semantic_scholar: std::env::var("SEMANTIC_SCHOLAR_API_KEY").ok(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Total attempts per request; 1 disables retry
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_attempts() -> usize {
    1
}

/// How far into the document title and author heuristics may look
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Characters scanned for a title
    #[serde(default = "default_title_window")]
    pub title_window: usize,

    /// Characters scanned for an author line
    #[serde(default = "default_authors_window")]
    pub authors_window: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            title_window: default_title_window(),
            authors_window: default_authors_window(),
        }
    }
}

fn default_title_window() -> usize {
    1000
}

fn default_authors_window() -> usize {
    2000
}

/// Citation rendering configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CitationConfig {
    #[serde(default)]
    pub style: CitationFormat,
}

/// Load configuration from `path` layered with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    settings.try_deserialize()
}

/// Load configuration from environment variables only
pub fn load_env_config() -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    settings.try_deserialize()
}

/// Find the first existing config file in the standard locations
///
/// Checks `./verifai.toml`, then `<config dir>/verifai/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("verifai.toml");
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("verifai").join("config.toml"))
        .filter(|path| path.is_file())
}

/// Resolve configuration from an explicit path, a discovered file, or defaults
pub fn get_config(explicit: Option<&Path>) -> Result<Config, config::ConfigError> {
    match explicit.map(Path::to_path_buf).or_else(find_config_file) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading config file");
            load_config(&path)
        }
        None => load_env_config(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sources.search_limit, 5);
        assert_eq!(config.sources.crossref_base_url, "https://api.crossref.org");
        assert_eq!(config.http.timeout_seconds, 30);
        assert_eq!(config.http.max_attempts, 1);
        assert_eq!(config.extraction.title_window, 1000);
        assert_eq!(config.extraction.authors_window, 2000);
        assert_eq!(config.citation.style, CitationFormat::Ieee);
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[sources]\nmailto = \"ops@example.org\"\nsearch_limit = 3\n\n[citation]\nstyle = \"apa\""
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.sources.mailto.as_deref(), Some("ops@example.org"));
        assert_eq!(config.sources.search_limit, 3);
        assert_eq!(config.sources.arxiv_base_url, "https://export.arxiv.org/api");
        assert_eq!(config.citation.style, CitationFormat::Apa);
        assert_eq!(config.http.timeout_seconds, 30);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join("absent.toml")).is_err());
    }
}
