//! Utility modules supporting verification.
//!
//! - [`HttpClient`]: shared HTTP client with retry on transient failures
//! - [`with_retry`]: execute an operation with exponential backoff
//! - [`extract_document`]: plain text from PDF, DOCX or TXT files
//! - [`sequence_ratio`]: character-sequence similarity used by the ranker
//! - [`CitationRenderer`]: citation strings in IEEE, APA, MLA, Chicago or BibTeX
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use verifai::sources::SourceError;
//! use verifai::utils::{with_retry, RetryConfig};
//!
//! # async fn fetch_data() -> Result<String, SourceError> { Ok("data".to_string()) }
//! # #[tokio::main]
//! # async fn main() -> Result<(), SourceError> {
//! let data = with_retry(RetryConfig::default(), || fetch_data()).await?;
//! # Ok(())
//! # }
//! ```

mod cite;
mod document;
mod http;
mod retry;
mod similarity;

pub use cite::{format_citation, CitationFormat, CitationRenderer, TemplateRenderer};
pub use document::{decode_text, docx_xml_to_text, extract_document, DocumentError};
pub use http::{check_status, HttpClient, USER_AGENT};
pub use retry::{with_retry, RetryConfig, TransientError};
pub use similarity::sequence_ratio;
