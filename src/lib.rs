//! # VerifAI
//!
//! Verification of scholarly papers: structural extraction of references and
//! front matter from document text, metadata reconciliation across
//! bibliographic sources, reference relevance ranking and retraction checks.
//!
//! ## Architecture
//!
//! - [`extract`]: references, metadata and citation style from raw text
//! - [`reconcile`]: DOI-driven merge of a primary and a secondary record
//! - [`rank`]: reference relevance scoring
//! - [`integrity`]: retraction registry lookups
//! - [`sources`]: CrossRef, Semantic Scholar, arXiv and Open Library adapters
//! - [`verifier`]: the [`Verifier`] context that ties the stages together
//! - [`models`]: records passed between stages and handed to callers
//! - [`utils`]: HTTP, retry, document text extraction, similarity, citations
//! - [`config`]: configuration management
//!
//! ```rust,no_run
//! use verifai::config::Config;
//! use verifai::Verifier;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let verifier = Verifier::from_config(Config::default())?;
//! let report = verifier.verify_doi("10.1038/nature14539").await;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod extract;
pub mod integrity;
pub mod models;
pub mod rank;
pub mod reconcile;
pub mod sources;
pub mod utils;
pub mod verifier;

pub use models::{PaperMetadata, Reference, VerificationReport};
pub use verifier::{Verifier, VerifierBuilder, VerifyError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
