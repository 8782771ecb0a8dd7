//! Failures surfaced to callers of the verifier.

use crate::utils::DocumentError;

/// Total failures; anything smaller degrades to an empty or placeholder value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed identifier: {0}")]
    MalformedIdentifier(String),

    #[error("No source could be reached: {0}")]
    SourceUnavailable(String),

    #[error("Paper not found: {0}")]
    PaperNotFound(String),

    #[error("Document contains no text: {0}")]
    EmptyDocument(String),

    #[error("Could not decode document: {0}")]
    DecodeFailure(String),
}

impl VerifyError {
    /// Stable machine-readable code carried in the report
    pub fn code(&self) -> &'static str {
        match self {
            VerifyError::UnsupportedFormat(_) => "unsupported_format",
            VerifyError::NotFound(_) => "not_found",
            VerifyError::MalformedIdentifier(_) => "malformed_identifier",
            VerifyError::SourceUnavailable(_) => "source_unavailable",
            VerifyError::PaperNotFound(_) => "paper_not_found",
            VerifyError::EmptyDocument(_) => "empty_document",
            VerifyError::DecodeFailure(_) => "decode_failure",
        }
    }
}

impl From<DocumentError> for VerifyError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::UnsupportedFormat(ext) => VerifyError::UnsupportedFormat(ext),
            DocumentError::NotFound(path) => VerifyError::NotFound(path),
            e @ (DocumentError::DecodeFailure(_) | DocumentError::Io(_)) => {
                VerifyError::DecodeFailure(e.to_string())
            }
        }
    }
}
