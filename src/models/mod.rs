//! Core data models for papers, references and verification results.

mod paper;
mod record;
mod report;

pub use paper::{
    BookInfo, CitationStyle, CitationStyleReport, DocumentFormat, DocumentText, PaperMetadata,
    RankedReference, Reference, RetractionRecord, VerificationStatus,
};
pub use record::{RawAuthors, RawRecord, RawReference};
pub use report::{
    PaperCheck, RankedPaper, ReferenceCheck, ReferenceReport, SearchHit, VerificationReport,
    VerificationStats,
};
