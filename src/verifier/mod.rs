//! The verification context.
//!
//! A [`Verifier`] is built once with its sources, citation renderer and
//! settings, then passed to whatever needs it. Report-producing operations
//! never return `Err`: every failure becomes a [`VerificationReport`] with
//! `success = false` and a stable `error_code`.

mod error;

pub use error::VerifyError;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use strsim::jaro_winkler;
use tokio::task::JoinSet;

use crate::config::{Config, ExtractionConfig};
use crate::extract::{extract_structure, strip_leading_marker};
use crate::integrity::{check_retraction, is_retracted};
use crate::models::{
    CitationStyleReport, DocumentFormat, DocumentText, PaperCheck, PaperMetadata, RankedPaper,
    RawRecord, Reference, ReferenceCheck, ReferenceReport, SearchHit, VerificationReport,
    VerificationStatus,
};
use crate::rank::rank_references;
use crate::reconcile::{
    current_year, is_transport_error, normalize_isbn, sanitize_year, validated_doi, Reconciler,
};
use crate::sources::{
    ArxivSource, BibliographicSource, BookSource, CrossRefSource, OpenLibrarySource,
    RetractionRegistry, SemanticScholarSource, SourceError,
};
use crate::utils::{extract_document, CitationFormat, CitationRenderer, TemplateRenderer};

/// Minimum Jaro-Winkler similarity for a search hit to confirm a reference
pub const TITLE_MATCH_THRESHOLD: f64 = 0.90;

/// Shortest hit title accepted as a substring match inside a raw reference
const MIN_CONTAINED_TITLE_CHARS: usize = 15;

/// Sources, renderer and settings for one verification session
#[derive(Debug, Clone)]
pub struct Verifier {
    reconciler: Reconciler,
    search_sources: Vec<Arc<dyn BibliographicSource>>,
    retractions: Arc<dyn RetractionRegistry>,
    books: Arc<dyn BookSource>,
    renderer: Arc<dyn CitationRenderer>,
    extraction: ExtractionConfig,
    style: CitationFormat,
    search_limit: usize,
    current_year: Option<i32>,
}

/// Builder for [`Verifier`]; anything not set falls back to the HTTP sources
/// described by the configuration
#[derive(Debug, Default)]
pub struct VerifierBuilder {
    config: Config,
    primary: Option<Arc<dyn BibliographicSource>>,
    secondary: Option<Arc<dyn BibliographicSource>>,
    search_sources: Option<Vec<Arc<dyn BibliographicSource>>>,
    retractions: Option<Arc<dyn RetractionRegistry>>,
    books: Option<Arc<dyn BookSource>>,
    renderer: Option<Arc<dyn CitationRenderer>>,
    style: Option<CitationFormat>,
    current_year: Option<i32>,
}

impl VerifierBuilder {
    pub fn primary(mut self, source: Arc<dyn BibliographicSource>) -> Self {
        self.primary = Some(source);
        self
    }

    pub fn secondary(mut self, source: Arc<dyn BibliographicSource>) -> Self {
        self.secondary = Some(source);
        self
    }

    /// Sources queried by title when verifying references or checking a paper
    pub fn search_sources(mut self, sources: Vec<Arc<dyn BibliographicSource>>) -> Self {
        self.search_sources = Some(sources);
        self
    }

    pub fn retractions(mut self, registry: Arc<dyn RetractionRegistry>) -> Self {
        self.retractions = Some(registry);
        self
    }

    pub fn books(mut self, source: Arc<dyn BookSource>) -> Self {
        self.books = Some(source);
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn CitationRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Override the configured citation style
    pub fn style(mut self, style: CitationFormat) -> Self {
        self.style = Some(style);
        self
    }

    /// Pin the year used for reference-year sanitization
    pub fn current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    pub fn build(self) -> Result<Verifier, SourceError> {
        let VerifierBuilder {
            config,
            primary,
            secondary,
            search_sources,
            retractions,
            books,
            renderer,
            style,
            current_year,
        } = self;

        let sources = &config.sources;
        let http = &config.http;
        let mut crossref: Option<Arc<CrossRefSource>> = None;
        let mut semantic: Option<Arc<SemanticScholarSource>> = None;

        let primary = match primary {
            Some(source) => source,
            None => shared(&mut crossref, || CrossRefSource::new(sources, http))?
                as Arc<dyn BibliographicSource>,
        };

        let secondary = match secondary {
            Some(source) => source,
            None => shared(&mut semantic, || {
                SemanticScholarSource::new(sources, http, config.api_keys.semantic_scholar.clone())
            })? as Arc<dyn BibliographicSource>,
        };

        let search_sources = match search_sources {
            Some(list) => list,
            None => vec![
                shared(&mut crossref, || CrossRefSource::new(sources, http))?
                    as Arc<dyn BibliographicSource>,
                shared(&mut semantic, || {
                    SemanticScholarSource::new(
                        sources,
                        http,
                        config.api_keys.semantic_scholar.clone(),
                    )
                })? as Arc<dyn BibliographicSource>,
                Arc::new(ArxivSource::new(sources, http)?) as Arc<dyn BibliographicSource>,
            ],
        };

        let retractions = match retractions {
            Some(registry) => registry,
            None => shared(&mut crossref, || CrossRefSource::new(sources, http))?
                as Arc<dyn RetractionRegistry>,
        };

        let books = match books {
            Some(source) => source,
            None => Arc::new(OpenLibrarySource::new(sources, http)?) as Arc<dyn BookSource>,
        };

        for source in [&primary, &secondary] {
            if !source.supports_doi_lookup() {
                return Err(SourceError::InvalidRequest(format!(
                    "{} cannot look up DOIs",
                    source.name()
                )));
            }
        }

        let search_sources: Vec<_> = search_sources
            .into_iter()
            .filter(|source| {
                let searchable = source.supports_title_search();
                if !searchable {
                    tracing::debug!(source = source.name(), "Skipping source without title search");
                }
                searchable
            })
            .collect();

        tracing::debug!(
            primary = primary.id(),
            secondary = secondary.id(),
            search_sources = search_sources.len(),
            "Verifier ready"
        );

        Ok(Verifier {
            reconciler: Reconciler::new(primary, secondary),
            search_sources,
            retractions,
            books,
            renderer: renderer.unwrap_or_else(|| Arc::new(TemplateRenderer)),
            extraction: config.extraction.clone(),
            style: style.unwrap_or(config.citation.style),
            search_limit: config.sources.search_limit,
            current_year,
        })
    }
}

/// Reuse the instance in `slot`, creating it on first use
fn shared<T>(
    slot: &mut Option<Arc<T>>,
    make: impl FnOnce() -> Result<T, SourceError>,
) -> Result<Arc<T>, SourceError> {
    if let Some(existing) = slot {
        return Ok(Arc::clone(existing));
    }
    let created = Arc::new(make()?);
    *slot = Some(Arc::clone(&created));
    Ok(created)
}

impl Verifier {
    pub fn builder(config: Config) -> VerifierBuilder {
        VerifierBuilder {
            config,
            ..VerifierBuilder::default()
        }
    }

    /// Verifier backed by the HTTP sources named in `config`
    pub fn from_config(config: Config) -> Result<Self, SourceError> {
        Self::builder(config).build()
    }

    pub fn style(&self) -> CitationFormat {
        self.style
    }

    fn year(&self) -> i32 {
        self.current_year.unwrap_or_else(current_year)
    }

    /// Canonical metadata for a DOI, merged from the primary and secondary sources
    pub async fn reconcile(&self, identifier: &str) -> Result<PaperMetadata, VerifyError> {
        self.reconciler.reconcile_at(identifier, self.year()).await
    }

    /// Reconcile a DOI, rank its references, check retractions and cite it
    pub async fn verify_doi(&self, identifier: &str) -> VerificationReport {
        match self.reconcile(identifier).await {
            Ok(metadata) => self.finish(metadata, None, None).await,
            Err(e) => failure(&e),
        }
    }

    /// Look up a book by ISBN and cite it
    pub async fn verify_isbn(&self, isbn: &str) -> VerificationReport {
        let Some(normalized) = normalize_isbn(isbn) else {
            return failure(&VerifyError::MalformedIdentifier(isbn.trim().to_string()));
        };

        match self.books.get_by_isbn(&normalized).await {
            Ok(book) => {
                let citation = self.renderer.render(&book.to_metadata(), self.style);
                VerificationReport {
                    book: Some(book),
                    citation: Some(citation),
                    ..VerificationReport::success()
                }
            }
            Err(e) => failure(&lookup_error(normalized, e)),
        }
    }

    /// Full pipeline for a document on disk
    pub async fn verify_document(&self, path: &Path) -> VerificationReport {
        match self.document_metadata(path).await {
            Ok((metadata, style, format)) => self.finish(metadata, Some(style), Some(format)).await,
            Err(e) => failure(&e),
        }
    }

    /// References of a DOI or of a document at `target`, unranked
    pub async fn collect_references(&self, target: &str) -> Result<Vec<Reference>, VerifyError> {
        let path = Path::new(target);
        let metadata = if path.exists() {
            self.document_metadata(path).await?.0
        } else {
            self.reconcile(target).await?
        };
        Ok(metadata.references)
    }

    /// Check one reference against the search sources and the retraction registry
    ///
    /// A reference with a valid DOI that resolves on the primary source is
    /// verified; otherwise each search source is queried by title and a hit
    /// with a close enough title verifies it. A retraction notice overrides
    /// both. Placeholders are left pending.
    pub async fn verify_reference(&self, reference: &Reference) -> ReferenceCheck {
        let mut reference = reference.clone();
        let text = reference.display_text().trim().to_string();

        if reference.is_placeholder() || text.is_empty() {
            return ReferenceCheck {
                reference,
                matches: BTreeMap::new(),
                retracted: Vec::new(),
            };
        }

        let ((matches, verified), retracted) = tokio::join!(
            self.lookup_reference(&reference, &text),
            check_retraction(self.retractions.as_ref(), strip_leading_marker(&text))
        );

        reference.verification_status = if is_retracted(&retracted) {
            VerificationStatus::Retracted
        } else if verified {
            VerificationStatus::Verified
        } else {
            VerificationStatus::Unverifiable
        };

        ReferenceCheck {
            reference,
            matches,
            retracted,
        }
    }

    /// Verify references one at a time and tally the outcomes
    pub async fn verify_references(&self, references: &[Reference]) -> ReferenceReport {
        let mut checks = Vec::with_capacity(references.len());
        for (index, reference) in references.iter().enumerate() {
            tracing::debug!(index, total = references.len(), "Verifying reference");
            checks.push(self.verify_reference(reference).await);
        }

        let report = ReferenceReport::new(checks);
        tracing::info!(
            verified = report.stats.verified,
            unverifiable = report.stats.unverifiable,
            retracted = report.stats.retracted,
            "Reference verification finished"
        );
        report
    }

    /// Free-text lookup across the search sources plus a retraction check
    pub async fn check_paper(&self, query: &str) -> PaperCheck {
        let query = query.trim();
        if query.is_empty() {
            return PaperCheck::default();
        }

        let year = self.year();
        let (results, retracted) = tokio::join!(
            self.search_all(query),
            check_retraction(self.retractions.as_ref(), query)
        );

        let results = results
            .into_iter()
            .map(|(source, records)| {
                let hits = records
                    .into_iter()
                    .map(|record| SearchHit {
                        doi: validated_doi(&record.doi),
                        year: sanitize_year(&record.year, year),
                        title: record.title,
                    })
                    .collect();
                (source, hits)
            })
            .collect();

        PaperCheck {
            query: query.to_string(),
            results,
            retracted,
        }
    }

    /// Rank references, check retraction and render the citation
    async fn finish(
        &self,
        mut metadata: PaperMetadata,
        citation_style: Option<CitationStyleReport>,
        source_format: Option<DocumentFormat>,
    ) -> VerificationReport {
        let citation = self.renderer.render(&metadata, self.style);
        let retraction_info = check_retraction(self.retractions.as_ref(), &metadata.title).await;

        let references = std::mem::take(&mut metadata.references);
        let ranked = rank_references(&metadata.title, metadata.abstract_or_empty(), references);

        VerificationReport {
            paper: Some(RankedPaper::new(metadata, ranked)),
            citation_style,
            citation: Some(citation),
            source_format,
            is_retracted: is_retracted(&retraction_info),
            retraction_info,
            ..VerificationReport::success()
        }
    }

    async fn load_document(path: &Path) -> Result<DocumentText, VerifyError> {
        let owned = path.to_path_buf();
        let document = tokio::task::spawn_blocking(move || extract_document(&owned))
            .await
            .map_err(|e| VerifyError::DecodeFailure(format!("Extraction task failed: {}", e)))??;

        if document.text.trim().is_empty() {
            return Err(VerifyError::EmptyDocument(path.display().to_string()));
        }
        Ok(document)
    }

    /// Extract a document and, when it names a DOI, enrich it from the sources
    async fn document_metadata(
        &self,
        path: &Path,
    ) -> Result<(PaperMetadata, CitationStyleReport, DocumentFormat), VerifyError> {
        let document = Self::load_document(path).await?;
        let year = self.year();
        let extraction = extract_structure(&document, &self.extraction, year);

        let mut metadata = extraction.metadata;
        if let Some(doi) = metadata.doi.clone() {
            match self.reconciler.reconcile_at(&doi, year).await {
                Ok(reconciled) => metadata = prefer_reconciled(metadata, reconciled),
                Err(e) => {
                    tracing::warn!(doi = %doi, error = %e, "Using extracted metadata only");
                }
            }
        }

        Ok((metadata, extraction.citation_style, document.format))
    }

    /// Titles found for a reference per source, and whether any confirms it
    async fn lookup_reference(
        &self,
        reference: &Reference,
        text: &str,
    ) -> (BTreeMap<String, Vec<String>>, bool) {
        if let Some(doi) = reference.doi.as_deref().and_then(validated_doi) {
            let primary = self.reconciler.primary();
            match primary.get_by_doi(&doi).await {
                Ok(record) => {
                    let mut matches = BTreeMap::new();
                    matches.insert(primary.id().to_string(), vec![record.title]);
                    return (matches, true);
                }
                Err(e) => {
                    tracing::debug!(doi = %doi, error = %e, "DOI lookup failed, searching by title");
                }
            }
        }

        let matches: BTreeMap<String, Vec<String>> = self
            .search_all(text)
            .await
            .into_iter()
            .map(|(source, records)| (source, records.into_iter().map(|r| r.title).collect()))
            .collect();

        let verified = matches
            .values()
            .flatten()
            .any(|candidate| titles_match(text, candidate));

        (matches, verified)
    }

    /// Query every search source concurrently; a failing source yields no hits
    async fn search_all(&self, query: &str) -> BTreeMap<String, Vec<RawRecord>> {
        let mut tasks = JoinSet::new();
        for source in &self.search_sources {
            let source = Arc::clone(source);
            let query = query.to_string();
            let limit = self.search_limit;
            tasks.spawn(async move {
                let result = source.search_by_title(&query, limit).await;
                (source.id().to_string(), result)
            });
        }

        let mut results = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((source, Ok(records))) => {
                    results.insert(source, records);
                }
                Ok((source, Err(e))) => {
                    tracing::warn!(source = %source, error = %e, "Search failed, continuing without it");
                    results.insert(source, Vec::new());
                }
                Err(e) => tracing::warn!(error = %e, "Search task did not complete"),
            }
        }
        results
    }
}

fn failure(err: &VerifyError) -> VerificationReport {
    tracing::warn!(code = err.code(), error = %err, "Verification failed");
    VerificationReport::failure(err.code(), err.to_string())
}

fn lookup_error(identifier: String, err: SourceError) -> VerifyError {
    if is_transport_error(&err) {
        tracing::warn!(identifier = %identifier, error = %err, "Lookup source unavailable");
        VerifyError::SourceUnavailable(identifier)
    } else {
        VerifyError::PaperNotFound(identifier)
    }
}

/// Reconciled fields win wherever they are non-empty
fn prefer_reconciled(extracted: PaperMetadata, reconciled: PaperMetadata) -> PaperMetadata {
    PaperMetadata {
        title: if reconciled.title.is_empty() {
            extracted.title
        } else {
            reconciled.title
        },
        authors: if reconciled.authors.is_empty() {
            extracted.authors
        } else {
            reconciled.authors
        },
        year: reconciled.year.or(extracted.year),
        doi: reconciled.doi.or(extracted.doi),
        abstract_text: reconciled.abstract_text.or(extracted.abstract_text),
        keywords: if reconciled.keywords.is_empty() {
            extracted.keywords
        } else {
            reconciled.keywords
        },
        references: if reconciled.references.is_empty() {
            extracted.references
        } else {
            reconciled.references
        },
    }
}

/// Lowercase, drop punctuation, collapse whitespace
fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether `candidate` names the same work as the reference text
///
/// Either the normalized titles are close under Jaro-Winkler, or the
/// reference is a raw entry that contains the candidate title verbatim.
pub fn titles_match(reference: &str, candidate: &str) -> bool {
    let reference = normalize_title(reference);
    let candidate = normalize_title(candidate);
    if reference.is_empty() || candidate.is_empty() {
        return false;
    }

    jaro_winkler(&reference, &candidate) >= TITLE_MATCH_THRESHOLD
        || (candidate.chars().count() >= MIN_CONTAINED_TITLE_CHARS
            && reference.contains(&candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookInfo, RetractionRecord};
    use crate::sources::{MockSource, SourceCapabilities};

    fn record(source: &str, title: &str) -> RawRecord {
        RawRecord::new(source, title)
    }

    fn reference(title: &str) -> Reference {
        Reference {
            title: title.to_string(),
            ..Reference::default()
        }
    }

    struct Fixture {
        primary: Arc<MockSource>,
        search: Arc<MockSource>,
        registry: Arc<MockSource>,
        books: Arc<MockSource>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                primary: Arc::new(MockSource::new("crossref")),
                search: Arc::new(MockSource::new("arxiv")),
                registry: Arc::new(MockSource::new("retractions")),
                books: Arc::new(MockSource::new("openlibrary")),
            }
        }

        fn verifier(&self) -> Verifier {
            Verifier::builder(Config::default())
                .primary(self.primary.clone())
                .secondary(Arc::new(MockSource::new("semantic_scholar")))
                .search_sources(vec![self.search.clone()])
                .retractions(self.registry.clone())
                .books(self.books.clone())
                .current_year(2024)
                .build()
                .unwrap()
        }
    }

    #[test]
    fn test_build_requires_doi_lookup_and_keeps_searchable_sources() {
        let search_only = || -> Arc<dyn BibliographicSource> {
            Arc::new(MockSource::new("arxiv").with_capabilities(SourceCapabilities::TITLE_SEARCH))
        };
        let doi_only: Arc<dyn BibliographicSource> = Arc::new(
            MockSource::new("doi-only").with_capabilities(SourceCapabilities::DOI_LOOKUP),
        );

        let verifier = Verifier::builder(Config::default())
            .primary(Arc::new(MockSource::new("crossref")))
            .secondary(Arc::new(MockSource::new("semantic_scholar")))
            .search_sources(vec![search_only(), doi_only])
            .retractions(Arc::new(MockSource::new("retractions")))
            .books(Arc::new(MockSource::new("openlibrary")))
            .build()
            .unwrap();
        assert_eq!(verifier.search_sources.len(), 1);
        assert_eq!(verifier.search_sources[0].id(), "arxiv");

        let result = Verifier::builder(Config::default())
            .primary(search_only())
            .secondary(Arc::new(MockSource::new("semantic_scholar")))
            .search_sources(Vec::new())
            .retractions(Arc::new(MockSource::new("retractions")))
            .books(Arc::new(MockSource::new("openlibrary")))
            .build();
        assert!(matches!(result, Err(SourceError::InvalidRequest(_))));
    }

    #[test]
    fn test_titles_match() {
        assert!(titles_match("Attention is all you need", "Attention Is All You Need."));
        assert!(titles_match(
            "[1] A. Vaswani et al. Attention is all you need. NeurIPS, 2017.",
            "Attention Is All You Need"
        ));
        assert!(!titles_match("Graph networks", "Protein folding at scale"));
        assert!(!titles_match("", "Anything"));
    }

    #[test]
    fn test_prefer_reconciled_fills_only_non_empty() {
        let extracted = PaperMetadata {
            title: "Extracted Title".to_string(),
            authors: vec!["Extracted Author".to_string()],
            abstract_text: Some("Extracted abstract".to_string()),
            keywords: vec!["kw".to_string()],
            references: vec![reference("[1] Some extracted reference entry")],
            ..PaperMetadata::default()
        };
        let reconciled = PaperMetadata {
            title: "Reconciled Title".to_string(),
            year: Some("2020".to_string()),
            doi: Some("10.1000/xyz123".to_string()),
            ..PaperMetadata::default()
        };

        let merged = prefer_reconciled(extracted, reconciled);
        assert_eq!(merged.title, "Reconciled Title");
        assert_eq!(merged.authors, vec!["Extracted Author"]);
        assert_eq!(merged.year.as_deref(), Some("2020"));
        assert_eq!(merged.abstract_text.as_deref(), Some("Extracted abstract"));
        assert_eq!(merged.keywords, vec!["kw"]);
        assert_eq!(merged.references.len(), 1);
    }

    #[tokio::test]
    async fn test_reference_verified_by_title_search() {
        let mut fixture = Fixture::new();
        fixture.search = Arc::new(
            MockSource::new("arxiv")
                .with_search_results(vec![record("arxiv", "Attention Is All You Need")]),
        );

        let check = fixture
            .verifier()
            .verify_reference(&reference("Attention is all you need"))
            .await;

        assert_eq!(check.reference.verification_status, VerificationStatus::Verified);
        assert_eq!(check.matches["arxiv"], vec!["Attention Is All You Need"]);
        assert!(check.retracted.is_empty());
    }

    #[tokio::test]
    async fn test_retraction_overrides_verified() {
        let mut fixture = Fixture::new();
        fixture.search = Arc::new(
            MockSource::new("arxiv").with_search_results(vec![record("arxiv", "Fake Results")]),
        );
        fixture.registry = Arc::new(MockSource::new("retractions").with_retractions(vec![
            RetractionRecord {
                title: "Retraction: Fake Results".to_string(),
                doi: "10.1000/retracted".to_string(),
            },
        ]));

        let check = fixture.verifier().verify_reference(&reference("Fake Results")).await;
        assert_eq!(check.reference.verification_status, VerificationStatus::Retracted);
        assert_eq!(check.retracted.len(), 1);
    }

    #[tokio::test]
    async fn test_reference_with_doi_uses_primary() {
        let mut fixture = Fixture::new();
        fixture.primary = Arc::new(
            MockSource::new("crossref")
                .with_record("10.1000/xyz123", record("crossref", "Resolved Title")),
        );

        let mut with_doi = reference("Some reference text that differs");
        with_doi.doi = Some("10.1000/xyz123".to_string());

        let check = fixture.verifier().verify_reference(&with_doi).await;
        assert_eq!(check.reference.verification_status, VerificationStatus::Verified);
        assert_eq!(check.matches["crossref"], vec!["Resolved Title"]);
        assert!(fixture.search.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failing_search_leaves_reference_unverifiable() {
        let mut fixture = Fixture::new();
        fixture.search = Arc::new(MockSource::new("arxiv").failing());

        let check = fixture.verifier().verify_reference(&reference("Unknown work")).await;
        assert_eq!(
            check.reference.verification_status,
            VerificationStatus::Unverifiable
        );
        assert!(check.matches["arxiv"].is_empty());
    }

    #[tokio::test]
    async fn test_retraction_query_drops_ordinal_marker() {
        let fixture = Fixture::new();
        fixture
            .verifier()
            .verify_reference(&reference("[3] Smith, J. Fake results. 2019."))
            .await;

        assert_eq!(
            fixture.registry.calls(),
            vec!["retracted:Smith, J. Fake results. 2019."]
        );
    }

    #[tokio::test]
    async fn test_placeholder_stays_pending() {
        let fixture = Fixture::new();
        let check = fixture.verifier().verify_reference(&Reference::placeholder()).await;

        assert_eq!(check.reference.verification_status, VerificationStatus::Pending);
        assert!(fixture.search.calls().is_empty());
        assert!(fixture.registry.calls().is_empty());
    }

    #[tokio::test]
    async fn test_verify_references_tallies() {
        let mut fixture = Fixture::new();
        fixture.search = Arc::new(
            MockSource::new("arxiv").with_search_results(vec![record("arxiv", "Known Work Title")]),
        );

        let report = fixture
            .verifier()
            .verify_references(&[reference("Known Work Title"), reference("Zebra migration")])
            .await;

        assert_eq!(report.checks.len(), 2);
        assert_eq!(report.stats.verified, 1);
        assert_eq!(report.stats.unverifiable, 1);
        assert_eq!(report.stats.unverifiable_titles, vec!["Zebra migration"]);
    }

    #[tokio::test]
    async fn test_verify_isbn() {
        let mut fixture = Fixture::new();
        fixture.books = Arc::new(MockSource::new("openlibrary").with_book(BookInfo {
            isbn: "9780262033848".to_string(),
            title: "Introduction to Algorithms".to_string(),
            authors: vec!["Thomas H. Cormen".to_string()],
            publish_date: "2009".to_string(),
            publisher: "MIT Press".to_string(),
        }));

        let report = fixture.verifier().verify_isbn("978-0-262-03384-8").await;
        assert!(report.success);
        assert_eq!(report.book.unwrap().title, "Introduction to Algorithms");
        assert!(report.citation.unwrap().contains("Introduction to Algorithms"));
    }

    #[tokio::test]
    async fn test_verify_isbn_errors() {
        let fixture = Fixture::new();
        let report = fixture.verifier().verify_isbn("12-34").await;
        assert_eq!(report.error_code.as_deref(), Some("malformed_identifier"));

        let report = fixture.verifier().verify_isbn("0262033844").await;
        assert_eq!(report.error_code.as_deref(), Some("paper_not_found"));

        let mut fixture = Fixture::new();
        fixture.books = Arc::new(MockSource::new("openlibrary").failing());
        let report = fixture.verifier().verify_isbn("0262033844").await;
        assert_eq!(report.error_code.as_deref(), Some("source_unavailable"));
    }

    #[tokio::test]
    async fn test_check_paper() {
        let mut fixture = Fixture::new();
        fixture.search = Arc::new(MockSource::new("arxiv").with_search_results(vec![record(
            "arxiv",
            "Deep Residual Learning",
        )
        .doi("10.1109/CVPR.2016.90")
        .year("2016")]));

        let check = fixture.verifier().check_paper("  deep residual learning ").await;
        assert_eq!(check.query, "deep residual learning");
        let hits = &check.results["arxiv"];
        assert_eq!(hits[0].title, "Deep Residual Learning");
        assert_eq!(hits[0].doi.as_deref(), Some("10.1109/CVPR.2016.90"));
        assert_eq!(hits[0].year.as_deref(), Some("2016"));
        assert!(check.retracted.is_empty());
    }

    #[tokio::test]
    async fn test_missing_document_reports_not_found() {
        let report = Fixture::new()
            .verifier()
            .verify_document(Path::new("/nonexistent/paper.pdf"))
            .await;
        assert!(!report.success);
        assert_eq!(report.error_code.as_deref(), Some("not_found"));
    }

    #[tokio::test]
    async fn test_blank_document_reports_empty() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        std::fs::write(file.path(), "  \n\n ").unwrap();

        let report = Fixture::new().verifier().verify_document(file.path()).await;
        assert_eq!(report.error_code.as_deref(), Some("empty_document"));
    }
}
