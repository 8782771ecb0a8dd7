//! Retraction checks against a retraction registry.

use crate::models::RetractionRecord;
use crate::sources::RetractionRegistry;

/// Retraction notices whose title matches `title`
///
/// Fails open: a registry error is logged and reported as "not known to be
/// retracted". An empty title is never sent to the registry.
pub async fn check_retraction(
    registry: &dyn RetractionRegistry,
    title: &str,
) -> Vec<RetractionRecord> {
    let title = title.trim();
    if title.is_empty() {
        return Vec::new();
    }

    match registry.search_retracted(title).await {
        Ok(records) => {
            if !records.is_empty() {
                tracing::info!(title, notices = records.len(), "Retraction notices found");
            }
            records
        }
        Err(e) => {
            tracing::warn!(title, error = %e, "Retraction check failed, assuming not retracted");
            Vec::new()
        }
    }
}

/// A paper is retracted iff the registry returned at least one notice
pub fn is_retracted(records: &[RetractionRecord]) -> bool {
    !records.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MockSource;

    fn notice() -> RetractionRecord {
        RetractionRecord {
            title: "Retraction: Fake Results".to_string(),
            doi: "10.1000/retract.1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_retraction_found() {
        let registry = MockSource::new("crossref").with_retractions(vec![notice()]);
        let records = check_retraction(&registry, "Fake Results").await;

        assert!(is_retracted(&records));
        assert_eq!(records[0].doi, "10.1000/retract.1");
        assert_eq!(registry.calls(), vec!["retracted:Fake Results"]);
    }

    #[tokio::test]
    async fn test_registry_failure_fails_open() {
        let registry = MockSource::new("crossref").failing();
        let records = check_retraction(&registry, "Anything").await;
        assert!(!is_retracted(&records));
    }

    #[tokio::test]
    async fn test_empty_title_skips_registry() {
        let registry = MockSource::new("crossref").with_retractions(vec![notice()]);
        assert!(check_retraction(&registry, "   ").await.is_empty());
        assert!(registry.calls().is_empty());
    }
}
