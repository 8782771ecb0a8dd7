//! Reference relevance ranking.
//!
//! Each reference is scored by how closely its title resembles the citing
//! paper's title and, more loosely, its title plus abstract. There is no
//! ground truth; the score only orders references.

use crate::models::{RankedReference, Reference};
use crate::utils::sequence_ratio;

/// Weight of the title-to-title similarity
pub const TITLE_WEIGHT: f64 = 0.7;

/// Weight of the title-to-content similarity
pub const CONTENT_WEIGHT: f64 = 0.3;

/// Round to two decimal places
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Score one reference against the paper's title and abstract
pub fn score_reference(title: &str, abstract_text: &str, reference: &Reference) -> f64 {
    let title_similarity = sequence_ratio(title, &reference.title);

    let content_similarity = if reference.title.is_empty() {
        0.0
    } else {
        let content = format!("{} {}", title, abstract_text);
        sequence_ratio(content.trim_end(), &reference.title)
    };

    (TITLE_WEIGHT * title_similarity + CONTENT_WEIGHT * content_similarity).clamp(0.0, 1.0)
}

/// Score every reference and sort them by descending score
///
/// The sort is stable: equal scores keep their input order.
pub fn rank_references(
    title: &str,
    abstract_text: &str,
    references: Vec<Reference>,
) -> Vec<RankedReference> {
    let mut ranked: Vec<RankedReference> = references
        .into_iter()
        .map(|reference| {
            let score = score_reference(title, abstract_text, &reference);
            RankedReference {
                reference,
                similarity_score: score,
                similarity_percentage: round2(score * 100.0),
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));

    tracing::debug!(count = ranked.len(), "References ranked");
    ranked
}
