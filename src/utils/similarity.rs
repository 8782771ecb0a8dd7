//! Character-sequence similarity.

/// Similarity of `a` and `b` in `[0, 1]`, ignoring case
///
/// Normalized indel similarity, `2 * M / T` where `M` is the number of
/// matched characters and `T` the combined length. Two empty strings are
/// identical.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    rapidfuzz::fuzz::ratio(a.chars(), b.chars())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identical_and_empty() {
        assert!(close(sequence_ratio("Deep Learning", "deep learning"), 1.0));
        assert!(close(sequence_ratio("", ""), 1.0));
        assert!(close(sequence_ratio("abc", ""), 0.0));
    }

    #[test]
    fn test_disjoint() {
        assert!(close(sequence_ratio("abc", "xyz"), 0.0));
    }

    #[test]
    fn test_known_ratios() {
        // "bcd" matched -> 6/8
        assert!(close(sequence_ratio("abcd", "bcde"), 0.75));
        // "abcd" matched -> 8/9
        assert!(close(sequence_ratio("abxcd", "abcd"), 8.0 / 9.0));
    }

    #[test]
    fn test_symmetric_bounds() {
        let r = sequence_ratio("Graph neural networks", "Neural graph networks");
        assert!((0.0..=1.0).contains(&r));
        assert!(close(r, sequence_ratio("Neural graph networks", "Graph neural networks")));
    }
}
