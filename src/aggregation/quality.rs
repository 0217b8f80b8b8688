//! Heuristic confidence score for an aggregated unit.

use crate::models::OverlapPair;

const BASE_SCORE: f64 = 85.0;
const OVERLAP_WEIGHT: f64 = 10.0;
const PER_CONTRIBUTOR: f64 = 2.0;
const CONTRIBUTOR_CAP: f64 = 5.0;

/// `85 + mean_ratio × 10 + min(contributors × 2, 5)`, rounded and clamped to [0, 100].
///
/// More tracts and higher average overlap both raise confidence. This is not a
/// statistical bound.
pub fn quality_score(pairs: &[OverlapPair]) -> u8 {
    let contributors = pairs.len() as f64;
    let mean_ratio = if pairs.is_empty() {
        0.0
    } else {
        pairs.iter().map(|p| p.ratio).sum::<f64>() / contributors
    };

    let score = BASE_SCORE
        + mean_ratio * OVERLAP_WEIGHT
        + (contributors * PER_CONTRIBUTOR).min(CONTRIBUTOR_CAP);

    score.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(ratios: &[f64]) -> Vec<OverlapPair> {
        ratios
            .iter()
            .enumerate()
            .map(|(tract, &ratio)| OverlapPair { tract, ratio })
            .collect()
    }

    #[test]
    fn test_no_contributors() {
        assert_eq!(quality_score(&[]), 85);
    }

    #[test]
    fn test_single_full_contributor() {
        // 85 + 10 + 2
        assert_eq!(quality_score(&pairs(&[1.0])), 97);
    }

    #[test]
    fn test_partial_overlap() {
        // 85 + 5 + 4
        assert_eq!(quality_score(&pairs(&[0.5, 0.5])), 94);
    }

    #[test]
    fn test_many_contributors_never_exceed_100() {
        assert_eq!(quality_score(&pairs(&[1.0; 45])), 100);
    }
}
