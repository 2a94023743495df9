// Keyword statistics: display percentages derived from stored scores.
//
// Never persisted; computed from a KeywordSet whenever someone asks.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Guards the inverse against a zero score.
pub const EPSILON: f64 = 1e-12;

/// One keyword with its stored score and its share of the whole set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordStat {
    pub word: String,
    pub score: f64,
    pub percent: f64,
}

/// Round to one decimal place, ties to even (0.25 -> 0.2, 0.75 -> 0.8).
///
/// Ties are judged on `value * 10` as an f64, so a value whose binary form
/// sits just off a tie can land on the other side of it.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Inverse-score normalization for relevance scores (lower = better).
///
///   weight_i = (1 / (score_i + eps)) / sum_j (1 / (score_j + eps))
///   percent_i = round(weight_i * 100, 1)
///
/// Sorted by percent descending; equal percents keep input order.
pub fn normalize(entries: &[(String, f64)]) -> Vec<KeywordStat> {
    if entries.is_empty() {
        return Vec::new();
    }

    let inverses: Vec<f64> = entries
        .iter()
        .map(|(_, score)| 1.0 / (score + EPSILON))
        .collect();
    let total: f64 = inverses.iter().sum();
    let total = if total.is_finite() && total != 0.0 { total } else { 1.0 };

    let stats = entries
        .iter()
        .zip(inverses)
        .map(|((word, score), inverse)| KeywordStat {
            word: word.clone(),
            score: *score,
            percent: round1(inverse / total * 100.0),
        })
        .collect();

    sort_by_percent(stats)
}

/// Percentages for frequency counts: each count's share of all counted
/// tokens, exactly as the counter reported it.
pub fn frequency_percentages(entries: &[(String, f64)], total_tokens: u64) -> Vec<KeywordStat> {
    if entries.is_empty() || total_tokens == 0 {
        return Vec::new();
    }

    let stats = entries
        .iter()
        .map(|(word, count)| KeywordStat {
            word: word.clone(),
            score: *count,
            percent: round1(100.0 * count / total_tokens as f64),
        })
        .collect();

    sort_by_percent(stats)
}

fn sort_by_percent(mut stats: Vec<KeywordStat>) -> Vec<KeywordStat> {
    stats.sort_by(|a, b| b.percent.partial_cmp(&a.percent).unwrap_or(Ordering::Equal));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
        pairs.iter().map(|(w, s)| (w.to_string(), *s)).collect()
    }

    #[test]
    fn test_equal_scores_split_evenly() {
        let stats = normalize(&entries(&[("x", 1.0), ("y", 1.0)]));
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].percent, 50.0);
        assert_eq!(stats[1].percent, 50.0);
        // Ties keep input order
        assert_eq!(stats[0].word, "x");
        assert_eq!(stats[1].word, "y");
    }

    #[test]
    fn test_empty_map_gives_empty_stats() {
        assert!(normalize(&[]).is_empty());
        assert!(frequency_percentages(&[], 10).is_empty());
    }

    #[test]
    fn test_lower_score_gets_higher_percent() {
        let stats = normalize(&entries(&[("weak", 0.3), ("strong", 0.1)]));
        assert_eq!(stats[0].word, "strong");
        assert_eq!(stats[0].percent, 75.0);
        assert_eq!(stats[1].word, "weak");
        assert_eq!(stats[1].percent, 25.0);
        assert_eq!(stats[0].score, 0.1);
    }

    #[test]
    fn test_zero_score_does_not_divide_by_zero() {
        let stats = normalize(&entries(&[("exact", 0.0), ("other", 0.5)]));
        assert_eq!(stats[0].word, "exact");
        assert_eq!(stats[0].percent, 100.0);
        assert_eq!(stats[1].percent, 0.0);
    }

    #[test]
    fn test_percentages_sum_to_about_100() {
        let input = entries(&[
            ("invoice", 0.021),
            ("due date", 0.048),
            ("late fee", 0.09),
            ("consulting services", 0.13),
            ("payment", 0.2),
            ("march", 0.41),
            ("reference", 0.77),
        ]);
        let stats = normalize(&input);
        let sum: f64 = stats.iter().map(|s| s.percent).sum();
        let tolerance = input.len() as f64 * 0.05 + 1e-9;
        assert!((sum - 100.0).abs() <= tolerance, "sum was {sum}");

        for pair in stats.windows(2) {
            assert!(pair[0].percent >= pair[1].percent);
        }
    }

    #[test]
    fn test_frequency_percentages_use_total_tokens() {
        let stats = frequency_percentages(&entries(&[("paid", 1.0), ("invoice", 2.0)]), 3);
        assert_eq!(stats[0].word, "invoice");
        assert_eq!(stats[0].percent, 66.7);
        assert_eq!(stats[1].word, "paid");
        assert_eq!(stats[1].percent, 33.3);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(66.666), 66.7);
        assert_eq!(round1(33.333), 33.3);
        assert_eq!(round1(50.0), 50.0);
        assert_eq!(round1(0.25), 0.2);
        assert_eq!(round1(0.75), 0.8);
        assert_eq!(round1(100.0 * 1.0 / 400.0), 0.2);
    }
}
