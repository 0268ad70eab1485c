//! Per-product aggregation over the joined dataset.

use std::collections::{BTreeMap, HashSet};

use revsent_core::{round2, ProductStats, ProductStatsMap};

use crate::dataset::JoinedReview;

#[derive(Default)]
struct Accumulator<'a> {
    score_sum: f64,
    scored_rows: u32,
    review_ids: HashSet<&'a str>,
}

/// Group joined rows by product: mean score over numeric scores (rounded to
/// 2 decimals) and the number of distinct review ids.
///
/// Every joined row counts once, so a review of an order with two units of
/// the same product weighs twice in that product's mean.
#[must_use]
pub fn compute_product_stats(rows: &[JoinedReview]) -> ProductStatsMap {
    let mut groups: BTreeMap<&str, Accumulator<'_>> = BTreeMap::new();

    for row in rows {
        let group = groups.entry(row.product_id.as_str()).or_default();
        group.review_ids.insert(row.review_id.as_str());
        if let Some(score) = row.review_score.as_deref().and_then(numeric_score) {
            group.score_sum += score;
            group.scored_rows += 1;
        }
    }

    groups
        .into_iter()
        .map(|(product_id, group)| {
            let average_score = (group.scored_rows > 0)
                .then(|| round2(group.score_sum / f64::from(group.scored_rows)));
            let stats = ProductStats {
                average_score,
                review_count: u64::try_from(group.review_ids.len()).unwrap_or(u64::MAX),
            };
            (product_id.to_string(), stats)
        })
        .collect()
}

fn numeric_score(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Products with at least `min_reviews` distinct reviews, lowest average
/// first. Products without an average sort last.
#[must_use]
pub fn product_candidates(
    stats: &ProductStatsMap,
    min_reviews: u64,
) -> Vec<(&str, &ProductStats)> {
    let mut candidates: Vec<(&str, &ProductStats)> = stats
        .iter()
        .filter(|(_, s)| s.review_count >= min_reviews)
        .map(|(id, s)| (id.as_str(), s))
        .collect();

    candidates.sort_by(|(_, a), (_, b)| match (a.average_score, b.average_score) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(review_id: &str, product_id: &str, score: Option<&str>) -> JoinedReview {
        JoinedReview {
            review_id: review_id.to_string(),
            product_id: product_id.to_string(),
            review_score: score.map(str::to_string),
            review_comment_title: None,
            review_comment_message: None,
            review_creation_date: None,
        }
    }

    #[test]
    fn mean_is_rounded_and_reviews_are_distinct() {
        let rows = vec![
            row("r1", "pA", Some("5")),
            row("r2", "pA", Some("4")),
            row("r3", "pA", Some("4")),
            // Same review, second unit of the product: counted in the mean, not the count.
            row("r3", "pA", Some("4")),
            row("r4", "pB", Some("1")),
        ];
        let stats = compute_product_stats(&rows);

        assert_eq!(stats.len(), 2);
        let a = &stats["pA"];
        assert_eq!(a.review_count, 3);
        assert_eq!(a.average_score, Some(4.25));
        assert_eq!(stats["pB"].average_score, Some(1.0));
    }

    #[test]
    fn repeating_means_round_to_two_decimals() {
        let rows = vec![
            row("r1", "pA", Some("5")),
            row("r2", "pA", Some("4")),
            row("r3", "pA", Some("4")),
        ];
        assert_eq!(compute_product_stats(&rows)["pA"].average_score, Some(4.33));
    }

    #[test]
    fn exact_half_cent_means_round_to_even() {
        let mut rows = vec![row("r0", "pA", Some("5"))];
        for i in 1..8 {
            rows.push(row(&format!("r{i}"), "pA", Some("4")));
        }
        // 33 / 8 = 4.125
        assert_eq!(compute_product_stats(&rows)["pA"].average_score, Some(4.12));
    }

    #[test]
    fn non_numeric_scores_are_excluded_from_the_mean() {
        let rows = vec![
            row("r1", "pA", Some("5")),
            row("r2", "pA", Some("n/a")),
            row("r3", "pA", None),
            row("r4", "pB", Some("")),
        ];
        let stats = compute_product_stats(&rows);
        assert_eq!(stats["pA"].average_score, Some(5.0));
        assert_eq!(stats["pA"].review_count, 3);
        assert_eq!(stats["pB"].average_score, None);
        assert_eq!(stats["pB"].review_count, 1);
    }

    #[test]
    fn candidates_filter_and_sort_ascending() {
        let mut stats = ProductStatsMap::new();
        for (id, avg, count) in [
            ("high", Some(4.8), 20),
            ("low", Some(1.5), 12),
            ("few", Some(1.0), 3),
            ("none", None, 15),
        ] {
            stats.insert(
                id.to_string(),
                ProductStats {
                    average_score: avg,
                    review_count: count,
                },
            );
        }

        let ids: Vec<&str> = product_candidates(&stats, 10)
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec!["low", "high", "none"]);
    }
}
