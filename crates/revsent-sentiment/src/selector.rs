//! Review selection: filter incomplete records, order by recency, truncate.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::SentimentError;
use crate::store::ReviewStore;
use crate::types::{ScoredReview, Selection, StoredReview};

/// Reviews sent to the model per request.
pub const DEFAULT_MAX_RECENT: usize = 100;
/// Review excerpts returned to the caller.
pub const DEFAULT_MAX_TOP: usize = 3;

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Fetch a product's reviews from `store` and select the most recent ones.
///
/// # Errors
///
/// Returns [`SentimentError::Retrieval`] wrapping the store error if the
/// store cannot be read. The store is called exactly once.
pub async fn select_reviews(
    product_id: &str,
    store: &dyn ReviewStore,
    max_recent: usize,
    max_top: usize,
) -> Result<Selection, SentimentError> {
    let records = store
        .reviews_for_product(product_id)
        .await
        .map_err(|e| SentimentError::Retrieval {
            product_id: product_id.to_string(),
            source: Box::new(e),
        })?;

    let fetched = records.len();
    let selection = select_from(records, max_recent, max_top);
    if let Selection::Reviews { to_analyze, .. } = &selection {
        tracing::debug!(
            product = product_id,
            fetched,
            selected = to_analyze.len(),
            "selected reviews for analysis"
        );
    } else {
        tracing::debug!(
            product = product_id,
            fetched,
            "no valid reviews for analysis"
        );
    }
    Ok(selection)
}

/// Pure selection over already-fetched records.
///
/// Records without a parseable creation date, without a score in 1–5, or
/// with an empty document are dropped. The rest are sorted by date, most
/// recent first. The sort is stable: records with equal dates keep the order
/// in which the store returned them, so the output is deterministic for an
/// unchanged store.
#[must_use]
pub fn select_from(records: Vec<StoredReview>, max_recent: usize, max_top: usize) -> Selection {
    let fetched = records.len();
    let mut valid: Vec<(NaiveDateTime, ScoredReview)> = records
        .into_iter()
        .filter_map(|record| {
            let created = record.review_creation_date.as_deref().and_then(parse_review_date)?;
            let score = record.review_score.as_ref().and_then(parse_review_score)?;
            let text = record.document.filter(|d| !d.trim().is_empty())?;
            Some((created, ScoredReview { text, score }))
        })
        .collect();

    let discarded = fetched - valid.len();
    if discarded > 0 {
        tracing::debug!(discarded, kept = valid.len(), "discarded incomplete review records");
    }

    if valid.is_empty() {
        return Selection::InsufficientData;
    }

    // `sort_by` is stable; reversing the comparison keeps ties in store order.
    valid.sort_by(|(a, _), (b, _)| b.cmp(a));

    let top_reviews = valid
        .iter()
        .take(max_top)
        .map(|(_, r)| r.text.clone())
        .collect();
    let to_analyze = valid
        .into_iter()
        .take(max_recent)
        .map(|(_, r)| r)
        .collect();

    Selection::Reviews {
        to_analyze,
        top_reviews,
    }
}

/// Parse a review creation date. Accepts `YYYY-MM-DD HH:MM:SS`, the ISO `T`
/// separator (both with optional fractional seconds) and bare dates, which
/// are taken as midnight.
#[must_use]
pub fn parse_review_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse a stored review score. Accepts integers, integral floats and
/// numeric strings in the range 1–5.
#[must_use]
pub fn parse_review_score(raw: &serde_json::Value) -> Option<u8> {
    let value = match raw {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if value.fract() != 0.0 || !(1.0..=5.0).contains(&value) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(value as u8)
}

#[cfg(test)]
#[path = "selector_test.rs"]
mod tests;
