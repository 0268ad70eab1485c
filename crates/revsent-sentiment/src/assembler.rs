//! Turns the model's raw reply into the final [`SentimentResult`].
//!
//! Parsing is strict: text that is not a JSON object is a
//! [`SentimentError::ResponseParse`] and is never repaired or retried.
//! Field extraction is permissive: a missing or mistyped key becomes an
//! empty value (`""`, `[]`, or `Indeterminado` for the label) instead of an
//! error. Every such default is logged at `warn` so format drift in the
//! model's output shows up in the logs rather than passing silently.

use revsent_core::{ProductStats, Sentiment, SentimentResult};
use serde::de::Error as _;
use serde_json::{Map, Value};

use crate::error::SentimentError;

pub const MAX_POSITIVE_POINTS: usize = 5;
pub const MAX_NEGATIVE_POINTS: usize = 3;

pub const INSUFFICIENT_DATA_SUMMARY: &str = "Não há avaliações suficientes para análise.";

/// Merge the model reply with the precomputed statistics and the selected
/// review excerpts.
///
/// `review_count` and `average_score` always come from `stats`; any such
/// keys in the model reply are ignored.
///
/// # Errors
///
/// Returns [`SentimentError::ResponseParse`] carrying the raw text when
/// `raw_model_output` is not a JSON object.
pub fn assemble(
    product_id: &str,
    raw_model_output: &str,
    stats: &ProductStats,
    top_reviews: Vec<String>,
) -> Result<SentimentResult, SentimentError> {
    let parsed: Value =
        serde_json::from_str(raw_model_output).map_err(|source| SentimentError::ResponseParse {
            raw: raw_model_output.to_string(),
            source,
        })?;

    let Value::Object(object) = parsed else {
        return Err(SentimentError::ResponseParse {
            raw: raw_model_output.to_string(),
            source: serde_json::Error::custom("expected a JSON object"),
        });
    };

    Ok(SentimentResult {
        review_count: stats.review_count,
        average_score: stats.average_score_or_zero(),
        sentiment: sentiment_field(product_id, &object),
        summary: summary_field(product_id, &object),
        positive_points: points_field(product_id, &object, "positive_points", MAX_POSITIVE_POINTS),
        negative_points: points_field(product_id, &object, "negative_points", MAX_NEGATIVE_POINTS),
        top_reviews,
    })
}

/// The fixed payload for a product with no usable stored reviews.
#[must_use]
pub fn insufficient_data_result(stats: &ProductStats) -> SentimentResult {
    SentimentResult {
        review_count: stats.review_count,
        average_score: stats.average_score_or_zero(),
        sentiment: Sentiment::Indeterminado,
        summary: INSUFFICIENT_DATA_SUMMARY.to_string(),
        positive_points: Vec::new(),
        negative_points: Vec::new(),
        top_reviews: Vec::new(),
    }
}

fn sentiment_field(product_id: &str, object: &Map<String, Value>) -> Sentiment {
    match object.get("sentiment").and_then(Value::as_str) {
        Some(label) => Sentiment::from_label(label).unwrap_or_else(|| {
            tracing::warn!(
                product = product_id,
                label,
                "model returned an unknown sentiment label; using Indeterminado"
            );
            Sentiment::Indeterminado
        }),
        None => {
            log_defaulted(product_id, "sentiment");
            Sentiment::Indeterminado
        }
    }
}

fn summary_field(product_id: &str, object: &Map<String, Value>) -> String {
    if let Some(summary) = object.get("summary").and_then(Value::as_str) {
        summary.to_string()
    } else {
        log_defaulted(product_id, "summary");
        String::new()
    }
}

fn points_field(
    product_id: &str,
    object: &Map<String, Value>,
    key: &'static str,
    max: usize,
) -> Vec<String> {
    let Some(items) = object.get(key).and_then(Value::as_array) else {
        log_defaulted(product_id, key);
        return Vec::new();
    };

    let points: Vec<String> = items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();

    if points.len() > max {
        tracing::warn!(
            product = product_id,
            key,
            returned = points.len(),
            max,
            "model returned too many points; truncating"
        );
    }

    points.into_iter().take(max).collect()
}

fn log_defaulted(product_id: &str, key: &'static str) {
    tracing::warn!(
        product = product_id,
        key,
        "model response is missing or mistyped a required key; using an empty value"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> ProductStats {
        ProductStats {
            average_score: Some(4.5),
            review_count: 12,
        }
    }

    fn top() -> Vec<String> {
        vec!["jan 3".to_string(), "jan 2".to_string(), "jan 1".to_string()]
    }

    #[test]
    fn merges_model_fields_with_stats_and_top_reviews() {
        let raw = r#"{
            "sentiment": "Positivo",
            "summary": "Clientes satisfeitos.",
            "positive_points": ["qualidade", "preço"],
            "negative_points": ["entrega"]
        }"#;
        let result = assemble("P1", raw, &stats(), top()).expect("assemble");

        assert_eq!(result.sentiment, Sentiment::Positivo);
        assert_eq!(result.summary, "Clientes satisfeitos.");
        assert_eq!(result.positive_points, vec!["qualidade", "preço"]);
        assert_eq!(result.negative_points, vec!["entrega"]);
        assert_eq!(result.review_count, 12);
        assert!((result.average_score - 4.5).abs() < f64::EPSILON);
        assert_eq!(result.top_reviews, top());
    }

    #[test]
    fn stats_override_model_supplied_aggregates() {
        let raw = r#"{"sentiment": "Negativo", "summary": "", "positive_points": [],
                      "negative_points": [], "review_count": 999, "average_score": 1.0}"#;
        let result = assemble("P1", raw, &stats(), vec![]).expect("assemble");
        assert_eq!(result.review_count, 12);
        assert!((result.average_score - 4.5).abs() < f64::EPSILON);
        assert_eq!(result.sentiment, Sentiment::Negativo);
    }

    #[test]
    fn missing_keys_become_empty_values() {
        let result = assemble("P1", r#"{"sentiment": "Neutro"}"#, &stats(), top())
            .expect("permissive merge");
        assert_eq!(result.sentiment, Sentiment::Neutro);
        assert_eq!(result.summary, "");
        assert!(result.positive_points.is_empty());
        assert!(result.negative_points.is_empty());
    }

    #[test]
    fn missing_or_unknown_sentiment_is_indeterminado() {
        let missing = assemble("P1", r#"{"summary": "x"}"#, &stats(), vec![]).unwrap();
        assert_eq!(missing.sentiment, Sentiment::Indeterminado);

        let unknown = assemble("P1", r#"{"sentiment": "Misto"}"#, &stats(), vec![]).unwrap();
        assert_eq!(unknown.sentiment, Sentiment::Indeterminado);
    }

    #[test]
    fn point_lists_are_bounded_and_skip_non_strings() {
        let raw = r#"{"sentiment": "Positivo", "summary": "s",
                      "positive_points": ["a", 1, "b", "c", "d", "e", "f"],
                      "negative_points": ["x", "y", "z", "w"]}"#;
        let result = assemble("P1", raw, &stats(), vec![]).unwrap();
        assert_eq!(result.positive_points, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(result.negative_points, vec!["x", "y", "z"]);
    }

    #[test]
    fn non_json_output_is_a_parse_failure() {
        let err = assemble("P1", "O sentimento é positivo.", &stats(), top()).unwrap_err();
        assert!(
            matches!(err, SentimentError::ResponseParse { ref raw, .. } if raw == "O sentimento é positivo."),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn fenced_json_is_not_repaired() {
        let raw = "```json\n{\"sentiment\": \"Positivo\"}\n```";
        assert!(matches!(
            assemble("P1", raw, &stats(), vec![]),
            Err(SentimentError::ResponseParse { .. })
        ));
    }

    #[test]
    fn non_object_json_is_a_parse_failure() {
        assert!(matches!(
            assemble("P1", r#"["Positivo"]"#, &stats(), vec![]),
            Err(SentimentError::ResponseParse { .. })
        ));
    }

    #[test]
    fn insufficient_data_placeholder_is_fixed() {
        let result = insufficient_data_result(&stats());
        assert_eq!(result.sentiment, Sentiment::Indeterminado);
        assert_eq!(result.summary, INSUFFICIENT_DATA_SUMMARY);
        assert!(result.positive_points.is_empty());
        assert!(result.negative_points.is_empty());
        assert!(result.top_reviews.is_empty());
        assert_eq!(result.review_count, 12);
    }
}
