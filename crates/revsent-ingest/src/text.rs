//! Review document text and the payloads written to the vector store.

use revsent_sentiment::selector::parse_review_score;
use revsent_sentiment::ReviewDocument;

use crate::dataset::JoinedReview;

/// `"title. message"` when both are present, otherwise whichever is
/// non-empty. Both parts are trimmed; the result may be empty.
#[must_use]
pub fn combine_review_text(title: Option<&str>, message: Option<&str>) -> String {
    let title = title.map_or("", str::trim);
    let message = message.map_or("", str::trim);
    match (title.is_empty(), message.is_empty()) {
        (false, false) => format!("{title}. {message}"),
        (false, true) => title.to_string(),
        (true, false) => message.to_string(),
        (true, true) => String::new(),
    }
}

/// Build one document per joined row that has review text.
///
/// The synthetic id is `review_<row index>` over the joined rows, so ids
/// stay stable across runs on the same dataset.
#[must_use]
pub fn prepare_documents(rows: &[JoinedReview]) -> Vec<ReviewDocument> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let document = combine_review_text(
                row.review_comment_title.as_deref(),
                row.review_comment_message.as_deref(),
            );
            if document.is_empty() {
                return None;
            }
            let review_score = row
                .review_score
                .as_ref()
                .and_then(|s| parse_review_score(&serde_json::Value::String(s.clone())));
            Some(ReviewDocument {
                id: format!("review_{index}"),
                document,
                product_id: row.product_id.clone(),
                review_score,
                review_creation_date: row.review_creation_date.clone(),
                review_comment_title: row.review_comment_title.clone().unwrap_or_default(),
                review_comment_message: row.review_comment_message.clone().unwrap_or_default(),
            })
        })
        .collect()
}
