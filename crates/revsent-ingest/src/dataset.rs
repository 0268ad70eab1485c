//! Olist CSV loading and the reviews → orders → order-items join.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::IngestError;

pub const REVIEWS_FILE: &str = "olist_order_reviews_dataset.csv";
pub const ORDERS_FILE: &str = "olist_orders_dataset.csv";
pub const ORDER_ITEMS_FILE: &str = "olist_order_items_dataset.csv";

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRow {
    pub review_id: String,
    pub order_id: String,
    #[serde(default)]
    pub review_score: Option<String>,
    #[serde(default)]
    pub review_comment_title: Option<String>,
    #[serde(default)]
    pub review_comment_message: Option<String>,
    #[serde(default)]
    pub review_creation_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderRow {
    pub order_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemRow {
    pub order_id: String,
    pub product_id: String,
}

/// The three source tables, as read from disk.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub reviews: Vec<ReviewRow>,
    pub orders: Vec<OrderRow>,
    pub order_items: Vec<OrderItemRow>,
}

/// One review paired with one purchased product.
///
/// A review of an order with several items appears once per item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedReview {
    pub review_id: String,
    pub product_id: String,
    pub review_score: Option<String>,
    pub review_comment_title: Option<String>,
    pub review_comment_message: Option<String>,
    pub review_creation_date: Option<String>,
}

/// Read the three Olist CSV files from `dir`.
///
/// # Errors
///
/// Returns [`IngestError::Csv`] if a file is missing or a row does not match
/// the expected columns.
pub fn load_dataset(dir: &Path) -> Result<Dataset, IngestError> {
    let dataset = Dataset {
        reviews: read_csv(&dir.join(REVIEWS_FILE))?,
        orders: read_csv(&dir.join(ORDERS_FILE))?,
        order_items: read_csv(&dir.join(ORDER_ITEMS_FILE))?,
    };
    tracing::info!(
        dir = %dir.display(),
        reviews = dataset.reviews.len(),
        orders = dataset.orders.len(),
        order_items = dataset.order_items.len(),
        "loaded dataset"
    );
    Ok(dataset)
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, IngestError> {
    let csv_err = |source| IngestError::Csv {
        path: PathBuf::from(path),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(csv_err)?;

    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(csv_err)
}

/// Inner-join reviews with orders, then with order items, on `order_id`.
///
/// Output follows review order; for one review, matches follow the order of
/// the right-hand table. Reviews without a matching order or item are dropped.
#[must_use]
pub fn join_reviews(dataset: &Dataset) -> Vec<JoinedReview> {
    let mut order_counts: HashMap<&str, usize> = HashMap::new();
    for order in &dataset.orders {
        *order_counts.entry(order.order_id.as_str()).or_default() += 1;
    }

    let mut items_by_order: HashMap<&str, Vec<&str>> = HashMap::new();
    for item in &dataset.order_items {
        items_by_order
            .entry(item.order_id.as_str())
            .or_default()
            .push(item.product_id.as_str());
    }

    let mut joined = Vec::new();
    for review in &dataset.reviews {
        let orders = order_counts
            .get(review.order_id.as_str())
            .copied()
            .unwrap_or(0);
        let Some(products) = items_by_order.get(review.order_id.as_str()) else {
            continue;
        };
        for _ in 0..orders {
            for product_id in products {
                joined.push(JoinedReview {
                    review_id: review.review_id.clone(),
                    product_id: (*product_id).to_string(),
                    review_score: review.review_score.clone(),
                    review_comment_title: review.review_comment_title.clone(),
                    review_comment_message: review.review_comment_message.clone(),
                    review_creation_date: review.review_creation_date.clone(),
                });
            }
        }
    }

    tracing::info!(rows = joined.len(), "joined reviews with order items");
    joined
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn write_fixture(dir: &Path) {
        fs::write(
            dir.join(REVIEWS_FILE),
            "review_id,order_id,review_score,review_comment_title,review_comment_message,review_creation_date,review_answer_timestamp\n\
             r1,o1,5,Ótimo,\"Chegou rápido, recomendo\",2018-01-18 00:00:00,2018-01-18 21:46:59\n\
             r2,o2,1,,Veio quebrado,2018-03-10 00:00:00,2018-03-11 03:05:13\n\
             r3,o3,4,,,2018-02-17 00:00:00,2018-02-18 14:36:24\n",
        )
        .expect("write reviews");
        fs::write(
            dir.join(ORDERS_FILE),
            "order_id,customer_id,order_status\no1,c1,delivered\no2,c2,delivered\n",
        )
        .expect("write orders");
        fs::write(
            dir.join(ORDER_ITEMS_FILE),
            "order_id,order_item_id,product_id,price\no1,1,pA,10.0\no2,1,pB,20.0\no2,2,pA,10.0\no3,1,pC,5.0\n",
        )
        .expect("write items");
    }

    #[test]
    fn loads_and_joins_csv_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_fixture(dir.path());

        let dataset = load_dataset(dir.path()).expect("load");
        assert_eq!(dataset.reviews.len(), 3);
        assert_eq!(
            dataset.reviews[0].review_comment_message.as_deref(),
            Some("Chegou rápido, recomendo")
        );
        assert_eq!(dataset.reviews[1].review_comment_title, None);

        let joined = join_reviews(&dataset);
        let pairs: Vec<(&str, &str)> = joined
            .iter()
            .map(|j| (j.review_id.as_str(), j.product_id.as_str()))
            .collect();
        // r3's order has no row in the orders table.
        assert_eq!(pairs, vec![("r1", "pA"), ("r2", "pB"), ("r2", "pA")]);
    }

    #[test]
    fn missing_file_is_a_csv_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_dataset(dir.path()).unwrap_err();
        assert!(
            matches!(err, IngestError::Csv { ref path, .. } if path.ends_with(REVIEWS_FILE)),
            "unexpected error: {err:?}"
        );
    }
}
