use serde::{Deserialize, Serialize};

/// Aggregate sentiment label. Serialized with the Portuguese labels used by
/// the prompt and the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positivo,
    Negativo,
    Neutro,
    Indeterminado,
}

impl Sentiment {
    /// Parse a model-provided label. Matching ignores case and surrounding
    /// whitespace; anything else yields `None`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "positivo" => Some(Self::Positivo),
            "negativo" => Some(Self::Negativo),
            "neutro" => Some(Self::Neutro),
            "indeterminado" => Some(Self::Indeterminado),
            _ => None,
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::Positivo => write!(f, "Positivo"),
            Sentiment::Negativo => write!(f, "Negativo"),
            Sentiment::Neutro => write!(f, "Neutro"),
            Sentiment::Indeterminado => write!(f, "Indeterminado"),
        }
    }
}

/// Final payload returned for a sentiment-analysis request.
///
/// `review_count` and `average_score` always come from the precomputed
/// statistics snapshot, never from the model or the review sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub review_count: u64,
    pub average_score: f64,
    pub sentiment: Sentiment,
    pub summary: String,
    pub positive_points: Vec<String>,
    pub negative_points: Vec<String>,
    pub top_reviews: Vec<String>,
}
