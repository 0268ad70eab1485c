use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Qdrant error: {0}")]
    Qdrant(String),

    #[error("TEI embed error: {0}")]
    Tei(String),

    /// The review store could not be read. Never retried.
    #[error("failed to fetch reviews for product '{product_id}': {source}")]
    Retrieval {
        product_id: String,
        #[source]
        source: Box<SentimentError>,
    },

    /// The language model call failed. `status` is the HTTP status when the
    /// model endpoint answered with one.
    #[error("model invocation failed: {message}")]
    ModelInvocation {
        status: Option<u16>,
        message: String,
    },

    /// The model answered with something that is not a JSON object.
    #[error("failed to parse model response: {source}; raw response: {raw}")]
    ResponseParse {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    /// A dependency was disabled at startup (missing credential or store).
    #[error("{0} is not available")]
    Unavailable(&'static str),
}
