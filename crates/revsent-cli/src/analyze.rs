//! One-shot sentiment analysis from the command line.

use revsent_core::AppConfig;
use revsent_sentiment::{AnalysisOutcome, ServiceContext};

/// Analyze `product_id` with the same context the server builds and print
/// the result as pretty JSON.
///
/// # Errors
///
/// Returns an error for an unknown product or any analysis failure.
pub(crate) async fn run_analyze(config: &AppConfig, product_id: &str) -> anyhow::Result<()> {
    let context = ServiceContext::from_config(config);
    let result = match context.analyze_product(product_id).await? {
        AnalysisOutcome::NotFound => {
            anyhow::bail!("Product with ID '{product_id}' not found in the statistics file.")
        }
        AnalysisOutcome::InsufficientData(result) | AnalysisOutcome::Assembled(result) => result,
    };
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
