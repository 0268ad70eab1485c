mod analyze;
mod ingest;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "revsent-cli")]
#[command(about = "revsent review ingestion and sentiment analysis")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compute statistics, embed reviews and store them in Qdrant
    Ingest,
    /// Compute and save product statistics only, then list candidate products
    Stats {
        /// Dataset directory (defaults to REVSENT_DATASET_DIR)
        #[arg(long)]
        dataset_dir: Option<PathBuf>,

        /// Only list products with at least this many distinct reviews
        #[arg(long, default_value_t = 10)]
        min_reviews: u64,

        /// Maximum number of candidates to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Run one sentiment analysis and print the JSON result
    Analyze {
        /// Product identifier
        product_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = revsent_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Ingest) => ingest::run_ingest(&config).await?,
        Some(Commands::Stats {
            dataset_dir,
            min_reviews,
            limit,
        }) => {
            let dir = dataset_dir.unwrap_or_else(|| config.dataset_dir.clone());
            ingest::run_stats(&dir, &config.product_stats_path, min_reviews, limit)?;
        }
        Some(Commands::Analyze { product_id }) => {
            analyze::run_analyze(&config, &product_id).await?;
        }
        None => println!("no command given; run `revsent-cli --help` for usage"),
    }

    Ok(())
}
