//! atlas-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) plus `ATLAS_*`
//! environment variables, then either serves the JSON API or bulk-loads a
//! dataset exported by the data pipeline.
//!
//! ```text
//! atlas-server load --file colombia.json
//! atlas-server serve
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use atlas_server::ServerConfig;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Atlas economic complexity API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API.
  Serve,
  /// Load a JSON dataset into the configured database.
  Load {
    /// Dataset file with `locations`, `products` and fact-table arrays.
    #[arg(short, long)]
    file: PathBuf,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let config = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to read config {:?}", cli.config))?;

  match cli.command {
    Command::Serve => atlas_server::serve(&config).await,
    Command::Load { file } => {
      let summary = atlas_server::load_dataset(&config, &file).await?;
      tracing::info!(
        locations = summary.locations,
        products = summary.products,
        department_product_years = summary.department_product_years,
        department_years = summary.department_years,
        product_years = summary.product_years,
        "load complete"
      );
      Ok(())
    }
  }
}
