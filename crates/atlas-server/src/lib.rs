//! HTTP server assembly for Atlas.
//!
//! Layers configuration, the SQLite store and the JSON API into a runnable
//! server. The binary in `main.rs` is a thin CLI over [`serve`] and
//! [`load_dataset`].

use std::{
  fs::File,
  io::BufReader,
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use atlas_core::{
  dataset::{Dataset, LoadSummary},
  store::AtlasStore,
};
use atlas_store_sqlite::SqliteStore;
use axum::Router;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ATLAS_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  pub database_path: PathBuf,
}

impl ServerConfig {
  /// Read `path` (optional) and overlay `ATLAS_*` environment variables.
  pub fn load(path: impl Into<PathBuf>) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8001)?
      .set_default("database_path", "atlas.db")?
      .add_source(config::File::from(path.into()).required(false))
      .add_source(config::Environment::with_prefix("ATLAS"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// The configured database path with a leading `~` expanded.
  pub fn resolved_database_path(&self) -> PathBuf {
    expand_tilde(&self.database_path)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API router with request tracing.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: AtlasStore + 'static,
{
  atlas_api::api_router(store).layer(TraceLayer::new_for_http())
}

async fn open_store(config: &ServerConfig) -> anyhow::Result<SqliteStore> {
  let path = config.resolved_database_path();
  SqliteStore::open(&path)
    .await
    .with_context(|| format!("failed to open store at {path:?}"))
}

// ─── Commands ─────────────────────────────────────────────────────────────────

/// Open the configured store and serve the API until the process exits.
pub async fn serve(config: &ServerConfig) -> anyhow::Result<()> {
  let store = open_store(config).await?;
  let app = router(Arc::new(store));
  let address = config.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}

/// Bulk-load the JSON dataset at `file` into the configured store.
pub async fn load_dataset(
  config: &ServerConfig,
  file: &Path,
) -> anyhow::Result<LoadSummary> {
  let reader = BufReader::new(
    File::open(file).with_context(|| format!("failed to open {file:?}"))?,
  );
  let dataset = Dataset::from_reader(reader)
    .with_context(|| format!("failed to parse dataset {file:?}"))?;

  let store = open_store(config).await?;
  let summary = store
    .load(dataset)
    .await
    .with_context(|| format!("failed to load dataset {file:?}"))?;
  Ok(summary)
}
