//! JSON REST API for Atlas.
//!
//! Exposes an axum [`Router`] backed by any [`atlas_core::store::AtlasStore`].
//! Every successful response is wrapped as `{"data": ...}`. Tracing layers,
//! TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! Router::new().merge(atlas_api::api_router(store.clone()))
//! ```

pub mod data;
pub mod error;
pub mod metadata;

use std::sync::Arc;

use atlas_core::{
  entity::{LocationLevel, ProductLevel},
  store::AtlasStore,
};
use axum::{Router, routing::get};
use serde::Serialize;

pub use error::ApiError;

/// The `{"data": ...}` response envelope.
#[derive(Debug, Serialize)]
pub struct Data<T> {
  pub data: T,
}

impl<T> Data<T> {
  pub fn new(data: T) -> Self { Self { data } }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: AtlasStore + 'static,
{
  Router::new()
    // Classification metadata
    .route("/metadata/locations", get(metadata::lookup::<S, LocationLevel>))
    .route(
      "/metadata/locations/{entity_id}",
      get(metadata::get_one::<S, LocationLevel>),
    )
    .route("/metadata/products", get(metadata::lookup::<S, ProductLevel>))
    .route(
      "/metadata/products/{entity_id}",
      get(metadata::get_one::<S, ProductLevel>),
    )
    // Fact tables
    .route(
      "/data/department_product_year",
      get(data::department_product_years::<S>),
    )
    .route("/data/department_year", get(data::department_years::<S>))
    .route("/data/product_year", get(data::product_years::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────
