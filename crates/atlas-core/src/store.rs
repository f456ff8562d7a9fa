//! The `AtlasStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `atlas-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  dataset::{Dataset, LoadSummary},
  entity::{Entity, EntityId, Level},
  fact::{DepartmentProductYear, DepartmentYear, ProductYear},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Sort order for distance-ranked results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceSort {
  /// Most feasible products first.
  DistanceAsc,
  DistanceDesc,
}

/// Parameters for [`AtlasStore::department_product_years`].
#[derive(Debug, Clone, Default)]
pub struct DepartmentProductYearQuery {
  pub department_id: Option<EntityId>,
  pub product_id:    Option<EntityId>,
  pub year:          Option<i32>,
  /// Keep rows whose `1 - density` is at most this value.
  pub max_distance:  Option<f64>,
  pub sort:          Option<DistanceSort>,
  pub limit:         Option<usize>,
}

/// Parameters for [`AtlasStore::department_years`].
#[derive(Debug, Clone, Default)]
pub struct DepartmentYearQuery {
  pub department_id: Option<EntityId>,
  pub year:          Option<i32>,
}

/// Parameters for [`AtlasStore::product_years`].
#[derive(Debug, Clone, Default)]
pub struct ProductYearQuery {
  pub product_id: Option<EntityId>,
  pub year:       Option<i32>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an Atlas store backend.
///
/// Reads never mutate; the only write is [`AtlasStore::load`], which replaces
/// nothing and is expected to run from the data pipeline, not from requests.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait AtlasStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Classification metadata ───────────────────────────────────────────

  /// Look up a location or product by primary key. Returns `None` if no row
  /// has that id.
  fn get_entity<L: Level>(
    &self,
    id: EntityId,
  ) -> impl Future<Output = Result<Option<Entity<L>>, Self::Error>> + Send + '_;

  /// List every entity of `L`'s kind, optionally restricted to one level.
  fn list_entities<L: Level>(
    &self,
    level: Option<L>,
  ) -> impl Future<Output = Result<Vec<Entity<L>>, Self::Error>> + Send + '_;

  // ── Fact tables ───────────────────────────────────────────────────────

  /// Query department × product × year rows. Distance filtering and sorting
  /// are evaluated by the backend, not in memory.
  fn department_product_years<'a>(
    &'a self,
    query: &'a DepartmentProductYearQuery,
  ) -> impl Future<Output = Result<Vec<DepartmentProductYear>, Self::Error>>
  + Send
  + 'a;

  fn department_years<'a>(
    &'a self,
    query: &'a DepartmentYearQuery,
  ) -> impl Future<Output = Result<Vec<DepartmentYear>, Self::Error>> + Send + 'a;

  fn product_years<'a>(
    &'a self,
    query: &'a ProductYearQuery,
  ) -> impl Future<Output = Result<Vec<ProductYear>, Self::Error>> + Send + 'a;

  // ── Bulk load ─────────────────────────────────────────────────────────

  /// Validate and write a whole dataset atomically.
  fn load(
    &self,
    dataset: Dataset,
  ) -> impl Future<Output = Result<LoadSummary, Self::Error>> + Send + '_;
}
