//! Handlers for `/data/...` fact-table endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/data/department_product_year` | Optional `department_id`, `product_id`, `year`, `max_distance`, `sort`, `limit` |
//! | `GET`  | `/data/department_year` | Optional `department_id`, `year` |
//! | `GET`  | `/data/product_year` | Optional `product_id`, `year` |

use std::sync::Arc;

use atlas_core::{
  entity::EntityId,
  fact::{DepartmentProductYear, DepartmentYear, ProductYear},
  store::{
    AtlasStore, DepartmentProductYearQuery, DepartmentYearQuery, DistanceSort,
    ProductYearQuery,
  },
};
use axum::{
  Json,
  extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{Data, error::ApiError};

// ─── Department × product × year ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DepartmentProductYearParams {
  pub department_id: Option<EntityId>,
  pub product_id:    Option<EntityId>,
  pub year:          Option<i32>,
  /// Upper bound on `1 - density`, in `[0, 1]`.
  pub max_distance:  Option<f64>,
  /// `distance_asc` or `distance_desc`.
  pub sort:          Option<DistanceSort>,
  pub limit:         Option<usize>,
}

/// A stored row plus its derived `distance`.
#[derive(Debug, Serialize)]
pub struct DepartmentProductYearRow {
  #[serde(flatten)]
  pub row:      DepartmentProductYear,
  pub distance: f64,
}

impl From<DepartmentProductYear> for DepartmentProductYearRow {
  fn from(row: DepartmentProductYear) -> Self {
    let distance = row.distance();
    Self { row, distance }
  }
}

/// `GET /data/department_product_year[?department_id=...][&max_distance=...][&sort=distance_asc]`
pub async fn department_product_years<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<DepartmentProductYearParams>,
) -> Result<Json<Data<Vec<DepartmentProductYearRow>>>, ApiError>
where
  S: AtlasStore,
{
  if let Some(max) = params.max_distance
    && !(0.0..=1.0).contains(&max)
  {
    return Err(ApiError::BadRequest(format!(
      "max_distance must be within [0, 1], got {max}"
    )));
  }

  let query = DepartmentProductYearQuery {
    department_id: params.department_id,
    product_id:    params.product_id,
    year:          params.year,
    max_distance:  params.max_distance,
    sort:          params.sort,
    limit:         params.limit,
  };

  let rows = store
    .department_product_years(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(Data::new(rows.into_iter().map(Into::into).collect())))
}

// ─── Department × year ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DepartmentYearParams {
  pub department_id: Option<EntityId>,
  pub year:          Option<i32>,
}

/// `GET /data/department_year[?department_id=...][&year=...]`
pub async fn department_years<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<DepartmentYearParams>,
) -> Result<Json<Data<Vec<DepartmentYear>>>, ApiError>
where
  S: AtlasStore,
{
  let query = DepartmentYearQuery {
    department_id: params.department_id,
    year:          params.year,
  };
  let rows = store
    .department_years(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(Data::new(rows)))
}

// ─── Product × year ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ProductYearParams {
  pub product_id: Option<EntityId>,
  pub year:       Option<i32>,
}

/// `GET /data/product_year[?product_id=...][&year=...]`
pub async fn product_years<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ProductYearParams>,
) -> Result<Json<Data<Vec<ProductYear>>>, ApiError>
where
  S: AtlasStore,
{
  let query = ProductYearQuery {
    product_id: params.product_id,
    year:       params.year,
  };
  let rows = store
    .product_years(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(Data::new(rows)))
}
