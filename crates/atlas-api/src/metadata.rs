//! Handlers for `/metadata/{locations,products}` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/metadata/locations` | Optional `?entity_id=` or `?level=country\|department\|municipality` |
//! | `GET`  | `/metadata/locations/:entity_id` | 404 if not found |
//! | `GET`  | `/metadata/products` | Optional `?entity_id=` or `?level=section\|2digit\|4digit` |
//! | `GET`  | `/metadata/products/:entity_id` | 404 if not found |
//!
//! Both endpoint families are the same generic handlers instantiated with
//! [`LocationLevel`](atlas_core::entity::LocationLevel) or
//! [`ProductLevel`](atlas_core::entity::ProductLevel).

use std::sync::Arc;

use atlas_core::{
  entity::{Entity, EntityId, Level},
  store::AtlasStore,
};
use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{Data, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct LookupParams {
  /// Primary key; `0` is a real id, not "unset".
  pub entity_id: Option<EntityId>,
  /// Level name. Ignored when `entity_id` is present.
  pub level:     Option<String>,
}

/// Either a single entity (lookup by id) or a list (level filter).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Lookup<L> {
  One(Entity<L>),
  Many(Vec<Entity<L>>),
}

async fn fetch<S, L>(store: &S, id: EntityId) -> Result<Entity<L>, ApiError>
where
  S: AtlasStore,
  L: Level,
{
  store
    .get_entity::<L>(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("{} {id} not found", L::KIND)))
}

/// `GET /metadata/<kind>[?entity_id=<id>][&level=<level>]`
///
/// An unknown level matches nothing and yields an empty list.
pub async fn lookup<S, L>(
  State(store): State<Arc<S>>,
  Query(params): Query<LookupParams>,
) -> Result<Json<Data<Lookup<L>>>, ApiError>
where
  S: AtlasStore,
  L: Level,
{
  if let Some(id) = params.entity_id {
    let entity = fetch::<S, L>(&store, id).await?;
    return Ok(Json(Data::new(Lookup::One(entity))));
  }

  let level = match params.level.as_deref().map(L::parse).transpose() {
    Ok(level) => level,
    Err(e) => {
      tracing::debug!(error = %e, "level matches no entities");
      return Ok(Json(Data::new(Lookup::Many(Vec::new()))));
    }
  };

  let entities = store
    .list_entities(level)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(Data::new(Lookup::Many(entities))))
}

/// `GET /metadata/<kind>/:entity_id`
pub async fn get_one<S, L>(
  State(store): State<Arc<S>>,
  Path(entity_id): Path<EntityId>,
) -> Result<Json<Data<Entity<L>>>, ApiError>
where
  S: AtlasStore,
  L: Level,
{
  let entity = fetch::<S, L>(&store, entity_id).await?;
  Ok(Json(Data::new(entity)))
}
