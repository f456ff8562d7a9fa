//! Error types for `atlas-core`.

use thiserror::Error;

use crate::entity::{EntityId, EntityKind};

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown {kind} level: {value:?}")]
  UnknownLevel { kind: EntityKind, value: String },

  #[error(
    "department_product_year {row_id}: density {density} is outside [0, 1]"
  )]
  DensityOutOfRange { row_id: i64, density: f64 },

  #[error("{kind} {id} references missing parent {parent_id}")]
  MissingParent {
    kind:      EntityKind,
    id:        EntityId,
    parent_id: EntityId,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
