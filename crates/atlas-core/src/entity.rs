//! Classification entities, the hierarchical metadata that fact rows point at.
//!
//! Locations and HS products share one shape and differ only in the set of
//! levels they can sit at, so both are expressed as [`Entity<L>`] over a
//! [`Level`] enumeration.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

/// Primary key of a location or product. Zero is a valid id.
pub type EntityId = i64;

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// Which classification table an entity lives in.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
  Location,
  Product,
}

// ─── Levels ──────────────────────────────────────────────────────────────────

/// A classification tier. Implemented by [`LocationLevel`] and
/// [`ProductLevel`]; the wire string is the same for serde and the database.
pub trait Level:
  Copy
  + Eq
  + fmt::Debug
  + FromStr
  + AsRef<str>
  + Serialize
  + DeserializeOwned
  + Send
  + Sync
  + 'static
{
  /// The entity kind whose rows carry this level.
  const KIND: EntityKind;

  /// Parse a wire string, reporting unknown values as
  /// [`Error::UnknownLevel`].
  fn parse(value: &str) -> Result<Self> {
    value.parse().map_err(|_| Error::UnknownLevel {
      kind:  Self::KIND,
      value: value.to_owned(),
    })
  }
}

/// Geographic tiers, from the whole country down to municipalities.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LocationLevel {
  Country,
  Department,
  Municipality,
}

impl Level for LocationLevel {
  const KIND: EntityKind = EntityKind::Location;
}

/// Harmonized System tiers.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  AsRefStr, EnumString,
)]
pub enum ProductLevel {
  #[serde(rename = "section")]
  #[strum(serialize = "section")]
  Section,
  #[serde(rename = "2digit")]
  #[strum(serialize = "2digit")]
  TwoDigit,
  #[serde(rename = "4digit")]
  #[strum(serialize = "4digit")]
  FourDigit,
}

impl Level for ProductLevel {
  const KIND: EntityKind = EntityKind::Product;
}

// ─── Entity ──────────────────────────────────────────────────────────────────

/// A node in a classification hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity<L> {
  pub id:             EntityId,
  pub code:           String,
  pub level:          L,
  /// `None` for roots.
  pub parent_id:      Option<EntityId>,
  #[serde(default)]
  pub name_en:        Option<String>,
  #[serde(default)]
  pub name_short_en:  Option<String>,
  #[serde(default)]
  pub description_en: Option<String>,
  #[serde(default)]
  pub name_es:        Option<String>,
  #[serde(default)]
  pub name_short_es:  Option<String>,
  #[serde(default)]
  pub description_es: Option<String>,
}

impl<L: Level> Entity<L> {
  /// An entity with every localized field left empty.
  pub fn new(
    id: EntityId,
    code: impl Into<String>,
    level: L,
    parent_id: Option<EntityId>,
  ) -> Self {
    Self {
      id,
      code: code.into(),
      level,
      parent_id,
      name_en: None,
      name_short_en: None,
      description_en: None,
      name_es: None,
      name_short_es: None,
      description_es: None,
    }
  }

  pub fn kind(&self) -> EntityKind { L::KIND }
}

/// A geographic entity: a country, department or municipality.
pub type Location = Entity<LocationLevel>;

/// A product in the Harmonized System classification.
pub type HsProduct = Entity<ProductLevel>;
