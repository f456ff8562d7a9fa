//! Mapping between Rust domain types and SQLite rows.
//!
//! Levels are stored as their wire strings (`"department"`, `"2digit"`) and
//! decoded through [`Level::parse`]. Fact rows hold only numbers and map
//! column-for-column.

use atlas_core::{
  entity::{Entity, EntityId, EntityKind, Level},
  fact::{DepartmentProductYear, DepartmentYear, ProductYear},
};
use rusqlite::Row;

use crate::{Error, Result};

// ─── Tables ──────────────────────────────────────────────────────────────────

pub fn entity_table(kind: EntityKind) -> &'static str {
  match kind {
    EntityKind::Location => "location",
    EntityKind::Product => "hs_product",
  }
}

pub const ENTITY_COLUMNS: &str = "id, code, level, parent_id, name_en, \
                                  name_short_en, description_en, name_es, \
                                  name_short_es, description_es";

pub const DEPARTMENT_PRODUCT_YEAR_COLUMNS: &str =
  "id, department_id, product_id, year, import_value, export_value, \
   export_rca, density, cog, coi";

pub const DEPARTMENT_YEAR_COLUMNS: &str =
  "id, department_id, year, eci, eci_rank, diversity";

pub const PRODUCT_YEAR_COLUMNS: &str = "id, product_id, year, pci, pci_rank";

// ─── Entities ────────────────────────────────────────────────────────────────

/// A classification row with the level still in its stored string form.
pub struct RawEntity {
  pub id:             EntityId,
  pub code:           String,
  pub level:          String,
  pub parent_id:      Option<EntityId>,
  pub name_en:        Option<String>,
  pub name_short_en:  Option<String>,
  pub description_en: Option<String>,
  pub name_es:        Option<String>,
  pub name_short_es:  Option<String>,
  pub description_es: Option<String>,
}

impl RawEntity {
  /// Read a row selected with [`ENTITY_COLUMNS`].
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      code:           row.get(1)?,
      level:          row.get(2)?,
      parent_id:      row.get(3)?,
      name_en:        row.get(4)?,
      name_short_en:  row.get(5)?,
      description_en: row.get(6)?,
      name_es:        row.get(7)?,
      name_short_es:  row.get(8)?,
      description_es: row.get(9)?,
    })
  }

  pub fn into_entity<L: Level>(self) -> Result<Entity<L>> {
    let level = L::parse(&self.level).map_err(|e| {
      Error::Decode(format!("{} {}: {e}", entity_table(L::KIND), self.id))
    })?;
    Ok(Entity {
      id: self.id,
      code: self.code,
      level,
      parent_id: self.parent_id,
      name_en: self.name_en,
      name_short_en: self.name_short_en,
      description_en: self.description_en,
      name_es: self.name_es,
      name_short_es: self.name_short_es,
      description_es: self.description_es,
    })
  }
}

// ─── Fact rows ───────────────────────────────────────────────────────────────

/// Read a row selected with [`DEPARTMENT_PRODUCT_YEAR_COLUMNS`].
pub fn department_product_year(
  row: &Row<'_>,
) -> rusqlite::Result<DepartmentProductYear> {
  Ok(DepartmentProductYear {
    id:            row.get(0)?,
    department_id: row.get(1)?,
    product_id:    row.get(2)?,
    year:          row.get(3)?,
    import_value:  row.get(4)?,
    export_value:  row.get(5)?,
    export_rca:    row.get(6)?,
    density:       row.get(7)?,
    cog:           row.get(8)?,
    coi:           row.get(9)?,
  })
}

/// Read a row selected with [`DEPARTMENT_YEAR_COLUMNS`].
pub fn department_year(row: &Row<'_>) -> rusqlite::Result<DepartmentYear> {
  Ok(DepartmentYear {
    id:            row.get(0)?,
    department_id: row.get(1)?,
    year:          row.get(2)?,
    eci:           row.get(3)?,
    eci_rank:      row.get(4)?,
    diversity:     row.get(5)?,
  })
}

/// Read a row selected with [`PRODUCT_YEAR_COLUMNS`].
pub fn product_year(row: &Row<'_>) -> rusqlite::Result<ProductYear> {
  Ok(ProductYear {
    id:         row.get(0)?,
    product_id: row.get(1)?,
    year:       row.get(2)?,
    pci:        row.get(3)?,
    pci_rank:   row.get(4)?,
  })
}
