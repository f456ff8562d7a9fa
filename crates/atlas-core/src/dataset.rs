//! Bulk-load input for a store.
//!
//! The data pipeline exports one JSON document per load; a store accepts it
//! only after [`Dataset::validate`] passes, so nothing is written when any
//! row is malformed.

use std::{collections::HashSet, io::Read};

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  entity::{Entity, EntityId, HsProduct, Level, Location},
  fact::{DepartmentProductYear, DepartmentYear, ProductYear},
};

/// Everything a single load writes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
  pub locations:                Vec<Location>,
  pub products:                 Vec<HsProduct>,
  pub department_product_years: Vec<DepartmentProductYear>,
  pub department_years:         Vec<DepartmentYear>,
  pub product_years:            Vec<ProductYear>,
}

/// Row counts written by a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
  pub locations:                usize,
  pub products:                 usize,
  pub department_product_years: usize,
  pub department_years:         usize,
  pub product_years:            usize,
}

impl Dataset {
  /// Parse a dataset from its JSON export.
  pub fn from_reader(reader: impl Read) -> Result<Self> {
    Ok(serde_json::from_reader(reader)?)
  }

  /// Check the invariants the database schema cannot express.
  ///
  /// Foreign keys from fact rows are left to the backend.
  pub fn validate(&self) -> Result<()> {
    check_parents(&self.locations)?;
    check_parents(&self.products)?;

    for row in &self.department_product_years {
      if !(0.0..=1.0).contains(&row.density) {
        return Err(Error::DensityOutOfRange {
          row_id:  row.id,
          density: row.density,
        });
      }
    }
    Ok(())
  }

  pub fn summary(&self) -> LoadSummary {
    LoadSummary {
      locations:                self.locations.len(),
      products:                 self.products.len(),
      department_product_years: self.department_product_years.len(),
      department_years:         self.department_years.len(),
      product_years:            self.product_years.len(),
    }
  }
}

fn check_parents<L: Level>(entities: &[Entity<L>]) -> Result<()> {
  let ids: HashSet<EntityId> = entities.iter().map(|e| e.id).collect();
  for entity in entities {
    if let Some(parent_id) = entity.parent_id
      && !ids.contains(&parent_id)
    {
      return Err(Error::MissingParent {
        kind: L::KIND,
        id: entity.id,
        parent_id,
      });
    }
  }
  Ok(())
}
