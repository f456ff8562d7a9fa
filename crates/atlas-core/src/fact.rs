//! Fact rows: yearly statistics keyed by location and/or product.
//!
//! Rows are produced by an external data pipeline and are never mutated
//! through this crate. The only derived value is
//! [`DepartmentProductYear::distance`].

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Trade and feasibility statistics for one department, product and year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentProductYear {
  pub id:            i64,
  pub department_id: EntityId,
  pub product_id:    EntityId,
  pub year:          i32,
  pub import_value:  i64,
  pub export_value:  i64,
  /// Revealed comparative advantage.
  pub export_rca:    i64,
  /// Proximity-weighted feasibility, in `[0, 1]`.
  pub density:       f64,
  /// Complexity outlook gain.
  pub cog:           f64,
  /// Complexity outlook index.
  pub coi:           f64,
}

impl DepartmentProductYear {
  /// `1 - density`. Never stored; the SQL backend evaluates the same
  /// expression when filtering or sorting on distance.
  pub fn distance(&self) -> f64 { 1.0 - self.density }
}

/// Complexity of one department's economy in a year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentYear {
  pub id:            i64,
  pub department_id: EntityId,
  pub year:          i32,
  /// Economic complexity index.
  pub eci:           f64,
  pub eci_rank:      i64,
  pub diversity:     f64,
}

/// Complexity of one product in a year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductYear {
  pub id:         i64,
  pub product_id: EntityId,
  pub year:       i32,
  /// Product complexity index.
  pub pci:        f64,
  pub pci_rank:   i64,
}
