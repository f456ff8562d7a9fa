//! [`SqliteStore`], the SQLite implementation of [`AtlasStore`].

use std::path::Path;

use atlas_core::{
  dataset::{Dataset, LoadSummary},
  entity::{Entity, EntityId, Level},
  fact::{DepartmentProductYear, DepartmentYear, ProductYear},
  store::{
    AtlasStore, DepartmentProductYearQuery, DepartmentYearQuery, DistanceSort,
    ProductYearQuery,
  },
};
use rusqlite::{OptionalExtension as _, Transaction, types::Value};

use crate::{
  Result,
  encode::{
    DEPARTMENT_PRODUCT_YEAR_COLUMNS, DEPARTMENT_YEAR_COLUMNS, ENTITY_COLUMNS,
    PRODUCT_YEAR_COLUMNS, RawEntity, department_product_year, department_year,
    entity_table, product_year,
  },
  schema::{DISTANCE_SQL, SCHEMA},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Atlas store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Filters ─────────────────────────────────────────────────────────────────

/// A `WHERE` clause assembled from optional query fields, with positional
/// arguments numbered in push order.
#[derive(Default)]
struct Filter {
  conds: Vec<String>,
  args:  Vec<Value>,
}

impl Filter {
  fn cmp(&mut self, expr: &str, op: &str, value: Option<impl Into<Value>>) {
    if let Some(v) = value {
      self.args.push(v.into());
      self.conds.push(format!("{expr} {op} ?{}", self.args.len()));
    }
  }

  fn eq(&mut self, column: &str, value: Option<impl Into<Value>>) {
    self.cmp(column, "=", value);
  }

  fn where_clause(&self) -> String {
    if self.conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", self.conds.join(" AND "))
    }
  }
}

/// Run `sql` with `args` and map every row with `f`.
async fn select_all<T, F>(
  conn: &tokio_rusqlite::Connection,
  sql: String,
  args: Vec<Value>,
  f: F,
) -> Result<Vec<T>>
where
  T: Send + 'static,
  F: Fn(&rusqlite::Row<'_>) -> rusqlite::Result<T> + Send + 'static,
{
  let rows = conn
    .call(move |conn| {
      let mut stmt = conn.prepare(&sql)?;
      let rows = stmt
        .query_map(rusqlite::params_from_iter(args.iter()), |row| f(row))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      Ok(rows)
    })
    .await?;
  Ok(rows)
}

// ─── Bulk insert ─────────────────────────────────────────────────────────────

fn insert_entities<L: Level>(
  tx: &Transaction<'_>,
  entities: &[Entity<L>],
) -> rusqlite::Result<()> {
  let sql = format!(
    "INSERT INTO {} ({ENTITY_COLUMNS})
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    entity_table(L::KIND)
  );
  let mut stmt = tx.prepare(&sql)?;
  for e in entities {
    stmt.execute(rusqlite::params![
      e.id,
      e.code,
      e.level.as_ref(),
      e.parent_id,
      e.name_en,
      e.name_short_en,
      e.description_en,
      e.name_es,
      e.name_short_es,
      e.description_es,
    ])?;
  }
  Ok(())
}

fn insert_facts(tx: &Transaction<'_>, dataset: &Dataset) -> rusqlite::Result<()> {
  let mut stmt = tx.prepare(&format!(
    "INSERT INTO department_product_year ({DEPARTMENT_PRODUCT_YEAR_COLUMNS})
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
  ))?;
  for r in &dataset.department_product_years {
    stmt.execute(rusqlite::params![
      r.id,
      r.department_id,
      r.product_id,
      r.year,
      r.import_value,
      r.export_value,
      r.export_rca,
      r.density,
      r.cog,
      r.coi,
    ])?;
  }

  let mut stmt = tx.prepare(&format!(
    "INSERT INTO department_year ({DEPARTMENT_YEAR_COLUMNS})
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
  ))?;
  for r in &dataset.department_years {
    stmt.execute(rusqlite::params![
      r.id,
      r.department_id,
      r.year,
      r.eci,
      r.eci_rank,
      r.diversity,
    ])?;
  }

  let mut stmt = tx.prepare(&format!(
    "INSERT INTO product_year ({PRODUCT_YEAR_COLUMNS})
     VALUES (?1, ?2, ?3, ?4, ?5)"
  ))?;
  for r in &dataset.product_years {
    stmt.execute(rusqlite::params![
      r.id,
      r.product_id,
      r.year,
      r.pci,
      r.pci_rank,
    ])?;
  }
  Ok(())
}

// ─── AtlasStore impl ─────────────────────────────────────────────────────────

impl AtlasStore for SqliteStore {
  type Error = crate::Error;

  // ── Classification metadata ───────────────────────────────────────────────

  async fn get_entity<L: Level>(&self, id: EntityId) -> Result<Option<Entity<L>>> {
    let sql = format!(
      "SELECT {ENTITY_COLUMNS} FROM {} WHERE id = ?1",
      entity_table(L::KIND)
    );
    let kind = L::KIND;
    tracing::debug!(%kind, id, "get entity");

    let raw: Option<RawEntity> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], RawEntity::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEntity::into_entity).transpose()
  }

  async fn list_entities<L: Level>(&self, level: Option<L>) -> Result<Vec<Entity<L>>> {
    let mut filter = Filter::default();
    filter.eq("level", level.map(|l| l.as_ref().to_owned()));
    let sql = format!(
      "SELECT {ENTITY_COLUMNS} FROM {} {} ORDER BY id",
      entity_table(L::KIND),
      filter.where_clause()
    );
    let kind = L::KIND;
    tracing::debug!(%kind, ?level, "list entities");

    let raws = select_all(&self.conn, sql, filter.args, RawEntity::from_row).await?;
    raws.into_iter().map(RawEntity::into_entity).collect()
  }

  // ── Fact tables ───────────────────────────────────────────────────────────

  async fn department_product_years(
    &self,
    query: &DepartmentProductYearQuery,
  ) -> Result<Vec<DepartmentProductYear>> {
    let mut filter = Filter::default();
    filter.eq("department_id", query.department_id);
    filter.eq("product_id", query.product_id);
    filter.eq("year", query.year);
    filter.cmp(DISTANCE_SQL, "<=", query.max_distance);

    let order = match query.sort {
      Some(DistanceSort::DistanceAsc) => format!("{DISTANCE_SQL} ASC, id"),
      Some(DistanceSort::DistanceDesc) => format!("{DISTANCE_SQL} DESC, id"),
      None => "id".to_owned(),
    };
    let limit = query.limit.map_or(-1, |l| l as i64);

    let sql = format!(
      "SELECT {DEPARTMENT_PRODUCT_YEAR_COLUMNS}
       FROM department_product_year
       {}
       ORDER BY {order}
       LIMIT {limit}",
      filter.where_clause()
    );
    tracing::debug!(?query, "query department_product_year");

    select_all(&self.conn, sql, filter.args, department_product_year).await
  }

  async fn department_years(
    &self,
    query: &DepartmentYearQuery,
  ) -> Result<Vec<DepartmentYear>> {
    let mut filter = Filter::default();
    filter.eq("department_id", query.department_id);
    filter.eq("year", query.year);
    let sql = format!(
      "SELECT {DEPARTMENT_YEAR_COLUMNS} FROM department_year {} ORDER BY id",
      filter.where_clause()
    );
    tracing::debug!(?query, "query department_year");

    select_all(&self.conn, sql, filter.args, department_year).await
  }

  async fn product_years(&self, query: &ProductYearQuery) -> Result<Vec<ProductYear>> {
    let mut filter = Filter::default();
    filter.eq("product_id", query.product_id);
    filter.eq("year", query.year);
    let sql = format!(
      "SELECT {PRODUCT_YEAR_COLUMNS} FROM product_year {} ORDER BY id",
      filter.where_clause()
    );
    tracing::debug!(?query, "query product_year");

    select_all(&self.conn, sql, filter.args, product_year).await
  }

  // ── Bulk load ─────────────────────────────────────────────────────────────

  async fn load(&self, dataset: Dataset) -> Result<LoadSummary> {
    dataset.validate()?;
    let summary = dataset.summary();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        insert_entities(&tx, &dataset.locations)?;
        insert_entities(&tx, &dataset.products)?;
        insert_facts(&tx, &dataset)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::info!(?summary, "dataset loaded");
    Ok(summary)
  }
}
