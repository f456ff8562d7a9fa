//! Integration tests for `SqliteStore` against an in-memory database.

use atlas_core::{
  dataset::Dataset,
  entity::{HsProduct, Location, LocationLevel, ProductLevel},
  fact::{DepartmentProductYear, DepartmentYear, ProductYear},
  store::{
    AtlasStore, DepartmentProductYearQuery, DepartmentYearQuery, DistanceSort,
    ProductYearQuery,
  },
};

use crate::{DISTANCE_SQL, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn locations() -> Vec<Location> {
  let mut atlantico = Location::new(14, "08", LocationLevel::Department, Some(0));
  atlantico.name_en = Some("Atlantico".into());
  atlantico.name_short_en = Some("Atlantico".into());
  atlantico.description_en = Some("The region of Atlantico".into());
  atlantico.name_es = Some("Atlántico".into());

  vec![
    Location::new(0, "COL", LocationLevel::Country, None),
    atlantico,
    Location::new(15, "18", LocationLevel::Department, Some(0)),
    Location::new(2, "08001", LocationLevel::Municipality, Some(14)),
  ]
}

fn products() -> Vec<HsProduct> {
  let mut fish = HsProduct::new(132, "0302", ProductLevel::FourDigit, Some(2));
  fish.name_en = Some(
    "Fish, fresh or chilled, excluding fish fillets and other fish meat of \
     heading 0304"
      .into(),
  );
  fish.name_short_en = Some("Fish, excluding fillets".into());
  fish.description_en = Some("This is a description of fish.".into());
  fish.name_es = Some("El pescado, excepto los filetes".into());

  vec![
    HsProduct::new(1, "A", ProductLevel::Section, None),
    HsProduct::new(2, "03", ProductLevel::TwoDigit, Some(1)),
    fish,
    HsProduct::new(133, "0303", ProductLevel::FourDigit, Some(2)),
  ]
}

fn dpy(id: i64, department_id: i64, product_id: i64, density: f64) -> DepartmentProductYear {
  DepartmentProductYear {
    id,
    department_id,
    product_id,
    year: 2012,
    import_value: 100 * id,
    export_value: 200 * id,
    export_rca: id,
    density,
    cog: 0.1,
    coi: 0.2,
  }
}

fn dataset() -> Dataset {
  Dataset {
    locations:                locations(),
    products:                 products(),
    department_product_years: vec![
      dpy(1, 14, 132, 0.9),
      dpy(2, 14, 133, 0.1),
      dpy(3, 15, 132, 0.3),
      dpy(4, 15, 133, 0.75),
      dpy(5, 14, 2, 0.0),
      dpy(6, 15, 2, 1.0),
    ],
    department_years:         vec![
      DepartmentYear {
        id:            1,
        department_id: 14,
        year:          2012,
        eci:           0.42,
        eci_rank:      3,
        diversity:     117.0,
      },
      DepartmentYear {
        id:            2,
        department_id: 15,
        year:          2012,
        eci:           -0.3,
        eci_rank:      20,
        diversity:     51.0,
      },
      DepartmentYear {
        id:            3,
        department_id: 14,
        year:          2013,
        eci:           0.45,
        eci_rank:      2,
        diversity:     120.0,
      },
    ],
    product_years:            vec![
      ProductYear { id: 1, product_id: 132, year: 2012, pci: 1.5, pci_rank: 7 },
      ProductYear { id: 2, product_id: 133, year: 2012, pci: 0.2, pci_rank: 90 },
    ],
  }
}

async fn loaded() -> SqliteStore {
  let s = store().await;
  s.load(dataset()).await.expect("load dataset");
  s
}

// ─── Load ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn load_reports_row_counts() {
  let s = store().await;
  let summary = s.load(dataset()).await.unwrap();
  assert_eq!(summary.locations, 4);
  assert_eq!(summary.products, 4);
  assert_eq!(summary.department_product_years, 6);
  assert_eq!(summary.department_years, 3);
  assert_eq!(summary.product_years, 2);
}

#[tokio::test]
async fn load_accepts_children_before_parents() {
  let s = store().await;
  let mut data = Dataset::default();
  data.products = products().into_iter().rev().collect();
  s.load(data).await.unwrap();

  let all = s.list_entities::<ProductLevel>(None).await.unwrap();
  assert_eq!(all.len(), 4);
}

#[tokio::test]
async fn load_rejects_out_of_range_density_and_writes_nothing() {
  let s = store().await;
  let mut data = dataset();
  data.department_product_years.push(dpy(7, 14, 132, 1.5));

  let err = s.load(data).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(atlas_core::Error::DensityOutOfRange { row_id: 7, .. })
  ));
  assert!(s.list_entities::<LocationLevel>(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn load_with_unknown_department_rolls_back() {
  let s = store().await;
  let mut data = dataset();
  data.department_product_years.push(dpy(7, 999, 132, 0.5));

  let err = s.load(data).await.unwrap_err();
  assert!(matches!(err, crate::Error::Database(_)));
  assert!(s.list_entities::<ProductLevel>(None).await.unwrap().is_empty());
  let rows = s
    .department_product_years(&DepartmentProductYearQuery::default())
    .await
    .unwrap();
  assert!(rows.is_empty());
}

// ─── Entities ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_entity_returns_every_field() {
  let s = loaded().await;

  for expected in locations() {
    let got = s.get_entity::<LocationLevel>(expected.id).await.unwrap();
    assert_eq!(got.as_ref(), Some(&expected));
  }
  for expected in products() {
    let got = s.get_entity::<ProductLevel>(expected.id).await.unwrap();
    assert_eq!(got.as_ref(), Some(&expected));
  }
}

#[tokio::test]
async fn get_entity_with_id_zero() {
  let s = loaded().await;
  let country = s.get_entity::<LocationLevel>(0).await.unwrap().unwrap();
  assert_eq!(country.id, 0);
  assert_eq!(country.code, "COL");
  assert_eq!(country.parent_id, None);
}

#[tokio::test]
async fn get_entity_missing_returns_none() {
  let s = loaded().await;
  assert!(s.get_entity::<LocationLevel>(12345).await.unwrap().is_none());
  // Product ids do not resolve in the location table.
  assert!(s.get_entity::<LocationLevel>(132).await.unwrap().is_none());
}

#[tokio::test]
async fn list_entities_without_level_returns_all() {
  let s = loaded().await;
  let all = s.list_entities::<LocationLevel>(None).await.unwrap();
  assert_eq!(all.len(), 4);
  let all = s.list_entities::<ProductLevel>(None).await.unwrap();
  assert_eq!(all.len(), 4);
}

#[tokio::test]
async fn list_entities_filtered_by_level() {
  let s = loaded().await;

  let departments = s
    .list_entities(Some(LocationLevel::Department))
    .await
    .unwrap();
  let mut ids: Vec<_> = departments.iter().map(|d| d.id).collect();
  ids.sort_unstable();
  assert_eq!(ids, vec![14, 15]);
  assert!(departments.iter().all(|d| d.level == LocationLevel::Department));

  let sections = s.list_entities(Some(ProductLevel::Section)).await.unwrap();
  assert_eq!(sections.len(), 1);
  assert_eq!(sections[0].code, "A");
}

#[tokio::test]
async fn corrupt_level_is_a_decode_error() {
  let s = loaded().await;
  s.conn
    .call(|conn| {
      conn.execute("UPDATE location SET level = 'planet' WHERE id = 15", [])?;
      Ok(())
    })
    .await
    .unwrap();

  let err = s.get_entity::<LocationLevel>(15).await.unwrap_err();
  assert!(matches!(err, crate::Error::Decode(_)));
}

// ─── Distance ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sql_distance_matches_accessor() {
  let s = loaded().await;
  let rows = s
    .department_product_years(&DepartmentProductYearQuery::default())
    .await
    .unwrap();
  assert_eq!(rows.len(), 6);

  let sql = format!(
    "SELECT id, {DISTANCE_SQL} AS distance FROM department_product_year"
  );
  let projected: Vec<(i64, f64)> = s
    .conn
    .call(move |conn| {
      let mut stmt = conn.prepare(&sql)?;
      let rows = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      Ok(rows)
    })
    .await
    .unwrap();

  for (id, distance) in projected {
    let row = rows.iter().find(|r| r.id == id).unwrap();
    assert_eq!(row.distance(), distance, "row {id}");
    assert_eq!(distance, 1.0 - row.density);
  }
}

#[tokio::test]
async fn max_distance_filter_agrees_with_accessor() {
  let s = loaded().await;
  let all = s
    .department_product_years(&DepartmentProductYearQuery::default())
    .await
    .unwrap();

  for max_distance in [0.0, 0.1, 0.25, 0.7, 0.9, 1.0] {
    let query = DepartmentProductYearQuery {
      max_distance: Some(max_distance),
      ..Default::default()
    };
    let filtered = s.department_product_years(&query).await.unwrap();
    let expected: Vec<_> = all
      .iter()
      .filter(|r| r.distance() <= max_distance)
      .map(|r| r.id)
      .collect();
    let got: Vec<_> = filtered.iter().map(|r| r.id).collect();
    assert_eq!(got, expected, "max_distance = {max_distance}");
  }
}

#[tokio::test]
async fn distance_sort_agrees_with_accessor() {
  let s = loaded().await;
  let mut all = s
    .department_product_years(&DepartmentProductYearQuery::default())
    .await
    .unwrap();
  all.sort_by(|a, b| a.distance().total_cmp(&b.distance()).then(a.id.cmp(&b.id)));
  let expected: Vec<_> = all.iter().map(|r| r.id).collect();

  let asc = s
    .department_product_years(&DepartmentProductYearQuery {
      sort: Some(DistanceSort::DistanceAsc),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(asc.iter().map(|r| r.id).collect::<Vec<_>>(), expected);
  assert_eq!(asc[0].distance(), 0.0);

  let desc = s
    .department_product_years(&DepartmentProductYearQuery {
      sort: Some(DistanceSort::DistanceDesc),
      limit: Some(2),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(desc.len(), 2);
  assert_eq!(desc[0].id, 5);
  assert_eq!(desc[1].id, 2);
  assert!(desc[0].distance() >= desc[1].distance());
}

// ─── Fact filters ────────────────────────────────────────────────────────────

#[tokio::test]
async fn department_product_years_filter_by_keys() {
  let s = loaded().await;
  let rows = s
    .department_product_years(&DepartmentProductYearQuery {
      department_id: Some(15),
      product_id: Some(132),
      year: Some(2012),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0], dpy(3, 15, 132, 0.3));

  let none = s
    .department_product_years(&DepartmentProductYearQuery {
      year: Some(1999),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(none.is_empty());
}

#[tokio::test]
async fn department_years_filter() {
  let s = loaded().await;
  let rows = s
    .department_years(&DepartmentYearQuery {
      department_id: Some(14),
      year:          None,
    })
    .await
    .unwrap();
  assert_eq!(rows.iter().map(|r| r.year).collect::<Vec<_>>(), vec![2012, 2013]);

  let rows = s
    .department_years(&DepartmentYearQuery { department_id: None, year: Some(2012) })
    .await
    .unwrap();
  assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn product_years_filter() {
  let s = loaded().await;
  let rows = s
    .product_years(&ProductYearQuery { product_id: Some(133), year: Some(2012) })
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].pci_rank, 90);

  let all = s.product_years(&ProductYearQuery::default()).await.unwrap();
  assert_eq!(all.len(), 2);
}
