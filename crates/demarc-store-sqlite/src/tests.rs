//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use demarc_core::{
  class::LayerClass,
  layer::Layer,
  region::Region,
  store::{LayerStore, WriteMode, WriteOutcome},
};
use geo::{Coord, LineString, MultiPolygon, Polygon};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn d(s: &str) -> NaiveDate { s.parse().expect("test date") }

fn square(x: f64, y: f64, side: f64) -> MultiPolygon<f64> {
  let exterior = LineString::from(vec![
    Coord { x, y },
    Coord { x: x + side, y },
    Coord { x: x + side, y: y + side },
    Coord { x, y: y + side },
    Coord { x, y },
  ]);
  MultiPolygon::new(vec![Polygon::new(exterior, vec![])])
}

fn region(id: &str, name: &str, class: LayerClass) -> Region {
  Region {
    region_id: id.to_owned(),
    name: name.to_owned(),
    class,
    geometry: square(0.0, 0.0, 10.0),
  }
}

fn layer(date: &str, class: LayerClass, regions: Vec<Region>) -> Layer {
  Layer { date: d(date), class, regions }
}

const CLASS: LayerClass = LayerClass::Occupied;

// ─── Get / put ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn put_and_get_layer() {
  let s = store().await;

  let input = layer("2024-01-01", CLASS, vec![region("a", "A", CLASS)]);
  let outcome = s.put_layer(input, WriteMode::SkipExisting).await.unwrap();
  assert_eq!(outcome, WriteOutcome::Written);

  let fetched = s.get_layer(d("2024-01-01"), CLASS).await.unwrap().unwrap();
  assert_eq!(fetched.date, d("2024-01-01"));
  assert_eq!(fetched.class, CLASS);
  assert_eq!(fetched.regions.len(), 1);
  assert_eq!(fetched.regions[0].region_id, "a");
}

#[tokio::test]
async fn get_missing_layer_returns_none() {
  let s = store().await;
  assert!(s.get_layer(d("2024-01-01"), CLASS).await.unwrap().is_none());
}

#[tokio::test]
async fn classes_are_independent_keys() {
  let s = store().await;
  let occupied = layer("2024-01-01", CLASS, vec![region("a", "A", CLASS)]);
  s.put_layer(occupied, WriteMode::SkipExisting).await.unwrap();

  assert!(s.layer_exists(d("2024-01-01"), CLASS).await.unwrap());
  assert!(
    !s.layer_exists(d("2024-01-01"), LayerClass::Gray)
      .await
      .unwrap()
  );
  assert!(
    s.get_layer(d("2024-01-01"), LayerClass::Gray)
      .await
      .unwrap()
      .is_none()
  );
}

// ─── Write modes ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn skip_existing_leaves_the_stored_layer_alone() {
  let s = store().await;

  let first = layer("2024-01-01", CLASS, vec![region("a", "A", CLASS)]);
  s.put_layer(first, WriteMode::SkipExisting).await.unwrap();

  let second = layer(
    "2024-01-01",
    CLASS,
    vec![region("a", "A", CLASS), region("b", "B", CLASS)],
  );
  let outcome = s.put_layer(second, WriteMode::SkipExisting).await.unwrap();
  assert_eq!(outcome, WriteOutcome::SkippedExisting);

  let stored = s.get_layer(d("2024-01-01"), CLASS).await.unwrap().unwrap();
  assert_eq!(stored.regions.len(), 1);
}

#[tokio::test]
async fn overwrite_replaces_the_stored_layer() {
  let s = store().await;

  let first = layer("2024-01-01", CLASS, vec![region("a", "A", CLASS)]);
  s.put_layer(first, WriteMode::SkipExisting).await.unwrap();

  let second = layer(
    "2024-01-01",
    CLASS,
    vec![region("a", "A", CLASS), region("b", "B", CLASS)],
  );
  let outcome = s.put_layer(second, WriteMode::Overwrite).await.unwrap();
  assert_eq!(outcome, WriteOutcome::Written);

  let stored = s.get_layer(d("2024-01-01"), CLASS).await.unwrap().unwrap();
  assert_eq!(stored.regions.len(), 2);
}

#[tokio::test]
async fn identical_overwrite_is_reported_unchanged() {
  let s = store().await;

  let input = layer("2024-01-01", CLASS, vec![region("a", "A", CLASS)]);
  s.put_layer(input.clone(), WriteMode::SkipExisting)
    .await
    .unwrap();

  let outcome = s.put_layer(input, WriteMode::Overwrite).await.unwrap();
  assert_eq!(outcome, WriteOutcome::Unchanged);
}

#[tokio::test]
async fn empty_layer_round_trips() {
  let s = store().await;

  let input = Layer::empty(d("2024-01-01"), CLASS);
  s.put_layer(input, WriteMode::SkipExisting).await.unwrap();

  let stored = s.get_layer(d("2024-01-01"), CLASS).await.unwrap().unwrap();
  assert!(stored.is_empty());
}

// ─── Date listing ────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_dates_is_ordered_and_range_filtered() {
  let s = store().await;

  for date in ["2024-01-05", "2024-01-01", "2024-01-03"] {
    let input = layer(date, CLASS, vec![region("a", "A", CLASS)]);
    s.put_layer(input, WriteMode::SkipExisting).await.unwrap();
  }
  // A different class inside the range must not leak in.
  let gray = layer("2024-01-02", LayerClass::Gray, vec![]);
  s.put_layer(gray, WriteMode::SkipExisting).await.unwrap();

  let dates = s
    .list_dates(CLASS, d("2024-01-01"), d("2024-01-04"))
    .await
    .unwrap();
  assert_eq!(dates, vec![d("2024-01-01"), d("2024-01-03")]);

  let all = s
    .list_dates(CLASS, d("2024-01-01"), d("2024-01-31"))
    .await
    .unwrap();
  assert_eq!(all, vec![d("2024-01-01"), d("2024-01-03"), d("2024-01-05")]);
}

#[tokio::test]
async fn list_dates_empty_range() {
  let s = store().await;
  let dates = s
    .list_dates(CLASS, d("2024-01-01"), d("2024-01-31"))
    .await
    .unwrap();
  assert!(dates.is_empty());
}

// ─── Report cache ────────────────────────────────────────────────────────────

#[tokio::test]
async fn latest_report_is_the_most_recent_insert() {
  let s = store().await;
  assert!(s.latest_report().await.unwrap().is_none());

  s.put_report(d("2024-01-01"), "first").await.unwrap();
  s.put_report(d("2024-01-02"), "second").await.unwrap();

  let latest = s.latest_report().await.unwrap().unwrap();
  assert_eq!(latest.date, d("2024-01-02"));
  assert_eq!(latest.body, "second");
}
