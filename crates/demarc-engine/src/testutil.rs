//! Shared fixtures and in-memory collaborators for engine tests.

use std::{
  collections::{BTreeMap, BTreeSet},
  sync::Mutex,
};

use chrono::NaiveDate;
use demarc_core::{
  class::LayerClass,
  layer::Layer,
  region::Region,
  snapshot::{RawRegion, RawSnapshot},
  source::SnapshotSource,
  store::{LayerStore, WriteMode, WriteOutcome},
};
use geo::MultiPolygon;
use thiserror::Error;

use crate::geometry;

// ─── Geometry fixtures ───────────────────────────────────────────────────────

/// Axis-aligned square as raw rings, deliberately left unclosed to exercise
/// ring repair.
pub(crate) fn square_rings(x0: f64, y0: f64, size: f64) -> Vec<Vec<[f64; 2]>> {
  vec![vec![
    [x0, y0],
    [x0 + size, y0],
    [x0 + size, y0 + size],
    [x0, y0 + size],
  ]]
}

pub(crate) fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
  let polygon = geometry::polygon_from_rings(&square_rings(x0, y0, size))
    .expect("square fixture");
  MultiPolygon::new(vec![polygon])
}

pub(crate) fn region(
  id: &str,
  name: &str,
  class: LayerClass,
  geometry: MultiPolygon<f64>,
) -> Region {
  Region {
    region_id: id.to_owned(),
    name: name.to_owned(),
    class,
    geometry,
  }
}

pub(crate) fn layer(
  date: &str,
  class: LayerClass,
  regions: Vec<Region>,
) -> Layer {
  Layer { date: d(date), class, regions }
}

pub(crate) fn d(s: &str) -> NaiveDate { s.parse().expect("test date") }

pub(crate) fn raw(name: &str, rings: Vec<Vec<[f64; 2]>>) -> RawRegion {
  RawRegion { id: None, name: name.to_owned(), rings }
}

pub(crate) fn snapshot(
  date: &str,
  layers: Vec<(&str, Vec<RawRegion>)>,
) -> RawSnapshot {
  RawSnapshot {
    date:   d(date),
    layers: layers
      .into_iter()
      .map(|(class, records)| (class.to_owned(), records))
      .collect(),
  }
}

// ─── In-memory layer store ───────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("injected store failure")]
pub(crate) struct MemStoreError;

/// A `LayerStore` test double backed by a `BTreeMap`.
#[derive(Default)]
pub(crate) struct MemStore {
  layers: Mutex<BTreeMap<(NaiveDate, LayerClass), Layer>>,
  /// Dates reported by `list_dates` with no layer behind them, to simulate a
  /// store whose listing and reads disagree.
  pub phantom_dates: Vec<NaiveDate>,
  /// When set, every `put_layer` fails.
  pub fail_puts: bool,
}

impl MemStore {
  /// Test-setup shortcut that bypasses write modes.
  pub fn insert(&self, layer: Layer) {
    self.layers.lock().unwrap().insert(layer.key(), layer);
  }

  pub fn layer_count(&self) -> usize { self.layers.lock().unwrap().len() }

  pub fn get(&self, date: NaiveDate, class: LayerClass) -> Option<Layer> {
    self.layers.lock().unwrap().get(&(date, class)).cloned()
  }
}

impl LayerStore for MemStore {
  type Error = MemStoreError;

  async fn get_layer(
    &self,
    date: NaiveDate,
    class: LayerClass,
  ) -> Result<Option<Layer>, MemStoreError> {
    Ok(self.layers.lock().unwrap().get(&(date, class)).cloned())
  }

  async fn layer_exists(
    &self,
    date: NaiveDate,
    class: LayerClass,
  ) -> Result<bool, MemStoreError> {
    Ok(self.layers.lock().unwrap().contains_key(&(date, class)))
  }

  async fn put_layer(
    &self,
    layer: Layer,
    mode: WriteMode,
  ) -> Result<WriteOutcome, MemStoreError> {
    if self.fail_puts {
      return Err(MemStoreError);
    }
    let mut layers = self.layers.lock().unwrap();
    if layers.contains_key(&layer.key()) && mode == WriteMode::SkipExisting {
      return Ok(WriteOutcome::SkippedExisting);
    }
    layers.insert(layer.key(), layer);
    Ok(WriteOutcome::Written)
  }

  async fn list_dates(
    &self,
    class: LayerClass,
    from: NaiveDate,
    to: NaiveDate,
  ) -> Result<Vec<NaiveDate>, MemStoreError> {
    let layers = self.layers.lock().unwrap();
    let mut dates: BTreeSet<NaiveDate> = layers
      .keys()
      .filter(|(date, c)| *c == class && *date >= from && *date <= to)
      .map(|(date, _)| *date)
      .collect();
    dates.extend(
      self
        .phantom_dates
        .iter()
        .copied()
        .filter(|date| *date >= from && *date <= to),
    );
    Ok(dates.into_iter().collect())
  }
}

// ─── In-memory snapshot source ───────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("injected source failure")]
pub(crate) struct MemSourceError;

/// A `SnapshotSource` test double with per-date failure injection.
#[derive(Default)]
pub(crate) struct MemSource {
  snapshots:      BTreeMap<NaiveDate, RawSnapshot>,
  pub fail_dates: BTreeSet<NaiveDate>,
}

impl MemSource {
  pub fn with(mut self, snapshot: RawSnapshot) -> Self {
    self.snapshots.insert(snapshot.date, snapshot);
    self
  }
}

impl SnapshotSource for MemSource {
  type Error = MemSourceError;

  async fn fetch(
    &self,
    date: NaiveDate,
  ) -> Result<Option<RawSnapshot>, MemSourceError> {
    if self.fail_dates.contains(&date) {
      return Err(MemSourceError);
    }
    Ok(self.snapshots.get(&date).cloned())
  }
}
