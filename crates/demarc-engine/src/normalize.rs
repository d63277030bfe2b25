//! Geometry normaliser — raw snapshot records to canonical layers.
//!
//! Normalisation is a pure function: records that fail validation are
//! dropped and counted, never fatal for the layer as a whole.

use std::collections::{BTreeMap, btree_map::Entry};

use chrono::NaiveDate;
use demarc_core::{
  class::LayerClass,
  layer::Layer,
  region::{Region, slug},
  snapshot::RawRegion,
};
use geo::MultiPolygon;

use crate::geometry;

/// Tunables for the normaliser.
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
  /// Regions whose area is at or below this floor are dropped as degenerate.
  pub min_region_km2: f64,
}

impl Default for NormalizeConfig {
  fn default() -> Self { Self { min_region_km2: 1e-6 } }
}

/// A normalised layer plus the counts of what normalisation did.
#[derive(Debug)]
pub struct Normalized {
  pub layer:   Layer,
  /// Raw records dropped for failing validation.
  pub skipped: usize,
  /// Duplicate records folded into an existing region by union.
  pub merged:  usize,
}

/// Convert raw snapshot records into a canonical [`Layer`].
///
/// - Rings are closed and re-wound; records with a degenerate exterior or
///   with area at or below the configured floor are dropped and counted.
/// - Records sharing a region id (explicit id, or the slug of the name) are
///   merged by union, so each id appears at most once per layer.
/// - Regions come out sorted by id, which keeps downstream attribution and
///   rendering deterministic.
pub fn normalize(
  date: NaiveDate,
  class: LayerClass,
  records: &[RawRegion],
  cfg: &NormalizeConfig,
) -> Normalized {
  let mut skipped = 0usize;
  let mut merged = 0usize;
  let mut by_id: BTreeMap<String, Region> = BTreeMap::new();

  for record in records {
    let Some(polygon) = geometry::polygon_from_rings(&record.rings) else {
      tracing::debug!(name = %record.name, "dropping record with degenerate geometry");
      skipped += 1;
      continue;
    };
    let shape = MultiPolygon::new(vec![polygon]);
    if geometry::area_km2(&shape) <= cfg.min_region_km2 {
      tracing::debug!(name = %record.name, "dropping record with zero area");
      skipped += 1;
      continue;
    }

    let id = record
      .id
      .clone()
      .unwrap_or_else(|| slug(&record.name));
    if id.is_empty() {
      skipped += 1;
      continue;
    }

    match by_id.entry(id) {
      Entry::Occupied(mut entry) => {
        let existing = entry.get_mut();
        existing.geometry = geometry::union(&existing.geometry, &shape);
        merged += 1;
      }
      Entry::Vacant(entry) => {
        let region_id = entry.key().clone();
        entry.insert(Region {
          region_id,
          name: record.name.clone(),
          class,
          geometry: shape,
        });
      }
    }
  }

  Normalized {
    layer: Layer { date, class, regions: by_id.into_values().collect() },
    skipped,
    merged,
  }
}
