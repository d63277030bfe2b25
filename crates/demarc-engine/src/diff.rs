//! The differ — symmetric difference between two layers of one class.
//!
//! Gained area is what the later layer covers and the earlier one does not;
//! lost area the reverse; unchanged their intersection. Changed sub-areas
//! are attributed to the named regions of the layer that introduced them.
//!
//! Inputs are never mutated and no I/O happens here: callers fetch both
//! layers before invoking [`diff`].

use std::cmp::Ordering;

use demarc_core::{
  change::{Attribution, ChangeKind, ChangeRecord},
  layer::Layer,
  region::Region,
};
use geo::MultiPolygon;

use crate::{Error, Result, geometry};

/// Numeric tolerances for a diff.
#[derive(Debug, Clone)]
pub struct DiffConfig {
  /// Gained or lost totals below this fraction of the two layers' union
  /// area are treated as digitisation noise and folded into unchanged.
  pub relative_epsilon: f64,
  /// Attribution patches at or below this area are collapsed into the
  /// unattributed remainder rather than listed per region.
  pub min_patch_km2:    f64,
}

impl Default for DiffConfig {
  fn default() -> Self {
    Self {
      // 0.01% of the union area.
      relative_epsilon: 1e-4,
      min_patch_km2:    0.01,
    }
  }
}

/// Compute the change record between `earlier` and `later`.
///
/// Fails with [`Error::ClassMismatch`] when the layers carry different
/// classes. Swapping the arguments swaps gained and lost; the magnitudes and
/// the unchanged area are identical either way.
pub fn diff(
  earlier: &Layer,
  later: &Layer,
  cfg: &DiffConfig,
) -> Result<ChangeRecord> {
  if earlier.class != later.class {
    return Err(Error::ClassMismatch {
      left:  earlier.class,
      right: later.class,
    });
  }

  let shape_a = geometry::union_all(earlier.regions.iter().map(|r| &r.geometry));
  let shape_b = geometry::union_all(later.regions.iter().map(|r| &r.geometry));

  let gained_shape = geometry::difference(&shape_b, &shape_a);
  let lost_shape = geometry::difference(&shape_a, &shape_b);
  let unchanged_shape = geometry::intersection(&shape_a, &shape_b);

  let mut gained_km2 = geometry::area_km2(&gained_shape);
  let mut lost_km2 = geometry::area_km2(&lost_shape);
  let mut unchanged_km2 = geometry::area_km2(&unchanged_shape);

  // The noise floor is relative to the union of both layers, so identical
  // tolerance applies to either diff direction.
  let total_km2 = geometry::area_km2(&geometry::union(&shape_a, &shape_b));
  let noise_km2 = cfg.relative_epsilon * total_km2;

  let mut attributions: Vec<Attribution> = Vec::new();

  if gained_km2 <= noise_km2 {
    unchanged_km2 += gained_km2;
    gained_km2 = 0.0;
  } else {
    attributions.extend(attribute(
      &gained_shape,
      gained_km2,
      &later.regions,
      ChangeKind::Gained,
      cfg,
    ));
  }

  if lost_km2 <= noise_km2 {
    unchanged_km2 += lost_km2;
    lost_km2 = 0.0;
  } else {
    attributions.extend(attribute(
      &lost_shape,
      lost_km2,
      &earlier.regions,
      ChangeKind::Lost,
      cfg,
    ));
  }

  sort_attributions(&mut attributions);

  Ok(ChangeRecord {
    class: earlier.class,
    date_from: earlier.date,
    date_to: later.date,
    gained_km2,
    lost_km2,
    unchanged_km2,
    attributions,
  })
}

/// Assign a changed shape to the named regions of the layer that introduced
/// it, by overlap area. Whatever the per-region patches do not account for
/// is reported as an unattributed remainder, never silently dropped.
fn attribute(
  changed: &MultiPolygon<f64>,
  changed_km2: f64,
  owners: &[Region],
  kind: ChangeKind,
  cfg: &DiffConfig,
) -> Vec<Attribution> {
  let mut out = Vec::new();
  let mut accounted_km2 = 0.0;

  for region in owners {
    let overlap = geometry::intersection(changed, &region.geometry);
    let area_km2 = geometry::area_km2(&overlap);
    if area_km2 <= cfg.min_patch_km2 {
      continue;
    }
    accounted_km2 += area_km2;
    out.push(Attribution {
      kind,
      region: Some(region.to_ref()),
      area_km2,
      centroid: geometry::centroid(&overlap),
    });
  }

  let remainder_km2 = changed_km2 - accounted_km2;
  if remainder_km2 > cfg.min_patch_km2 {
    out.push(Attribution {
      kind,
      region: None,
      area_km2: remainder_km2,
      centroid: geometry::centroid(changed),
    });
  }

  out
}

/// Area descending; ties broken by region id, with unattributed remainders
/// last among equals. Keeps diff output and rendering deterministic.
pub(crate) fn sort_attributions(items: &mut [Attribution]) {
  items.sort_by(|a, b| {
    b.area_km2
      .total_cmp(&a.area_km2)
      .then_with(|| match (&a.region, &b.region) {
        (Some(x), Some(y)) => x.region_id.cmp(&y.region_id),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
      })
  });
}
