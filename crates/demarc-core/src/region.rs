//! Region — a named geographic area within a classified layer.
//!
//! Regions are immutable once captured for a date. Coordinates are planar
//! equal-area kilometres; producing the projection is the snapshot source's
//! concern, so every area in this workspace comes out directly in km².

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

use crate::class::LayerClass;

/// A named geographic area with validated geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
  /// Stable identifier; the raw document id when present, else a slug
  /// derived from the name.
  pub region_id: String,
  pub name:      String,
  pub class:     LayerClass,
  pub geometry:  MultiPolygon<f64>,
}

impl Region {
  pub fn to_ref(&self) -> RegionRef {
    RegionRef {
      region_id: self.region_id.clone(),
      name:      self.name.clone(),
    }
  }
}

/// A lightweight reference to a region, used in change attributions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRef {
  pub region_id: String,
  pub name:      String,
}

/// Derive a stable identifier from a region name: lowercase, with runs of
/// non-alphanumeric characters collapsed to a single hyphen.
pub fn slug(name: &str) -> String {
  let mut out = String::with_capacity(name.len());
  let mut pending_sep = false;
  for c in name.chars() {
    if c.is_alphanumeric() {
      if pending_sep && !out.is_empty() {
        out.push('-');
      }
      pending_sep = false;
      out.extend(c.to_lowercase());
    } else {
      pending_sep = true;
    }
  }
  out
}
