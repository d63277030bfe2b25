//! Raw snapshot documents — the immutable per-date input produced by the
//! external scraper or historical archive.
//!
//! A snapshot maps layer-class names to sequences of raw region records.
//! Nothing here is validated; the geometry normaliser turns raw records
//! into canonical [`Layer`](crate::layer::Layer)s.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Result;

/// One raw region description as it appears in a snapshot document.
///
/// `rings` holds closed coordinate rings as `[x, y]` pairs: the first ring
/// is the exterior, any following rings are holes. Rings may arrive
/// unclosed, degenerate, or duplicated; the normaliser repairs or drops
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRegion {
  /// Stable id assigned by the producer, when it has one.
  #[serde(default)]
  pub id:    Option<String>,
  pub name:  String,
  pub rings: Vec<Vec<[f64; 2]>>,
}

/// The full collection of raw layers for one date across all classes.
///
/// Keys are class names as produced by the source; unrecognised classes are
/// simply never requested by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSnapshot {
  pub date:   NaiveDate,
  pub layers: BTreeMap<String, Vec<RawRegion>>,
}

impl RawSnapshot {
  /// Parse a snapshot document from its JSON text form.
  pub fn from_json(text: &str) -> Result<Self> {
    Ok(serde_json::from_str(text)?)
  }

  /// The raw records for one class name, if the document carries that layer.
  pub fn class_records(&self, class: &str) -> Option<&[RawRegion]> {
    self.layers.get(class).map(Vec::as_slice)
  }
}
