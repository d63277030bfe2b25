//! Layer — the set of regions of one class as observed on one date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{class::LayerClass, region::Region};

/// One classified snapshot layer, keyed by `(date, class)`.
///
/// Never mutated after it is written; a correction is a new write to the
/// same key under an explicit overwrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
  pub date:    NaiveDate,
  pub class:   LayerClass,
  pub regions: Vec<Region>,
}

impl Layer {
  pub fn empty(date: NaiveDate, class: LayerClass) -> Self {
    Self { date, class, regions: Vec::new() }
  }

  /// The storage key this layer is persisted under.
  pub fn key(&self) -> (NaiveDate, LayerClass) { (self.date, self.class) }

  pub fn is_empty(&self) -> bool { self.regions.is_empty() }
}
