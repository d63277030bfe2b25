//! Change records — the computed difference between two layers, and the
//! period summaries folded from them.
//!
//! These types are ephemeral: recomputed on demand, never the system's
//! source of truth. A rendered report may be cached by the caller.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{class::LayerClass, region::RegionRef};

// ─── Attribution ─────────────────────────────────────────────────────────────

/// Whether a changed area appeared or disappeared between the two dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
  Gained,
  Lost,
}

impl ChangeKind {
  pub fn as_str(self) -> &'static str {
    match self {
      ChangeKind::Gained => "gained",
      ChangeKind::Lost => "lost",
    }
  }
}

/// A changed sub-area assigned to the named region that overlaps it.
/// `region: None` records the unattributed remainder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribution {
  pub kind:     ChangeKind,
  pub region:   Option<RegionRef>,
  pub area_km2: f64,
  /// Representative point of the changed sub-area (x, y), when computable.
  pub centroid: Option<(f64, f64)>,
}

// ─── ChangeRecord ────────────────────────────────────────────────────────────

/// The result of diffing two layers of the same class between `date_from`
/// (earlier) and `date_to` (later).
///
/// Invariant: `gained_km2 + lost_km2 + unchanged_km2` equals the area of the
/// union of the two input layers, within the differ's configured tolerance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
  pub class:         LayerClass,
  pub date_from:     NaiveDate,
  pub date_to:       NaiveDate,
  pub gained_km2:    f64,
  pub lost_km2:      f64,
  pub unchanged_km2: f64,
  /// Sorted by area descending, ties broken by region id; unattributed
  /// remainders sort last among equals.
  pub attributions:  Vec<Attribution>,
}

impl ChangeRecord {
  /// True when the record carries no change above the noise tolerance.
  pub fn is_quiet(&self) -> bool {
    self.gained_km2 == 0.0 && self.lost_km2 == 0.0
  }

  /// Net movement: positive when more area was gained than lost.
  pub fn net_km2(&self) -> f64 { self.gained_km2 - self.lost_km2 }
}

// ─── PeriodSummary ───────────────────────────────────────────────────────────

/// Day-by-day change records across a date range, plus the cumulative net
/// record computed from the endpoint layers.
///
/// The net record is deliberately *not* the sum of the daily records: a
/// region that flips back and forth would be double-counted. Net change
/// reflects final state versus initial state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodSummary {
  pub class:     LayerClass,
  pub date_from: NaiveDate,
  pub date_to:   NaiveDate,
  /// One record per consecutive pair of stored dates, in date order.
  pub daily:     Vec<ChangeRecord>,
  /// `diff(first stored layer, last stored layer)`.
  pub net:       ChangeRecord,
  /// Top-N attributions from the net record, by absolute changed area.
  pub top:       Vec<Attribution>,
}
