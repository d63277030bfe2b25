//! The backfill orchestrator — walks a date range, normalises source
//! snapshots, and writes layers according to an explicit write mode.
//!
//! Dates are processed independently: one date's failure is recorded and the
//! run continues. The final tally is an associative, commutative fold over
//! per-date outcomes, so it does not depend on processing order.

use std::sync::{
  Arc,
  atomic::{AtomicBool, Ordering},
};

use chrono::NaiveDate;
use demarc_core::{
  class::LayerClass,
  source::SnapshotSource,
  store::{LayerStore, WriteMode, WriteOutcome},
};

use crate::normalize::{NormalizeConfig, normalize};

// ─── Cancellation ────────────────────────────────────────────────────────────

/// Cooperative cancellation flag, checked between per-date units of work.
/// Cancelling leaves already-written dates intact; there is no rollback.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
  flag: Arc<AtomicBool>,
}

impl CancelToken {
  pub fn new() -> Self { Self::default() }

  pub fn cancel(&self) { self.flag.store(true, Ordering::Relaxed); }

  pub fn is_cancelled(&self) -> bool { self.flag.load(Ordering::Relaxed) }
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// What happened for one date of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateStatus {
  Processed {
    written:          usize,
    skipped_existing: usize,
    unchanged:        usize,
    /// Raw records the normaliser dropped for failing validation.
    dropped_regions:  usize,
  },
  /// No raw snapshot exists for this date, or the snapshot carries none of
  /// the requested classes.
  MissingSource,
  /// A source or store failure; the message is kept for the report.
  Failed(String),
}

#[derive(Debug, Clone)]
pub struct DateOutcome {
  pub date:   NaiveDate,
  pub status: DateStatus,
}

/// Final tally of a backfill run.
#[derive(Debug, Default)]
pub struct BackfillReport {
  pub written:          usize,
  pub skipped_existing: usize,
  pub unchanged:        usize,
  pub missing_source:   usize,
  pub failed:           usize,
  /// True when the run stopped early on a cancelled token.
  pub cancelled:        bool,
  /// Per-date outcomes in processing order.
  pub outcomes:         Vec<DateOutcome>,
}

impl BackfillReport {
  fn absorb(&mut self, outcome: DateOutcome) {
    match &outcome.status {
      DateStatus::Processed { written, skipped_existing, unchanged, .. } => {
        self.written += written;
        self.skipped_existing += skipped_existing;
        self.unchanged += unchanged;
      }
      DateStatus::MissingSource => self.missing_source += 1,
      DateStatus::Failed(_) => self.failed += 1,
    }
    self.outcomes.push(outcome);
  }
}

// ─── Orchestrator ────────────────────────────────────────────────────────────

/// Backfill layers for every date in `[from, to]` (inclusive, day
/// granularity) and every class in `classes`.
pub async fn backfill<Src, St>(
  source: &Src,
  store: &St,
  from: NaiveDate,
  to: NaiveDate,
  classes: &[LayerClass],
  mode: WriteMode,
  normalize_cfg: &NormalizeConfig,
  cancel: &CancelToken,
) -> BackfillReport
where
  Src: SnapshotSource,
  St: LayerStore,
{
  let (from, to) = if to < from { (to, from) } else { (from, to) };
  let mut report = BackfillReport::default();

  let mut date = from;
  while date <= to {
    if cancel.is_cancelled() {
      tracing::info!(%date, "backfill cancelled; keeping layers already written");
      report.cancelled = true;
      break;
    }

    let status =
      backfill_date(source, store, date, classes, mode, normalize_cfg).await;
    match &status {
      DateStatus::Processed {
        written,
        skipped_existing,
        unchanged,
        dropped_regions,
      } => {
        tracing::info!(
          %date,
          written,
          skipped_existing,
          unchanged,
          dropped_regions,
          "backfilled date"
        );
      }
      DateStatus::MissingSource => {
        tracing::warn!(%date, "no snapshot available for date");
      }
      DateStatus::Failed(err) => {
        tracing::error!(%date, error = %err, "backfill failed for date");
      }
    }
    report.absorb(DateOutcome { date, status });

    date = match date.succ_opt() {
      Some(next) => next,
      None => break,
    };
  }

  report
}

async fn backfill_date<Src, St>(
  source: &Src,
  store: &St,
  date: NaiveDate,
  classes: &[LayerClass],
  mode: WriteMode,
  normalize_cfg: &NormalizeConfig,
) -> DateStatus
where
  Src: SnapshotSource,
  St: LayerStore,
{
  // Fast path: with skip-existing, don't even fetch the source when every
  // requested class is already stored.
  if mode == WriteMode::SkipExisting {
    match all_classes_exist(store, date, classes).await {
      Ok(true) => {
        return DateStatus::Processed {
          written:          0,
          skipped_existing: classes.len(),
          unchanged:        0,
          dropped_regions:  0,
        };
      }
      Ok(false) => {}
      Err(message) => return DateStatus::Failed(message),
    }
  }

  let snapshot = match source.fetch(date).await {
    Ok(Some(snapshot)) => snapshot,
    Ok(None) => return DateStatus::MissingSource,
    Err(err) => return DateStatus::Failed(err.to_string()),
  };

  let mut written = 0usize;
  let mut skipped_existing = 0usize;
  let mut unchanged = 0usize;
  let mut dropped_regions = 0usize;
  let mut any_class_present = false;

  for class in classes {
    let Some(records) = snapshot.class_records(class.as_str()) else {
      continue;
    };
    any_class_present = true;

    let normalized = normalize(date, *class, records, normalize_cfg);
    dropped_regions += normalized.skipped;

    match store.put_layer(normalized.layer, mode).await {
      Ok(WriteOutcome::Written) => written += 1,
      Ok(WriteOutcome::SkippedExisting) => skipped_existing += 1,
      Ok(WriteOutcome::Unchanged) => unchanged += 1,
      Err(err) => return DateStatus::Failed(err.to_string()),
    }
  }

  if !any_class_present {
    // A document exists but carries none of the requested layers.
    return DateStatus::MissingSource;
  }

  DateStatus::Processed { written, skipped_existing, unchanged, dropped_regions }
}

async fn all_classes_exist<St: LayerStore>(
  store: &St,
  date: NaiveDate,
  classes: &[LayerClass],
) -> Result<bool, String> {
  for class in classes {
    let exists = store
      .layer_exists(date, *class)
      .await
      .map_err(|e| e.to_string())?;
    if !exists {
      return Ok(false);
    }
  }
  Ok(true)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testutil::{MemSource, MemStore, d, raw, snapshot, square_rings};

  const CLASSES: [LayerClass; 2] = [LayerClass::Occupied, LayerClass::Gray];

  fn cfg() -> NormalizeConfig { NormalizeConfig::default() }

  fn day_snapshot(date: &str) -> demarc_core::snapshot::RawSnapshot {
    snapshot(date, vec![
      ("occupied", vec![raw("A", square_rings(0.0, 0.0, 10.0))]),
      ("gray", vec![raw("G", square_rings(20.0, 0.0, 5.0))]),
    ])
  }

  #[tokio::test]
  async fn writes_all_dates_and_classes() {
    let source = MemSource::default()
      .with(day_snapshot("2024-01-01"))
      .with(day_snapshot("2024-01-02"));
    let store = MemStore::default();

    let report = backfill(
      &source,
      &store,
      d("2024-01-01"),
      d("2024-01-02"),
      &CLASSES,
      WriteMode::SkipExisting,
      &cfg(),
      &CancelToken::new(),
    )
    .await;

    assert_eq!(report.written, 4);
    assert_eq!(report.skipped_existing, 0);
    assert_eq!(report.missing_source, 0);
    assert_eq!(report.failed, 0);
    assert!(!report.cancelled);
    assert_eq!(store.layer_count(), 4);
  }

  #[tokio::test]
  async fn missing_date_is_counted_and_does_not_abort() {
    // No snapshot for the middle date.
    let source = MemSource::default()
      .with(day_snapshot("2024-01-01"))
      .with(day_snapshot("2024-01-03"));
    let store = MemStore::default();

    let report = backfill(
      &source,
      &store,
      d("2024-01-01"),
      d("2024-01-03"),
      &CLASSES,
      WriteMode::SkipExisting,
      &cfg(),
      &CancelToken::new(),
    )
    .await;

    assert_eq!(report.written, 4);
    assert_eq!(report.missing_source, 1);
    assert!(matches!(
      report.outcomes[1].status,
      DateStatus::MissingSource
    ));
    // The aggregator will later pair 01-01 directly with 01-03.
    assert!(store.get(d("2024-01-02"), LayerClass::Occupied).is_none());
  }

  #[tokio::test]
  async fn second_skip_existing_run_writes_nothing() {
    let source = MemSource::default()
      .with(day_snapshot("2024-01-01"))
      .with(day_snapshot("2024-01-02"));
    let store = MemStore::default();

    let first = backfill(
      &source,
      &store,
      d("2024-01-01"),
      d("2024-01-02"),
      &CLASSES,
      WriteMode::SkipExisting,
      &cfg(),
      &CancelToken::new(),
    )
    .await;
    assert_eq!(first.written, 4);

    let second = backfill(
      &source,
      &store,
      d("2024-01-01"),
      d("2024-01-02"),
      &CLASSES,
      WriteMode::SkipExisting,
      &cfg(),
      &CancelToken::new(),
    )
    .await;

    assert_eq!(second.written, 0);
    assert_eq!(second.skipped_existing, 4);
    assert_eq!(store.layer_count(), 4);
  }

  #[tokio::test]
  async fn snapshot_without_requested_classes_counts_as_missing() {
    let source = MemSource::default().with(snapshot("2024-01-01", vec![(
      "contested",
      vec![raw("C", square_rings(0.0, 0.0, 5.0))],
    )]));
    let store = MemStore::default();

    let report = backfill(
      &source,
      &store,
      d("2024-01-01"),
      d("2024-01-01"),
      &CLASSES,
      WriteMode::SkipExisting,
      &cfg(),
      &CancelToken::new(),
    )
    .await;

    assert_eq!(report.missing_source, 1);
    assert_eq!(store.layer_count(), 0);
  }

  #[tokio::test]
  async fn source_failure_is_recorded_and_run_continues() {
    let mut source = MemSource::default()
      .with(day_snapshot("2024-01-01"))
      .with(day_snapshot("2024-01-02"));
    source.fail_dates.insert(d("2024-01-01"));
    let store = MemStore::default();

    let report = backfill(
      &source,
      &store,
      d("2024-01-01"),
      d("2024-01-02"),
      &CLASSES,
      WriteMode::SkipExisting,
      &cfg(),
      &CancelToken::new(),
    )
    .await;

    assert_eq!(report.failed, 1);
    assert_eq!(report.written, 2);
    assert!(
      matches!(&report.outcomes[0].status, DateStatus::Failed(msg) if !msg.is_empty())
    );
  }

  #[tokio::test]
  async fn store_failure_is_recorded_per_date() {
    let source = MemSource::default().with(day_snapshot("2024-01-01"));
    let mut store = MemStore::default();
    store.fail_puts = true;

    let report = backfill(
      &source,
      &store,
      d("2024-01-01"),
      d("2024-01-01"),
      &CLASSES,
      WriteMode::Overwrite,
      &cfg(),
      &CancelToken::new(),
    )
    .await;

    assert_eq!(report.failed, 1);
    assert_eq!(report.written, 0);
  }

  #[tokio::test]
  async fn dropped_regions_are_tallied_per_date() {
    let source = MemSource::default().with(snapshot("2024-01-01", vec![(
      "occupied",
      vec![
        raw("Good", square_rings(0.0, 0.0, 10.0)),
        raw("Bad", vec![vec![[0.0, 0.0], [1.0, 1.0]]]),
      ],
    )]));
    let store = MemStore::default();

    let report = backfill(
      &source,
      &store,
      d("2024-01-01"),
      d("2024-01-01"),
      &[LayerClass::Occupied],
      WriteMode::SkipExisting,
      &cfg(),
      &CancelToken::new(),
    )
    .await;

    assert!(matches!(
      report.outcomes[0].status,
      DateStatus::Processed { written: 1, dropped_regions: 1, .. }
    ));
  }

  #[tokio::test]
  async fn cancelled_token_stops_before_next_date() {
    let source = MemSource::default()
      .with(day_snapshot("2024-01-01"))
      .with(day_snapshot("2024-01-02"));
    let store = MemStore::default();

    let cancel = CancelToken::new();
    cancel.cancel();

    let report = backfill(
      &source,
      &store,
      d("2024-01-01"),
      d("2024-01-02"),
      &CLASSES,
      WriteMode::SkipExisting,
      &cfg(),
      &cancel,
    )
    .await;

    assert!(report.cancelled);
    assert!(report.outcomes.is_empty());
    assert_eq!(store.layer_count(), 0);
  }
}
