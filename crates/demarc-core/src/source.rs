//! The `SnapshotSource` trait — where raw per-date documents come from.
//!
//! The scraper and historical archive live outside this repository; the
//! backfill orchestrator only ever sees this seam.

use std::future::Future;

use chrono::NaiveDate;

use crate::snapshot::RawSnapshot;

/// A producer of immutable dated snapshot documents.
pub trait SnapshotSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the raw snapshot for `date`.
  ///
  /// `Ok(None)` means the source has no document for that date — a normal,
  /// counted outcome during backfill, not a failure.
  fn fetch(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Option<RawSnapshot>, Self::Error>> + Send + '_;
}
