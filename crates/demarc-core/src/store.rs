//! The `LayerStore` trait and supporting write types.
//!
//! The trait is implemented by storage backends (e.g. `demarc-store-sqlite`).
//! The engine and CLI depend on this abstraction, not on any concrete
//! backend. Each `(date, class)` write is independently atomic; the store is
//! never asked for transactional multi-key writes.

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{class::LayerClass, layer::Layer};

// ─── Write types ─────────────────────────────────────────────────────────────

/// How a write should treat an existing layer under the same key.
///
/// Re-writing a key is never silent: overwrites must be requested
/// explicitly, which keeps backfill idempotence provable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
  /// An existing key is left untouched and reported as skipped.
  SkipExisting,
  /// An existing key is replaced.
  Overwrite,
}

/// What a [`LayerStore::put_layer`] call actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
  /// The layer was inserted, or replaced an existing one.
  Written,
  /// The key already existed and the mode was [`WriteMode::SkipExisting`].
  SkippedExisting,
  /// An overwrite found byte-identical content already stored and wrote
  /// nothing.
  Unchanged,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a demarc layer store backend.
///
/// Layers are immutable after write; the only mutation point is `put_layer`,
/// whose atomicity is the backend's responsibility.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait LayerStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Retrieve the layer stored under `(date, class)`. Returns `None` if no
  /// layer has been written for that key.
  fn get_layer(
    &self,
    date: NaiveDate,
    class: LayerClass,
  ) -> impl Future<Output = Result<Option<Layer>, Self::Error>> + Send + '_;

  /// Cheap existence check for `(date, class)` — the backfill fast path.
  fn layer_exists(
    &self,
    date: NaiveDate,
    class: LayerClass,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Persist a layer under its `(date, class)` key according to `mode`.
  ///
  /// A `SkipExisting` write against an existing key is a no-op reported as
  /// [`WriteOutcome::SkippedExisting`], never a failure.
  fn put_layer(
    &self,
    layer: Layer,
    mode: WriteMode,
  ) -> impl Future<Output = Result<WriteOutcome, Self::Error>> + Send + '_;

  /// Dates within `[from, to]` (inclusive) that have a stored layer for
  /// `class`, in ascending order.
  fn list_dates(
    &self,
    class: LayerClass,
    from: NaiveDate,
    to: NaiveDate,
  ) -> impl Future<Output = Result<Vec<NaiveDate>, Self::Error>> + Send + '_;
}
