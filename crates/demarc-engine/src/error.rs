//! Error types for `demarc-engine`.
//!
//! Per-unit failures (one raw region, one backfill date) are counted
//! outcomes, not errors; only whole-call failures surface here.

use chrono::NaiveDate;
use demarc_core::class::LayerClass;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
  /// Diffing layers of different classes has no meaning.
  #[error("class mismatch: cannot diff {left} against {right}")]
  ClassMismatch { left: LayerClass, right: LayerClass },

  /// Aggregation needs at least two stored dates in the requested range.
  #[error("need at least two stored dates in the range, found {0}")]
  InsufficientData(usize),

  /// The store listed a date but the layer read came back absent.
  #[error("layer missing for class {class} on {date}")]
  MissingLayer { class: LayerClass, date: NaiveDate },

  #[error("layer store unavailable: {0}")]
  Store(#[source] BoxError),
}

impl Error {
  pub(crate) fn store<E>(source: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Store(Box::new(source))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
