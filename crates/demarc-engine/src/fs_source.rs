//! Filesystem snapshot source.
//!
//! Reads `snapshot_YYYY-MM-DD.json` documents from a directory. The main
//! producer in practice; the archive exporter writes the same layout.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use demarc_core::{snapshot::RawSnapshot, source::SnapshotSource};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsSourceError {
  #[error("failed to read snapshot file {path}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("failed to decode snapshot file {path}")]
  Decode {
    path:   PathBuf,
    #[source]
    source: demarc_core::Error,
  },
  /// The file name says one date, the document body says another.
  #[error("snapshot {path} claims date {found}, expected {expected}")]
  DateMismatch {
    path:     PathBuf,
    expected: NaiveDate,
    found:    NaiveDate,
  },
}

/// A directory of dated snapshot documents.
#[derive(Debug, Clone)]
pub struct FsSnapshotSource {
  root: PathBuf,
}

impl FsSnapshotSource {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  pub fn root(&self) -> &Path { &self.root }

  fn path_for(&self, date: NaiveDate) -> PathBuf {
    self.root.join(format!("snapshot_{date}.json"))
  }
}

impl SnapshotSource for FsSnapshotSource {
  type Error = FsSourceError;

  async fn fetch(
    &self,
    date: NaiveDate,
  ) -> Result<Option<RawSnapshot>, Self::Error> {
    let path = self.path_for(date);

    let text = match tokio::fs::read_to_string(&path).await {
      Ok(text) => text,
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        return Ok(None);
      }
      Err(err) => return Err(FsSourceError::Io { path, source: err }),
    };

    let snapshot = RawSnapshot::from_json(&text)
      .map_err(|err| FsSourceError::Decode { path: path.clone(), source: err })?;

    if snapshot.date != date {
      return Err(FsSourceError::DateMismatch {
        path,
        expected: date,
        found: snapshot.date,
      });
    }

    Ok(Some(snapshot))
  }
}
