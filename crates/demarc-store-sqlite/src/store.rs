//! [`SqliteStore`] — the SQLite implementation of [`LayerStore`].

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::OptionalExtension as _;

use demarc_core::{
  class::LayerClass,
  layer::Layer,
  store::{LayerStore, WriteMode, WriteOutcome},
};

use crate::{
  Error, Result,
  encode::{
    RawLayer, checksum, decode_date, decode_dt, encode_class, encode_date,
    encode_dt, encode_regions,
  },
  schema::SCHEMA,
};

/// A rendered report cached alongside the layers it was derived from.
#[derive(Debug, Clone)]
pub struct CachedReport {
  pub date:       NaiveDate,
  pub body:       String,
  pub created_at: DateTime<Utc>,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A demarc layer store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Report cache ────────────────────────────────────────────────────────

  /// Cache a rendered report for `date`.
  pub async fn put_report(&self, date: NaiveDate, body: &str) -> Result<()> {
    let date_str = encode_date(date);
    let body = body.to_owned();
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO reports (date, body, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![date_str, body, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// The most recently cached report, if any.
  pub async fn latest_report(&self) -> Result<Option<CachedReport>> {
    let raw: Option<(String, String, String)> = self
      .conn
      .call(|conn| {
        Ok(
          conn
            .query_row(
              "SELECT date, body, created_at FROM reports
               ORDER BY report_id DESC LIMIT 1",
              [],
              |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(date, body, at)| {
        Ok(CachedReport {
          date:       decode_date(&date)?,
          body,
          created_at: decode_dt(&at)?,
        })
      })
      .transpose()
  }
}

// ─── LayerStore impl ─────────────────────────────────────────────────────────

impl LayerStore for SqliteStore {
  type Error = Error;

  async fn get_layer(
    &self,
    date: NaiveDate,
    class: LayerClass,
  ) -> Result<Option<Layer>> {
    let date_str = encode_date(date);
    let class_str = encode_class(class).to_owned();

    let raw: Option<RawLayer> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT date, class, regions_json FROM layers
               WHERE date = ?1 AND class = ?2",
              rusqlite::params![date_str, class_str],
              |row| {
                Ok(RawLayer {
                  date:         row.get(0)?,
                  class:        row.get(1)?,
                  regions_json: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLayer::into_layer).transpose()
  }

  async fn layer_exists(
    &self,
    date: NaiveDate,
    class: LayerClass,
  ) -> Result<bool> {
    let date_str = encode_date(date);
    let class_str = encode_class(class).to_owned();

    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM layers WHERE date = ?1 AND class = ?2",
              rusqlite::params![date_str, class_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(exists)
  }

  async fn put_layer(
    &self,
    layer: Layer,
    mode: WriteMode,
  ) -> Result<WriteOutcome> {
    let date_str = encode_date(layer.date);
    let class_str = encode_class(layer.class).to_owned();
    let regions_json = encode_regions(&layer.regions)?;
    let features_count = layer.regions.len() as i64;
    let sum = checksum(&regions_json);
    let at_str = encode_dt(Utc::now());

    // Existence check, checksum comparison, and write happen inside one
    // `call` so the whole put is atomic per key.
    let outcome = self
      .conn
      .call(move |conn| {
        let existing: Option<String> = conn
          .query_row(
            "SELECT checksum FROM layers WHERE date = ?1 AND class = ?2",
            rusqlite::params![date_str, class_str],
            |row| row.get(0),
          )
          .optional()?;

        match (existing, mode) {
          (Some(_), WriteMode::SkipExisting) => {
            Ok(WriteOutcome::SkippedExisting)
          }
          (Some(old_sum), WriteMode::Overwrite) if old_sum == sum => {
            Ok(WriteOutcome::Unchanged)
          }
          _ => {
            conn.execute(
              "INSERT OR REPLACE INTO layers
                 (date, class, regions_json, features_count, checksum, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
              rusqlite::params![
                date_str,
                class_str,
                regions_json,
                features_count,
                sum,
                at_str,
              ],
            )?;
            Ok(WriteOutcome::Written)
          }
        }
      })
      .await?;

    Ok(outcome)
  }

  async fn list_dates(
    &self,
    class: LayerClass,
    from: NaiveDate,
    to: NaiveDate,
  ) -> Result<Vec<NaiveDate>> {
    let class_str = encode_class(class).to_owned();
    let from_str = encode_date(from);
    let to_str = encode_date(to);

    let raw: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT date FROM layers
           WHERE class = ?1 AND date >= ?2 AND date <= ?3
           ORDER BY date ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![class_str, from_str, to_str], |row| {
            row.get(0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raw.iter().map(|s| decode_date(s)).collect()
  }
}
