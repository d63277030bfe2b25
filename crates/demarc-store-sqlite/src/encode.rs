//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as ISO 8601 calendar dates, timestamps as RFC 3339
//! strings, and region lists as compact JSON. The checksum column holds the
//! lowercase sha256 hex digest of the exact `regions_json` text, which is
//! what makes content-identical overwrites detectable.

use chrono::{DateTime, NaiveDate, Utc};
use demarc_core::{class::LayerClass, region::Region};
use sha2::{Digest as _, Sha256};

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(date: NaiveDate) -> String { date.to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  s.parse().map_err(|_| Error::DateParse(s.to_owned()))
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── LayerClass ──────────────────────────────────────────────────────────────

pub fn encode_class(class: LayerClass) -> &'static str { class.as_str() }

pub fn decode_class(s: &str) -> Result<LayerClass> { Ok(s.parse()?) }

// ─── Regions ─────────────────────────────────────────────────────────────────

pub fn encode_regions(regions: &[Region]) -> Result<String> {
  Ok(serde_json::to_string(regions)?)
}

pub fn decode_regions(s: &str) -> Result<Vec<Region>> {
  Ok(serde_json::from_str(s)?)
}

/// Lowercase sha256 hex digest of the stored JSON text.
pub fn checksum(regions_json: &str) -> String {
  hex::encode(Sha256::digest(regions_json.as_bytes()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `layers` row.
pub struct RawLayer {
  pub date:         String,
  pub class:        String,
  pub regions_json: String,
}

impl RawLayer {
  pub fn into_layer(self) -> Result<demarc_core::layer::Layer> {
    Ok(demarc_core::layer::Layer {
      date:    decode_date(&self.date)?,
      class:   decode_class(&self.class)?,
      regions: decode_regions(&self.regions_json)?,
    })
  }
}
