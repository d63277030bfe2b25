//! Classification classes for territorial status.
//!
//! The class set is closed: snapshots may carry other layer names, but only
//! recognised classes are normalised, stored, and diffed.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// The territorial status a layer describes.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LayerClass {
  Occupied,
  Gray,
  Contested,
}

impl LayerClass {
  /// Every recognised class, in stable order.
  pub const ALL: [LayerClass; 3] =
    [LayerClass::Occupied, LayerClass::Gray, LayerClass::Contested];

  /// The string form used in storage keys, snapshot documents, and the CLI.
  pub fn as_str(self) -> &'static str {
    match self {
      LayerClass::Occupied => "occupied",
      LayerClass::Gray => "gray",
      LayerClass::Contested => "contested",
    }
  }
}

impl fmt::Display for LayerClass {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for LayerClass {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "occupied" => Ok(LayerClass::Occupied),
      "gray" => Ok(LayerClass::Gray),
      "contested" => Ok(LayerClass::Contested),
      other => Err(Error::UnknownClass(other.to_owned())),
    }
  }
}
