//! The demarc differencing and aggregation engine.
//!
//! Given two or more dated layers of classified regions, this crate computes
//! which areas changed classification, by how much, and which named regions
//! are most affected, and folds daily diffs into period summaries.
//!
//! All polygon set algebra is funnelled through [`geometry`] so the numeric
//! tolerance policy lives in exactly one place.

pub mod backfill;
pub mod diff;
pub mod error;
pub mod fs_source;
pub mod geometry;
pub mod normalize;
pub mod period;
pub mod report;

pub use error::{Error, Result};

#[cfg(test)]
pub(crate) mod testutil;
