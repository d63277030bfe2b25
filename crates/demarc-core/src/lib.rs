//! Core types and trait definitions for the demarc territory tracker.
//!
//! This crate is deliberately free of database and CLI dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod change;
pub mod class;
pub mod error;
pub mod layer;
pub mod region;
pub mod snapshot;
pub mod source;
pub mod store;

pub use error::{Error, Result};
