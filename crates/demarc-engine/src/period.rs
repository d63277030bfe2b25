//! The period aggregator — daily diffs folded into a range summary.
//!
//! Only dates actually present in the store take part; missing days are
//! never synthesised or interpolated. The cumulative net record is computed
//! from the endpoint layers, not by summing daily diffs, so regions that
//! flip back and forth are not double-counted.

use chrono::NaiveDate;
use demarc_core::{
  change::PeriodSummary, class::LayerClass, layer::Layer, store::LayerStore,
};

use crate::{
  Error, Result,
  diff::{DiffConfig, diff},
};

/// Tunables for a period aggregation.
#[derive(Debug, Clone)]
pub struct PeriodConfig {
  /// How many top-changed regions the summary carries.
  pub top_n: usize,
  pub diff:  DiffConfig,
}

impl Default for PeriodConfig {
  fn default() -> Self { Self { top_n: 10, diff: DiffConfig::default() } }
}

/// Aggregate changes for `class` across all stored dates in `[from, to]`.
///
/// Fails with [`Error::InsufficientData`] when fewer than two dates are
/// stored in the range, and with [`Error::MissingLayer`] when the store
/// lists a date whose layer read comes back absent — aggregation has no
/// partial-result semantics.
pub async fn aggregate<S: LayerStore>(
  store: &S,
  class: LayerClass,
  from: NaiveDate,
  to: NaiveDate,
  cfg: &PeriodConfig,
) -> Result<PeriodSummary> {
  let (from, to) = if to < from { (to, from) } else { (from, to) };

  let dates = store
    .list_dates(class, from, to)
    .await
    .map_err(Error::store)?;
  if dates.len() < 2 {
    return Err(Error::InsufficientData(dates.len()));
  }

  // Fetch every layer up front; the differ itself never touches I/O.
  let mut layers: Vec<Layer> = Vec::with_capacity(dates.len());
  for date in &dates {
    let layer = store
      .get_layer(*date, class)
      .await
      .map_err(Error::store)?
      .ok_or(Error::MissingLayer { class, date: *date })?;
    layers.push(layer);
  }

  let mut daily = Vec::with_capacity(layers.len() - 1);
  for pair in layers.windows(2) {
    daily.push(diff(&pair[0], &pair[1], &cfg.diff)?);
  }

  let net = diff(&layers[0], &layers[layers.len() - 1], &cfg.diff)?;
  let top = net.attributions.iter().take(cfg.top_n).cloned().collect();

  tracing::debug!(
    %class,
    days = dates.len(),
    net_km2 = net.net_km2(),
    "aggregated period"
  );

  Ok(PeriodSummary {
    class,
    date_from: dates[0],
    date_to: dates[dates.len() - 1],
    daily,
    net,
    top,
  })
}
