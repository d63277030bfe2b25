//! Subcommand implementations.

use anyhow::{Context as _, bail};
use chrono::NaiveDate;
use demarc_core::{
  class::LayerClass,
  store::{LayerStore as _, WriteMode},
};
use demarc_engine::{
  backfill::{self, CancelToken, DateStatus},
  diff::DiffConfig,
  fs_source::FsSnapshotSource,
  normalize::NormalizeConfig,
  period::{PeriodConfig, aggregate},
  report::{ReportFormat, render_change, render_period},
};
use demarc_store_sqlite::SqliteStore;

use crate::AppConfig;

fn format_for(markdown: bool) -> ReportFormat {
  if markdown { ReportFormat::Markdown } else { ReportFormat::Plain }
}

// ─── backfill ─────────────────────────────────────────────────────────────────

pub async fn backfill(
  store: &SqliteStore,
  cfg: &AppConfig,
  from: NaiveDate,
  to: NaiveDate,
  classes: Vec<LayerClass>,
  overwrite: bool,
) -> anyhow::Result<()> {
  let classes = if classes.is_empty() {
    LayerClass::ALL.to_vec()
  } else {
    classes
  };
  let mode = if overwrite {
    WriteMode::Overwrite
  } else {
    WriteMode::SkipExisting
  };

  let source = FsSnapshotSource::new(&cfg.snapshots_dir);
  tracing::info!(
    snapshots_dir = %source.root().display(),
    %from,
    %to,
    ?mode,
    "starting backfill"
  );

  // Ctrl-C stops the run between dates; layers already written stay.
  let cancel = CancelToken::new();
  let ctrl_c_cancel = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      tracing::warn!("interrupt received; finishing current date");
      ctrl_c_cancel.cancel();
    }
  });

  let report = backfill::backfill(
    &source,
    store,
    from,
    to,
    &classes,
    mode,
    &NormalizeConfig::default(),
    &cancel,
  )
  .await;

  for outcome in &report.outcomes {
    if let DateStatus::Failed(message) = &outcome.status {
      eprintln!("{}: {message}", outcome.date);
    }
  }

  println!(
    "written {}, skipped {}, unchanged {}, missing {}, failed {}{}",
    report.written,
    report.skipped_existing,
    report.unchanged,
    report.missing_source,
    report.failed,
    if report.cancelled { " (cancelled)" } else { "" },
  );

  if report.failed > 0 {
    bail!("{} date(s) failed", report.failed);
  }
  Ok(())
}

// ─── diff ─────────────────────────────────────────────────────────────────────

pub async fn diff(
  store: &SqliteStore,
  class: LayerClass,
  from: NaiveDate,
  to: NaiveDate,
  markdown: bool,
) -> anyhow::Result<()> {
  let earlier = store
    .get_layer(from, class)
    .await?
    .with_context(|| format!("no {class} layer stored for {from}"))?;
  let later = store
    .get_layer(to, class)
    .await?
    .with_context(|| format!("no {class} layer stored for {to}"))?;

  let record = demarc_engine::diff::diff(&earlier, &later, &DiffConfig::default())?;
  println!("{}", render_change(&record, format_for(markdown)));
  Ok(())
}

// ─── report ───────────────────────────────────────────────────────────────────

pub async fn report(
  store: &SqliteStore,
  class: LayerClass,
  from: NaiveDate,
  to: NaiveDate,
  top: usize,
  markdown: bool,
  cache: bool,
) -> anyhow::Result<()> {
  let cfg = PeriodConfig { top_n: top, ..PeriodConfig::default() };
  let summary = aggregate(store, class, from, to, &cfg).await?;
  let text = render_period(&summary, format_for(markdown));

  if cache {
    store
      .put_report(summary.date_to, &text)
      .await
      .context("failed to cache report")?;
  }

  println!("{text}");
  Ok(())
}
