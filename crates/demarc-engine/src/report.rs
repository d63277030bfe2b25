//! Report renderer — change records and period summaries to text.
//!
//! Pure formatting, no computation: attributions arrive already ranked and
//! areas are printed with fixed two-decimal precision, so rendering the same
//! input twice produces byte-identical text. Output sticks to plain
//! characters that survive markdown-oriented messaging consumers.

use std::fmt::Write as _;

use demarc_core::change::{Attribution, ChangeRecord, PeriodSummary};

/// How headings are decorated. The body text is identical in both formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
  Plain,
  Markdown,
}

/// How many attributions a single-day report lists.
const DAILY_TOP: usize = 3;

fn heading(text: &str, format: ReportFormat) -> String {
  match format {
    ReportFormat::Plain => text.to_owned(),
    ReportFormat::Markdown => format!("*{text}*"),
  }
}

fn attribution_line(index: usize, item: &Attribution) -> String {
  let place = item
    .region
    .as_ref()
    .map(|r| r.name.as_str())
    .unwrap_or("unattributed area");
  format!(
    "{}. {} ({}): {:.2} km²",
    index + 1,
    place,
    item.kind.as_str(),
    item.area_km2
  )
}

fn totals_line(record: &ChangeRecord) -> String {
  format!(
    "gained +{:.2} km², lost -{:.2} km², unchanged {:.2} km²",
    record.gained_km2, record.lost_km2, record.unchanged_km2
  )
}

// ─── Single change record ────────────────────────────────────────────────────

/// Render one day-over-day change record.
pub fn render_change(record: &ChangeRecord, format: ReportFormat) -> String {
  let mut out = String::new();
  let title = format!(
    "Changes for {}: {} -> {}",
    record.class, record.date_from, record.date_to
  );
  out.push_str(&heading(&title, format));
  out.push('\n');

  if record.is_quiet() {
    out.push_str("No significant changes in zone configuration.");
    return out;
  }

  out.push_str(&totals_line(record));

  if !record.attributions.is_empty() {
    out.push_str("\n\nTop changed areas:");
    for (i, item) in record.attributions.iter().take(DAILY_TOP).enumerate() {
      let _ = write!(out, "\n{}", attribution_line(i, item));
    }
  }

  out
}

// ─── Period summary ──────────────────────────────────────────────────────────

/// Render a multi-day period summary: net totals, the day-by-day breakdown,
/// and the top changed regions over the whole period.
pub fn render_period(summary: &PeriodSummary, format: ReportFormat) -> String {
  let mut out = String::new();
  let title = format!(
    "Period report for {}: {} -> {}",
    summary.class, summary.date_from, summary.date_to
  );
  out.push_str(&heading(&title, format));
  out.push('\n');

  if summary.net.is_quiet() {
    out.push_str("Net: no significant changes over the period.");
  } else {
    let _ = write!(
      out,
      "Net: {} (net {:+.2} km²)",
      totals_line(&summary.net),
      summary.net.net_km2()
    );
  }

  out.push_str("\n\nDay by day:");
  for record in &summary.daily {
    let _ = write!(
      out,
      "\n{} -> {}: +{:.2} / -{:.2} km²",
      record.date_from, record.date_to, record.gained_km2, record.lost_km2
    );
  }

  if !summary.top.is_empty() {
    out.push_str("\n\nTop changes over the period:");
    for (i, item) in summary.top.iter().enumerate() {
      let _ = write!(out, "\n{}", attribution_line(i, item));
    }
  }

  out
}
