//! `demarc` — backfill, diff, and report over a territorial layer store.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and runs one subcommand.
//!
//! ```
//! demarc backfill --from 2024-01-01 --to 2024-01-31
//! demarc diff --class occupied --from 2024-01-01 --to 2024-01-02
//! demarc report --class occupied --from 2024-01-01 --to 2024-01-31 --top 5
//! ```

mod commands;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use demarc_core::class::LayerClass;
use demarc_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Territorial layer differencing and reporting")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Walk a date range, normalise source snapshots, and persist layers.
  Backfill {
    #[arg(long)]
    from: NaiveDate,
    #[arg(long)]
    to:   NaiveDate,

    /// Classes to backfill (default: all).
    #[arg(long, value_delimiter = ',')]
    classes: Vec<LayerClass>,

    /// Replace already-stored layers instead of skipping them.
    #[arg(long)]
    overwrite: bool,
  },

  /// Diff two stored dates for one class.
  Diff {
    #[arg(long)]
    class: LayerClass,
    #[arg(long)]
    from:  NaiveDate,
    #[arg(long)]
    to:    NaiveDate,

    /// Render with markdown headings.
    #[arg(long)]
    markdown: bool,
  },

  /// Aggregate a period and render the summary.
  Report {
    #[arg(long)]
    class: LayerClass,
    #[arg(long)]
    from:  NaiveDate,
    #[arg(long)]
    to:    NaiveDate,

    /// How many top-changed regions to list.
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Render with markdown headings.
    #[arg(long)]
    markdown: bool,

    /// Cache the rendered report in the store.
    #[arg(long)]
    cache: bool,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Runtime configuration, deserialised from `config.toml` and `DEMARC_*`
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// SQLite database file.
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,

  /// Directory holding `snapshot_YYYY-MM-DD.json` documents.
  #[serde(default = "default_snapshots_dir")]
  pub snapshots_dir: PathBuf,
}

fn default_store_path() -> PathBuf { PathBuf::from("demarc.sqlite3") }

fn default_snapshots_dir() -> PathBuf { PathBuf::from("snapshots") }

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("DEMARC"))
    .build()
    .context("failed to read config file")?;

  let app_cfg: AppConfig = settings
    .try_deserialize()
    .context("failed to deserialise AppConfig")?;

  let store_path = expand_tilde(&app_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command {
    Command::Backfill { from, to, classes, overwrite } => {
      commands::backfill(&store, &app_cfg, from, to, classes, overwrite).await
    }
    Command::Diff { class, from, to, markdown } => {
      commands::diff(&store, class, from, to, markdown).await
    }
    Command::Report { class, from, to, top, markdown, cache } => {
      commands::report(&store, class, from, to, top, markdown, cache).await
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
