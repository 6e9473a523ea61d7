//! `rollcall` — track upcoming state-legislative elections.
//!
//! # Usage
//!
//! ```
//! rollcall scrape --regions VA OH --years 2025 2026
//! rollcall query --region TX --contested true
//! rollcall stats
//! rollcall export --format json
//! rollcall serve --port 4000
//! ```

mod config;
mod output;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use rollcall_api::api_router;
use rollcall_core::{
  query, ElectionStore, IngestRequest, Office, QueryRequest, Region,
};
use rollcall_pipeline::{Pipeline, RunOptions};
use rollcall_sources::{BallotpediaConfig, BallotpediaSource};
use rollcall_store_files::FileStore;
use tokio::{net::TcpListener, sync::watch};
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use config::Settings;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
  name = "rollcall",
  about = "Track upcoming state-legislative elections"
)]
struct Cli {
  /// Path to a TOML configuration file (default: ./rollcall.toml).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Scrape listing pages and merge the results into the local dataset.
  Scrape {
    /// Regions to scrape, as codes or state names (default: the
    /// configured priority set).
    #[arg(long, num_args = 1..)]
    regions: Vec<String>,

    /// Election years to scrape (default: the configured horizon).
    #[arg(long, num_args = 1..)]
    years: Vec<i32>,

    /// Scrape all fifty states.
    #[arg(long)]
    all_regions: bool,
  },

  /// Query the local dataset with composable filters.
  Query {
    /// Region code or state name.
    #[arg(long)]
    region: Option<String>,

    /// Office category, e.g. "State Senate".
    #[arg(long)]
    office: Option<String>,

    /// Contested flag: true or false.
    #[arg(long)]
    contested: Option<bool>,

    /// Inclusive lower bound on partisan lean.
    #[arg(long)]
    min_lean: Option<f64>,

    /// Inclusive upper bound on partisan lean.
    #[arg(long)]
    max_lean: Option<f64>,

    /// Only races whose partisan lean is unknown.
    #[arg(long)]
    lean_unknown: bool,
  },

  /// Show dataset statistics.
  Stats,

  /// Copy one persisted representation to a new path.
  Export {
    #[arg(long, value_enum, default_value_t)]
    format: ExportFormat,

    /// Destination path (default: elections_export_<date>.<ext>).
    #[arg(long)]
    output: Option<PathBuf>,
  },

  /// Serve the read-only JSON API.
  Serve {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 4000)]
    port: u16,
  },
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
enum ExportFormat {
  #[default]
  Csv,
  Json,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(cli.config.as_deref())?;
  let store = Arc::new(FileStore::new(&settings.data_dir));

  match cli.command {
    Command::Scrape { regions, years, all_regions } => {
      scrape(&settings, store, regions, years, all_regions).await
    }
    Command::Query {
      region,
      office,
      contested,
      min_lean,
      max_lean,
      lean_unknown,
    } => {
      let request = QueryRequest {
        region: region
          .as_deref()
          .map(|s| s.parse::<Region>())
          .transpose()
          .context("bad --region")?,
        office: office.as_deref().map(Office::canonicalize),
        contested,
        min_lean,
        max_lean,
        lean_unknown,
      };
      run_query(store, request).await
    }
    Command::Stats => stats(store).await,
    Command::Export { format, output } => export(store, format, output).await,
    Command::Serve { host, port } => serve(store, host, port).await,
  }
}

// ─── Subcommands ──────────────────────────────────────────────────────────────

async fn scrape(
  settings: &Settings,
  store: Arc<FileStore>,
  regions: Vec<String>,
  years: Vec<i32>,
  all_regions: bool,
) -> anyhow::Result<()> {
  let regions: Vec<Region> = if all_regions {
    Region::all_states()
  } else if !regions.is_empty() {
    parse_regions(&regions)?
  } else {
    parse_regions(&settings.priority_regions)?
  };

  let years = if years.is_empty() {
    let current = Utc::now().year();
    (current..=current + settings.years_ahead).collect()
  } else {
    years
  };

  println!(
    "Scraping {} regions across {} years...",
    regions.len(),
    years.len()
  );

  // Ctrl-C raises the run-level shutdown signal; the run saves whatever
  // it has fetched by then.
  let (shutdown_tx, shutdown_rx) = watch::channel(false);
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      tracing::info!("shutdown requested; finishing current run");
      shutdown_tx.send(true).ok();
    }
  });

  let source_config = BallotpediaConfig {
    base_url:        settings.base_url.clone(),
    request_delay:   std::time::Duration::from_millis(
      settings.request_delay_ms,
    ),
    request_timeout: std::time::Duration::from_secs(
      settings.request_timeout_secs,
    ),
    max_retries:     settings.max_retries,
  };
  let source = Arc::new(
    BallotpediaSource::new(source_config, shutdown_rx.clone())
      .context("failed to build HTTP client")?,
  );

  let pipeline = Pipeline::new(source, Arc::clone(&store));
  let summary = pipeline
    .ingest(
      IngestRequest { regions, years },
      RunOptions {
        concurrency: settings.fetch_concurrency,
        shutdown:    shutdown_rx,
      },
    )
    .await
    .context("ingest run failed")?;

  output::print_summary(&summary);

  let records = store.load().await.context("reloading dataset")?;
  let (_, stats) = query(&records, &QueryRequest::default())?;
  output::print_stats(&stats);
  Ok(())
}

async fn run_query(
  store: Arc<FileStore>,
  request: QueryRequest,
) -> anyhow::Result<()> {
  let records = store.load().await.context("loading dataset")?;
  let (matches, _) = query(&records, &request)?;
  output::print_matches(&matches, 20);
  Ok(())
}

async fn stats(store: Arc<FileStore>) -> anyhow::Result<()> {
  let records = store.load().await.context("loading dataset")?;
  let (_, stats) = query(&records, &QueryRequest::default())?;
  output::print_stats(&stats);
  Ok(())
}

async fn export(
  store: Arc<FileStore>,
  format: ExportFormat,
  output: Option<PathBuf>,
) -> anyhow::Result<()> {
  // Loading first validates that the representations agree.
  let records = store.load().await.context("loading dataset")?;

  let (source_path, extension) = match format {
    ExportFormat::Csv => (store.csv_path(), "csv"),
    ExportFormat::Json => (store.json_path(), "json"),
  };
  let destination = output.unwrap_or_else(|| {
    PathBuf::from(format!(
      "elections_export_{}.{extension}",
      Utc::now().format("%Y%m%d")
    ))
  });

  anyhow::ensure!(!records.is_empty(), "dataset is empty; nothing to export");
  tokio::fs::copy(source_path, &destination)
    .await
    .with_context(|| format!("copying to {}", destination.display()))?;

  println!(
    "Exported {} records to {}",
    records.len(),
    destination.display()
  );
  Ok(())
}

async fn serve(
  store: Arc<FileStore>,
  host: String,
  port: u16,
) -> anyhow::Result<()> {
  let app = axum::Router::new()
    .nest("/api", api_router(store))
    .layer(TraceLayer::new_for_http());

  let address = format!("{host}:{port}");
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      tokio::signal::ctrl_c().await.ok();
    })
    .await
    .context("server error")?;
  Ok(())
}

fn parse_regions(raw: &[String]) -> anyhow::Result<Vec<Region>> {
  raw
    .iter()
    .map(|r| r.parse::<Region>().with_context(|| format!("bad region {r:?}")))
    .collect()
}
