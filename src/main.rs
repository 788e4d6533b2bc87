use analytics::PerformanceReport;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use configuration::{load_config, load_config_from, BacktestOverrides, Config, LoggingSettings};
use indicatif::ProgressStyle;
use market_data::{compute_log_returns, read_price_csv, write_returns_csv, ReportWriter, ReturnRepository};
use portfolio_backtester::{BacktestResult, PortfolioManager};
use std::path::PathBuf;
use tracing::{info, info_span};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_indicatif::span_ext::IndicatifSpanExt;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// The main entry point for the Allocation Lab backtester.
fn main() -> Result<()> {
    // Optional: ALLOCLAB__* overrides may live in a .env file.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => load_config().context("Failed to load configuration")?,
    };

    if let Commands::Run(args) = &cli.command {
        args.overrides.apply(&mut config);
        config.validate().context("Invalid command-line override")?;
    }

    // Keep the guard alive so the file appender flushes on exit.
    let _log_guard = init_tracing(&config.logging)?;

    match cli.command {
        Commands::Run(_) => handle_run(&config),
        Commands::Returns(args) => handle_returns(args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Rolling-window backtests of long-only portfolio allocation rules.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./config.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the backtest and export the report tables.
    Run(RunArgs),
    /// Convert a price CSV into a log-return CSV.
    Returns(ReturnsArgs),
}

#[derive(Parser)]
struct RunArgs {
    #[command(flatten)]
    overrides: BacktestOverrides,
}

#[derive(Parser)]
struct ReturnsArgs {
    /// Wide price CSV: Date,<asset>,...
    #[arg(long)]
    prices: PathBuf,

    /// Where to write the log returns.
    #[arg(long)]
    out: PathBuf,

    /// Comma-separated tickers to keep (default: every column).
    #[arg(long, value_delimiter = ',')]
    tickers: Vec<String>,
}

// ==============================================================================
// Logging
// ==============================================================================

/// Installs the global subscriber: `RUST_LOG` (or the configured level), a
/// stderr layer routed through the progress bars, and an optional daily file.
fn init_tracing(settings: &LoggingSettings) -> Result<Option<WorkerGuard>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level)
            .with_context(|| format!("Invalid log level '{}'", settings.level))?,
    };

    let indicatif_layer = IndicatifLayer::new();
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(indicatif_layer.get_stderr_writer());

    let (file_layer, guard) = match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "allocation-lab.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .with(indicatif_layer)
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    Ok(guard)
}

// ==============================================================================
// Run Command Logic
// ==============================================================================

fn handle_run(config: &Config) -> Result<()> {
    let returns = ReturnRepository::new(config.data.clone())
        .load_or_build()
        .context("Failed to load the return history")?;
    info!(
        rows = returns.len(),
        assets = returns.n_assets(),
        first = %returns.dates().first().map(|d| d.to_string()).unwrap_or_default(),
        last = %returns.dates().last().map(|d| d.to_string()).unwrap_or_default(),
        "Return history ready."
    );

    let manager = PortfolioManager::from_config(config)?;

    let span = info_span!("backtest");
    span.pb_set_style(
        &ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
        )?
        .progress_chars("=>-"),
    );
    span.pb_set_length(manager.simulated_days(returns.len()) as u64);

    let progress_span = span.clone();
    let manager = manager.with_progress(move |_, _| progress_span.pb_inc(1));

    let result = {
        let _entered = span.enter();
        manager.run(&returns)?
    };
    drop(span);

    print_metrics(&result);

    let writer = ReportWriter::new(&config.report);
    let written = writer
        .write_all(&result)
        .context("Failed to export the report")?;
    println!(
        "Backtest complete. {} files written to {}",
        written.len(),
        writer.output_dir().display()
    );
    Ok(())
}

fn print_metrics(result: &BacktestResult) {
    let mut header = vec!["strategy"];
    header.extend(PerformanceReport::COLUMNS);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for (strategy, report) in &result.metrics {
        let mut row = vec![strategy.as_str().to_string()];
        row.extend(report.values().iter().map(|v| format!("{:.4}", v)));
        table.add_row(row);
    }

    println!("{table}");
}

// ==============================================================================
// Returns Command Logic
// ==============================================================================

fn handle_returns(args: ReturnsArgs) -> Result<()> {
    let prices = read_price_csv(&args.prices, &args.tickers)
        .with_context(|| format!("Failed to read prices from {}", args.prices.display()))?;
    let returns = compute_log_returns(&prices)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    write_returns_csv(&returns, &args.out)
        .with_context(|| format!("Failed to write returns to {}", args.out.display()))?;

    println!(
        "Wrote {} days x {} assets of log returns to {}",
        returns.len(),
        returns.n_assets(),
        args.out.display()
    );
    Ok(())
}
