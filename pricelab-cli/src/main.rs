//! PriceLab CLI: fetch daily closes, add indicators, write curated data and charts.
//!
//! ```text
//! pricelab --tickers AAPL MSFT --start 2020-01-01 --end 2025-08-31 --outfmt parquet --save-plots
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use pricelab_core::data::YahooProvider;
use pricelab_core::{FileConfig, OutputFormat, PipelineConfig, RunSummary};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "pricelab",
    version,
    about = "PriceLab: daily closes, MA30/returns/normalized price, Parquet or CSV output"
)]
struct Cli {
    /// Ticker symbols to fetch (e.g. AAPL MSFT).
    #[arg(long, num_args = 1.., value_name = "SYMBOL")]
    tickers: Vec<String>,

    /// First date, YYYY-MM-DD. [default: 2020-01-01]
    #[arg(long, value_name = "DATE")]
    start: Option<NaiveDate>,

    /// End date (exclusive), YYYY-MM-DD. [default: 2025-08-31]
    #[arg(long, value_name = "DATE")]
    end: Option<NaiveDate>,

    /// Output layout. [default: parquet]
    #[arg(long, value_enum, value_name = "FORMAT")]
    outfmt: Option<OutFmt>,

    /// Render one Close vs MA30 chart per ticker.
    #[arg(long, default_value_t = false)]
    save_plots: bool,

    /// TOML file with defaults for any of the options above.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output root for curated data. [default: data/curated]
    #[arg(long, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Output directory for charts. [default: reports]
    #[arg(long, value_name = "PATH")]
    reports_dir: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutFmt {
    Csv,
    Parquet,
}

impl From<OutFmt> for OutputFormat {
    fn from(f: OutFmt) -> Self {
        match f {
            OutFmt::Csv => OutputFormat::Csv,
            OutFmt::Parquet => OutputFormat::Parquet,
        }
    }
}

impl Cli {
    /// Layer command-line flags over the config file (or built-in defaults).
    fn into_config(self) -> Result<PipelineConfig> {
        let file = match &self.config {
            Some(path) => FileConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => FileConfig::default(),
        };
        let mut config = file.into_pipeline_config();

        if !self.tickers.is_empty() {
            config.tickers = self.tickers;
        }
        if let Some(start) = self.start {
            config.start = start;
        }
        if let Some(end) = self.end {
            config.end = end;
        }
        if let Some(fmt) = self.outfmt {
            config.format = fmt.into();
        }
        if self.save_plots {
            config.save_plots = true;
        }
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(dir) = self.reports_dir {
            config.reports_dir = dir;
        }

        Ok(config.validated()?)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pricelab=info,pricelab_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Cli::parse().into_config()?;
    log_run_start(&config);
    let provider = YahooProvider::new().context("initializing Yahoo Finance provider")?;

    let summary = pricelab_core::run(&config, &provider).context("pipeline run failed")?;
    log_run_complete(&summary);
    print_summary(&config, &summary);
    Ok(())
}

fn log_run_start(config: &PipelineConfig) {
    info!(
        tickers = ?config.tickers,
        start = %config.start,
        end = %config.end,
        format = %config.format,
        save_plots = config.save_plots,
        "starting run"
    );
}

fn log_run_complete(summary: &RunSummary) {
    info!(
        rows = summary.total_rows,
        files = summary.data_files.len(),
        charts = summary.charts.len(),
        missing = summary.missing.len(),
        "run complete"
    );
}

fn print_summary(config: &PipelineConfig, summary: &RunSummary) {
    println!();
    println!("=== PriceLab Run ===");
    println!("Period:   {} to {} (exclusive)", config.start, config.end);
    println!("Format:   {}", config.format);
    println!("Rows:     {}", summary.total_rows);
    println!();
    println!(
        "{:<10} {:>6} {:<25} {:>12} {:>10}",
        "Ticker", "Rows", "Date Range", "Last Close", "Cum Ret"
    );
    println!("{}", "-".repeat(67));
    for t in &summary.tickers {
        println!(
            "{:<10} {:>6} {:<25} {:>12.2} {:>9.2}%",
            t.ticker,
            t.rows,
            format!("{} to {}", t.first_date, t.last_date),
            t.last_close,
            t.cum_return * 100.0
        );
    }
    for ticker in &summary.missing {
        println!("WARNING: no data returned for {ticker}");
    }
    println!();
    for path in &summary.data_files {
        println!("Wrote:    {}", path.display());
    }
    for path in &summary.charts {
        println!("Chart:    {}", path.display());
    }
}
