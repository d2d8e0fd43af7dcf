//! Pipeline entry point: fetch → transform → persist → (optional) charts.
//!
//! Stages run strictly in order on the calling thread. The first failure
//! ends the run; there are no retries and no partial rollback.

use crate::chart::{render_close_ma30, ChartError};
use crate::config::{ConfigError, PipelineConfig};
use crate::data::{fetch_prices, DataError, PriceProvider};
use crate::indicators::{add_indicators, IndicatorError};
use crate::persist::{persist, PersistError};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Chart(#[from] ChartError),
}

/// Per-ticker outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerSummary {
    pub ticker: String,
    pub rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub last_close: f64,
    pub cum_return: f64,
}

/// What a run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub tickers: Vec<TickerSummary>,
    /// Requested tickers the provider returned nothing for.
    pub missing: Vec<String>,
    pub total_rows: usize,
    pub data_files: Vec<PathBuf>,
    pub charts: Vec<PathBuf>,
}

/// Run the whole pipeline for `config` against `provider`.
pub fn run(
    config: &PipelineConfig,
    provider: &dyn PriceProvider,
) -> Result<RunSummary, PipelineError> {
    let config = config.clone().validated()?;

    let prices = fetch_prices(provider, &config.tickers, config.start, config.end)?;

    let table = add_indicators(prices.rows())?;
    info!(
        rows = table.len(),
        tickers = table.series().len(),
        "computed indicators"
    );

    let data_files = persist(&table, config.format, &config.data_dir)?;
    info!(
        format = %config.format,
        files = data_files.len(),
        dir = %config.data_dir.display(),
        "persisted"
    );

    let mut charts = Vec::new();
    if config.save_plots {
        for series in table.series() {
            charts.push(render_close_ma30(series, &config.reports_dir)?);
        }
        info!(
            charts = charts.len(),
            dir = %config.reports_dir.display(),
            "rendered charts"
        );
    }

    let tickers = table
        .series()
        .iter()
        .filter_map(|s| {
            let first = s.rows.first()?;
            let last = s.rows.last()?;
            Some(TickerSummary {
                ticker: s.ticker.clone(),
                rows: s.len(),
                first_date: first.date,
                last_date: last.date,
                last_close: last.close,
                cum_return: last.cum_return,
            })
        })
        .collect();
    let missing = config
        .tickers
        .iter()
        .filter(|t| table.get(t).is_none())
        .cloned()
        .collect();

    Ok(RunSummary {
        tickers,
        missing,
        total_rows: table.len(),
        data_files,
        charts,
    })
}
