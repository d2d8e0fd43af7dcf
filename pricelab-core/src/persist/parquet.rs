//! Ticker-partitioned Parquet output.

use super::{PersistError, COLUMNS, UNIX_EPOCH_DAYS_FROM_CE};
use crate::domain::{IndicatorRow, IndicatorTable, TickerSeries};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name inside each partition directory.
pub const PARTITION_FILE: &str = "prices.parquet";

/// Directory for one ticker: `{base_dir}/ticker={SYMBOL}/`
pub fn partition_dir(base_dir: &Path, ticker: &str) -> PathBuf {
    base_dir.join(format!("ticker={ticker}"))
}

/// Parquet file for one ticker: `{base_dir}/ticker={SYMBOL}/prices.parquet`
pub fn partition_path(base_dir: &Path, ticker: &str) -> PathBuf {
    partition_dir(base_dir, ticker).join(PARTITION_FILE)
}

/// Write every ticker's series to its own partition.
pub fn write_partitions(
    table: &IndicatorTable,
    base_dir: &Path,
) -> Result<Vec<PathBuf>, PersistError> {
    let mut written = Vec::with_capacity(table.series().len());
    for series in table.series() {
        written.push(write_partition(series, base_dir)?);
    }
    Ok(written)
}

/// Write a single ticker's series, replacing any existing file.
pub fn write_partition(series: &TickerSeries, base_dir: &Path) -> Result<PathBuf, PersistError> {
    let dir = partition_dir(base_dir, &series.ticker);
    fs::create_dir_all(&dir).map_err(|e| PersistError::io(&dir, e))?;

    let path = dir.join(PARTITION_FILE);
    let mut df = series_to_dataframe(series)?;
    write_parquet(&mut df, &path)?;
    debug!(ticker = %series.ticker, rows = series.len(), path = %path.display(), "wrote partition");
    Ok(path)
}

/// Load one partition back into a series.
pub fn read_partition(path: &Path) -> Result<TickerSeries, PersistError> {
    let file = fs::File::open(path).map_err(|e| PersistError::io(path, e))?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| PersistError::Parquet(format!("read {}: {e}", path.display())))?;

    for col_name in COLUMNS {
        if df.column(col_name).is_err() {
            return Err(PersistError::Schema(format!(
                "{}: missing column '{col_name}'",
                path.display()
            )));
        }
    }

    let rows = dataframe_to_rows(&df)?;
    let ticker = rows
        .first()
        .map(|r| r.ticker.clone())
        .ok_or_else(|| PersistError::Schema(format!("{}: partition is empty", path.display())))?;
    Ok(TickerSeries { ticker, rows })
}

// ── Parquet I/O helpers ─────────────────────────────────────────────

fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
}

/// Convert a ticker series to a Polars DataFrame in [`COLUMNS`] order.
fn series_to_dataframe(series: &TickerSeries) -> Result<DataFrame, PersistError> {
    let rows = &series.rows;
    let dates: Vec<i32> = rows.iter().map(|r| days_since_epoch(r.date)).collect();
    let tickers: Vec<&str> = rows.iter().map(|r| r.ticker.as_str()).collect();
    let closes: Vec<f64> = rows.iter().map(|r| r.close).collect();
    let ma30: Vec<f64> = rows.iter().map(|r| r.ma30).collect();
    let returns: Vec<Option<f64>> = rows.iter().map(|r| r.daily_return).collect();
    let cum: Vec<f64> = rows.iter().map(|r| r.cum_return).collect();
    let norm: Vec<f64> = rows.iter().map(|r| r.norm_price).collect();

    DataFrame::new(vec![
        Column::new("date".into(), dates)
            .cast(&DataType::Date)
            .map_err(|e| PersistError::Parquet(format!("date cast: {e}")))?,
        Column::new("ticker".into(), tickers),
        Column::new("close".into(), closes),
        Column::new("ma30".into(), ma30),
        Column::new("return".into(), returns),
        Column::new("cum_return".into(), cum),
        Column::new("norm_price".into(), norm),
    ])
    .map_err(|e| PersistError::Parquet(format!("dataframe creation: {e}")))
}

fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<(), PersistError> {
    let file = fs::File::create(path).map_err(|e| PersistError::io(path, e))?;
    ParquetWriter::new(file)
        .finish(df)
        .map_err(|e| PersistError::Parquet(format!("write {}: {e}", path.display())))?;
    Ok(())
}

fn dataframe_to_rows(df: &DataFrame) -> Result<Vec<IndicatorRow>, PersistError> {
    let col_err = |name: &str, e: PolarsError| PersistError::Schema(format!("{name} column: {e}"));

    let date_ca = df
        .column("date")
        .and_then(|c| c.date())
        .map_err(|e| col_err("date", e))?;
    let ticker_ca = df
        .column("ticker")
        .and_then(|c| c.str())
        .map_err(|e| col_err("ticker", e))?;
    let f64_col = |name: &str| {
        df.column(name)
            .and_then(|c| c.f64())
            .map_err(|e| col_err(name, e))
    };
    let close_ca = f64_col("close")?;
    let ma_ca = f64_col("ma30")?;
    let ret_ca = f64_col("return")?;
    let cum_ca = f64_col("cum_return")?;
    let norm_ca = f64_col("norm_price")?;

    let n = df.height();
    let mut rows = Vec::with_capacity(n);
    for i in 0..n {
        let date = date_ca
            .get(i)
            .and_then(date_from_epoch_days)
            .ok_or_else(|| PersistError::Schema(format!("null or invalid date at row {i}")))?;
        let ticker = ticker_ca
            .get(i)
            .ok_or_else(|| PersistError::Schema(format!("null ticker at row {i}")))?;

        rows.push(IndicatorRow {
            date,
            ticker: ticker.to_string(),
            close: close_ca.get(i).unwrap_or(f64::NAN),
            ma30: ma_ca.get(i).unwrap_or(f64::NAN),
            daily_return: ret_ca.get(i),
            cum_return: cum_ca.get(i).unwrap_or(f64::NAN),
            norm_price: norm_ca.get(i).unwrap_or(f64::NAN),
        });
    }
    Ok(rows)
}
