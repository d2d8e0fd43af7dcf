//! Persistence of the indicator table.
//!
//! Two layouts:
//! - Parquet, Hive-style: `{base_dir}/ticker={SYMBOL}/prices.parquet`, one file per ticker
//! - CSV, flat: `{base_dir}/prices.csv`, every ticker concatenated
//!
//! Both truncate existing files. Neither embeds timestamps, so writing the
//! same table twice yields identical bytes. Writes are not atomic.

pub mod flat;
pub mod parquet;

use crate::config::OutputFormat;
use crate::domain::IndicatorTable;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Column order shared by both layouts.
pub const COLUMNS: [&str; 7] = [
    "date",
    "ticker",
    "close",
    "ma30",
    "return",
    "cum_return",
    "norm_price",
];

/// Days between 0001-01-01 and 1970-01-01 in chrono's day numbering.
pub(crate) const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("filesystem error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parquet I/O error: {0}")]
    Parquet(String),

    #[error("csv error: {0}")]
    Csv(String),

    #[error("schema error: {0}")]
    Schema(String),
}

impl PersistError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Write `table` under `base_dir` in the requested layout.
///
/// Returns the paths written, in write order.
pub fn persist(
    table: &IndicatorTable,
    format: OutputFormat,
    base_dir: &Path,
) -> Result<Vec<PathBuf>, PersistError> {
    match format {
        OutputFormat::Parquet => parquet::write_partitions(table, base_dir),
        OutputFormat::Csv => flat::write_flat(table, base_dir).map(|p| vec![p]),
    }
}
