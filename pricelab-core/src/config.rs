//! Pipeline configuration.
//!
//! `PipelineConfig` is the explicit record handed to [`crate::pipeline::run`].
//! `FileConfig` is the optional TOML layer the CLI reads first; command-line
//! flags then override individual fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::domain::{normalize_tickers, TickerError};

/// Default output root for curated data.
pub const DEFAULT_DATA_DIR: &str = "data/curated";

/// Default output directory for charts.
pub const DEFAULT_REPORTS_DIR: &str = "reports";

pub fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
}

pub fn default_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 31).unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Ticker(#[from] TickerError),

    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("unknown output format '{0}' (expected csv or parquet)")]
    UnknownFormat(String),
}

/// How the indicator table is written to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One Parquet file per ticker under `ticker=<SYMBOL>/`.
    #[default]
    Parquet,
    /// A single CSV file with every ticker concatenated.
    Csv,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parquet" => Ok(Self::Parquet),
            "csv" => Ok(Self::Csv),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parquet => f.write_str("parquet"),
            Self::Csv => f.write_str("csv"),
        }
    }
}

/// Everything one pipeline run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub tickers: Vec<String>,
    /// First date requested (inclusive).
    pub start: NaiveDate,
    /// End of the range (exclusive): no row is dated `end`.
    pub end: NaiveDate,
    pub format: OutputFormat,
    pub save_plots: bool,
    pub data_dir: PathBuf,
    pub reports_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tickers: Vec::new(),
            start: default_start(),
            end: default_end(),
            format: OutputFormat::default(),
            save_plots: false,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
        }
    }
}

impl PipelineConfig {
    /// Check the record and normalize the ticker list (trimmed, deduplicated).
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.tickers = normalize_tickers(&self.tickers)?;
        if self.start > self.end {
            return Err(ConfigError::InvertedRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(self)
    }
}

/// Optional TOML configuration file. Every field may be omitted.
///
/// ```toml
/// tickers = ["AAPL", "MSFT"]
/// start = "2021-01-01"
/// end = "2024-12-31"
/// format = "csv"
/// save_plots = true
/// data_dir = "out/curated"
/// reports_dir = "out/reports"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub tickers: Option<Vec<String>>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub format: Option<OutputFormat>,
    pub save_plots: Option<bool>,
    pub data_dir: Option<PathBuf>,
    pub reports_dir: Option<PathBuf>,
}

impl FileConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Fill unset fields with the built-in defaults.
    pub fn into_pipeline_config(self) -> PipelineConfig {
        let defaults = PipelineConfig::default();
        PipelineConfig {
            tickers: self.tickers.unwrap_or(defaults.tickers),
            start: self.start.unwrap_or(defaults.start),
            end: self.end.unwrap_or(defaults.end),
            format: self.format.unwrap_or(defaults.format),
            save_plots: self.save_plots.unwrap_or(defaults.save_plots),
            data_dir: self.data_dir.unwrap_or(defaults.data_dir),
            reports_dir: self.reports_dir.unwrap_or(defaults.reports_dir),
        }
    }
}
