//! PriceLab Core: daily close fetch, per-ticker indicators, partitioned
//! persistence and charts.
//!
//! The pipeline has three stages, run once per invocation:
//! - Fetch: one provider call, normalized into a long-form (date, ticker) table
//! - Transform: partition by ticker, sort by date, derive MA30 / return /
//!   cumulative return / normalized price
//! - Persist and visualize: Parquet partitions or a flat CSV, optional PNG
//!   chart per ticker

pub mod chart;
pub mod config;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod persist;
pub mod pipeline;

pub use config::{FileConfig, OutputFormat, PipelineConfig};
pub use pipeline::{run, PipelineError, RunSummary, TickerSummary};
