//! Price provider trait, response shapes and structured error types.
//!
//! The PriceProvider trait abstracts over the market-data source so the
//! pipeline can run against Yahoo Finance in production and an in-memory
//! provider in tests.

use chrono::NaiveDate;
use thiserror::Error;

/// One observation from a provider: a date and a close that may be missing.
pub type ClosePoint = (NaiveDate, Option<f64>);

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("response format changed: {0}")]
    ResponseFormat(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },
}

/// The raw shape a provider hands back.
///
/// Single-symbol requests come back as a flat series with the symbol
/// attached separately; multi-symbol requests come back wide, one column per
/// symbol on a shared date axis. [`crate::data::fetch`] melts both into the
/// same long form.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderFrame {
    Series {
        ticker: String,
        points: Vec<ClosePoint>,
    },
    Wide {
        dates: Vec<NaiveDate>,
        /// (ticker, closes) with `closes.len() == dates.len()`.
        columns: Vec<(String, Vec<Option<f64>>)>,
    },
}

/// Trait for market-data providers.
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch adjusted daily closes for every symbol over `start..end` (`end` excluded).
    ///
    /// Symbols the provider does not know should come back with no
    /// observations rather than as an error.
    fn fetch_closes(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ProviderFrame, DataError>;
}
