//! IndicatorRow: a PriceRow enriched with per-ticker derived columns.

use chrono::NaiveDate;

/// One trading day for one ticker, with indicators computed over that
/// ticker's date-sorted history.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub ticker: String,
    pub close: f64,
    /// Trailing mean of up to 30 closes ending at this row.
    pub ma30: f64,
    /// Day-over-day fractional change, persisted as `return`; `None` on the
    /// ticker's first row.
    pub daily_return: Option<f64>,
    /// Compounded return since the ticker's first row (0 on that row).
    pub cum_return: f64,
    /// Close rescaled so the ticker's first row is 100.
    pub norm_price: f64,
}

/// A single ticker's full indicator history, sorted ascending by date.
///
/// This is the unit of persistence (one partition) and of charting (one image).
#[derive(Debug, Clone, PartialEq)]
pub struct TickerSeries {
    pub ticker: String,
    pub rows: Vec<IndicatorRow>,
}

impl TickerSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }
}

/// Indicator rows grouped per ticker, groups in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorTable {
    series: Vec<TickerSeries>,
}

impl IndicatorTable {
    pub fn new(series: Vec<TickerSeries>) -> Self {
        Self { series }
    }

    pub fn series(&self) -> &[TickerSeries] {
        &self.series
    }

    /// Look up one ticker's series.
    pub fn get(&self, ticker: &str) -> Option<&TickerSeries> {
        self.series.iter().find(|s| s.ticker == ticker)
    }

    /// All rows, group by group.
    pub fn rows(&self) -> impl Iterator<Item = &IndicatorRow> {
        self.series.iter().flat_map(|s| s.rows.iter())
    }

    /// Total row count across all tickers.
    pub fn len(&self) -> usize {
        self.series.iter().map(|s| s.rows.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
