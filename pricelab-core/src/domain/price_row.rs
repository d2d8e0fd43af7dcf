//! PriceRow: one observed trading day for one ticker.

use chrono::NaiveDate;

/// Adjusted daily close for a single ticker on a single day.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub date: NaiveDate,
    pub ticker: String,
    pub close: f64,
}

impl PriceRow {
    pub fn new(date: NaiveDate, ticker: impl Into<String>, close: f64) -> Self {
        Self {
            date,
            ticker: ticker.into(),
            close,
        }
    }
}

/// Long-form price table keyed by (date, ticker).
///
/// Rows are always sorted ascending by (date, ticker) and the key is unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    rows: Vec<PriceRow>,
}

impl PriceTable {
    /// Build a table from rows in any order.
    ///
    /// Sorts by (date, ticker) and drops duplicate keys, keeping the first
    /// occurrence of each pair.
    pub fn from_rows(mut rows: Vec<PriceRow>) -> Self {
        rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.ticker.cmp(&b.ticker)));
        rows.dedup_by(|later, kept| later.date == kept.date && later.ticker == kept.ticker);
        Self { rows }
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct tickers in order of first appearance.
    pub fn tickers(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.ticker.as_str()) {
                seen.push(&row.ticker);
            }
        }
        seen
    }

    pub fn into_rows(self) -> Vec<PriceRow> {
        self.rows
    }
}
