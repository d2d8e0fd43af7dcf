//! The indicator transform: partition by ticker, sort, derive columns.

use super::{cumulative_return, normalize_to_first, pct_change, rolling_mean, MA_WINDOW};
use crate::domain::{IndicatorRow, IndicatorTable, PriceRow, TickerSeries};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    /// The first close anchors `norm_price`; zero would make every value non-finite.
    #[error("first close for '{ticker}' is zero; normalized price is undefined")]
    DegenerateFirstClose { ticker: String },
}

/// Split rows into per-ticker groups, groups ordered by first appearance.
///
/// Row order inside a group is the input order.
pub fn partition_by_ticker(rows: &[PriceRow]) -> Vec<(String, Vec<PriceRow>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<PriceRow>)> = Vec::new();

    for row in rows {
        let slot = *index.entry(row.ticker.as_str()).or_insert_with(|| {
            groups.push((row.ticker.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(row.clone());
    }

    groups
}

/// Compute one ticker's indicator rows.
///
/// Rows are sorted by date here regardless of how they arrive.
pub fn compute_series(
    ticker: String,
    mut rows: Vec<PriceRow>,
) -> Result<TickerSeries, IndicatorError> {
    rows.sort_by_key(|r| r.date);

    if rows.first().is_some_and(|r| r.close == 0.0) {
        return Err(IndicatorError::DegenerateFirstClose { ticker });
    }

    let closes: Vec<f64> = rows.iter().map(|r| r.close).collect();
    let ma30 = rolling_mean(&closes, MA_WINDOW);
    let returns = pct_change(&closes);
    let cum = cumulative_return(&returns);
    let norm = normalize_to_first(&closes);

    let out = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| IndicatorRow {
            date: row.date,
            ticker: row.ticker,
            close: row.close,
            ma30: ma30[i],
            daily_return: returns[i],
            cum_return: cum[i],
            norm_price: norm[i],
        })
        .collect();

    Ok(TickerSeries { ticker, rows: out })
}

/// Add `ma30`, `return`, `cum_return` and `norm_price` to every row.
///
/// Each ticker is computed from its own rows only; the output has exactly
/// one row per input row.
pub fn add_indicators(rows: &[PriceRow]) -> Result<IndicatorTable, IndicatorError> {
    let mut series = Vec::new();
    for (ticker, group) in partition_by_ticker(rows) {
        debug!(%ticker, rows = group.len(), "computing indicators");
        series.push(compute_series(ticker, group)?);
    }
    Ok(IndicatorTable::new(series))
}
