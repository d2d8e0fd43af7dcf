//! Multi-symbol time alignment.
//!
//! Given close series for several symbols, lay them out on the union of
//! their dates. Missing cells stay `None`; nothing is forward-filled.

use super::provider::{ClosePoint, ProviderFrame};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Align per-symbol series into a [`ProviderFrame::Wide`].
///
/// Column order follows the input order. If a symbol reports the same date
/// twice, the first observation wins.
pub fn align_closes(series: Vec<(String, Vec<ClosePoint>)>) -> ProviderFrame {
    let mut all_dates = BTreeSet::new();
    for (_, points) in &series {
        for (date, _) in points {
            all_dates.insert(*date);
        }
    }
    let dates: Vec<NaiveDate> = all_dates.into_iter().collect();

    let columns = series
        .into_iter()
        .map(|(ticker, points)| {
            let mut by_date: HashMap<NaiveDate, Option<f64>> = HashMap::new();
            for (date, close) in points {
                by_date.entry(date).or_insert(close);
            }
            let closes = dates
                .iter()
                .map(|date| by_date.get(date).copied().flatten())
                .collect();
            (ticker, closes)
        })
        .collect();

    ProviderFrame::Wide { dates, columns }
}
