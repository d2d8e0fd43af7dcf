//! Fetch stage: one provider call, normalized into a long-form table.

use super::provider::{DataError, PriceProvider, ProviderFrame};
use crate::domain::{PriceRow, PriceTable};
use chrono::NaiveDate;
use tracing::{info, warn};

/// Fetch adjusted closes for `tickers` over `start..end` as a long-form table.
///
/// The result is sorted by (date, ticker) with unique keys and contains no
/// missing closes. Tickers the provider had nothing for are logged and
/// skipped; an entirely empty result is [`DataError::DataUnavailable`].
pub fn fetch_prices(
    provider: &dyn PriceProvider,
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceTable, DataError> {
    if tickers.is_empty() {
        return Err(DataError::InvalidRequest("no tickers requested".into()));
    }
    if start > end {
        return Err(DataError::InvalidRequest(format!(
            "start {start} is after end {end}"
        )));
    }

    info!(
        provider = provider.name(),
        tickers = tickers.len(),
        %start,
        %end,
        "fetching daily closes"
    );
    let frame = provider.fetch_closes(tickers, start, end).map_err(|e| match e {
        DataError::DataUnavailable(_) => e,
        other => DataError::DataUnavailable(other.to_string()),
    })?;
    let table = normalize_frame(frame);

    if table.is_empty() {
        return Err(DataError::DataUnavailable(format!(
            "provider returned no closes for {} between {start} and {end}",
            tickers.join(", ")
        )));
    }

    let present = table.tickers();
    for ticker in tickers {
        if !present.contains(&ticker.as_str()) {
            warn!(%ticker, "no closes returned, ticker skipped");
        }
    }
    info!(rows = table.len(), tickers = present.len(), "fetched closes");

    Ok(table)
}

/// Melt either provider shape into long-form rows and canonicalize them.
pub fn normalize_frame(frame: ProviderFrame) -> PriceTable {
    PriceTable::from_rows(melt(frame))
}

/// Reshape a provider frame into one row per (date, ticker), dropping
/// missing and non-finite closes.
fn melt(frame: ProviderFrame) -> Vec<PriceRow> {
    match frame {
        ProviderFrame::Series { ticker, points } => points
            .into_iter()
            .filter_map(|(date, close)| {
                close
                    .filter(|c| c.is_finite())
                    .map(|c| PriceRow::new(date, ticker.clone(), c))
            })
            .collect(),
        ProviderFrame::Wide { dates, columns } => {
            let mut rows = Vec::with_capacity(dates.len() * columns.len());
            for (ticker, closes) in &columns {
                for (date, close) in dates.iter().zip(closes) {
                    if let Some(c) = close.filter(|c| c.is_finite()) {
                        rows.push(PriceRow::new(*date, ticker.clone(), c));
                    }
                }
            }
            rows
        }
    }
}
