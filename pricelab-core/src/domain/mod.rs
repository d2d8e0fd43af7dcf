//! Domain types for PriceLab

pub mod indicator_row;
pub mod price_row;
pub mod ticker;

pub use indicator_row::{IndicatorRow, IndicatorTable, TickerSeries};
pub use price_row::{PriceRow, PriceTable};
pub use ticker::{normalize_tickers, TickerError};
