//! Data acquisition: provider abstraction, Yahoo Finance client, alignment,
//! and the fetch stage that normalizes everything into a long-form table.

pub mod align;
pub mod fetch;
pub mod provider;
pub mod yahoo;

pub use align::align_closes;
pub use fetch::{fetch_prices, normalize_frame};
pub use provider::{ClosePoint, DataError, PriceProvider, ProviderFrame};
pub use yahoo::YahooProvider;
