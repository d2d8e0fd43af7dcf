//! Per-ticker indicator computation.
//!
//! The transform partitions the long-form price table by ticker, sorts each
//! partition by date, and derives the indicator columns from that partition
//! alone. The column math lives in small slice-in/vec-out helpers so it can
//! be tested and benchmarked without building rows.

pub mod returns;
pub mod sma;
pub mod transform;

pub use returns::{cumulative_return, normalize_to_first, pct_change};
pub use sma::rolling_mean;
pub use transform::{add_indicators, compute_series, partition_by_ticker, IndicatorError};

/// Window of the trailing moving average, in observations.
pub const MA_WINDOW: usize = 30;

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
