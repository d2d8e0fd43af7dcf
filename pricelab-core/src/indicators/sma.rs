//! Trailing simple moving average with a minimum of one observation.
//!
//! Unlike a strict SMA there is no warmup: row `i` averages rows
//! `max(0, i + 1 - window)..=i`, so the first value is the first close.

/// Trailing mean of `values` over at most `window` observations.
///
/// `window == 0` is treated as 1.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut result = Vec::with_capacity(values.len());
    let mut sum = 0.0;

    for i in 0..values.len() {
        sum += values[i];
        if i >= window {
            sum -= values[i - window];
        }
        let count = (i + 1).min(window);
        result.push(sum / count as f64);
    }

    result
}
