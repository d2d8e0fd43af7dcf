//! Return-style columns: day-over-day change, compounded return, and
//! rebasing to the first observation.

/// Fractional change from the previous value; `None` for the first element.
pub fn pct_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if i == 0 {
            result.push(None);
        } else {
            result.push(Some(values[i] / values[i - 1] - 1.0));
        }
    }
    result
}

/// Running product of `(1 + r)` minus one. Missing returns contribute a
/// neutral factor, so a series that starts with `None` starts at 0.
pub fn cumulative_return(returns: &[Option<f64>]) -> Vec<f64> {
    let mut growth = 1.0;
    returns
        .iter()
        .map(|r| {
            growth *= 1.0 + r.unwrap_or(0.0);
            growth - 1.0
        })
        .collect()
}

/// Rescale so the first value becomes 100.
///
/// A zero first value produces non-finite output; callers that care must
/// check before calling.
pub fn normalize_to_first(values: &[f64]) -> Vec<f64> {
    let Some(&base) = values.first() else {
        return Vec::new();
    };
    values.iter().map(|v| v / base * 100.0).collect()
}
