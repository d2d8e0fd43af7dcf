//! Ticker symbol checks.
//!
//! Symbols end up in directory and file names (`ticker=<SYMBOL>/`,
//! `<SYMBOL>_close_ma30.png`), so anything that would escape or confuse that
//! layout is rejected before any network call is made.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickerError {
    #[error("at least one ticker is required")]
    Empty,

    #[error("invalid ticker '{symbol}': {reason}")]
    Invalid {
        symbol: String,
        reason: &'static str,
    },
}

/// Check a single symbol. Returns the trimmed symbol.
pub fn validate_ticker(raw: &str) -> Result<String, TickerError> {
    let symbol = raw.trim();
    let invalid = |reason| TickerError::Invalid {
        symbol: raw.to_string(),
        reason,
    };

    if symbol.is_empty() {
        return Err(invalid("symbol is blank"));
    }
    if symbol.contains(['/', '\\']) {
        return Err(invalid("path separators are not allowed"));
    }
    if symbol.contains('=') {
        return Err(invalid("'=' is reserved for partition directories"));
    }
    if symbol.contains("..") {
        return Err(invalid("'..' is not allowed"));
    }
    if symbol.chars().any(char::is_whitespace) {
        return Err(invalid("whitespace is not allowed"));
    }
    Ok(symbol.to_string())
}

/// Validate a ticker list, trimming each symbol and dropping repeats
/// (first occurrence wins).
pub fn normalize_tickers(raw: &[String]) -> Result<Vec<String>, TickerError> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for symbol in raw {
        let symbol = validate_ticker(symbol)?;
        if !out.contains(&symbol) {
            out.push(symbol);
        }
    }
    if out.is_empty() {
        return Err(TickerError::Empty);
    }
    Ok(out)
}
