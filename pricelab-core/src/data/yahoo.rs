//! Yahoo Finance price provider.
//!
//! Fetches daily closes from Yahoo's v8 chart API, one request per symbol,
//! and hands them back in the shape the caller asked for: a flat series for
//! one symbol, a date-aligned wide frame for several.
//!
//! No retries and no backoff: a transport failure ends the run.

use super::align::align_closes;
use super::provider::{ClosePoint, DataError, PriceProvider, ProviderFrame};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

/// Exchange metadata. `gmtoffset` is the exchange's UTC offset in seconds.
#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new() -> Result<Self, DataError> {
        Self::with_base_url(BASE_URL)
    }

    /// Point the provider at a different chart endpoint (mirrors, proxies).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::DataUnavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Build the chart API URL for a symbol over `[start, end)`.
    ///
    /// Both bounds are midnight UTC; Yahoo treats `period2` as exclusive, so
    /// no bar dated `end` is returned.
    fn chart_url(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        format!(
            "{}/{symbol}?period1={start_ts}&period2={end_ts}&interval=1d&includeAdjustedClose=true",
            self.base_url
        )
    }

    /// Fetch one symbol's closes.
    ///
    /// A symbol Yahoo has no data for (404, or a 400 whose chart error says
    /// so) is [`DataError::SymbolNotFound`]. Other failures are fatal.
    fn fetch_symbol(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ClosePoint>, DataError> {
        let url = self.chart_url(symbol, start, end);
        debug!(%symbol, %url, "requesting chart");

        let resp = self.client.get(&url).send().map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                DataError::DataUnavailable(format!("network unreachable: {e}"))
            } else {
                DataError::DataUnavailable(format!("request for {symbol} failed: {e}"))
            }
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        if status == reqwest::StatusCode::BAD_REQUEST {
            return Err(match resp.json::<ChartResponse>() {
                Ok(chart) if reports_no_data(&chart) => DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                },
                _ => DataError::DataUnavailable(format!("HTTP {status} for {symbol}")),
            });
        }
        if !status.is_success() {
            return Err(DataError::DataUnavailable(format!(
                "HTTP {status} for {symbol}"
            )));
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormat(format!("failed to parse response for {symbol}: {e}"))
        })?;
        parse_response(symbol, chart)
    }
}

/// Chart error descriptions Yahoo uses for a symbol without bars in range.
const NO_DATA_MARKERS: [&str; 2] = ["Data doesn't exist", "No data found"];

/// True when the response says the symbol simply has no data: a "Not Found"
/// chart error, a no-data description, or no result and no error at all.
fn reports_no_data(resp: &ChartResponse) -> bool {
    match &resp.chart.error {
        Some(err) => {
            err.code == "Not Found"
                || NO_DATA_MARKERS
                    .iter()
                    .any(|marker| err.description.contains(marker))
        }
        None => resp.chart.result.as_ref().map_or(true, Vec::is_empty),
    }
}

/// Parse a chart API response into (date, adjusted close) points.
///
/// Uses `adjclose` when Yahoo supplies it and falls back to the raw close
/// otherwise. Each bar is dated in the exchange's local calendar
/// (`meta.gmtoffset`), so sessions east of UTC keep their trading date.
fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<ClosePoint>, DataError> {
    if reports_no_data(&resp) {
        return Err(DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        });
    }

    let ChartResult { result, error } = resp.chart;
    let data = match (result.and_then(|r| r.into_iter().next()), error) {
        (Some(data), _) => data,
        (None, Some(err)) => {
            return Err(DataError::ResponseFormat(format!(
                "{}: {}",
                err.code, err.description
            )))
        }
        (None, None) => {
            return Err(DataError::ResponseFormat("result array is empty".into()));
        }
    };

    // No timestamps means no trading days in range.
    let Some(timestamps) = data.timestamp else {
        return Ok(Vec::new());
    };
    let gmtoffset = data.meta.map_or(0, |m| m.gmtoffset);

    let closes = data
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let adj_closes = data
        .indicators
        .adjclose
        .and_then(|v| v.into_iter().next())
        .map(|a| a.adjclose);

    let mut points = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(ts + gmtoffset, 0)
            .map(|dt| dt.naive_utc().date())
            .ok_or_else(|| DataError::ResponseFormat(format!("invalid timestamp: {ts}")))?;

        let close = match &adj_closes {
            Some(adj) => adj.get(i).copied().flatten(),
            None => closes.get(i).copied().flatten(),
        };
        points.push((date, close));
    }

    Ok(points)
}

impl PriceProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_closes(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ProviderFrame, DataError> {
        let mut series = Vec::with_capacity(tickers.len());
        for symbol in tickers {
            let points = match self.fetch_symbol(symbol, start, end) {
                Ok(points) => points,
                Err(DataError::SymbolNotFound { symbol }) => {
                    warn!(%symbol, "symbol not found by provider");
                    Vec::new()
                }
                Err(e) => return Err(e),
            };
            series.push((symbol.clone(), points));
        }

        if series.len() == 1 {
            if let Some((ticker, points)) = series.pop() {
                return Ok(ProviderFrame::Series { ticker, points });
            }
        }
        Ok(align_closes(series))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fetch_prices;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// Serve canned chart responses on a local port. Each route is matched
    /// against the request line (e.g. `/AAPL?`); unmatched paths get a 404.
    fn serve(routes: Vec<(&'static str, u16, String)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut request_line = String::new();
                if reader.read_line(&mut request_line).is_err() {
                    continue;
                }
                loop {
                    let mut header = String::new();
                    match reader.read_line(&mut header) {
                        Ok(n) if n > 2 => continue,
                        _ => break,
                    }
                }

                let (status, body) = routes
                    .iter()
                    .find(|(path, _, _)| request_line.contains(path))
                    .map(|(_, status, body)| (*status, body.clone()))
                    .unwrap_or((404, String::new()));
                let reason = match status {
                    200 => "OK",
                    400 => "Bad Request",
                    404 => "Not Found",
                    _ => "Internal Server Error",
                };
                let _ = write!(
                    stream,
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
            }
        });
        format!("http://{addr}")
    }

    /// A 200 chart body with one adjusted close per (timestamp, value).
    fn chart_body(bars: &[(i64, f64)]) -> String {
        let ts: Vec<String> = bars.iter().map(|(t, _)| t.to_string()).collect();
        let closes: Vec<String> = bars.iter().map(|(_, c)| c.to_string()).collect();
        format!(
            r#"{{"chart":{{"result":[{{"meta":{{"gmtoffset":-18000}},"timestamp":[{}],"indicators":{{"quote":[{{"close":[{}]}}],"adjclose":[{{"adjclose":[{}]}}]}}}}],"error":null}}}}"#,
            ts.join(","),
            closes.join(","),
            closes.join(",")
        )
    }

    fn no_data_body() -> String {
        r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Data doesn't exist for startDate = 1577836800, endDate = 1578614400"}}}"#.to_string()
    }

    // 14:30 UTC session opens
    const JAN_02: i64 = 1_577_975_400;
    const JAN_03: i64 = 1_578_061_800;
    const JAN_06: i64 = 1_578_321_000;

    fn tickers(symbols: &[&str]) -> Vec<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    fn parse(symbol: &str, json: &str) -> Result<Vec<ClosePoint>, DataError> {
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        parse_response(symbol, resp)
    }

    #[test]
    fn prefers_adjusted_close() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704205800, 1704292200],
                    "indicators": {
                        "quote": [{"close": [185.64, 184.25]}],
                        "adjclose": [{"adjclose": [184.73, null]}]
                    }
                }],
                "error": null
            }
        }"#;

        let points = parse("AAPL", json).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].0, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(points[0].1, Some(184.73));
        assert_eq!(points[1].0, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(points[1].1, None);
    }

    #[test]
    fn falls_back_to_raw_close() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704205800],
                    "indicators": {"quote": [{"close": [185.64]}]}
                }],
                "error": null
            }
        }"#;
        let points = parse("AAPL", json).unwrap();
        assert_eq!(points[0].1, Some(185.64));
    }

    #[test]
    fn missing_timestamps_means_no_rows() {
        let json = r#"{
            "chart": {
                "result": [{"indicators": {"quote": [{}]}}],
                "error": null
            }
        }"#;
        assert!(parse("AAPL", json).unwrap().is_empty());
    }

    #[test]
    fn not_found_error_maps_to_symbol_not_found() {
        let json = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        }"#;
        assert!(matches!(
            parse("NOPE", json),
            Err(DataError::SymbolNotFound { .. })
        ));
    }

    #[test]
    fn other_chart_errors_are_format_errors() {
        let json = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Bad Request", "description": "Invalid input"}
            }
        }"#;
        assert!(matches!(parse("AAPL", json), Err(DataError::ResponseFormat(_))));
    }

    #[test]
    fn chart_url_excludes_end_date() {
        let provider = YahooProvider::with_base_url("http://localhost").unwrap();
        let url = provider.chart_url(
            "MSFT",
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 10).unwrap(),
        );
        assert_eq!(
            url,
            "http://localhost/MSFT?period1=1577836800&period2=1578614400&interval=1d&includeAdjustedClose=true"
        );
    }

    #[test]
    fn unreachable_host_is_data_unavailable() {
        // Port 9 on localhost is the discard service; nothing listens there in CI.
        let provider = YahooProvider::with_base_url("http://127.0.0.1:9").unwrap();
        let err = provider
            .fetch_closes(
                &["AAPL".to_string()],
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            )
            .unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable(_)));
    }

    #[test]
    fn data_does_not_exist_is_symbol_not_found() {
        assert!(matches!(
            parse("NEWCO", &no_data_body()),
            Err(DataError::SymbolNotFound { .. })
        ));
    }

    #[test]
    fn empty_result_is_symbol_not_found() {
        let json = r#"{"chart": {"result": [], "error": null}}"#;
        assert!(matches!(
            parse("GONE", json),
            Err(DataError::SymbolNotFound { .. })
        ));
    }

    #[test]
    fn exchange_offset_keeps_local_trading_date() {
        // ASX open 10:00 AEDT on 2024-01-03 is 23:00 UTC on 2024-01-02.
        let json = r#"{
            "chart": {
                "result": [{
                    "meta": {"gmtoffset": 39600, "exchangeTimezoneName": "Australia/Sydney"},
                    "timestamp": [1704236400],
                    "indicators": {"quote": [{"close": [7.21]}]}
                }],
                "error": null
            }
        }"#;
        let points = parse("BHP.AX", json).unwrap();
        assert_eq!(points[0].0, d("2024-01-03"));
    }

    #[test]
    fn single_symbol_yields_series() {
        let base = serve(vec![("/AAPL?", 200, chart_body(&[(JAN_02, 75.09), (JAN_03, 74.36)]))]);
        let provider = YahooProvider::with_base_url(base).unwrap();

        let frame = provider
            .fetch_closes(&tickers(&["AAPL"]), d("2020-01-01"), d("2020-01-10"))
            .unwrap();
        assert_eq!(
            frame,
            ProviderFrame::Series {
                ticker: "AAPL".into(),
                points: vec![
                    (d("2020-01-02"), Some(75.09)),
                    (d("2020-01-03"), Some(74.36)),
                ],
            }
        );
    }

    #[test]
    fn several_symbols_align_into_wide() {
        let base = serve(vec![
            ("/AAPL?", 200, chart_body(&[(JAN_02, 75.09), (JAN_03, 74.36)])),
            ("/MSFT?", 200, chart_body(&[(JAN_03, 158.62), (JAN_06, 159.03)])),
        ]);
        let provider = YahooProvider::with_base_url(base).unwrap();

        let frame = provider
            .fetch_closes(&tickers(&["AAPL", "MSFT"]), d("2020-01-01"), d("2020-01-10"))
            .unwrap();
        assert_eq!(
            frame,
            ProviderFrame::Wide {
                dates: vec![d("2020-01-02"), d("2020-01-03"), d("2020-01-06")],
                columns: vec![
                    ("AAPL".into(), vec![Some(75.09), Some(74.36), None]),
                    ("MSFT".into(), vec![None, Some(158.62), Some(159.03)]),
                ],
            }
        );
    }

    #[test]
    fn unknown_symbol_becomes_empty_column() {
        let base = serve(vec![("/AAPL?", 200, chart_body(&[(JAN_02, 75.09)]))]);
        let provider = YahooProvider::with_base_url(base).unwrap();

        let frame = provider
            .fetch_closes(&tickers(&["AAPL", "NOPE"]), d("2020-01-01"), d("2020-01-10"))
            .unwrap();
        assert_eq!(
            frame,
            ProviderFrame::Wide {
                dates: vec![d("2020-01-02")],
                columns: vec![
                    ("AAPL".into(), vec![Some(75.09)]),
                    ("NOPE".into(), vec![None]),
                ],
            }
        );
    }

    #[test]
    fn symbol_without_data_in_range_is_skipped() {
        let base = serve(vec![
            ("/AAPL?", 200, chart_body(&[(JAN_02, 75.09)])),
            ("/NEWCO?", 400, no_data_body()),
        ]);
        let provider = YahooProvider::with_base_url(base).unwrap();

        let table = fetch_prices(
            &provider,
            &tickers(&["AAPL", "NEWCO"]),
            d("2020-01-01"),
            d("2020-01-10"),
        )
        .unwrap();
        assert_eq!(table.tickers(), vec!["AAPL"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].close, 75.09);
    }

    #[test]
    fn other_bad_requests_stay_fatal() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input - interval=1x is not supported"}}}"#;
        let base = serve(vec![("/AAPL?", 400, body.to_string())]);
        let provider = YahooProvider::with_base_url(base).unwrap();

        let err = provider
            .fetch_closes(&tickers(&["AAPL"]), d("2020-01-01"), d("2020-01-10"))
            .unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable(_)));
    }

    #[test]
    fn server_error_is_fatal() {
        let base = serve(vec![
            ("/AAPL?", 200, chart_body(&[(JAN_02, 75.09)])),
            ("/MSFT?", 503, String::new()),
        ]);
        let provider = YahooProvider::with_base_url(base).unwrap();

        let err = provider
            .fetch_closes(&tickers(&["AAPL", "MSFT"]), d("2020-01-01"), d("2020-01-10"))
            .unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable(_)));
    }
}
