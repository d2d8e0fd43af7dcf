//! Flat CSV output: one file, every ticker, (date, ticker) leading.

use super::{PersistError, COLUMNS};
use crate::domain::IndicatorTable;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the flat export inside the base directory.
pub const FLAT_FILE: &str = "prices.csv";

/// Path of the flat export: `{base_dir}/prices.csv`
pub fn flat_path(base_dir: &Path) -> PathBuf {
    base_dir.join(FLAT_FILE)
}

/// Write the whole table to `{base_dir}/prices.csv`, replacing any existing file.
pub fn write_flat(table: &IndicatorTable, base_dir: &Path) -> Result<PathBuf, PersistError> {
    fs::create_dir_all(base_dir).map_err(|e| PersistError::io(base_dir, e))?;

    let path = flat_path(base_dir);
    let data = export_csv(table)?;
    fs::write(&path, data).map_err(|e| PersistError::io(&path, e))?;
    debug!(rows = table.len(), path = %path.display(), "wrote flat file");
    Ok(path)
}

/// Render the table as CSV bytes.
///
/// Columns follow [`COLUMNS`]. A missing return is an empty field. Floats use
/// the shortest representation that reads back to the same value.
pub fn export_csv(table: &IndicatorTable) -> Result<Vec<u8>, PersistError> {
    let csv_err = |e: csv::Error| PersistError::Csv(e.to_string());
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(COLUMNS).map_err(csv_err)?;

    for r in table.rows() {
        wtr.write_record([
            &r.date.to_string(),
            &r.ticker,
            &r.close.to_string(),
            &r.ma30.to_string(),
            &r.daily_return.map(|v| v.to_string()).unwrap_or_default(),
            &r.cum_return.to_string(),
            &r.norm_price.to_string(),
        ])
        .map_err(csv_err)?;
    }

    wtr.into_inner()
        .map_err(|e| PersistError::Csv(format!("failed to flush CSV writer: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceRow;
    use crate::indicators::add_indicators;
    use chrono::NaiveDate;

    fn sample_table() -> IndicatorTable {
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        add_indicators(&[
            PriceRow::new(d1, "AAPL", 10.0),
            PriceRow::new(d1, "MSFT", 20.0),
            PriceRow::new(d2, "AAPL", 11.0),
            PriceRow::new(d2, "MSFT", 25.0),
        ])
        .unwrap()
    }

    #[test]
    fn header_and_leading_key_columns() {
        let text = String::from_utf8(export_csv(&sample_table()).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "date,ticker,close,ma30,return,cum_return,norm_price");
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "2024-01-02,AAPL,10,10,,0,100");
        assert!(lines[2].starts_with("2024-01-03,AAPL,11,10.5,"));
        assert_eq!(lines[3], "2024-01-02,MSFT,20,20,,0,100");
        assert_eq!(lines[4], "2024-01-03,MSFT,25,22.5,0.25,0.25,125");
    }

    #[test]
    fn csv_reads_back_with_csv_reader() {
        let bytes = export_csv(&sample_table()).unwrap();
        let mut rdr = csv::Reader::from_reader(bytes.as_slice());
        let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 4);
        assert_eq!(&records[2][1], "MSFT");
        assert_eq!(&records[2][4], "");
        let norm: f64 = records[3][6].parse().unwrap();
        assert_eq!(norm, 125.0);
    }

    #[test]
    fn write_flat_twice_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let table = sample_table();

        let path = write_flat(&table, dir.path()).unwrap();
        let first = fs::read(&path).unwrap();
        write_flat(&table, dir.path()).unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(path, dir.path().join("prices.csv"));
        assert_eq!(first, second);
    }

    #[test]
    fn unwritable_base_dir_surfaces_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, b"x").unwrap();

        let err = write_flat(&sample_table(), &blocker.join("curated")).unwrap_err();
        assert!(matches!(err, PersistError::Io { .. }));
    }
}
