//! Close vs MA30 chart, one PNG per ticker.
//!
//! Every call builds its own canvas and drops it once the file is written,
//! so nothing drawn for one ticker can leak into the next.

pub mod canvas;
pub mod font;

use crate::domain::TickerSeries;
use canvas::colors;
use image::{ImageFormat, Rgb, RgbImage};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("nothing to plot for '{ticker}'")]
    EmptySeries { ticker: String },

    #[error("filesystem error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Canvas geometry and palette.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub margin_left: u32,
    pub margin_right: u32,
    pub margin_top: u32,
    pub margin_bottom: u32,
    pub line_thickness: u32,
    pub y_ticks: u32,
    pub background: Rgb<u8>,
    pub close_color: Rgb<u8>,
    pub ma_color: Rgb<u8>,
}

impl Default for ChartConfig {
    /// 12 x 6 inches at 150 dpi.
    fn default() -> Self {
        Self {
            width: 1800,
            height: 900,
            margin_left: 160,
            margin_right: 60,
            margin_top: 100,
            margin_bottom: 120,
            line_thickness: 3,
            y_ticks: 5,
            background: colors::WHITE,
            close_color: colors::BLUE,
            ma_color: colors::ORANGE,
        }
    }
}

/// Output file for a ticker: `{outdir}/{TICKER}_close_ma30.png`
pub fn chart_path(outdir: &Path, ticker: &str) -> PathBuf {
    outdir.join(format!("{ticker}_close_ma30.png"))
}

/// Render `series` and save it as PNG under `outdir`, replacing any existing file.
pub fn render_close_ma30(series: &TickerSeries, outdir: &Path) -> Result<PathBuf, ChartError> {
    std::fs::create_dir_all(outdir).map_err(|source| ChartError::Io {
        path: outdir.to_path_buf(),
        source,
    })?;

    let img = draw_close_ma30(series, &ChartConfig::default())?;
    let path = chart_path(outdir, &series.ticker);
    img.save_with_format(&path, ImageFormat::Png)?;
    debug!(ticker = %series.ticker, path = %path.display(), "saved chart");
    Ok(path)
}

/// Plot area in pixel coordinates.
struct Frame {
    left: u32,
    right: u32,
    top: u32,
    bottom: u32,
}

impl Frame {
    fn width(&self) -> f64 {
        f64::from(self.right - self.left)
    }

    fn height(&self) -> f64 {
        f64::from(self.bottom - self.top)
    }
}

/// Draw the chart in memory.
pub fn draw_close_ma30(series: &TickerSeries, cfg: &ChartConfig) -> Result<RgbImage, ChartError> {
    let (Some(first), Some(last)) = (series.rows.first(), series.rows.last()) else {
        return Err(ChartError::EmptySeries {
            ticker: series.ticker.clone(),
        });
    };

    let mut img = RgbImage::from_pixel(cfg.width, cfg.height, cfg.background);
    let frame = Frame {
        left: cfg.margin_left,
        right: cfg.width.saturating_sub(cfg.margin_right).max(cfg.margin_left + 1),
        top: cfg.margin_top,
        bottom: cfg.height.saturating_sub(cfg.margin_bottom).max(cfg.margin_top + 1),
    };

    let (lo, hi) = value_range(series);
    let span_days = (last.date - first.date).num_days();

    let x_of = |date: chrono::NaiveDate| -> i64 {
        if span_days == 0 {
            return i64::from(frame.left) + (frame.width() / 2.0) as i64;
        }
        let t = (date - first.date).num_days() as f64 / span_days as f64;
        i64::from(frame.left) + (t * frame.width()).round() as i64
    };
    let y_of = |v: f64| -> i64 {
        let t = (v - lo) / (hi - lo);
        i64::from(frame.bottom) - (t * frame.height()).round() as i64
    };

    // Horizontal grid and price labels
    let label_scale = 2;
    for k in 0..=cfg.y_ticks {
        let v = lo + (hi - lo) * f64::from(k) / f64::from(cfg.y_ticks.max(1));
        let y = y_of(v).clamp(0, i64::from(cfg.height) - 1) as u32;
        canvas::draw_horizontal_line(&mut img, y, frame.left, frame.right, colors::GRID);

        let label = format!("{v:.2}");
        let w = font::text_width(&label, label_scale);
        let x = frame.left.saturating_sub(w + 12);
        let y = y.saturating_sub(font::text_height(label_scale) / 2);
        font::draw_text(&mut img, x, y, &label, label_scale, colors::DARK_GRAY);
    }

    // Date labels: first, middle, last
    let mid = &series.rows[series.rows.len() / 2];
    let mut labelled: Vec<chrono::NaiveDate> = Vec::new();
    for date in [first.date, mid.date, last.date] {
        if labelled.contains(&date) {
            continue;
        }
        labelled.push(date);
        let label = date.to_string();
        let w = font::text_width(&label, label_scale);
        let cx = x_of(date).max(0) as u32;
        let x = cx
            .saturating_sub(w / 2)
            .min(cfg.width.saturating_sub(w));
        canvas::draw_vertical_line(&mut img, cx, frame.bottom, frame.bottom + 8, colors::BLACK);
        font::draw_text(&mut img, x, frame.bottom + 16, &label, label_scale, colors::DARK_GRAY);
    }

    // Axes
    canvas::draw_vertical_line(&mut img, frame.left, frame.top, frame.bottom, colors::BLACK);
    canvas::draw_horizontal_line(&mut img, frame.bottom, frame.left, frame.right, colors::BLACK);

    // Series
    let close_pts: Vec<(i64, i64)> = series
        .rows
        .iter()
        .map(|r| (x_of(r.date), y_of(r.close)))
        .collect();
    let ma_pts: Vec<(i64, i64)> = series
        .rows
        .iter()
        .map(|r| (x_of(r.date), y_of(r.ma30)))
        .collect();
    canvas::draw_polyline(&mut img, &close_pts, cfg.line_thickness, cfg.close_color);
    canvas::draw_polyline(&mut img, &ma_pts, cfg.line_thickness, cfg.ma_color);

    // Title and axis labels
    let title = format!("{} - CLOSE VS MA30", series.ticker);
    let title_scale = 4;
    let tw = font::text_width(&title, title_scale);
    font::draw_text(
        &mut img,
        cfg.width.saturating_sub(tw) / 2,
        30,
        &title,
        title_scale,
        colors::BLACK,
    );

    let axis_scale = 3;
    let xw = font::text_width("DATE", axis_scale);
    font::draw_text(
        &mut img,
        frame.left + (frame.right - frame.left).saturating_sub(xw) / 2,
        cfg.height.saturating_sub(font::text_height(axis_scale) + 30),
        "DATE",
        axis_scale,
        colors::BLACK,
    );
    font::draw_text(
        &mut img,
        24,
        frame.top.saturating_sub(font::text_height(axis_scale) + 16),
        "USD",
        axis_scale,
        colors::BLACK,
    );

    draw_legend(&mut img, &frame, cfg);
    Ok(img)
}

/// Min/max over both plotted series, padded 5% so lines clear the frame.
fn value_range(series: &TickerSeries) -> (f64, f64) {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for r in &series.rows {
        for v in [r.close, r.ma30] {
            if v.is_finite() {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if hi > lo {
        (hi - lo) * 0.05
    } else {
        (hi.abs() * 0.05).max(1.0)
    };
    (lo - pad, hi + pad)
}

fn draw_legend(img: &mut RgbImage, frame: &Frame, cfg: &ChartConfig) {
    let scale = 2;
    let entries = [("CLOSE", cfg.close_color), ("MA30", cfg.ma_color)];
    let row_h = font::text_height(scale) + 14;
    let swatch_w = 40;
    let label_w = entries
        .iter()
        .map(|(l, _)| font::text_width(l, scale))
        .max()
        .unwrap_or(0);

    let x = frame.left + 20;
    let y = frame.top + 20;
    let box_w = 12 + swatch_w + 10 + label_w + 12;
    let box_h = row_h * entries.len() as u32 + 10;

    canvas::fill_rect(img, x, y, box_w, box_h, cfg.background);
    canvas::draw_horizontal_line(img, y, x, x + box_w, colors::DARK_GRAY);
    canvas::draw_horizontal_line(img, y + box_h, x, x + box_w, colors::DARK_GRAY);
    canvas::draw_vertical_line(img, x, y, y + box_h, colors::DARK_GRAY);
    canvas::draw_vertical_line(img, x + box_w, y, y + box_h, colors::DARK_GRAY);

    for (i, (label, color)) in entries.iter().enumerate() {
        let row_y = y + 10 + row_h * i as u32;
        let mid_y = row_y + font::text_height(scale) / 2;
        canvas::fill_rect(img, x + 12, mid_y.saturating_sub(2), swatch_w, 5, *color);
        font::draw_text(img, x + 12 + swatch_w + 10, row_y, label, scale, colors::BLACK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceRow;
    use crate::indicators::compute_series;
    use chrono::NaiveDate;

    fn series(ticker: &str, closes: &[f64]) -> TickerSeries {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let rows = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceRow::new(base + chrono::Duration::days(i as i64), ticker, c))
            .collect();
        compute_series(ticker.to_string(), rows).unwrap()
    }

    fn count_color(img: &RgbImage, color: Rgb<u8>) -> usize {
        img.pixels().filter(|p| **p == color).count()
    }

    #[test]
    fn canvas_has_configured_size_and_both_series() {
        let s = series("AAPL", &(0..60).map(|i| 100.0 + (i as f64 * 0.3).sin() * 8.0).collect::<Vec<_>>());
        let img = draw_close_ma30(&s, &ChartConfig::default()).unwrap();

        assert_eq!(img.dimensions(), (1800, 900));
        // Far more than the legend swatches alone.
        assert!(count_color(&img, colors::BLUE) > 1000);
        assert!(count_color(&img, colors::ORANGE) > 1000);
    }

    #[test]
    fn single_row_series_still_renders() {
        let s = series("ONE", &[42.0]);
        let img = draw_close_ma30(&s, &ChartConfig::default()).unwrap();
        assert_eq!(img.dimensions(), (1800, 900));
    }

    #[test]
    fn empty_series_is_an_error() {
        let s = TickerSeries {
            ticker: "NONE".into(),
            rows: Vec::new(),
        };
        assert!(matches!(
            draw_close_ma30(&s, &ChartConfig::default()),
            Err(ChartError::EmptySeries { .. })
        ));
    }

    #[test]
    fn writes_png_named_after_ticker() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports");
        let path = render_close_ma30(&series("MSFT", &[1.0, 2.0, 3.0]), &out).unwrap();

        assert_eq!(path, out.join("MSFT_close_ma30.png"));
        let loaded = image::open(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (1800, 900));
    }

    #[test]
    fn charts_do_not_share_state() {
        let dir = tempfile::tempdir().unwrap();
        let a = series("AAA", &[10.0, 30.0, 20.0, 50.0]);
        let b = series("BBB", &[5.0, 4.0, 6.0]);

        let solo_dir = dir.path().join("solo");
        let solo = std::fs::read(render_close_ma30(&b, &solo_dir).unwrap()).unwrap();

        let both_dir = dir.path().join("both");
        render_close_ma30(&a, &both_dir).unwrap();
        let after_a = std::fs::read(render_close_ma30(&b, &both_dir).unwrap()).unwrap();

        assert_eq!(solo, after_a);
    }
}
