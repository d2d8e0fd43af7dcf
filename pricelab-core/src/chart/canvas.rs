//! Raster primitives on an `RgbImage`. Everything clips to the image.

use image::{Rgb, RgbImage};

/// Common color definitions
pub mod colors {
    use image::Rgb;

    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    pub const GRID: Rgb<u8> = Rgb([225, 225, 225]);
    pub const DARK_GRAY: Rgb<u8> = Rgb([60, 60, 60]);
    pub const BLUE: Rgb<u8> = Rgb([31, 119, 180]);
    pub const ORANGE: Rgb<u8> = Rgb([255, 127, 14]);
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u64) < img.width() as u64 && (y as u64) < img.height() as u64 {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Fill an axis-aligned rectangle.
pub fn fill_rect(img: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    for dy in 0..height {
        for dx in 0..width {
            put(img, x as i64 + dx as i64, y as i64 + dy as i64, color);
        }
    }
}

/// Draw a horizontal line from x1 to x2 inclusive.
pub fn draw_horizontal_line(img: &mut RgbImage, y: u32, x1: u32, x2: u32, color: Rgb<u8>) {
    let (start, end) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
    for x in start..=end {
        put(img, x as i64, y as i64, color);
    }
}

/// Draw a vertical line from y1 to y2 inclusive.
pub fn draw_vertical_line(img: &mut RgbImage, x: u32, y1: u32, y2: u32, color: Rgb<u8>) {
    let (start, end) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
    for y in start..=end {
        put(img, x as i64, y as i64, color);
    }
}

/// Bresenham line, `thickness` pixels wide (square brush).
pub fn draw_line(
    img: &mut RgbImage,
    from: (i64, i64),
    to: (i64, i64),
    thickness: u32,
    color: Rgb<u8>,
) {
    let (x1, y1) = from;
    let (x2, y2) = to;
    let dx = (x2 - x1).abs();
    let dy = (y2 - y1).abs();
    let sx = if x1 < x2 { 1 } else { -1 };
    let sy = if y1 < y2 { 1 } else { -1 };
    let mut err = dx - dy;

    let half = thickness.max(1) as i64 / 2;
    let span = thickness.max(1) as i64;

    let (mut x, mut y) = (x1, y1);
    loop {
        for oy in 0..span {
            for ox in 0..span {
                put(img, x - half + ox, y - half + oy, color);
            }
        }

        if x == x2 && y == y2 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}

/// Connect consecutive points with `draw_line`.
pub fn draw_polyline(img: &mut RgbImage, points: &[(i64, i64)], thickness: u32, color: Rgb<u8>) {
    match points {
        [] => {}
        [only] => draw_line(img, *only, *only, thickness, color),
        _ => {
            for pair in points.windows(2) {
                draw_line(img, pair[0], pair[1], thickness, color);
            }
        }
    }
}
