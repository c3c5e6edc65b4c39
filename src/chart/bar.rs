use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::{ReportError, Result};

pub const WIDTH: u32 = 1000;
pub const HEIGHT: u32 = 600;

const MARGIN: u32 = 60;
const BACKGROUND: Rgb = Rgb(255, 255, 255);
const AXIS: Rgb = Rgb(64, 64, 64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#RRGGBB`
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |range: std::ops::Range<usize>| {
            digits
                .get(range)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
        };
        match (digits.len(), channel(0..2), channel(2..4), channel(4..6)) {
            (6, Some(r), Some(g), Some(b)) => Ok(Rgb(r, g, b)),
            _ => Err(ReportError::Chart(format!("invalid color '{hex}'"))),
        }
    }
}

/// One category of a bar chart
#[derive(Debug, Clone)]
pub struct Bar {
    pub label: String,
    pub value: Decimal,
    pub color: Rgb,
}

#[derive(Debug, Clone)]
pub struct BarChart {
    pub title: String,
    pub bars: Vec<Bar>,
}

/// Pixel rectangle of a bar: x, y (top), width, height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Lay out bars left to right, heights scaled to the largest value.
/// Non-positive values get a zero-height bar.
pub fn layout(chart: &BarChart) -> Vec<Rect> {
    let count = chart.bars.len() as u32;
    if count == 0 {
        return Vec::new();
    }

    let plot_width = WIDTH - 2 * MARGIN;
    let plot_height = HEIGHT - 2 * MARGIN;
    let slot = plot_width / count;
    let bar_width = slot * 3 / 5;

    let values: Vec<f64> = chart
        .bars
        .iter()
        .map(|b| b.value.to_f64().unwrap_or(0.0).max(0.0))
        .collect();
    let max = values.iter().cloned().fold(0.0_f64, f64::max);

    values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let height = if max > 0.0 {
                ((value / max) * f64::from(plot_height)).round() as u32
            } else {
                0
            };
            Rect {
                x: MARGIN + slot * i as u32 + (slot - bar_width) / 2,
                y: MARGIN + plot_height - height,
                width: bar_width,
                height,
            }
        })
        .collect()
}

fn fill(pixels: &mut [u8], rect: Rect, color: Rgb) {
    for y in rect.y..(rect.y + rect.height).min(HEIGHT) {
        for x in rect.x..(rect.x + rect.width).min(WIDTH) {
            let at = ((y * WIDTH + x) * 3) as usize;
            pixels[at..at + 3].copy_from_slice(&[color.0, color.1, color.2]);
        }
    }
}

fn rasterize(chart: &BarChart) -> Vec<u8> {
    let mut pixels = [BACKGROUND.0, BACKGROUND.1, BACKGROUND.2].repeat((WIDTH * HEIGHT) as usize);

    for (rect, bar) in layout(chart).into_iter().zip(&chart.bars) {
        fill(&mut pixels, rect, bar.color);
    }

    // Baseline and y axis
    let baseline = HEIGHT - MARGIN;
    fill(
        &mut pixels,
        Rect { x: MARGIN, y: baseline, width: WIDTH - 2 * MARGIN, height: 2 },
        AXIS,
    );
    fill(
        &mut pixels,
        Rect { x: MARGIN - 2, y: MARGIN, width: 2, height: baseline - MARGIN + 2 },
        AXIS,
    );

    pixels
}

/// Write the chart as an RGB PNG. Title and bar values go into tEXt chunks.
pub fn render_bar_chart(chart: &BarChart, path: &Path) -> Result<()> {
    let pixels = rasterize(chart);
    let to_chart_err = |e: png::EncodingError| ReportError::Chart(e.to_string());

    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), WIDTH, HEIGHT);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder
        .add_text_chunk("Title".to_string(), chart.title.clone())
        .map_err(to_chart_err)?;
    for bar in &chart.bars {
        encoder
            .add_text_chunk(bar.label.clone(), format!("{:.2}", bar.value))
            .map_err(to_chart_err)?;
    }

    let mut writer = encoder.write_header().map_err(to_chart_err)?;
    writer.write_image_data(&pixels).map_err(to_chart_err)?;
    writer.finish().map_err(to_chart_err)?;

    Ok(())
}
