//! Figure geometry: margins, the value axis scale and the bar rectangles.
//!
//! The layout is computed before anything is drawn so the placement of every
//! element can be inspected (and tested) independently of the pixels.

use super::canvas::Rect;
use super::text::{TextExtent, Typeface};
use crate::config::{ChartConfig, Color};
use crate::results::{self, ResultRow};

/// Autoscale margin added past the longest bar.
const AXIS_MARGIN: f64 = 0.05;
/// Upper bound on the number of tick intervals along the value axis.
const MAX_TICK_INTERVALS: f64 = 8.0;
const TICK_STEPS: [f64; 5] = [1.0, 2.0, 2.5, 5.0, 10.0];

/// A tick on the value (x) axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    /// Horizontal pixel position
    pub x: i64,
    pub label: String,
}

/// A bar and its annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct BarGeometry {
    pub command: String,
    pub rect: Rect,
    pub color: Color,
    /// Value label text, e.g. `1.234s`
    pub label: String,
    /// Left edge of the value label
    pub label_x: i64,
}

/// The linear value axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueAxis {
    pub max: f64,
    pub step: f64,
    pub decimals: usize,
}

impl ValueAxis {
    /// Scale for data running from zero to `data_max`.
    pub fn for_max(data_max: f64) -> Self {
        let max = if data_max > 0.0 && data_max.is_finite() {
            data_max * (1.0 + AXIS_MARGIN)
        } else {
            1.0
        };
        let step = nice_step(max);
        Self {
            max,
            step,
            decimals: step_decimals(step),
        }
    }

    /// Tick values from zero up to the axis maximum.
    pub fn tick_values(&self) -> Vec<f64> {
        let count = (self.max / self.step + 1e-9).floor() as usize;
        (0..=count).map(|i| i as f64 * self.step).collect()
    }

    pub fn format(&self, value: f64) -> String {
        format!("{value:.prec$}", prec = self.decimals)
    }
}

/// Smallest step from the 1-2-2.5-5 series that splits `span` into at most
/// eight intervals.
pub fn nice_step(span: f64) -> f64 {
    let exponent = (span / MAX_TICK_INTERVALS).log10().floor() as i32;
    // Dividing keeps negative powers of ten correctly rounded (0.1, not 0.1000...02).
    let magnitude = if exponent < 0 {
        1.0 / 10f64.powi(-exponent)
    } else {
        10f64.powi(exponent)
    };
    TICK_STEPS
        .iter()
        .map(|m| m * magnitude)
        .find(|step| span / step <= MAX_TICK_INTERVALS + 1e-9)
        .unwrap_or(10.0 * magnitude)
}

/// Decimal places needed to print multiples of `step` exactly.
fn step_decimals(step: f64) -> usize {
    (0..6)
        .find(|&d| {
            let scaled = step * 10f64.powi(d as i32);
            (scaled - scaled.round()).abs() < 1e-6
        })
        .unwrap_or(6)
}

/// Positions of every chart element in the uncropped figure.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub width: u32,
    pub height: u32,
    /// Union of the figure and every drawn element. Value labels of fast
    /// commands can sit far right of the plot and extend the figure.
    pub bounds: Rect,
    /// The axes area bars are drawn in
    pub plot: Rect,
    pub axis: ValueAxis,
    pub ticks: Vec<Tick>,
    pub bars: Vec<BarGeometry>,
    /// Top of the title text
    pub title_y: i64,
    /// Top of the x-axis label text
    pub x_label_y: i64,
    pub tick_length: u32,
    pub tick_width: u32,
    pub tick_pad: u32,
}

impl ChartLayout {
    /// Lays out one bar per distinct command, in order of first appearance.
    pub fn compute(rows: &[ResultRow], config: &ChartConfig, typeface: &Typeface) -> Self {
        let rows = results::group_by_command(rows);
        let (width, height) = config.figure_size_px();
        let px = |pt: f32| config.pt_to_px(pt);

        let tick_px = px(config.tick_style.size_pt);
        let bar_label_px = px(config.bar_label_style.size_pt);
        let title_px = px(config.title_style.size_pt);
        let x_label_px = px(config.x_label_style.size_pt);

        let tick_length = px(3.5).round().max(1.0) as u32;
        let tick_width = px(0.8).round().max(1.0) as u32;
        let tick_pad = px(3.5).round() as u32;
        let label_pad = px(4.0).round() as u32;
        let edge = px(6.0).round() as i64;

        let measure_ticks = |text: &str| typeface.measure(text, tick_px, config.tick_style.bold);

        let widest_command = rows
            .iter()
            .map(|row| measure_ticks(&row.command).width)
            .max()
            .unwrap_or(0);
        let widest_bar_label = rows
            .iter()
            .map(|row| {
                typeface
                    .measure(&row.label(), bar_label_px, config.bar_label_style.bold)
                    .width
            })
            .max()
            .unwrap_or(0);

        let title = typeface.measure(&config.title, title_px, config.title_style.bold);
        let x_label = typeface.measure(&config.x_label, x_label_px, config.x_label_style.bold);
        let tick_label_height = measure_ticks("0").height;

        let left = edge + i64::from(widest_command + tick_length + tick_pad);
        let right = i64::from(width) - edge - i64::from(widest_bar_label);
        let top = edge + i64::from(title.height) + px(config.title_pad_pt).round() as i64;
        let bottom = i64::from(height)
            - edge
            - i64::from(x_label.height + label_pad + tick_label_height + tick_pad + tick_length);

        let plot = Rect::new(
            left,
            top,
            (right - left).max(1) as u32,
            (bottom - top).max(1) as u32,
        );

        let data_max = rows.iter().map(|row| row.mean).fold(0.0, f64::max);
        let axis = ValueAxis::for_max(data_max);
        let to_x = |value: f64| plot.x + (value / axis.max * f64::from(plot.width)).round() as i64;

        let ticks: Vec<Tick> = axis
            .tick_values()
            .into_iter()
            .map(|value| Tick {
                value,
                x: to_x(value),
                label: axis.format(value),
            })
            .collect();

        let slot = f64::from(plot.height) / rows.len().max(1) as f64;
        let thickness = (slot * f64::from(config.bar_fill)).round().max(1.0) as u32;
        let bars: Vec<BarGeometry> = rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let center = plot.y as f64 + (index as f64 + 0.5) * slot;
                let top = (center - f64::from(thickness) / 2.0).round() as i64;
                let length = (to_x(row.mean) - plot.x).max(0) as u32;
                BarGeometry {
                    command: row.command.clone(),
                    rect: Rect::new(plot.x, top, length, thickness),
                    color: config.bar_color(index),
                    label: row.label(),
                    label_x: to_x(row.mean + config.label_offset),
                }
            })
            .collect();

        let title_y = edge;
        let x_label_y =
            plot.bottom() + i64::from(tick_length + tick_pad + tick_label_height + label_pad);
        let center_x = plot.x + i64::from(plot.width / 2);
        let tick_label_y = plot.bottom() + i64::from(tick_length + tick_pad);

        let mut bounds = Rect::new(0, 0, width, height);
        bounds = union(bounds, centered_text(center_x, title_y, title));
        bounds = union(bounds, centered_text(center_x, x_label_y, x_label));
        for tick in &ticks {
            bounds = union(bounds, centered_text(tick.x, tick_label_y, measure_ticks(&tick.label)));
        }
        for bar in &bars {
            let extent =
                typeface.measure(&bar.label, bar_label_px, config.bar_label_style.bold);
            let top = Self::centered_top(bar, extent);
            bounds = union(bounds, Rect::new(bar.label_x, top, extent.width, extent.height));
        }

        Self {
            width,
            height,
            bounds,
            plot,
            axis,
            ticks,
            bars,
            title_y,
            x_label_y,
            tick_length,
            tick_width,
            tick_pad,
        }
    }

    /// Top edge at which text of height `extent` is vertically centered on `bar`.
    pub fn centered_top(bar: &BarGeometry, extent: TextExtent) -> i64 {
        (bar.rect.center_y() - f64::from(extent.height) / 2.0).round() as i64
    }
}

/// Box of text of the given extent horizontally centered on `center_x`.
fn centered_text(center_x: i64, top: i64, extent: TextExtent) -> Rect {
    Rect::new(center_x - i64::from(extent.width / 2), top, extent.width, extent.height)
}

fn union(a: Rect, b: Rect) -> Rect {
    let x = a.x.min(b.x);
    let y = a.y.min(b.y);
    let right = a.right().max(b.right());
    let bottom = a.bottom().max(b.bottom());
    Rect::new(x, y, (right - x) as u32, (bottom - y) as u32)
}
