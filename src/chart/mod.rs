//! Horizontal bar chart composition.
//!
//! Draw order follows the usual plotting conventions: grid below bars, then
//! bars, ticks and tick labels, value labels, and finally the title and axis
//! label. The composed figure is cropped to its tight bounding box.

pub mod canvas;
mod font_5x7;
pub mod layout;
pub mod text;

use image::RgbImage;

use crate::config::ChartConfig;
use crate::results::ResultRow;
use canvas::{Canvas, Rect};
use layout::ChartLayout;
use text::Typeface;

/// Renders `rows` as a bar chart, one bar per distinct command from top to bottom.
pub fn draw_chart(rows: &[ResultRow], config: &ChartConfig, typeface: &Typeface) -> RgbImage {
    let layout = ChartLayout::compute(rows, config, typeface);
    draw_layout(&layout, config, typeface)
}

/// Draws a computed layout and crops it to its tight bounding box.
pub fn draw_layout(layout: &ChartLayout, config: &ChartConfig, typeface: &Typeface) -> RgbImage {
    tracing::debug!(
        target: "benchviz::chart",
        "Composing {}x{} figure with {} bars, axis max {:.3}",
        layout.width,
        layout.height,
        layout.bars.len(),
        layout.axis.max
    );

    let mut canvas = Canvas::covering(layout.bounds, config.background);

    draw_grid(&mut canvas, layout, config);
    for bar in &layout.bars {
        canvas.fill_rect(bar.rect, bar.color);
    }
    draw_x_ticks(&mut canvas, layout, config, typeface);
    draw_y_ticks(&mut canvas, layout, config, typeface);
    draw_bar_labels(&mut canvas, layout, config, typeface);
    draw_titles(&mut canvas, layout, config, typeface);

    let pad = (config.crop_pad_in * config.dpi as f32).round() as u32;
    canvas.into_tight_image(pad)
}

fn draw_grid(canvas: &mut Canvas, layout: &ChartLayout, config: &ChartConfig) {
    let dash = config.pt_to_px(config.grid_dash_pt).round().max(1.0) as u32;
    let gap = config.pt_to_px(config.grid_dash_pt * 0.43).round().max(1.0) as u32;
    for tick in &layout.ticks {
        canvas.dashed_vline(
            tick.x,
            layout.plot.y,
            layout.plot.bottom(),
            layout.tick_width,
            dash,
            gap,
            config.foreground,
            config.grid_alpha,
        );
    }
}

fn draw_x_ticks(canvas: &mut Canvas, layout: &ChartLayout, config: &ChartConfig, typeface: &Typeface) {
    let style = &config.tick_style;
    let px = config.pt_to_px(style.size_pt);
    let label_top = layout.plot.bottom() + i64::from(layout.tick_length + layout.tick_pad);

    for tick in &layout.ticks {
        let mark = Rect::new(
            tick.x - i64::from(layout.tick_width / 2),
            layout.plot.bottom(),
            layout.tick_width,
            layout.tick_length,
        );
        canvas.fill_rect(mark, config.foreground);

        let extent = typeface.measure(&tick.label, px, style.bold);
        let left = tick.x - i64::from(extent.width / 2);
        typeface.draw(canvas, &tick.label, left, label_top, px, style.bold, style.color);
    }
}

fn draw_y_ticks(canvas: &mut Canvas, layout: &ChartLayout, config: &ChartConfig, typeface: &Typeface) {
    let style = &config.tick_style;
    let px = config.pt_to_px(style.size_pt);

    for bar in &layout.bars {
        let center = bar.rect.center_y().round() as i64;
        let mark = Rect::new(
            layout.plot.x - i64::from(layout.tick_length),
            center - i64::from(layout.tick_width / 2),
            layout.tick_length,
            layout.tick_width,
        );
        canvas.fill_rect(mark, config.foreground);

        let extent = typeface.measure(&bar.command, px, style.bold);
        let right = layout.plot.x - i64::from(layout.tick_length + layout.tick_pad);
        let top = ChartLayout::centered_top(bar, extent);
        typeface.draw(
            canvas,
            &bar.command,
            right - i64::from(extent.width),
            top,
            px,
            style.bold,
            style.color,
        );
    }
}

fn draw_bar_labels(
    canvas: &mut Canvas,
    layout: &ChartLayout,
    config: &ChartConfig,
    typeface: &Typeface,
) {
    let style = &config.bar_label_style;
    let px = config.pt_to_px(style.size_pt);

    for bar in &layout.bars {
        let extent = typeface.measure(&bar.label, px, style.bold);
        let top = ChartLayout::centered_top(bar, extent);
        typeface.draw(canvas, &bar.label, bar.label_x, top, px, style.bold, style.color);
    }
}

fn draw_titles(canvas: &mut Canvas, layout: &ChartLayout, config: &ChartConfig, typeface: &Typeface) {
    let center_x = layout.plot.x + i64::from(layout.plot.width / 2);

    let title = &config.title_style;
    let title_px = config.pt_to_px(title.size_pt);
    let extent = typeface.measure(&config.title, title_px, title.bold);
    typeface.draw(
        canvas,
        &config.title,
        center_x - i64::from(extent.width / 2),
        layout.title_y,
        title_px,
        title.bold,
        title.color,
    );

    let x_label = &config.x_label_style;
    let x_label_px = config.pt_to_px(x_label.size_pt);
    let extent = typeface.measure(&config.x_label, x_label_px, x_label.bold);
    typeface.draw(
        canvas,
        &config.x_label,
        center_x - i64::from(extent.width / 2),
        layout.x_label_y,
        x_label_px,
        x_label.bold,
        x_label.color,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Color;

    fn config() -> ChartConfig {
        let mut config = ChartConfig {
            dpi: 40,
            ..ChartConfig::default()
        };
        // The default axis label shares the first bar color.
        config.x_label_style.color = Color::new(0x80, 0x80, 0x80);
        config
    }

    fn find_bar_rows(image: &RgbImage, color: Color) -> Vec<u32> {
        let target: image::Rgb<u8> = color.into();
        (0..image.height())
            .filter(|&y| (0..image.width()).any(|x| *image.get_pixel(x, y) == target))
            .collect()
    }

    #[test]
    fn test_chart_contains_both_bar_colors() {
        let config = config();
        let rows = vec![ResultRow::new("Go", 1.234), ResultRow::new("PHP", 0.567)];
        let image = draw_chart(&rows, &config, &Typeface::Bitmap);

        let first = find_bar_rows(&image, config.palette[0]);
        let second = find_bar_rows(&image, config.palette[1]);
        assert!(!first.is_empty());
        assert!(!second.is_empty());
        assert!(first.iter().max() < second.iter().min());
    }

    #[test]
    fn test_chart_is_cropped() {
        let config = config();
        let rows = vec![ResultRow::new("Go", 1.0)];
        let image = draw_chart(&rows, &config, &Typeface::Bitmap);
        let (width, height) = config.figure_size_px();

        assert!(image.width() <= width + 2 * 4);
        assert!(image.height() <= height + 2 * 4);

        let background: image::Rgb<u8> = config.background.into();
        assert_eq!(*image.get_pixel(0, 0), background);
        assert_eq!(*image.get_pixel(image.width() - 1, image.height() - 1), background);
    }

    /// Vertical runs of rows containing `color`, as (first row, last row).
    fn row_bands(image: &RgbImage, color: Color) -> Vec<(u32, u32)> {
        let mut bands: Vec<(u32, u32)> = Vec::new();
        for y in find_bar_rows(image, color) {
            match bands.last_mut() {
                Some((_, last)) if *last + 1 == y => *last = y,
                _ => bands.push((y, y)),
            }
        }
        bands
    }

    #[test]
    fn test_value_labels_of_fast_commands_are_drawn() {
        let mut config = config();
        let label_color = Color::new(0xff, 0x55, 0x55);
        config.bar_label_style.color = label_color;
        let rows = vec![ResultRow::new("Go", 0.0021), ResultRow::new("PHP", 0.0009)];

        let image = draw_chart(&rows, &config, &Typeface::Bitmap);
        let (width, _) = config.figure_size_px();

        // "0.002s" and "0.001s", one beside each bar
        assert_eq!(row_bands(&image, label_color).len(), 2);
        assert!(image.width() > width);

        let target: image::Rgb<u8> = label_color.into();
        let rightmost = image
            .enumerate_pixels()
            .filter(|(_, _, pixel)| **pixel == target)
            .map(|(x, _, _)| x)
            .max()
            .unwrap();
        assert!(rightmost > width);
    }

    #[test]
    fn test_duplicate_commands_draw_one_bar() {
        let config = config();
        let rows = vec![
            ResultRow::new("Go", 1.0),
            ResultRow::new("PHP", 0.5),
            ResultRow::new("Go", 1.4),
        ];
        let image = draw_chart(&rows, &config, &Typeface::Bitmap);

        assert_eq!(row_bands(&image, config.palette[0]).len(), 1);
        assert_eq!(row_bands(&image, config.palette[1]).len(), 1);
    }

    #[test]
    fn test_longer_bar_for_larger_mean() {
        let config = config();
        let rows = vec![ResultRow::new("slow", 2.0), ResultRow::new("fast", 0.5)];
        let image = draw_chart(&rows, &config, &Typeface::Bitmap);

        let width_of = |color: Color| {
            let target: image::Rgb<u8> = color.into();
            (0..image.height())
                .map(|y| {
                    (0..image.width())
                        .filter(|&x| *image.get_pixel(x, y) == target)
                        .count()
                })
                .max()
                .unwrap_or(0)
        };
        assert!(width_of(config.palette[0]) > 3 * width_of(config.palette[1]));
    }
}
