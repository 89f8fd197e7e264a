//! Text measurement and drawing.
//!
//! Two typefaces are supported: the embedded 5x7 bitmap font, scaled by an
//! integer factor, and any TrueType font rasterized with `fontdue`.

use std::path::Path;

use fontdue::{Font, FontSettings};

use super::canvas::Canvas;
use super::font_5x7;
use crate::config::Color;
use crate::error::{RenderError, Result};

/// Pixel size of a laid-out string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextExtent {
    pub width: u32,
    pub height: u32,
}

pub enum Typeface {
    /// The embedded bitmap font
    Bitmap,
    TrueType(Box<Font>),
}

impl Typeface {
    /// Loads a TrueType or OpenType font file.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| RenderError::FontLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let font =
            Font::from_bytes(bytes, FontSettings::default()).map_err(|e| RenderError::FontLoad {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        tracing::debug!(
            target: "benchviz::chart::text",
            "Loaded font {:?} from {}",
            font.name(),
            path.display()
        );

        Ok(Self::TrueType(Box::new(font)))
    }

    /// Size of `text` at a font size of `px` pixels.
    pub fn measure(&self, text: &str, px: f32, bold: bool) -> TextExtent {
        match self {
            Self::Bitmap => {
                let scale = bitmap_scale(px);
                let chars = text.chars().count() as u32;
                if chars == 0 {
                    return TextExtent {
                        width: 0,
                        height: font_5x7::HEIGHT * scale,
                    };
                }
                let mut width = (chars * font_5x7::ADVANCE - 1) * scale;
                if bold {
                    width += scale;
                }
                TextExtent {
                    width,
                    height: font_5x7::HEIGHT * scale,
                }
            }
            Self::TrueType(font) => {
                let advance: f32 = text
                    .chars()
                    .map(|ch| font.metrics(ch, px).advance_width)
                    .sum();
                let (ascent, descent) = line_metrics(font, px);
                let mut width = advance.ceil() as u32;
                if bold {
                    width += truetype_bold_offset(px);
                }
                TextExtent {
                    width,
                    height: (ascent - descent).ceil() as u32,
                }
            }
        }
    }

    /// Draws `text` with its top-left corner at (`x`, `y`).
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        canvas: &mut Canvas,
        text: &str,
        x: i64,
        y: i64,
        px: f32,
        bold: bool,
        color: Color,
    ) {
        match self {
            Self::Bitmap => {
                let scale = bitmap_scale(px);
                draw_bitmap(canvas, text, x, y, scale, color);
                if bold {
                    draw_bitmap(canvas, text, x + i64::from(scale), y, scale, color);
                }
            }
            Self::TrueType(font) => {
                draw_truetype(font, canvas, text, x, y, px, color);
                if bold {
                    let offset = i64::from(truetype_bold_offset(px));
                    draw_truetype(font, canvas, text, x + offset, y, px, color);
                }
            }
        }
    }
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bitmap => f.write_str("Bitmap"),
            Self::TrueType(font) => f.debug_tuple("TrueType").field(&font.name()).finish(),
        }
    }
}

/// Integer scale applied to the bitmap font so its line height approximates `px`.
fn bitmap_scale(px: f32) -> u32 {
    (px / font_5x7::LINE_HEIGHT as f32).round().max(1.0) as u32
}

fn truetype_bold_offset(px: f32) -> u32 {
    (px / 24.0).round().max(1.0) as u32
}

fn line_metrics(font: &Font, px: f32) -> (f32, f32) {
    match font.horizontal_line_metrics(px) {
        Some(metrics) => (metrics.ascent, metrics.descent),
        None => (px * 0.8, -px * 0.2),
    }
}

fn draw_bitmap(canvas: &mut Canvas, text: &str, x: i64, y: i64, scale: u32, color: Color) {
    let scale = i64::from(scale);
    let mut pen_x = x;
    for ch in text.chars() {
        for (column, bits) in font_5x7::glyph(ch).iter().enumerate() {
            for row in 0..font_5x7::HEIGHT {
                if bits & (1 << row) == 0 {
                    continue;
                }
                let px0 = pen_x + column as i64 * scale;
                let py0 = y + i64::from(row) * scale;
                for dy in 0..scale {
                    for dx in 0..scale {
                        canvas.put_pixel(px0 + dx, py0 + dy, color);
                    }
                }
            }
        }
        pen_x += i64::from(font_5x7::ADVANCE) * scale;
    }
}

fn draw_truetype(font: &Font, canvas: &mut Canvas, text: &str, x: i64, y: i64, px: f32, color: Color) {
    let (ascent, _) = line_metrics(font, px);
    let baseline = y as f32 + ascent;
    let mut pen_x = x as f32;
    for ch in text.chars() {
        let (metrics, coverage) = font.rasterize(ch, px);
        let left = (pen_x + metrics.xmin as f32).round() as i64;
        let top = (baseline - metrics.height as f32 - metrics.ymin as f32).round() as i64;
        for (i, value) in coverage.iter().enumerate() {
            if *value == 0 {
                continue;
            }
            let gx = (i % metrics.width) as i64;
            let gy = (i / metrics.width) as i64;
            canvas.blend_pixel(left + gx, top + gy, color, f32::from(*value) / 255.0);
        }
        pen_x += metrics.advance_width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Color = Color::new(0, 0, 0);
    const WHITE: Color = Color::new(255, 255, 255);

    #[test]
    fn test_bitmap_scale() {
        assert_eq!(bitmap_scale(1.0), 1);
        assert_eq!(bitmap_scale(8.0), 1);
        assert_eq!(bitmap_scale(41.7), 5);
        assert_eq!(bitmap_scale(75.0), 9);
    }

    #[test]
    fn test_bitmap_measure() {
        let typeface = Typeface::Bitmap;
        assert_eq!(
            typeface.measure("1.234s", 16.0, false),
            TextExtent {
                width: 70,
                height: 14
            }
        );
        assert_eq!(typeface.measure("1.234s", 16.0, true).width, 72);
        assert_eq!(typeface.measure("", 16.0, false).width, 0);
    }

    #[test]
    fn test_bitmap_draw_stays_within_measured_extent() {
        let typeface = Typeface::Bitmap;
        let mut canvas = Canvas::new(200, 50, BLACK);
        let extent = typeface.measure("Go 0.567s", 16.0, true);
        typeface.draw(&mut canvas, "Go 0.567s", 10, 5, 16.0, true, WHITE);

        let bounds = canvas.content_bounds().unwrap();
        assert!(bounds.x >= 10);
        assert!(bounds.y >= 5);
        assert!(bounds.right() <= 10 + i64::from(extent.width));
        assert!(bounds.bottom() <= 5 + i64::from(extent.height));
    }

    const SYSTEM_FONTS: [&str; 4] = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/Library/Fonts/Arial Unicode.ttf",
    ];

    fn system_font() -> Option<Typeface> {
        SYSTEM_FONTS
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(|path| Typeface::load(path).unwrap())
    }

    #[test]
    fn test_truetype_draw_stays_within_measured_extent() {
        let Some(typeface) = system_font() else {
            eprintln!("no system TrueType font found, skipping");
            return;
        };
        let mut canvas = Canvas::new(400, 100, BLACK);
        let extent = typeface.measure("Go 0.567s", 32.0, true);
        typeface.draw(&mut canvas, "Go 0.567s", 20, 10, 32.0, true, WHITE);

        assert!(extent.width > 0);
        assert!(extent.height >= 32);

        // Antialiased edges may round one pixel past the nominal box.
        let bounds = canvas.content_bounds().unwrap();
        assert!(bounds.x >= 20 - 1);
        assert!(bounds.y >= 10 - 1);
        assert!(bounds.right() <= 20 + i64::from(extent.width) + 1);
        assert!(bounds.bottom() <= 10 + i64::from(extent.height) + 1);
    }

    #[test]
    fn test_truetype_bold_is_wider() {
        let Some(typeface) = system_font() else {
            eprintln!("no system TrueType font found, skipping");
            return;
        };
        let regular = typeface.measure("1.234s", 20.0, false);
        let bold = typeface.measure("1.234s", 20.0, true);
        assert_eq!(bold.width, regular.width + truetype_bold_offset(20.0));
        assert_eq!(bold.height, regular.height);
        assert!(format!("{typeface:?}").starts_with("TrueType"));
    }

    #[test]
    fn test_load_missing_font() {
        let err = Typeface::load(Path::new("/nonexistent/font.ttf")).unwrap_err();
        assert!(matches!(err, RenderError::FontLoad { .. }));
    }

    #[test]
    fn test_load_invalid_font() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.ttf");
        std::fs::write(&path, b"not a font").unwrap();

        let err = Typeface::load(&path).unwrap_err();
        assert!(matches!(err, RenderError::FontLoad { .. }));
    }
}
