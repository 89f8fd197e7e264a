//! Styling constants for the benchmark chart.
//!
//! Sizes are expressed the way a plotting library would: figure dimensions in
//! inches and font sizes in points, converted to pixels through [`ChartConfig::dpi`].

use image::Rgb;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Mixes `self` over `background` with the given opacity (0.0..=1.0).
    pub fn blend_over(self, background: Color, alpha: f32) -> Color {
        let alpha = alpha.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| -> u8 {
            (f32::from(fg) * alpha + f32::from(bg) * (1.0 - alpha)).round() as u8
        };
        Color::new(
            mix(self.r, background.r),
            mix(self.g, background.g),
            mix(self.b, background.b),
        )
    }
}

impl From<Color> for Rgb<u8> {
    fn from(color: Color) -> Self {
        Rgb([color.r, color.g, color.b])
    }
}

impl From<Rgb<u8>> for Color {
    fn from(pixel: Rgb<u8>) -> Self {
        Color::new(pixel.0[0], pixel.0[1], pixel.0[2])
    }
}

/// Size (in points), weight and color of a piece of chart text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub size_pt: f32,
    pub bold: bool,
    pub color: Color,
}

/// Configuration for chart rendering
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    /// Bar colors, assigned by row index and cycled when there are more rows than colors
    pub palette: Vec<Color>,
    pub background: Color,
    /// Default text color of the dark theme (tick labels)
    pub foreground: Color,
    /// Figure width in inches
    pub width_in: f32,
    /// Figure height in inches
    pub height_in: f32,
    pub dpi: u32,
    pub title: String,
    pub title_style: TextStyle,
    /// Gap between the title baseline and the plot area, in points
    pub title_pad_pt: f32,
    pub x_label: String,
    pub x_label_style: TextStyle,
    pub tick_style: TextStyle,
    pub bar_label_style: TextStyle,
    /// Horizontal offset of the value label past the bar end, in data units (seconds)
    pub label_offset: f64,
    /// Fraction of each category slot covered by its bar
    pub bar_fill: f32,
    pub grid_alpha: f32,
    /// Dash and gap length of the grid lines, in points
    pub grid_dash_pt: f32,
    /// Padding kept around the content when cropping to the tight bounding box, in inches
    pub crop_pad_in: f32,
}

impl ChartConfig {
    /// Converts a length in points to pixels at the configured resolution.
    pub fn pt_to_px(&self, points: f32) -> f32 {
        points * self.dpi as f32 / 72.0
    }

    /// Full figure size in pixels, before cropping.
    pub fn figure_size_px(&self) -> (u32, u32) {
        let width = (self.width_in * self.dpi as f32).round().max(1.0) as u32;
        let height = (self.height_in * self.dpi as f32).round().max(1.0) as u32;
        (width, height)
    }

    /// Color of the bar for the command at `index`.
    pub fn bar_color(&self, index: usize) -> Color {
        if self.palette.is_empty() {
            return self.foreground;
        }
        self.palette[index % self.palette.len()]
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        let bright = Color::new(0xf8, 0xf8, 0xf2);
        Self {
            palette: vec![Color::new(0x62, 0x72, 0xa4), Color::new(0x50, 0xfa, 0x7b)],
            background: Color::new(0x00, 0x00, 0x00),
            foreground: Color::new(0xff, 0xff, 0xff),
            width_in: 10.0,
            height_in: 6.0,
            dpi: 300,
            title: "CsvQuery (Go) vs Native PHP (fgetcsv)".to_string(),
            title_style: TextStyle {
                size_pt: 18.0,
                bold: true,
                color: bright,
            },
            title_pad_pt: 20.0,
            x_label: "Mean Execution Time (seconds)".to_string(),
            x_label_style: TextStyle {
                size_pt: 12.0,
                bold: false,
                color: Color::new(0x62, 0x72, 0xa4),
            },
            tick_style: TextStyle {
                size_pt: 10.0,
                bold: false,
                color: Color::new(0xff, 0xff, 0xff),
            },
            bar_label_style: TextStyle {
                size_pt: 10.0,
                bold: true,
                color: bright,
            },
            label_offset: 0.01,
            bar_fill: 0.8,
            grid_alpha: 0.2,
            grid_dash_pt: 3.7,
            crop_pad_in: 0.1,
        }
    }
}
