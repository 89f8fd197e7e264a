//! Pixel canvas the chart is composed on.
//!
//! Coordinates are signed so callers can position shapes partially outside the
//! image; everything is clipped to the image bounds. A canvas may cover a
//! region that does not start at the origin, in which case the top-left pixel
//! of the image sits at that region's corner.

use image::{ImageBuffer, RgbImage};

use crate::config::Color;

/// An axis-aligned rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn right(&self) -> i64 {
        self.x + self.width as i64
    }

    pub const fn bottom(&self) -> i64 {
        self.y + self.height as i64
    }

    pub fn center_y(&self) -> f64 {
        self.y as f64 + f64::from(self.height) / 2.0
    }
}

pub struct Canvas {
    image: RgbImage,
    background: Color,
    origin_x: i64,
    origin_y: i64,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self::covering(Rect::new(0, 0, width, height), background)
    }

    /// A canvas whose pixels span `region`, which may reach into negative coordinates.
    pub fn covering(region: Rect, background: Color) -> Self {
        Self {
            image: RgbImage::from_pixel(region.width, region.height, background.into()),
            background,
            origin_x: region.x,
            origin_y: region.y,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: i64, y: i64) -> Option<Color> {
        let (x, y) = self.clip_point(x, y)?;
        Some((*self.image.get_pixel(x, y)).into())
    }

    pub fn put_pixel(&mut self, x: i64, y: i64, color: Color) {
        if let Some((x, y)) = self.clip_point(x, y) {
            self.image.put_pixel(x, y, color.into());
        }
    }

    /// Draws `color` over the existing pixel with the given opacity.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Color, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        if let Some((x, y)) = self.clip_point(x, y) {
            let existing: Color = (*self.image.get_pixel(x, y)).into();
            self.image
                .put_pixel(x, y, color.blend_over(existing, alpha).into());
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some((x0, y0, x1, y1)) = self.clip_rect(rect) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                self.image.put_pixel(x, y, color.into());
            }
        }
    }

    /// Draws a vertical dashed line of the given thickness, starting with a dash at `y0`.
    #[allow(clippy::too_many_arguments)]
    pub fn dashed_vline(
        &mut self,
        x: i64,
        y0: i64,
        y1: i64,
        thickness: u32,
        dash: u32,
        gap: u32,
        color: Color,
        alpha: f32,
    ) {
        let period = i64::from(dash.max(1) + gap);
        let left = x - i64::from(thickness) / 2;
        for y in y0..y1 {
            if (y - y0) % period >= i64::from(dash.max(1)) {
                continue;
            }
            for dx in 0..i64::from(thickness.max(1)) {
                self.blend_pixel(left + dx, y, color, alpha);
            }
        }
    }

    /// Bounding box of every pixel that differs from the background, if any.
    pub fn content_bounds(&self) -> Option<Rect> {
        let background: image::Rgb<u8> = self.background.into();
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (x, y, pixel) in self.image.enumerate_pixels() {
            if *pixel == background {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
        bounds.map(|(x0, y0, x1, y1)| {
            Rect::new(
                self.origin_x + i64::from(x0),
                self.origin_y + i64::from(y0),
                x1 - x0 + 1,
                y1 - y0 + 1,
            )
        })
    }

    /// Crops to the drawn content plus `pad` pixels of background on each side.
    ///
    /// The padding may extend past the original canvas; the extra area is
    /// filled with the background color. A blank canvas is returned unchanged.
    pub fn into_tight_image(self, pad: u32) -> RgbImage {
        let Some(bounds) = self.content_bounds() else {
            return self.image;
        };
        let origin_x = bounds.x - i64::from(pad);
        let origin_y = bounds.y - i64::from(pad);
        let width = bounds.width + 2 * pad;
        let height = bounds.height + 2 * pad;
        let background = self.background.into();

        ImageBuffer::from_fn(width, height, |x, y| {
            let src_x = origin_x + i64::from(x);
            let src_y = origin_y + i64::from(y);
            match self.clip_point(src_x, src_y) {
                Some((sx, sy)) => *self.image.get_pixel(sx, sy),
                None => background,
            }
        })
    }

    fn clip_point(&self, x: i64, y: i64) -> Option<(u32, u32)> {
        let x = u32::try_from(x - self.origin_x).ok()?;
        let y = u32::try_from(y - self.origin_y).ok()?;
        (x < self.width() && y < self.height()).then_some((x, y))
    }

    fn clip_rect(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let x0 = (rect.x - self.origin_x).max(0);
        let y0 = (rect.y - self.origin_y).max(0);
        let x1 = (rect.right() - self.origin_x).min(i64::from(self.width()));
        let y1 = (rect.bottom() - self.origin_y).min(i64::from(self.height()));
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}
