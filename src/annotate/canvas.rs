use super::glyphs::layout_text;
use super::DrawingSpec;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use imageproc::pixelops::interpolate;

/// Parameters for on-frame text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Rgb<u8>,
    pub scale: f32,
    pub thickness: u32,
    pub antialiased: bool,
}

/// Drawing surface the annotator renders onto
///
/// Coordinates are pixels; implementations clip anything outside the surface.
pub trait Canvas {
    /// (width, height) in pixels
    fn dimensions(&self) -> (u32, u32);

    fn draw_line(&mut self, start: (i32, i32), end: (i32, i32), spec: &DrawingSpec);

    fn draw_point(&mut self, center: (i32, i32), spec: &DrawingSpec);

    /// Draw `text` with `origin` at the bottom-left of the first glyph
    fn draw_text(&mut self, text: &str, origin: (i32, i32), style: &TextStyle);
}

impl Canvas for RgbImage {
    fn dimensions(&self) -> (u32, u32) {
        RgbImage::dimensions(self)
    }

    /// Connections are drawn with hard edges
    fn draw_line(&mut self, start: (i32, i32), end: (i32, i32), spec: &DrawingSpec) {
        stroke(self, start, end, spec.color, spec.thickness, false);
    }

    fn draw_point(&mut self, center: (i32, i32), spec: &DrawingSpec) {
        draw_filled_circle_mut(self, center, spec.circle_radius.max(1) as i32, spec.color);
    }

    fn draw_text(&mut self, text: &str, origin: (i32, i32), style: &TextStyle) {
        for (start, end) in layout_text(text, origin, style.scale) {
            stroke(self, start, end, style.color, style.thickness, style.antialiased);
        }
    }
}

/// Draw a segment exactly `thickness` pixels wide with round caps
///
/// A pixel is covered when its distance to the segment is at most half the
/// thickness. Even widths have no centre row, so the segment is moved half a
/// pixel up-left to cover `thickness` rows rather than `thickness + 1`.
/// Anti-aliased strokes blend a one-pixel fringe by coverage.
fn stroke(
    image: &mut RgbImage,
    start: (i32, i32),
    end: (i32, i32),
    color: Rgb<u8>,
    thickness: u32,
    antialiased: bool,
) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    let thickness = thickness.max(1);
    let half = thickness as f32 / 2.0;
    let shift = if thickness % 2 == 0 { 0.5 } else { 0.0 };
    let (ax, ay) = (start.0 as f32 - shift, start.1 as f32 - shift);
    let (bx, by) = (end.0 as f32 - shift, end.1 as f32 - shift);
    let (dx, dy) = (bx - ax, by - ay);
    let len_sq = dx * dx + dy * dy;

    let reach = half + 1.0;
    let clip = |v: f32, max: u32| v.clamp(0.0, (max - 1) as f32) as u32;
    let x_range = clip(ax.min(bx) - reach, width)..=clip(ax.max(bx) + reach, width);
    let y_range = clip(ay.min(by) - reach, height)..=clip(ay.max(by) + reach, height);

    for y in y_range {
        for x in x_range.clone() {
            let (px, py) = (x as f32 - ax, y as f32 - ay);
            let t = if len_sq > 0.0 {
                ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let (ex, ey) = (px - t * dx, py - t * dy);
            let dist = (ex * ex + ey * ey).sqrt();

            let coverage = if antialiased {
                (half + 0.5 - dist).clamp(0.0, 1.0)
            } else if dist <= half {
                1.0
            } else {
                0.0
            };

            if coverage >= 1.0 {
                image.put_pixel(x, y, color);
            } else if coverage > 0.0 {
                let blended = interpolate(color, *image.get_pixel(x, y), coverage);
                image.put_pixel(x, y, blended);
            }
        }
    }
}
