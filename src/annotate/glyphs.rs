//! Stroke font for the on-frame diagnostic text.
//!
//! Glyphs are polylines on a 4x6 cell with y pointing down and the baseline
//! at y = 6. Only the characters a timestamp needs are defined; anything else
//! advances the pen without drawing.

type Stroke = &'static [(f32, f32)];

/// Pixel size of one cell unit at scale 1.0
const UNIT_PX: f32 = 3.5;

/// Horizontal pen advance for a regular glyph, in cell units
const ADVANCE: f32 = 5.5;

/// Horizontal pen advance for narrow punctuation, in cell units
const NARROW_ADVANCE: f32 = 3.0;

fn glyph(c: char) -> &'static [Stroke] {
    match c {
        '0' => &[&[(0.0, 0.0), (4.0, 0.0), (4.0, 6.0), (0.0, 6.0), (0.0, 0.0)], &[(4.0, 0.0), (0.0, 6.0)]],
        '1' => &[&[(1.0, 1.0), (2.0, 0.0), (2.0, 6.0)], &[(1.0, 6.0), (3.0, 6.0)]],
        '2' => &[&[(0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 3.0), (0.0, 6.0), (4.0, 6.0)]],
        '3' => &[&[(0.0, 0.0), (4.0, 0.0), (4.0, 6.0), (0.0, 6.0)], &[(1.0, 3.0), (4.0, 3.0)]],
        '4' => &[&[(0.0, 0.0), (0.0, 3.0), (4.0, 3.0)], &[(4.0, 0.0), (4.0, 6.0)]],
        '5' => &[&[(4.0, 0.0), (0.0, 0.0), (0.0, 3.0), (4.0, 3.0), (4.0, 6.0), (0.0, 6.0)]],
        '6' => &[&[(4.0, 0.0), (0.0, 0.0), (0.0, 6.0), (4.0, 6.0), (4.0, 3.0), (0.0, 3.0)]],
        '7' => &[&[(0.0, 0.0), (4.0, 0.0), (1.0, 6.0)]],
        '8' => &[&[(0.0, 0.0), (4.0, 0.0), (4.0, 6.0), (0.0, 6.0), (0.0, 0.0)], &[(0.0, 3.0), (4.0, 3.0)]],
        '9' => &[&[(4.0, 3.0), (0.0, 3.0), (0.0, 0.0), (4.0, 0.0), (4.0, 6.0), (0.0, 6.0)]],
        '.' => &[&[(1.0, 5.6), (1.0, 6.0)]],
        '-' => &[&[(0.5, 3.0), (3.5, 3.0)]],
        's' => &[&[(4.0, 3.0), (0.0, 3.0), (0.0, 4.5), (4.0, 4.5), (4.0, 6.0), (0.0, 6.0)]],
        _ => &[],
    }
}

fn advance(c: char) -> f32 {
    match c {
        '.' => NARROW_ADVANCE,
        _ => ADVANCE,
    }
}

/// Lay out `text` as pixel line segments
///
/// `origin` is the bottom-left corner of the first glyph, on the baseline.
pub fn layout_text(text: &str, origin: (i32, i32), scale: f32) -> Vec<((i32, i32), (i32, i32))> {
    let unit = UNIT_PX * scale;
    let top = origin.1 as f32 - 6.0 * unit;
    let mut pen_x = origin.0 as f32;
    let mut segments = Vec::new();

    for c in text.chars() {
        for stroke in glyph(c) {
            let to_px = |&(gx, gy): &(f32, f32)| {
                (
                    (pen_x + gx * unit).round() as i32,
                    (top + gy * unit).round() as i32,
                )
            };
            for pair in stroke.windows(2) {
                segments.push((to_px(&pair[0]), to_px(&pair[1])));
            }
        }
        pen_x += advance(c) * unit;
    }

    segments
}
