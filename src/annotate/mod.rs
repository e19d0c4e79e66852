mod canvas;
pub mod glyphs;

pub use canvas::{Canvas, TextStyle};

use crate::detection::LandmarkPoint;
use crate::error::LandmarkError;
use image::Rgb;
use std::collections::BTreeMap;

/// Where the elapsed-time stamp is drawn (bottom-left of the text)
pub const TIMESTAMP_ORIGIN: (i32, i32) = (10, 60);

/// Fixed style of the elapsed-time stamp
pub const TIMESTAMP_STYLE: TextStyle = TextStyle {
    color: Rgb([0, 0, 0]),
    scale: 2.0,
    thickness: 3,
    antialiased: true,
};

/// Rendering parameters for one kind of mark
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawingSpec {
    pub color: Rgb<u8>,
    pub thickness: u32,
    pub circle_radius: u32,
}

impl DrawingSpec {
    pub const fn new(color: [u8; 3], thickness: u32, circle_radius: u32) -> Self {
        Self {
            color: Rgb(color),
            thickness,
            circle_radius,
        }
    }
}

impl Default for DrawingSpec {
    fn default() -> Self {
        Self::new([224, 224, 224], 2, 2)
    }
}

/// Style for one overlay layer
///
/// Connections are always drawn; landmark points only when `landmark` is set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawingStyle {
    pub landmark: Option<DrawingSpec>,
    pub connection: DrawingSpec,
}

/// One overlay layer: a connection set and the style it is drawn with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlay {
    pub name: &'static str,
    pub connections: &'static [(usize, usize)],
    pub style: DrawingStyle,
}

impl Overlay {
    pub const fn new(
        name: &'static str,
        connections: &'static [(usize, usize)],
        style: DrawingStyle,
    ) -> Self {
        Self {
            name,
            connections,
            style,
        }
    }
}

/// Check that every connection in every layer fits a schema of `schema_len` points
pub fn validate_overlays(overlays: &[Overlay], schema_len: usize) -> Result<(), LandmarkError> {
    for overlay in overlays {
        if let Some(&(start, end)) = overlay
            .connections
            .iter()
            .find(|(start, end)| *start >= schema_len || *end >= schema_len)
        {
            return Err(LandmarkError::ConnectionOutOfSchema {
                start,
                end,
                schema_len,
            });
        }
    }
    Ok(())
}

/// Annotate a frame in place
///
/// The elapsed-time stamp is always drawn. Overlays are skipped entirely for
/// an empty snapshot; otherwise they are drawn in order, so later layers sit
/// on top of earlier ones and of the stamp.
pub fn annotate<C: Canvas + ?Sized>(
    canvas: &mut C,
    snapshot: &[LandmarkPoint],
    overlays: &[Overlay],
    elapsed_secs: f64,
) {
    annotate_time(canvas, elapsed_secs);
    if snapshot.is_empty() {
        return;
    }
    annotate_landmarks(canvas, snapshot, overlays);
}

/// Draw the elapsed time as `<seconds>.<millis>s`
pub fn annotate_time<C: Canvas + ?Sized>(canvas: &mut C, elapsed_secs: f64) {
    canvas.draw_text(
        &format_timestamp(elapsed_secs),
        TIMESTAMP_ORIGIN,
        &TIMESTAMP_STYLE,
    );
}

pub fn format_timestamp(elapsed_secs: f64) -> String {
    format!("{:.3}s", elapsed_secs)
}

/// Draw each overlay layer for the points of `snapshot`
///
/// A point counts as present when its index exists in the snapshot and it
/// lies inside the frame. Connections with a missing endpoint are skipped.
pub fn annotate_landmarks<C: Canvas + ?Sized>(
    canvas: &mut C,
    snapshot: &[LandmarkPoint],
    overlays: &[Overlay],
) {
    let _span = tracing::debug_span!("annotate_landmarks").entered();

    let (width, height) = canvas.dimensions();
    let pixels: BTreeMap<usize, (i32, i32)> = snapshot
        .iter()
        .enumerate()
        .filter_map(|(idx, point)| point.to_pixel(width, height).map(|px| (idx, px)))
        .collect();

    for overlay in overlays {
        for (start, end) in overlay.connections {
            if let (Some(&a), Some(&b)) = (pixels.get(start), pixels.get(end)) {
                canvas.draw_line(a, b, &overlay.style.connection);
            }
        }

        if let Some(spec) = &overlay.style.landmark {
            for &center in pixels.values() {
                canvas.draw_point(center, spec);
            }
        }
    }
}
