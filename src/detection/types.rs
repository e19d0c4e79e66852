use anyhow::Result;
use image::RgbImage;

/// A single detected landmark, normalized to the frame
///
/// `x` and `y` are in [0, 1] relative to frame width and height when the
/// point lies inside the frame. `z` is a relative depth with no fixed unit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl LandmarkPoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Map to pixel coordinates, or `None` when the point falls outside the frame
    pub fn to_pixel(&self, width: u32, height: u32) -> Option<(i32, i32)> {
        if !(0.0..=1.0).contains(&self.x) || !(0.0..=1.0).contains(&self.y) {
            return None;
        }
        let px = (self.x * width as f32).floor().min(width.saturating_sub(1) as f32);
        let py = (self.y * height as f32).floor().min(height.saturating_sub(1) as f32);
        Some((px as i32, py as i32))
    }
}

/// Ordered landmark points for one subject, index-aligned to the variant schema
pub type LandmarkSnapshot = Vec<LandmarkPoint>;

/// A landmark as reported by a detector, before normalization
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawLandmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub visibility: Option<f32>,
    pub presence: Option<f32>,
}

/// Per-frame detector output: zero or more subjects, each a full point list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionResult {
    pub subjects: Vec<Vec<RawLandmark>>,
}

impl DetectionResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

/// Trait for landmark detectors
/// Allows swapping between different backends (ONNX Runtime, scripted fakes, ...)
pub trait LandmarkDetector {
    /// Run detection on a frame
    ///
    /// The frame is never modified. Finding no subject is a normal outcome
    /// and yields an empty result.
    fn detect(&mut self, frame: &RgbImage) -> Result<DetectionResult>;

    /// Number of points in the schema this detector produces
    fn point_count(&self) -> usize;
}
