mod sequence;
mod v4l_capture;

pub use sequence::ImageSequence;
pub use v4l_capture::WebcamCapture;

use anyhow::Result;
use image::RgbImage;

/// Trait for pull-based frame sources
pub trait FrameSource {
    /// Fetch the next frame, or `None` once the source is exhausted
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;

    /// Get the resolution of produced frames
    fn resolution(&self) -> (u32, u32);

    /// Give the underlying device back; called once when a run ends
    fn release(&mut self) {}
}
