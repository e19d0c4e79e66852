mod loopback;
mod window;

pub use loopback::V4L2Output;
pub use window::WindowOutput;

use anyhow::Result;
use image::RgbImage;

/// Trait for output destinations of the blocking loop
pub trait OutputSink {
    /// Write a frame to the output
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()>;

    /// Polled once per frame; `true` ends the run
    fn stop_requested(&mut self) -> bool {
        false
    }

    /// Tear down the output; called once when a run ends
    fn close(&mut self) {}
}
