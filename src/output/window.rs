use super::OutputSink;
use anyhow::{anyhow, Context, Result};
use image::RgbImage;
use minifb::{Key, Window, WindowOptions};

/// Keys that end a blocking run
const CANCEL_KEYS: [Key; 2] = [Key::Escape, Key::Q];

/// Local preview window
pub struct WindowOutput {
    window: Option<Window>,
    buffer: Vec<u32>,
}

impl WindowOutput {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self> {
        tracing::info!("Opening preview window ({}x{})", width, height);

        let mut window = Window::new(
            title,
            width as usize,
            height as usize,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| anyhow!("Failed to create window: {}", e))?;

        // Key polling happens on update; keep it from spinning faster than ~60 Hz.
        window.set_target_fps(60);

        Ok(Self {
            window: Some(window),
            buffer: Vec::with_capacity((width * height) as usize),
        })
    }
}

/// Pack RGB pixels as 0RGB words for the window buffer
pub(crate) fn pack_rgb(frame: &RgbImage, buffer: &mut Vec<u32>) {
    buffer.clear();
    buffer.extend(
        frame
            .pixels()
            .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32),
    );
}

impl OutputSink for WindowOutput {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        let window = self.window.as_mut().context("Preview window already closed")?;

        pack_rgb(frame, &mut self.buffer);
        let (width, height) = frame.dimensions();
        window
            .update_with_buffer(&self.buffer, width as usize, height as usize)
            .map_err(|e| anyhow!("Window update failed: {}", e))?;

        Ok(())
    }

    fn stop_requested(&mut self) -> bool {
        match &self.window {
            Some(window) => {
                !window.is_open() || CANCEL_KEYS.iter().any(|key| window.is_key_down(*key))
            }
            None => true,
        }
    }

    fn close(&mut self) {
        if self.window.take().is_some() {
            tracing::info!("Preview window closed");
        }
    }
}
