/// Runtime options for a [`crate::pipeline::Landmarker`]
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkerConfig {
    /// Append a history entry for every processed frame, in either mode
    pub record_history: bool,

    /// Upper bound on the blocking loop's frame rate; `None` runs flat out
    pub max_fps: Option<u32>,

    /// Log averaged stage timings every this many frames; 0 disables
    pub stats_interval: u64,
}

impl Default for LandmarkerConfig {
    fn default() -> Self {
        Self {
            record_history: true,
            max_fps: None,
            stats_interval: 30,
        }
    }
}
