//! Real-time landmark annotation: detect body or face landmarks on each
//! frame, draw them with an elapsed-time stamp, and hand the frame to a
//! display, a virtual camera, or back to a streaming caller.

pub mod annotate;
pub mod capture;
pub mod clock;
pub mod config;
pub mod detection;
pub mod error;
pub mod history;
pub mod output;
pub mod pipeline;
pub mod variant;

pub use config::LandmarkerConfig;
pub use error::LandmarkError;
pub use pipeline::{Landmarker, RunSummary, StopReason};
