use std::path::PathBuf;
use thiserror::Error;

/// Domain failures raised by the landmark pipeline
#[derive(Debug, Error)]
pub enum LandmarkError {
    /// The detector model could not be loaded
    #[error("landmark detector unavailable at {path}")]
    DetectorUnavailable {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// A connection set references a point outside the variant's schema
    #[error("connection ({start}, {end}) is outside the {schema_len}-point schema")]
    ConnectionOutOfSchema {
        start: usize,
        end: usize,
        schema_len: usize,
    },

    /// The model produced an output the detector cannot interpret
    #[error("malformed detector output: {0}")]
    MalformedOutput(String),

    /// A frame with no pixels reached the pipeline
    #[error("frame has zero width or height")]
    EmptyFrame,
}
