mod normalize;
mod onnx;
mod preprocess;
pub mod types;

pub use normalize::normalize;
pub use onnx::{decode_landmarks, LandmarkModelSpec, OnnxLandmarkDetector, PresenceOutput, ScoreKind};
pub use preprocess::{Preprocessor, TensorLayout};
pub use types::{DetectionResult, LandmarkDetector, LandmarkPoint, LandmarkSnapshot, RawLandmark};
