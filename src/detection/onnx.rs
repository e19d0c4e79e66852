use super::preprocess::{Preprocessor, TensorLayout};
use super::types::{DetectionResult, LandmarkDetector, RawLandmark};
use crate::error::LandmarkError;
use anyhow::{Context, Result};
use image::RgbImage;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::TensorRef;
use std::path::Path;

/// Subjects whose presence score falls below this are not reported
const PRESENCE_THRESHOLD: f32 = 0.5;

/// How a model reports a score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreKind {
    Probability,
    Logit,
}

impl ScoreKind {
    fn to_probability(self, raw: f32) -> f32 {
        match self {
            ScoreKind::Probability => raw,
            ScoreKind::Logit => sigmoid(raw),
        }
    }
}

/// Secondary model output carrying a whole-subject presence score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceOutput {
    pub index: usize,
    pub kind: ScoreKind,
}

/// Tensor contract of a single-subject landmark model
///
/// Output 0 holds `point_count * stride` values (the model may append extra
/// auxiliary points, which are ignored). Each point starts with x, y, z in
/// input-pixel units; a stride of 5 adds visibility and presence logits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkModelSpec {
    pub input_size: u32,
    pub layout: TensorLayout,
    pub point_count: usize,
    pub stride: usize,
    pub presence: Option<PresenceOutput>,
}

/// Landmark detector backed by an ONNX Runtime session
pub struct OnnxLandmarkDetector {
    session: Session,
    preprocessor: Preprocessor,
    spec: LandmarkModelSpec,
}

impl OnnxLandmarkDetector {
    /// Load a landmark model from an ONNX file
    pub fn new<P: AsRef<Path>>(model_path: P, spec: LandmarkModelSpec) -> Result<Self> {
        let path = model_path.as_ref();

        tracing::info!("Loading landmark model from {}", path.display());

        let session = Self::build_session(path).map_err(|source| {
            LandmarkError::DetectorUnavailable {
                path: path.to_path_buf(),
                source,
            }
        })?;

        tracing::info!(
            "Landmark model loaded: {} points, {}x{} input",
            spec.point_count,
            spec.input_size,
            spec.input_size
        );

        Ok(Self {
            session,
            preprocessor: Preprocessor::new(spec.input_size, spec.input_size, spec.layout),
            spec,
        })
    }

    fn build_session(path: &Path) -> Result<Session> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;
        Ok(session)
    }
}

impl LandmarkDetector for OnnxLandmarkDetector {
    fn detect(&mut self, frame: &RgbImage) -> Result<DetectionResult> {
        let _span = tracing::debug_span!("onnx_detect").entered();

        let input_tensor = self.preprocessor.preprocess(frame)?;

        let _infer_span = tracing::debug_span!("inference").entered();
        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input_tensor.view())?])
            .context("Failed to run inference")?;
        drop(_infer_span);

        let presence = match self.spec.presence {
            Some(output) => {
                if output.index >= outputs.len() {
                    return Err(LandmarkError::MalformedOutput(format!(
                        "presence output {} missing, model has {} outputs",
                        output.index,
                        outputs.len()
                    ))
                    .into());
                }
                let (_, scores) = outputs[output.index].try_extract_tensor::<f32>()?;
                let raw = scores.first().copied().ok_or_else(|| {
                    LandmarkError::MalformedOutput("empty presence output".into())
                })?;
                Some(output.kind.to_probability(raw))
            }
            None => None,
        };

        let (_, values) = outputs[0].try_extract_tensor::<f32>()?;
        decode_landmarks(values, presence, &self.spec)
    }

    fn point_count(&self) -> usize {
        self.spec.point_count
    }
}

/// Turn a flat landmark tensor into a detection result
///
/// Coordinates are divided by the model input size so they land in the
/// frame's normalized space, since the whole frame was resized to the input.
pub fn decode_landmarks(
    values: &[f32],
    presence: Option<f32>,
    spec: &LandmarkModelSpec,
) -> Result<DetectionResult> {
    if spec.stride < 3 {
        return Err(LandmarkError::MalformedOutput(format!(
            "stride {} cannot hold x, y, z",
            spec.stride
        ))
        .into());
    }

    let needed = spec.point_count * spec.stride;
    if values.len() < needed {
        return Err(LandmarkError::MalformedOutput(format!(
            "expected at least {} values, got {}",
            needed,
            values.len()
        ))
        .into());
    }

    if let Some(score) = presence {
        if score < PRESENCE_THRESHOLD {
            tracing::debug!("No subject (presence {:.2})", score);
            return Ok(DetectionResult::empty());
        }
    }

    let scale = spec.input_size as f32;
    let points = values[..needed]
        .chunks_exact(spec.stride)
        .map(|chunk| RawLandmark {
            x: chunk[0] / scale,
            y: chunk[1] / scale,
            z: chunk[2] / scale,
            visibility: chunk.get(3).copied().map(sigmoid),
            presence: chunk.get(4).copied().map(sigmoid),
        })
        .collect();

    Ok(DetectionResult {
        subjects: vec![points],
    })
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
