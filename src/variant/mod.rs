mod face;
mod pose;

pub use face::FaceVariant;
pub use pose::PoseVariant;

use crate::annotate::Overlay;
use crate::detection::{LandmarkDetector, LandmarkModelSpec, OnnxLandmarkDetector};
use anyhow::Result;
use std::path::Path;

/// A detector variant: fixed point schema, connection topology and styling
pub trait LandmarkVariant {
    fn name(&self) -> &'static str;

    /// Number of points in this variant's schema
    fn point_count(&self) -> usize;

    /// Overlay layers in drawing order
    fn overlays(&self) -> Vec<Overlay>;

    /// Tensor contract of this variant's landmark model
    fn model_spec(&self) -> LandmarkModelSpec;

    /// Load the detector for this variant from a model file
    fn load_detector(&self, model_path: &Path) -> Result<Box<dyn LandmarkDetector>> {
        let detector = OnnxLandmarkDetector::new(model_path, self.model_spec())?;
        Ok(Box::new(detector))
    }
}

/// Variant selection exposed on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum VariantKind {
    Pose,
    Face,
}

impl VariantKind {
    pub fn variant(self) -> Box<dyn LandmarkVariant> {
        match self {
            VariantKind::Pose => Box::new(PoseVariant),
            VariantKind::Face => Box::new(FaceVariant),
        }
    }
}
