use super::LandmarkVariant;
use crate::annotate::{DrawingSpec, DrawingStyle, Overlay};
use crate::detection::{LandmarkModelSpec, PresenceOutput, ScoreKind, TensorLayout};

/// Body pose schema size
pub const POSE_POINT_COUNT: usize = 33;

/// Skeleton edges of the 33-point body pose schema
pub const POSE_CONNECTIONS: &[(usize, usize)] = &[
    // face
    (0, 1), (1, 2), (2, 3), (3, 7), (0, 4), (4, 5), (5, 6), (6, 8), (9, 10),
    // arms and hands
    (11, 12), (11, 13), (13, 15), (15, 17), (15, 19), (15, 21), (17, 19),
    (12, 14), (14, 16), (16, 18), (16, 20), (16, 22), (18, 20),
    // torso
    (11, 23), (12, 24), (23, 24),
    // legs and feet
    (23, 25), (24, 26), (25, 27), (26, 28), (27, 29), (28, 30), (29, 31),
    (30, 32), (27, 31), (28, 32),
];

const POSE_STYLE: DrawingStyle = DrawingStyle {
    landmark: Some(DrawingSpec::new([255, 0, 0], 2, 2)),
    connection: DrawingSpec::new([224, 224, 224], 2, 2),
};

/// Full-body pose landmarks
pub struct PoseVariant;

impl LandmarkVariant for PoseVariant {
    fn name(&self) -> &'static str {
        "pose"
    }

    fn point_count(&self) -> usize {
        POSE_POINT_COUNT
    }

    fn overlays(&self) -> Vec<Overlay> {
        vec![Overlay::new("pose", POSE_CONNECTIONS, POSE_STYLE)]
    }

    fn model_spec(&self) -> LandmarkModelSpec {
        // 39 points are emitted (33 + auxiliary), each x, y, z, visibility, presence.
        LandmarkModelSpec {
            input_size: 256,
            layout: TensorLayout::Nhwc,
            point_count: POSE_POINT_COUNT,
            stride: 5,
            presence: Some(PresenceOutput {
                index: 1,
                kind: ScoreKind::Probability,
            }),
        }
    }
}
