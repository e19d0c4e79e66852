use super::types::{DetectionResult, LandmarkPoint, LandmarkSnapshot};

/// Convert a detector result into a canonical snapshot
///
/// Only the first detected subject is kept; any further subjects are
/// dropped. The pipeline tracks a single subject per frame.
pub fn normalize(result: &DetectionResult) -> LandmarkSnapshot {
    let Some(first) = result.subjects.first() else {
        return LandmarkSnapshot::new();
    };

    if result.subjects.len() > 1 {
        tracing::trace!(
            "Discarding {} extra subject(s)",
            result.subjects.len() - 1
        );
    }

    first
        .iter()
        .map(|raw| LandmarkPoint::new(raw.x, raw.y, raw.z))
        .collect()
}
