use crate::shared::eye_state::EyeState;

/// Memoryless per-frame classification from detection counts.
///
/// Eyes are pooled across all faces; only face presence matters. A single
/// visible eye is enough for OPEN so that an occluded eye does not read as
/// closed.
pub fn classify(face_count: usize, eye_count: usize) -> EyeState {
    match (face_count, eye_count) {
        (0, _) => EyeState::NoFace,
        (_, 0) => EyeState::Closed,
        _ => EyeState::Open,
    }
}
