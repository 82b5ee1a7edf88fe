use crate::estimation::domain::pose::Pose;
use crate::shared::frame::Frame;

/// Domain interface for pose estimation.
///
/// The model is a black box to the rest of the system: one frame in, zero
/// or more scored poses out, ordered best-first. Implementations may be
/// stateful (e.g., frame skipping), hence `&mut self`.
pub trait PoseEstimator: Send {
    fn estimate(&mut self, frame: &Frame) -> Result<Vec<Pose>, Box<dyn std::error::Error>>;
}
