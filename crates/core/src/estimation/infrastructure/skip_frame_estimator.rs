use crate::estimation::domain::pose::Pose;
use crate::estimation::domain::pose_estimator::PoseEstimator;
use crate::shared::frame::Frame;

/// Decorator that runs the model every N frames, reusing results in between.
///
/// Visibility rules compare confidence scores, not positions, so reusing
/// the previous poses on skipped frames changes nothing rule-wise and cuts
/// inference cost roughly by the skip factor. Markers lag by at most N-1
/// frames.
pub struct SkipFrameEstimator {
    inner: Box<dyn PoseEstimator>,
    skip_interval: usize,
    frame_count: usize,
    last_poses: Vec<Pose>,
}

impl SkipFrameEstimator {
    pub fn new(inner: Box<dyn PoseEstimator>, skip_interval: usize) -> Result<Self, &'static str> {
        if skip_interval < 1 {
            return Err("skip_interval must be >= 1");
        }
        Ok(Self {
            inner,
            skip_interval,
            frame_count: 0,
            last_poses: Vec::new(),
        })
    }
}

impl PoseEstimator for SkipFrameEstimator {
    fn estimate(&mut self, frame: &Frame) -> Result<Vec<Pose>, Box<dyn std::error::Error>> {
        if self.frame_count % self.skip_interval == 0 {
            self.last_poses = self.inner.estimate(frame)?;
        }
        self.frame_count += 1;
        Ok(self.last_poses.clone())
    }
}
