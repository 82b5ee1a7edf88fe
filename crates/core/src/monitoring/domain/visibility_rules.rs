//! Facial-visibility rules over keypoint confidence scores.
//!
//! Three independent, non-exclusive rules: any subset may fire on the same
//! pose. Bilateral rules (eyes, ears) require BOTH members of the pair to
//! fall below the threshold, so a profile view with one visible eye raises
//! no eye alert.

use crate::estimation::domain::pose::{KeypointName, Pose};
use crate::shared::constants::DEFAULT_RULE_THRESHOLD;

/// A violated visibility rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alert {
    FaceNotVisible,
    EyesNotVisible,
    LookingAway,
}

impl Alert {
    pub fn message(self) -> &'static str {
        match self {
            Alert::FaceNotVisible => "face not visible",
            Alert::EyesNotVisible => "eyes not visible",
            Alert::LookingAway => "possibly looking away",
        }
    }
}

/// Rule set with a configurable confidence threshold.
///
/// A keypoint counts as visible at or above the threshold; the comparison
/// is strict `<` on the violation side.
#[derive(Clone, Copy, Debug)]
pub struct VisibilityRules {
    threshold: f32,
}

impl Default for VisibilityRules {
    fn default() -> Self {
        Self::new(DEFAULT_RULE_THRESHOLD)
    }
}

impl VisibilityRules {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Evaluate all rules against one pose. Missing keypoints score 0 and
    /// therefore count as not visible.
    pub fn evaluate(&self, pose: &Pose) -> Vec<Alert> {
        let below = |name: KeypointName| pose.score_of(name) < self.threshold;

        let mut alerts = Vec::new();
        if below(KeypointName::Nose) {
            alerts.push(Alert::FaceNotVisible);
        }
        if below(KeypointName::LeftEye) && below(KeypointName::RightEye) {
            alerts.push(Alert::EyesNotVisible);
        }
        if below(KeypointName::LeftEar) && below(KeypointName::RightEar) {
            alerts.push(Alert::LookingAway);
        }
        alerts
    }
}
