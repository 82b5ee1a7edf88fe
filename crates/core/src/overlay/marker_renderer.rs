use crate::estimation::domain::pose::Pose;
use crate::shared::constants::DEFAULT_MARKER_THRESHOLD;
use crate::shared::frame::Frame;

pub const DEFAULT_MARKER_RADIUS: i32 = 5;
pub const DEFAULT_MARKER_COLOR: [u8; 3] = [0, 0, 255];

/// Draws filled disc markers on confident keypoints.
///
/// Every keypoint of the pose is eligible regardless of name; only the
/// score gates drawing, with a strict `>` comparison. Discs are clipped at
/// frame edges.
#[derive(Clone, Copy, Debug)]
pub struct MarkerRenderer {
    radius: i32,
    color: [u8; 3],
    min_score: f32,
}

impl Default for MarkerRenderer {
    fn default() -> Self {
        Self::new(
            DEFAULT_MARKER_RADIUS,
            DEFAULT_MARKER_COLOR,
            DEFAULT_MARKER_THRESHOLD,
        )
    }
}

impl MarkerRenderer {
    pub fn new(radius: i32, color: [u8; 3], min_score: f32) -> Self {
        Self {
            radius,
            color,
            min_score,
        }
    }

    pub fn draw(&self, frame: &mut Frame, pose: &Pose) {
        for kp in pose.keypoints() {
            if kp.score > self.min_score {
                self.fill_disc(frame, kp.x.round() as i32, kp.y.round() as i32);
            }
        }
    }

    fn fill_disc(&self, frame: &mut Frame, cx: i32, cy: i32) {
        let r = self.radius;
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy > r * r {
                    continue;
                }
                let x = cx + dx;
                let y = cy + dy;
                if x < 0 || y < 0 {
                    continue;
                }
                // put_pixel clips the right/bottom edges
                frame.put_pixel(x as u32, y as u32, self.color);
            }
        }
    }
}
