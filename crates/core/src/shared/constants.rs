pub const MOVENET_MODEL_NAME: &str = "movenet_multipose_lightning.onnx";
pub const MOVENET_MODEL_URL: &str =
    "https://github.com/facewatch/facewatch/releases/download/v0.1.0/movenet_multipose_lightning.onnx";

/// Minimum keypoint score for a visibility rule to consider a keypoint seen.
pub const DEFAULT_RULE_THRESHOLD: f32 = 0.3;

/// Keypoints scoring strictly above this are drawn as overlay markers.
pub const DEFAULT_MARKER_THRESHOLD: f32 = 0.3;

/// Capture resolution requested from the camera.
pub const CAPTURE_WIDTH: u32 = 640;
pub const CAPTURE_HEIGHT: u32 = 480;

/// Frame rate requested from the camera, and the pacing target when
/// replaying a file whose metadata carries no rate.
pub const DEFAULT_CAPTURE_FPS: u32 = 30;
