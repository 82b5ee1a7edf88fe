//! MoveNet MultiPose estimator using ONNX Runtime via `ort`.
//!
//! Handles letterbox preprocessing, inference, and mapping of normalized
//! model coordinates back to frame pixels. One model is loaded at startup;
//! there is no runtime model switching.

use std::path::Path;

use crate::estimation::domain::pose::{Keypoint, KeypointName, Pose};
use crate::estimation::domain::pose_estimator::PoseEstimator;
use crate::shared::frame::Frame;

use super::execution_provider::preferred_execution_providers;

/// Fallback model input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 256;

/// Default whole-pose confidence below which a detection is discarded.
pub const DEFAULT_POSE_CONFIDENCE: f32 = 0.25;

/// Values per detection row: 17 keypoints x (y, x, score) + box + pose score.
const VALUES_PER_POSE: usize = KeypointName::COUNT * 3 + 5;

/// Pose estimator backed by an ONNX Runtime session.
pub struct OnnxMovenetEstimator {
    session: ort::session::Session,
    pose_confidence: f32,
    input_size: u32,
}

impl OnnxMovenetEstimator {
    /// Load a MoveNet ONNX model and prepare for inference.
    ///
    /// The input resolution is read from the model's input shape (expecting
    /// NHWC). Falls back to 256 if the shape is dynamic or unreadable.
    pub fn new(
        model_path: &Path,
        pose_confidence: f32,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;

        // Try to read input size from model metadata (NHWC: [1, H, W, 3])
        let input_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    if shape.len() >= 4 && shape[1] > 0 {
                        Some(shape[1] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        Ok(Self {
            session,
            pose_confidence,
            input_size,
        })
    }
}

impl PoseEstimator for OnnxMovenetEstimator {
    fn estimate(&mut self, frame: &Frame) -> Result<Vec<Pose>, Box<dyn std::error::Error>> {
        // 1. Preprocess: letterbox into the model's square int32 NHWC input
        let (input_tensor, scale, pad_x, pad_y) = letterbox(frame, self.input_size);

        // 2. Inference
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape();

        // Output shape is [1, num_detections, 56]
        if shape.len() != 3 || shape[2] != VALUES_PER_POSE {
            return Err(format!("Unexpected MoveNet output shape: {shape:?}").into());
        }
        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;

        // 3. Parse detection rows into pixel-space poses
        Ok(parse_poses(
            data,
            self.input_size,
            scale,
            pad_x,
            pad_y,
            self.pose_confidence,
        ))
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Letterbox-resize a frame to `target_size` x `target_size`.
///
/// MoveNet takes raw 0..255 int32 NHWC input; padding is black. Returns
/// `(tensor, scale, pad_x, pad_y)` so keypoints can be mapped back.
fn letterbox(frame: &Frame, target_size: u32) -> (ndarray::Array4<i32>, f64, u32, u32) {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = (fw * scale).round() as u32;
    let new_h = (fh * scale).round() as u32;
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let mut tensor =
        ndarray::Array4::<i32>::zeros((1, target_size as usize, target_size as usize, 3));

    let src = frame.as_ndarray(); // [H, W, C] u8
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;

    // Nearest-neighbor resize + copy into padded region
    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, ty, tx, c]] = src[[src_y, src_x, c]] as i32;
            }
        }
    }

    (tensor, scale, pad_x, pad_y)
}

// ---------------------------------------------------------------------------
// Postprocessing
// ---------------------------------------------------------------------------

/// Parse flattened `[1, N, 56]` MoveNet output rows into poses.
///
/// Row layout: 17 x (y, x, score) normalized to the letterboxed square,
/// then [ymin, xmin, ymax, xmax, pose_score]. Detections below
/// `min_pose_score` are dropped; survivors are ordered best-first.
fn parse_poses(
    data: &[f32],
    input_size: u32,
    scale: f64,
    pad_x: u32,
    pad_y: u32,
    min_pose_score: f32,
) -> Vec<Pose> {
    let mut poses = Vec::new();

    for row in data.chunks_exact(VALUES_PER_POSE) {
        let pose_score = row[VALUES_PER_POSE - 1];
        if pose_score < min_pose_score {
            continue;
        }

        let mut keypoints = Vec::with_capacity(KeypointName::COUNT);
        for k in 0..KeypointName::COUNT {
            let name = match KeypointName::from_index(k) {
                Some(name) => name,
                None => break,
            };
            let ny = row[k * 3] as f64;
            let nx = row[k * 3 + 1] as f64;
            let score = row[k * 3 + 2];

            // Normalized square coords -> letterbox pixels -> frame pixels
            let x = (nx * input_size as f64 - pad_x as f64) / scale;
            let y = (ny * input_size as f64 - pad_y as f64) / scale;

            keypoints.push(Keypoint {
                name,
                x: x as f32,
                y: y as f32,
                score,
            });
        }

        poses.push(Pose::new(keypoints, pose_score));
    }

    poses.sort_by(|a, b| {
        b.score()
            .partial_cmp(&a.score())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    poses
}
