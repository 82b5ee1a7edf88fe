/// Properties of an opened frame source.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    /// Frames per second reported by the source; 0.0 when unknown.
    pub fps: f64,
    /// Total frame count for finite sources; 0 for live cameras.
    pub total_frames: usize,
    /// Human-readable source description ("/dev/video0", file path, ...).
    pub source: String,
}

impl StreamInfo {
    /// Live sources deliver frames at their own pace and have no known end.
    pub fn is_live(&self) -> bool {
        self.total_frames == 0
    }
}
