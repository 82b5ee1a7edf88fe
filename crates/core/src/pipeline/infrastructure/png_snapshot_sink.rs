use std::path::{Path, PathBuf};

use crate::pipeline::frame_sink::FrameSink;
use crate::shared::frame::Frame;

/// Saves every Nth annotated frame as a PNG using the `image` crate.
///
/// Gives the headless CLI a way to inspect what the monitor saw without
/// a GUI. Files are named after the frame index (`frame_000042.png`).
pub struct PngSnapshotSink {
    dir: PathBuf,
    every: usize,
    saved: usize,
}

impl PngSnapshotSink {
    pub fn new(dir: &Path, every: usize) -> Self {
        Self {
            dir: dir.to_path_buf(),
            every: every.max(1),
            saved: 0,
        }
    }

    pub fn saved(&self) -> usize {
        self.saved
    }
}

impl FrameSink for PngSnapshotSink {
    fn present(
        &mut self,
        frame: &Frame,
        _alerts: &[String],
    ) -> Result<(), Box<dyn std::error::Error>> {
        if frame.index() % self.every != 0 {
            return Ok(());
        }

        std::fs::create_dir_all(&self.dir)?;

        let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or("Failed to create image from frame data")?;

        let path = self.dir.join(format!("frame_{:06}.png", frame.index()));
        img.save(&path)?;
        self.saved += 1;
        Ok(())
    }
}
