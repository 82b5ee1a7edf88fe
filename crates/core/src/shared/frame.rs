use ndarray::ArrayView3;

/// A single camera/video frame: contiguous RGB bytes in row-major order.
///
/// Pixel format conversion happens at the capture boundary only; rule
/// evaluation and overlay drawing treat the buffer as plain RGB24.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Capture-order index, monotonically increasing from 0.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Read one pixel. Returns `None` when `(x, y)` lies outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * self.channels as usize;
        Some([
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ])
    }

    /// Write one pixel. Out-of-bounds coordinates are ignored, which lets
    /// overlay drawing clip at frame edges without bounds arithmetic.
    pub fn put_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * self.channels as usize;
        self.data[offset] = rgb[0];
        self.data[offset + 1] = rgb[1];
        self.data[offset + 2] = rgb[2];
    }

    /// `[H, W, C]` view for inference preprocessing.
    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(
            (
                self.height as usize,
                self.width as usize,
                self.channels as usize,
            ),
            &self.data,
        )
        .expect("Frame data length must match dimensions")
    }

    /// Expand RGB24 to tightly-packed RGBA (alpha 255), as GUI image
    /// handles expect.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.data.len() / 3 * 4);
        for px in self.data.chunks_exact(3) {
            rgba.extend_from_slice(px);
            rgba.push(255);
        }
        rgba
    }
}
