use crate::shared::frame::Frame;
use crate::shared::stream_info::StreamInfo;

/// Produces frames from a camera or a recorded file.
///
/// Implementations handle I/O details (device protocol, codec, container)
/// while the monitor loop works with the abstract `Frame` and `StreamInfo`
/// types. Acquisition failure in `open` is fatal to the caller: there is
/// no retry and no mid-stream reconnect.
pub trait FrameSource: Send {
    /// Acquires the source and returns its properties.
    fn open(&mut self) -> Result<StreamInfo, Box<dyn std::error::Error>>;

    /// Returns an iterator over frames in capture order. Live sources
    /// block on the next frame; finite sources end.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases any resources held by the source.
    fn close(&mut self);
}
