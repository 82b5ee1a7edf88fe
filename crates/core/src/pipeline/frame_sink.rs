use crate::shared::frame::Frame;

/// Receives each annotated frame together with the alert messages that
/// were active when it was produced.
///
/// This is a port (application-layer interface). Infrastructure provides
/// concrete implementations (GUI channel, PNG snapshots, discard).
pub trait FrameSink: Send {
    fn present(&mut self, frame: &Frame, alerts: &[String]) -> Result<(), Box<dyn std::error::Error>>;
}

/// Sink that discards every frame.
///
/// Used by the headless CLI when no snapshot directory is configured,
/// and by tests that only care about alert output.
pub struct NullFrameSink;

impl FrameSink for NullFrameSink {
    fn present(
        &mut self,
        _frame: &Frame,
        _alerts: &[String],
    ) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}
