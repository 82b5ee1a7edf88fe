use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use facewatch_core::capture::domain::frame_source::FrameSource;
use facewatch_core::capture::infrastructure::ffmpeg_source::FfmpegSource;
use facewatch_core::estimation::domain::pose_estimator::PoseEstimator;
use facewatch_core::estimation::infrastructure::model_resolver;
use facewatch_core::estimation::infrastructure::onnx_movenet_estimator::OnnxMovenetEstimator;
use facewatch_core::estimation::infrastructure::skip_frame_estimator::SkipFrameEstimator;
use facewatch_core::monitoring::domain::visibility_rules::VisibilityRules;
use facewatch_core::overlay::marker_renderer::{
    MarkerRenderer, DEFAULT_MARKER_COLOR, DEFAULT_MARKER_RADIUS,
};
use facewatch_core::pipeline::frame_sink::FrameSink;
use facewatch_core::pipeline::monitor::{Monitor, MonitorConfig};
use facewatch_core::pipeline::monitor_logger::NullMonitorLogger;
use facewatch_core::shared::constants::{
    DEFAULT_CAPTURE_FPS, MOVENET_MODEL_NAME, MOVENET_MODEL_URL,
};
use facewatch_core::shared::frame::Frame;

/// One annotated frame ready for display, with the alerts that were
/// active when it was produced.
#[derive(Debug, Clone)]
pub struct FrameUpdate {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub alerts: Vec<String>,
}

/// Messages sent from the worker thread to the UI.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    DownloadProgress(u64, u64),
    Frame(FrameUpdate),
    Error(String),
    Stopped,
}

/// Parameters for a monitoring session.
pub struct MonitorParams {
    pub camera: String,
    /// Replay a recorded video instead of the camera.
    pub input: Option<PathBuf>,
    pub threshold: f32,
    pub marker_threshold: f32,
    pub confidence: f32,
    pub estimate_every: usize,
}

/// Spawn a background monitor worker. Returns the channel receiver and
/// cancellation token.
pub fn spawn(params: MonitorParams) -> (Receiver<WorkerMessage>, Arc<AtomicBool>) {
    let (tx, rx) = crossbeam_channel::unbounded::<WorkerMessage>();
    let cancelled = Arc::new(AtomicBool::new(false));
    let cancelled_clone = cancelled.clone();

    thread::spawn(move || {
        if let Err(e) = run_monitor(&tx, &cancelled_clone, &params) {
            if cancelled_clone.load(Ordering::Relaxed) {
                let _ = tx.send(WorkerMessage::Stopped);
            } else {
                log::error!("Monitor worker failed: {e}");
                let _ = tx.send(WorkerMessage::Error(e.to_string()));
            }
        } else {
            let _ = tx.send(WorkerMessage::Stopped);
        }
    });

    (rx, cancelled)
}

/// Sink that converts each annotated frame to RGBA and forwards it to
/// the UI thread.
struct ChannelSink {
    tx: Sender<WorkerMessage>,
}

impl FrameSink for ChannelSink {
    fn present(
        &mut self,
        frame: &Frame,
        alerts: &[String],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let update = FrameUpdate {
            rgba: frame.to_rgba(),
            width: frame.width(),
            height: frame.height(),
            alerts: alerts.to_vec(),
        };
        self.tx
            .send(WorkerMessage::Frame(update))
            .map_err(|_| "UI channel closed".into())
    }
}

fn run_monitor(
    tx: &Sender<WorkerMessage>,
    cancelled: &Arc<AtomicBool>,
    params: &MonitorParams,
) -> Result<(), Box<dyn std::error::Error>> {
    let tx_dl = tx.clone();
    let model_path = model_resolver::resolve(
        MOVENET_MODEL_NAME,
        MOVENET_MODEL_URL,
        None,
        Some(Box::new(move |dl, total| {
            let _ = tx_dl.send(WorkerMessage::DownloadProgress(dl, total));
        })),
    )?;

    if cancelled.load(Ordering::Relaxed) {
        return Ok(());
    }
    log::info!("Pose model ready at {}", model_path.display());

    let base: Box<dyn PoseEstimator> =
        Box::new(OnnxMovenetEstimator::new(&model_path, params.confidence)?);
    let mut estimator: Box<dyn PoseEstimator> = if params.estimate_every > 1 {
        Box::new(SkipFrameEstimator::new(base, params.estimate_every)?)
    } else {
        base
    };

    let mut source: Box<dyn FrameSource> = match &params.input {
        Some(path) => Box::new(FfmpegSource::file(path)),
        None => Box::new(FfmpegSource::camera(&params.camera, DEFAULT_CAPTURE_FPS)),
    };
    let mut sink = ChannelSink { tx: tx.clone() };

    let monitor = Monitor::new(
        VisibilityRules::new(params.threshold),
        MarkerRenderer::new(
            DEFAULT_MARKER_RADIUS,
            DEFAULT_MARKER_COLOR,
            params.marker_threshold,
        ),
    );
    let config = MonitorConfig {
        max_frames: None,
        pace_playback: true,
        cancelled: cancelled.clone(),
    };

    let mut logger = NullMonitorLogger;
    monitor.run(
        source.as_mut(),
        estimator.as_mut(),
        &mut sink,
        &mut logger,
        &config,
    )?;
    Ok(())
}
