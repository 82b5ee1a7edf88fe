use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use facewatch_core::capture::domain::frame_source::FrameSource;
use facewatch_core::capture::infrastructure::ffmpeg_source::FfmpegSource;
use facewatch_core::estimation::domain::pose_estimator::PoseEstimator;
use facewatch_core::estimation::infrastructure::model_resolver;
use facewatch_core::estimation::infrastructure::onnx_movenet_estimator::{
    OnnxMovenetEstimator, DEFAULT_POSE_CONFIDENCE,
};
use facewatch_core::estimation::infrastructure::skip_frame_estimator::SkipFrameEstimator;
use facewatch_core::monitoring::domain::visibility_rules::VisibilityRules;
use facewatch_core::overlay::marker_renderer::{
    MarkerRenderer, DEFAULT_MARKER_COLOR, DEFAULT_MARKER_RADIUS,
};
use facewatch_core::pipeline::frame_sink::{FrameSink, NullFrameSink};
use facewatch_core::pipeline::infrastructure::png_snapshot_sink::PngSnapshotSink;
use facewatch_core::pipeline::monitor::{Monitor, MonitorConfig};
use facewatch_core::pipeline::monitor_logger::StdoutMonitorLogger;
use facewatch_core::shared::constants::{
    DEFAULT_CAPTURE_FPS, DEFAULT_MARKER_THRESHOLD, DEFAULT_RULE_THRESHOLD, MOVENET_MODEL_NAME,
    MOVENET_MODEL_URL,
};

/// Webcam proctoring monitor: watches a camera or video for a visible,
/// forward-facing person and raises alerts when the face disappears.
#[derive(Parser)]
#[command(name = "facewatch")]
struct Cli {
    /// Input video file to monitor (omit to use a live camera).
    input: Option<PathBuf>,

    /// Camera device to capture from (e.g. /dev/video0).
    #[arg(long, default_value = "/dev/video0")]
    camera: String,

    /// Capture rate requested from the camera.
    #[arg(long, default_value_t = DEFAULT_CAPTURE_FPS)]
    fps: u32,

    /// Keypoint score below which a visibility rule fires (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_RULE_THRESHOLD)]
    threshold: f32,

    /// Keypoint score above which a marker is drawn (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_MARKER_THRESHOLD)]
    marker_threshold: f32,

    /// Minimum whole-pose confidence for a detection to count (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_POSE_CONFIDENCE)]
    confidence: f32,

    /// Run estimation every Nth frame (1 = every frame).
    #[arg(long, default_value = "1")]
    estimate_every: usize,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<usize>,

    /// Save annotated frames as PNGs to this directory.
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Save every Nth annotated frame (with --snapshot-dir).
    #[arg(long, default_value = "30")]
    snapshot_every: usize,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let mut estimator = build_estimator(&cli)?;
    let mut source: Box<dyn FrameSource> = match &cli.input {
        Some(path) => Box::new(FfmpegSource::file(path)),
        None => Box::new(FfmpegSource::camera(&cli.camera, cli.fps)),
    };
    let mut sink: Box<dyn FrameSink> = match &cli.snapshot_dir {
        Some(dir) => Box::new(PngSnapshotSink::new(dir, cli.snapshot_every)),
        None => Box::new(NullFrameSink),
    };

    // Ctrl-C flips the cancellation flag so the loop finishes its current
    // cycle and shuts down cleanly.
    let cancelled = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&cancelled);
    ctrlc::set_handler(move || handler_flag.store(true, Ordering::Relaxed))?;

    let monitor = Monitor::new(
        VisibilityRules::new(cli.threshold),
        MarkerRenderer::new(DEFAULT_MARKER_RADIUS, DEFAULT_MARKER_COLOR, cli.marker_threshold),
    );
    let config = MonitorConfig {
        max_frames: cli.max_frames,
        pace_playback: true,
        cancelled,
    };

    let mut logger = StdoutMonitorLogger::default();
    let outcome = monitor.run(
        source.as_mut(),
        estimator.as_mut(),
        sink.as_mut(),
        &mut logger,
        &config,
    )?;

    log::info!(
        "Monitored {} frames, final state: {}",
        outcome.frames_processed,
        outcome.final_alerts.join(" | ")
    );
    Ok(())
}

fn build_estimator(cli: &Cli) -> Result<Box<dyn PoseEstimator>, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {MOVENET_MODEL_NAME}");
    let model_path = model_resolver::resolve(
        MOVENET_MODEL_NAME,
        MOVENET_MODEL_URL,
        None,
        Some(Box::new(download_progress)),
    )?;
    eprintln!();

    let base: Box<dyn PoseEstimator> =
        Box::new(OnnxMovenetEstimator::new(&model_path, cli.confidence)?);

    if cli.estimate_every > 1 {
        Ok(Box::new(SkipFrameEstimator::new(base, cli.estimate_every)?))
    } else {
        Ok(base)
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(input) = &cli.input {
        if !input.exists() {
            return Err(format!("Input file not found: {}", input.display()).into());
        }
    }
    if !(0.0..=1.0).contains(&cli.threshold) {
        return Err(format!(
            "Threshold must be between 0.0 and 1.0, got {}",
            cli.threshold
        )
        .into());
    }
    if !(0.0..=1.0).contains(&cli.marker_threshold) {
        return Err(format!(
            "Marker threshold must be between 0.0 and 1.0, got {}",
            cli.marker_threshold
        )
        .into());
    }
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    if cli.estimate_every == 0 {
        return Err("--estimate-every must be at least 1".into());
    }
    if cli.fps == 0 {
        return Err("--fps must be at least 1".into());
    }
    if cli.snapshot_every == 0 {
        return Err("--snapshot-every must be at least 1".into());
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading pose model... {pct}%");
    } else {
        eprint!("\rDownloading pose model... {downloaded} bytes");
    }
}
