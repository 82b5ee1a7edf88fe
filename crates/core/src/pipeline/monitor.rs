use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::capture::domain::frame_source::FrameSource;
use crate::estimation::domain::pose_estimator::PoseEstimator;
use crate::monitoring::domain::alert_board::AlertBoard;
use crate::monitoring::domain::visibility_rules::VisibilityRules;
use crate::overlay::marker_renderer::MarkerRenderer;
use crate::pipeline::frame_sink::FrameSink;
use crate::pipeline::monitor_logger::MonitorLogger;

/// Configuration for a monitoring run.
pub struct MonitorConfig {
    /// Stop after this many frames. `None` runs until the source ends or
    /// the run is cancelled.
    pub max_frames: Option<usize>,
    /// Pace finite sources (recorded video) to their native frame rate.
    /// Live sources already arrive at capture rate and are never paced.
    pub pace_playback: bool,
    pub cancelled: Arc<AtomicBool>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            max_frames: None,
            pace_playback: true,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Result of a completed monitoring run.
#[derive(Debug)]
pub struct MonitorOutcome {
    pub frames_processed: usize,
    pub final_alerts: Vec<String>,
    pub cancelled: bool,
}

/// The monitoring loop: capture, estimate, evaluate, annotate, present.
///
/// Cycles run strictly one at a time. Each cycle takes the next frame,
/// runs pose estimation, evaluates the visibility rules on the best
/// pose, updates the alert board, draws keypoint markers, and hands the
/// annotated frame to the sink. Cycles that detect no pose leave the
/// board untouched and present the frame unannotated.
///
/// An estimator failure ends the run: the error is logged and
/// propagated, and no further frames are read.
pub struct Monitor {
    rules: VisibilityRules,
    renderer: MarkerRenderer,
}

impl Monitor {
    pub fn new(rules: VisibilityRules, renderer: MarkerRenderer) -> Self {
        Self { rules, renderer }
    }

    pub fn run(
        &self,
        source: &mut dyn FrameSource,
        estimator: &mut dyn PoseEstimator,
        sink: &mut dyn FrameSink,
        logger: &mut dyn MonitorLogger,
        config: &MonitorConfig,
    ) -> Result<MonitorOutcome, Box<dyn std::error::Error>> {
        let info = source.open()?;
        logger.info(&format!(
            "Monitoring {} ({}x{} @ {:.1} fps)",
            info.source, info.width, info.height, info.fps
        ));

        let frame_duration = if config.pace_playback && !info.is_live() && info.fps > 0.0 {
            Some(Duration::from_secs_f64(1.0 / info.fps))
        } else {
            None
        };

        let mut board = AlertBoard::new();
        let mut frames_processed = 0usize;
        let mut was_cancelled = false;

        let result = (|| {
            for frame in source.frames() {
                if config.cancelled.load(Ordering::Relaxed) {
                    was_cancelled = true;
                    return Ok(());
                }

                let cycle_start = Instant::now();
                let mut frame = frame?;

                let estimate_start = Instant::now();
                let poses = estimator.estimate(&frame).map_err(|e| {
                    log::error!("Pose estimation failed: {e}");
                    e
                })?;
                logger.timing("estimate", estimate_start.elapsed().as_secs_f64() * 1000.0);

                if let Some(pose) = poses.first() {
                    let alerts = self.rules.evaluate(pose);
                    if board.publish(&alerts) {
                        logger.alerts(board.messages());
                    }

                    let overlay_start = Instant::now();
                    self.renderer.draw(&mut frame, pose);
                    logger.timing("overlay", overlay_start.elapsed().as_secs_f64() * 1000.0);
                }

                sink.present(&frame, board.messages())?;

                frames_processed += 1;
                logger.cycle(frames_processed, info.total_frames);

                if let Some(max) = config.max_frames {
                    if frames_processed >= max {
                        return Ok(());
                    }
                }

                if let Some(target) = frame_duration {
                    let elapsed = cycle_start.elapsed();
                    if elapsed < target {
                        std::thread::sleep(target - elapsed);
                    }
                }
            }
            Ok(())
        })();

        source.close();
        logger.summary();

        result.map(|()| MonitorOutcome {
            frames_processed,
            final_alerts: board.messages().to_vec(),
            cancelled: was_cancelled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::domain::pose::{Keypoint, KeypointName, Pose};
    use crate::monitoring::domain::alert_board::{ALL_CLEAR_MESSAGE, INITIALIZING_MESSAGE};
    use crate::pipeline::frame_sink::NullFrameSink;
    use crate::pipeline::monitor_logger::NullMonitorLogger;
    use crate::shared::frame::Frame;
    use crate::shared::stream_info::StreamInfo;

    fn test_frame(index: usize) -> Frame {
        Frame::new(vec![0u8; 16 * 12 * 3], 16, 12, 3, index)
    }

    struct FakeSource {
        num_frames: usize,
        opened: bool,
        closed: bool,
    }

    impl FakeSource {
        fn new(num_frames: usize) -> Self {
            Self {
                num_frames,
                opened: false,
                closed: false,
            }
        }
    }

    impl FrameSource for FakeSource {
        fn open(&mut self) -> Result<StreamInfo, Box<dyn std::error::Error>> {
            self.opened = true;
            Ok(StreamInfo {
                width: 16,
                height: 12,
                fps: 1000.0,
                total_frames: self.num_frames,
                source: "fake".to_string(),
            })
        }

        fn frames(
            &mut self,
        ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
            Box::new((0..self.num_frames).map(|i| Ok(test_frame(i))))
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    /// Plays back a script of per-cycle results. `None` means the
    /// estimator fails on that cycle.
    struct ScriptedEstimator {
        script: Vec<Option<Vec<Pose>>>,
        calls: usize,
    }

    impl ScriptedEstimator {
        fn new(script: Vec<Option<Vec<Pose>>>) -> Self {
            Self { script, calls: 0 }
        }
    }

    impl PoseEstimator for ScriptedEstimator {
        fn estimate(&mut self, _frame: &Frame) -> Result<Vec<Pose>, Box<dyn std::error::Error>> {
            let step = self.script.get(self.calls).cloned().unwrap_or(Some(vec![]));
            self.calls += 1;
            step.ok_or_else(|| "inference failed".into())
        }
    }

    struct CollectingSink {
        presented: Vec<(usize, Vec<String>)>,
    }

    impl CollectingSink {
        fn new() -> Self {
            Self {
                presented: Vec::new(),
            }
        }
    }

    impl FrameSink for CollectingSink {
        fn present(
            &mut self,
            frame: &Frame,
            alerts: &[String],
        ) -> Result<(), Box<dyn std::error::Error>> {
            self.presented.push((frame.index(), alerts.to_vec()));
            Ok(())
        }
    }

    fn full_pose(nose: f32, eyes: f32, ears: f32) -> Pose {
        let score_for = |name: KeypointName| match name {
            KeypointName::Nose => nose,
            KeypointName::LeftEye | KeypointName::RightEye => eyes,
            KeypointName::LeftEar | KeypointName::RightEar => ears,
            _ => 0.9,
        };
        let keypoints = KeypointName::ALL
            .iter()
            .map(|&name| Keypoint {
                name,
                x: 8.0,
                y: 6.0,
                score: score_for(name),
            })
            .collect();
        Pose::new(keypoints, 0.9)
    }

    fn monitor() -> Monitor {
        Monitor::new(VisibilityRules::default(), MarkerRenderer::default())
    }

    fn no_pacing() -> MonitorConfig {
        MonitorConfig {
            pace_playback: false,
            ..MonitorConfig::default()
        }
    }

    #[test]
    fn test_processes_all_frames_and_closes_source() {
        let mut source = FakeSource::new(3);
        let mut estimator = ScriptedEstimator::new(vec![]);
        let mut sink = NullFrameSink;
        let mut logger = NullMonitorLogger;

        let outcome = monitor()
            .run(
                &mut source,
                &mut estimator,
                &mut sink,
                &mut logger,
                &no_pacing(),
            )
            .unwrap();

        assert_eq!(outcome.frames_processed, 3);
        assert!(!outcome.cancelled);
        assert!(source.opened);
        assert!(source.closed);
        assert_eq!(estimator.calls, 3);
    }

    #[test]
    fn test_visible_pose_publishes_all_clear() {
        let mut source = FakeSource::new(1);
        let mut estimator = ScriptedEstimator::new(vec![Some(vec![full_pose(0.9, 0.9, 0.9)])]);
        let mut sink = CollectingSink::new();
        let mut logger = NullMonitorLogger;

        let outcome = monitor()
            .run(
                &mut source,
                &mut estimator,
                &mut sink,
                &mut logger,
                &no_pacing(),
            )
            .unwrap();

        assert_eq!(outcome.final_alerts, [ALL_CLEAR_MESSAGE]);
        assert_eq!(sink.presented.len(), 1);
        assert_eq!(sink.presented[0].1, [ALL_CLEAR_MESSAGE]);
    }

    #[test]
    fn test_hidden_face_publishes_violations() {
        let mut source = FakeSource::new(1);
        let mut estimator = ScriptedEstimator::new(vec![Some(vec![full_pose(0.1, 0.1, 0.1)])]);
        let mut sink = CollectingSink::new();
        let mut logger = NullMonitorLogger;

        monitor()
            .run(
                &mut source,
                &mut estimator,
                &mut sink,
                &mut logger,
                &no_pacing(),
            )
            .unwrap();

        assert_eq!(
            sink.presented[0].1,
            [
                "face not visible",
                "eyes not visible",
                "possibly looking away",
            ]
        );
    }

    #[test]
    fn test_no_pose_cycles_carry_alerts_over() {
        // Cycle 1 fires alerts, cycles 2 and 3 detect nobody. The alerts
        // must stay up unchanged, not reset to initializing or all-clear.
        let mut source = FakeSource::new(3);
        let mut estimator = ScriptedEstimator::new(vec![
            Some(vec![full_pose(0.1, 0.9, 0.9)]),
            Some(vec![]),
            Some(vec![]),
        ]);
        let mut sink = CollectingSink::new();
        let mut logger = NullMonitorLogger;

        monitor()
            .run(
                &mut source,
                &mut estimator,
                &mut sink,
                &mut logger,
                &no_pacing(),
            )
            .unwrap();

        assert_eq!(sink.presented.len(), 3);
        for (_, alerts) in &sink.presented {
            assert_eq!(alerts.as_slice(), ["face not visible"]);
        }
    }

    #[test]
    fn test_no_pose_before_first_evaluation_stays_initializing() {
        let mut source = FakeSource::new(2);
        let mut estimator = ScriptedEstimator::new(vec![Some(vec![]), Some(vec![])]);
        let mut sink = CollectingSink::new();
        let mut logger = NullMonitorLogger;

        monitor()
            .run(
                &mut source,
                &mut estimator,
                &mut sink,
                &mut logger,
                &no_pacing(),
            )
            .unwrap();

        for (_, alerts) in &sink.presented {
            assert_eq!(alerts.as_slice(), [INITIALIZING_MESSAGE]);
        }
    }

    #[test]
    fn test_only_first_pose_is_evaluated() {
        // Second person with a hidden face must not trigger alerts when
        // the best-scoring pose is fully visible.
        let mut source = FakeSource::new(1);
        let mut estimator = ScriptedEstimator::new(vec![Some(vec![
            full_pose(0.9, 0.9, 0.9),
            full_pose(0.1, 0.1, 0.1),
        ])]);
        let mut sink = CollectingSink::new();
        let mut logger = NullMonitorLogger;

        monitor()
            .run(
                &mut source,
                &mut estimator,
                &mut sink,
                &mut logger,
                &no_pacing(),
            )
            .unwrap();

        assert_eq!(sink.presented[0].1, [ALL_CLEAR_MESSAGE]);
    }

    #[test]
    fn test_estimator_failure_halts_run() {
        let mut source = FakeSource::new(5);
        let mut estimator = ScriptedEstimator::new(vec![
            Some(vec![full_pose(0.9, 0.9, 0.9)]),
            None,
        ]);
        let mut sink = CollectingSink::new();
        let mut logger = NullMonitorLogger;

        let result = monitor().run(
            &mut source,
            &mut estimator,
            &mut sink,
            &mut logger,
            &no_pacing(),
        );

        assert!(result.is_err());
        // Only the successful first cycle reached the sink, and the
        // source was still closed on the way out.
        assert_eq!(sink.presented.len(), 1);
        assert!(source.closed);
        assert_eq!(estimator.calls, 2);
    }

    #[test]
    fn test_max_frames_stops_early() {
        let mut source = FakeSource::new(10);
        let mut estimator = ScriptedEstimator::new(vec![]);
        let mut sink = NullFrameSink;
        let mut logger = NullMonitorLogger;

        let config = MonitorConfig {
            max_frames: Some(4),
            pace_playback: false,
            ..MonitorConfig::default()
        };

        let outcome = monitor()
            .run(&mut source, &mut estimator, &mut sink, &mut logger, &config)
            .unwrap();

        assert_eq!(outcome.frames_processed, 4);
    }

    #[test]
    fn test_cancellation_stops_before_next_cycle() {
        let mut source = FakeSource::new(10);
        let mut estimator = ScriptedEstimator::new(vec![]);
        let mut sink = NullFrameSink;
        let mut logger = NullMonitorLogger;

        let config = MonitorConfig {
            pace_playback: false,
            cancelled: Arc::new(AtomicBool::new(true)),
            ..MonitorConfig::default()
        };

        let outcome = monitor()
            .run(&mut source, &mut estimator, &mut sink, &mut logger, &config)
            .unwrap();

        assert_eq!(outcome.frames_processed, 0);
        assert!(outcome.cancelled);
        assert!(source.closed);
    }

    #[test]
    fn test_alert_transitions_reach_logger() {
        struct AlertCountingLogger {
            transitions: usize,
        }

        impl MonitorLogger for AlertCountingLogger {
            fn cycle(&mut self, _current: usize, _total: usize) {}
            fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
            fn alerts(&mut self, _messages: &[String]) {
                self.transitions += 1;
            }
            fn info(&mut self, _message: &str) {}
        }

        // visible, visible, hidden, hidden: two transitions
        // (initializing -> OK, OK -> face not visible).
        let mut source = FakeSource::new(4);
        let mut estimator = ScriptedEstimator::new(vec![
            Some(vec![full_pose(0.9, 0.9, 0.9)]),
            Some(vec![full_pose(0.9, 0.9, 0.9)]),
            Some(vec![full_pose(0.1, 0.9, 0.9)]),
            Some(vec![full_pose(0.1, 0.9, 0.9)]),
        ]);
        let mut sink = NullFrameSink;
        let mut logger = AlertCountingLogger { transitions: 0 };

        monitor()
            .run(
                &mut source,
                &mut estimator,
                &mut sink,
                &mut logger,
                &no_pacing(),
            )
            .unwrap();

        assert_eq!(logger.transitions, 2);
    }

    #[test]
    fn test_markers_drawn_only_when_pose_present() {
        struct PixelCheckingSink {
            annotated: Vec<bool>,
        }

        impl FrameSink for PixelCheckingSink {
            fn present(
                &mut self,
                frame: &Frame,
                _alerts: &[String],
            ) -> Result<(), Box<dyn std::error::Error>> {
                // Test frames start all black; a blue pixel at the shared
                // keypoint location means markers were drawn.
                self.annotated
                    .push(frame.pixel(8, 6) == Some([0, 0, 255]));
                Ok(())
            }
        }

        let mut source = FakeSource::new(2);
        let mut estimator = ScriptedEstimator::new(vec![
            Some(vec![full_pose(0.9, 0.9, 0.9)]),
            Some(vec![]),
        ]);
        let mut sink = PixelCheckingSink { annotated: vec![] };
        let mut logger = NullMonitorLogger;

        monitor()
            .run(
                &mut source,
                &mut estimator,
                &mut sink,
                &mut logger,
                &no_pacing(),
            )
            .unwrap();

        assert_eq!(sink.annotated, [true, false]);
    }
}
