use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, TryRecvError};
use iced::widget::{
    button, column, container, pick_list, row, slider, stack, text, text_input,
};
use iced::{Element, Length, Subscription, Task, Theme};

use facewatch_core::monitoring::domain::alert_board::ALL_CLEAR_MESSAGE;
use facewatch_core::shared::constants::{CAPTURE_HEIGHT, CAPTURE_WIDTH};

use crate::settings::{Appearance, Settings};
use crate::theme;
use crate::workers::monitor_worker::{self, MonitorParams, WorkerMessage};

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Message {
    Start,
    Stop,
    Poll,
    CameraChanged(String),
    ThresholdChanged(u32),
    MarkerThresholdChanged(u32),
    ConfidenceChanged(u32),
    EstimateEveryChanged(u32),
    AppearanceChanged(Appearance),
    RestoreDefaults,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

struct Worker {
    rx: Receiver<WorkerMessage>,
    cancelled: Arc<AtomicBool>,
}

pub struct App {
    settings: Settings,
    worker: Option<Worker>,
    frame: Option<iced::widget::image::Handle>,
    alerts: Vec<String>,
    status: Option<String>,
    error: Option<String>,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        (
            Self {
                settings: Settings::load(),
                worker: None,
                frame: None,
                alerts: Vec::new(),
                status: None,
                error: None,
            },
            Task::none(),
        )
    }

    fn running(&self) -> bool {
        self.worker.is_some()
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Start => {
                if self.worker.is_none() {
                    self.error = None;
                    self.status = Some("Starting...".to_string());
                    let (rx, cancelled) = monitor_worker::spawn(MonitorParams {
                        camera: self.settings.camera.clone(),
                        input: None,
                        threshold: self.settings.threshold_fraction(),
                        marker_threshold: self.settings.marker_threshold_fraction(),
                        confidence: self.settings.confidence_fraction(),
                        estimate_every: self.settings.estimate_every as usize,
                    });
                    self.worker = Some(Worker { rx, cancelled });
                }
            }
            Message::Stop => {
                if let Some(worker) = &self.worker {
                    worker.cancelled.store(true, Ordering::Relaxed);
                    self.status = Some("Stopping...".to_string());
                }
            }
            Message::Poll => {
                self.drain_worker();
            }
            Message::CameraChanged(camera) => {
                self.settings.camera = camera;
                self.settings.save();
            }
            Message::ThresholdChanged(val) => {
                self.settings.threshold = val;
                self.settings.save();
            }
            Message::MarkerThresholdChanged(val) => {
                self.settings.marker_threshold = val;
                self.settings.save();
            }
            Message::ConfidenceChanged(val) => {
                self.settings.confidence = val;
                self.settings.save();
            }
            Message::EstimateEveryChanged(val) => {
                self.settings.estimate_every = val.max(1);
                self.settings.save();
            }
            Message::AppearanceChanged(appearance) => {
                self.settings.appearance = appearance;
                self.settings.save();
            }
            Message::RestoreDefaults => {
                let defaults = Settings::default();
                self.settings.threshold = defaults.threshold;
                self.settings.marker_threshold = defaults.marker_threshold;
                self.settings.confidence = defaults.confidence;
                self.settings.estimate_every = defaults.estimate_every;
                self.settings.save();
            }
        }
        Task::none()
    }

    fn drain_worker(&mut self) {
        let Some(worker) = &self.worker else {
            return;
        };

        let mut finished = false;
        loop {
            match worker.rx.try_recv() {
                Ok(WorkerMessage::DownloadProgress(dl, total)) => {
                    self.status = Some(if total > 0 {
                        let pct = (dl as f64 / total as f64 * 100.0) as u32;
                        format!("Downloading pose model... {pct}%")
                    } else {
                        format!("Downloading pose model... {dl} bytes")
                    });
                }
                Ok(WorkerMessage::Frame(update)) => {
                    self.frame = Some(iced::widget::image::Handle::from_rgba(
                        update.width,
                        update.height,
                        update.rgba,
                    ));
                    self.alerts = update.alerts;
                    self.status = None;
                }
                Ok(WorkerMessage::Error(e)) => {
                    self.error = Some(e);
                    finished = true;
                }
                Ok(WorkerMessage::Stopped) => {
                    finished = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    finished = true;
                    break;
                }
            }
        }

        if finished {
            self.worker = None;
            self.status = None;
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let controls = self.view_controls();
        let video = self.view_video();
        let sliders = self.view_sliders();

        let mut content = column![controls, video, sliders].spacing(12).padding(16);

        if let Some(status) = &self.status {
            content = content.push(text(status).size(13));
        }
        if let Some(error) = &self.error {
            let palette = theme::resolve_theme(self.settings.appearance).palette();
            content = content.push(text(format!("Error: {error}")).size(13).color(palette.danger));
        }

        content.into()
    }

    fn view_controls(&self) -> Element<'_, Message> {
        let start_stop: Element<'_, Message> = if self.running() {
            button(text("Stop").size(13))
                .on_press(Message::Stop)
                .style(button::danger)
                .padding([6, 18])
                .into()
        } else {
            button(text("Start").size(13))
                .on_press(Message::Start)
                .style(button::primary)
                .padding([6, 18])
                .into()
        };

        let camera = text_input("camera device", &self.settings.camera)
            .on_input(Message::CameraChanged)
            .size(13)
            .width(Length::Fixed(180.0));

        let appearance = pick_list(
            Appearance::ALL,
            Some(self.settings.appearance),
            Message::AppearanceChanged,
        )
        .text_size(13);

        row![
            start_stop,
            camera,
            appearance,
            button(text("Defaults").size(13))
                .on_press(Message::RestoreDefaults)
                .style(button::text),
        ]
        .spacing(10)
        .into()
    }

    fn view_video(&self) -> Element<'_, Message> {
        let feed: Element<'_, Message> = match &self.frame {
            Some(handle) => iced::widget::image(handle.clone())
                .width(Length::Fixed(CAPTURE_WIDTH as f32))
                .height(Length::Fixed(CAPTURE_HEIGHT as f32))
                .into(),
            None => container(text(if self.running() {
                "Waiting for camera..."
            } else {
                "Press Start to begin monitoring"
            }))
            .width(Length::Fixed(CAPTURE_WIDTH as f32))
            .height(Length::Fixed(CAPTURE_HEIGHT as f32))
            .center(Length::Fill)
            .style(container::dark)
            .into(),
        };

        // Alerts stack on top of the feed, pinned to the top-left corner.
        let palette = theme::resolve_theme(self.settings.appearance).palette();
        let all_clear = self.alerts.len() == 1 && self.alerts[0] == ALL_CLEAR_MESSAGE;
        let alert_color = if all_clear {
            palette.success
        } else {
            palette.danger
        };

        let alert_lines = column(
            self.alerts
                .iter()
                .map(|msg| text(msg).size(15).color(alert_color).into())
                .collect::<Vec<_>>(),
        )
        .spacing(2);

        let alert_panel = container(alert_lines)
            .padding(8)
            .style(|_theme: &Theme| container::Style {
                background: Some(iced::Color::from_rgba(0.0, 0.0, 0.0, 0.55).into()),
                border: iced::border::rounded(4),
                ..container::Style::default()
            });

        let overlay = container(alert_panel).padding(6);

        container(stack![feed, overlay])
            .width(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    fn view_sliders(&self) -> Element<'_, Message> {
        fn labeled(label: String, s: Element<'_, Message>) -> Element<'_, Message> {
            column![text(label).size(12), s].spacing(2).width(Length::Fill).into()
        }

        row![
            labeled(
                format!("Alert threshold: {}%", self.settings.threshold),
                slider(0..=100, self.settings.threshold, Message::ThresholdChanged).into(),
            ),
            labeled(
                format!("Marker threshold: {}%", self.settings.marker_threshold),
                slider(
                    0..=100,
                    self.settings.marker_threshold,
                    Message::MarkerThresholdChanged
                )
                .into(),
            ),
            labeled(
                format!("Pose confidence: {}%", self.settings.confidence),
                slider(0..=100, self.settings.confidence, Message::ConfidenceChanged).into(),
            ),
            labeled(
                format!("Estimate every: {}", self.settings.estimate_every),
                slider(1..=10, self.settings.estimate_every, Message::EstimateEveryChanged).into(),
            ),
        ]
        .spacing(16)
        .into()
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.settings.appearance)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        if self.running() {
            iced::time::every(Duration::from_millis(33)).map(|_| Message::Poll)
        } else {
            Subscription::none()
        }
    }
}
