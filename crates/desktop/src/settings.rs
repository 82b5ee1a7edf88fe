use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    System,
    Dark,
    Light,
}

impl Appearance {
    pub const ALL: &[Appearance] = &[Appearance::System, Appearance::Dark, Appearance::Light];
}

impl std::fmt::Display for Appearance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Appearance::System => write!(f, "System"),
            Appearance::Dark => write!(f, "Dark"),
            Appearance::Light => write!(f, "Light"),
        }
    }
}

/// Persisted GUI settings. Threshold values are stored as percentages
/// so sliders work on integers; `*_fraction` converts for the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub camera: String,
    pub threshold: u32,
    pub marker_threshold: u32,
    pub confidence: u32,
    pub estimate_every: u32,
    pub appearance: Appearance,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera: default_camera(),
            threshold: 30,
            marker_threshold: 30,
            confidence: 25,
            estimate_every: 1,
            appearance: Appearance::System,
        }
    }
}

fn default_camera() -> String {
    #[cfg(target_os = "macos")]
    {
        "0".to_string()
    }
    #[cfg(not(target_os = "macos"))]
    {
        "/dev/video0".to_string()
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("FaceWatch").join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            if let Ok(json) = serde_json::to_string_pretty(self) {
                let _ = fs::write(path, json);
            }
        }
    }

    pub fn threshold_fraction(&self) -> f32 {
        self.threshold.min(100) as f32 / 100.0
    }

    pub fn marker_threshold_fraction(&self) -> f32 {
        self.marker_threshold.min(100) as f32 / 100.0
    }

    pub fn confidence_fraction(&self) -> f32 {
        self.confidence.min(100) as f32 / 100.0
    }
}
