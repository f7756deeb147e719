// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{Result, TrackerError};
use crate::gesture::PinchConfig;
use crate::joints::Handedness;
use crate::reference_space::ReferenceSpaceType;
use crate::retarget::ModelStyle;

pub const DEFAULT_MODEL_BASE_URL: &str = "https://cdn.aframe.io/";

/// Overrides the recording output directory of the binary.
pub const OUTPUT_DIR_ENV: &str = "HAND_TRACKER_OUTPUT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HandTrackingConfig {
    pub hand: Handedness,
    pub model_style: ModelStyle,
    pub model_color: Color,
    /// Root that the hand mesh paths are resolved against.
    pub model_base_url: String,
    pub pinch: PinchConfig,
}

impl Default for HandTrackingConfig {
    fn default() -> Self {
        Self {
            hand: Handedness::Right,
            model_style: ModelStyle::Mesh,
            model_color: Color::WHITE,
            model_base_url: DEFAULT_MODEL_BASE_URL.to_string(),
            pinch: PinchConfig::default(),
        }
    }
}

impl HandTrackingConfig {
    pub fn model_url(&self) -> String {
        format!(
            "{}controllers/oculus-hands/v4/{}.glb",
            self.model_base_url,
            self.hand.as_str()
        )
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.pinch.start_distance > 0.0) {
            return Err(TrackerError::InvalidConfig(format!(
                "pinch.startDistance must be positive, got {}",
                self.pinch.start_distance
            )));
        }
        if !(self.pinch.end_percentage >= 0.0) {
            return Err(TrackerError::InvalidConfig(format!(
                "pinch.endPercentage must not be negative, got {}",
                self.pinch.end_percentage
            )));
        }
        Ok(())
    }
}

/// Settings for a simulated run of the binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub controls: HandTrackingConfig,
    pub reference_space: ReferenceSpaceType,
    pub frames: u32,
    pub fps: f32,
    /// Frame range during which the hand input source is unplugged.
    pub dropout: Option<(u32, u32)>,
    pub output_dir: PathBuf,
    pub session_name: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            controls: HandTrackingConfig::default(),
            reference_space: ReferenceSpaceType::LocalFloor,
            frames: 600,
            fps: 72.0,
            dropout: Some((300, 360)),
            output_dir: default_output_dir(),
            session_name: None,
        }
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults; then apply
    /// environment overrides.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Ok(dir) = std::env::var(OUTPUT_DIR_ENV) {
            config.output_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.controls.validate()?;
        if !(self.fps > 0.0) {
            return Err(TrackerError::InvalidConfig(format!(
                "fps must be positive, got {}",
                self.fps
            )));
        }
        Ok(())
    }
}

fn default_output_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.document_dir().map(|p| p.join("HandTracker")))
        .unwrap_or_else(|| PathBuf::from("./output"))
}
