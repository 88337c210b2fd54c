use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_DEVICE: &str = "stub://camera";
const DEFAULT_TARGET_FPS: u32 = 10;
const DEFAULT_WIDTH: u32 = 640;
const DEFAULT_HEIGHT: u32 = 480;

#[derive(Debug, Deserialize, Default)]
struct TremordConfigFile {
    camera: Option<CameraConfigFile>,
    recording: Option<RecordingConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    device: Option<String>,
    target_fps: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct RecordingConfigFile {
    max_frames: Option<usize>,
}

/// Daemon configuration: TOML file named by `TREMOR_CONFIG`, then
/// environment overrides, then validation.
#[derive(Debug, Clone)]
pub struct TremordConfig {
    pub camera: CameraSettings,
    pub recording: RecordingSettings,
}

#[derive(Debug, Clone)]
pub struct CameraSettings {
    pub device: String,
    pub target_fps: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct RecordingSettings {
    /// Cap on buffered frames per recording; None means unbounded.
    pub max_frames: Option<usize>,
}

impl TremordConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("TREMOR_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: TremordConfigFile) -> Self {
        let camera = file.camera.unwrap_or_default();
        let recording = file.recording.unwrap_or_default();
        Self {
            camera: CameraSettings {
                device: camera.device.unwrap_or_else(|| DEFAULT_DEVICE.to_string()),
                target_fps: camera.target_fps.unwrap_or(DEFAULT_TARGET_FPS),
                width: camera.width.unwrap_or(DEFAULT_WIDTH),
                height: camera.height.unwrap_or(DEFAULT_HEIGHT),
            },
            recording: RecordingSettings {
                max_frames: recording.max_frames,
            },
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(device) = std::env::var("TREMOR_CAMERA_DEVICE") {
            self.camera.device = device;
        }
        if let Ok(fps) = std::env::var("TREMOR_CAMERA_FPS") {
            self.camera.target_fps = fps
                .parse()
                .with_context(|| format!("invalid TREMOR_CAMERA_FPS: {fps}"))?;
        }
        if let Ok(width) = std::env::var("TREMOR_CAMERA_WIDTH") {
            self.camera.width = width
                .parse()
                .with_context(|| format!("invalid TREMOR_CAMERA_WIDTH: {width}"))?;
        }
        if let Ok(height) = std::env::var("TREMOR_CAMERA_HEIGHT") {
            self.camera.height = height
                .parse()
                .with_context(|| format!("invalid TREMOR_CAMERA_HEIGHT: {height}"))?;
        }
        if let Ok(max) = std::env::var("TREMOR_RECORDING_MAX_FRAMES") {
            self.recording.max_frames = Some(
                max.parse()
                    .with_context(|| format!("invalid TREMOR_RECORDING_MAX_FRAMES: {max}"))?,
            );
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.camera.device.trim().is_empty() {
            return Err(anyhow!("camera.device must not be empty"));
        }
        if self.camera.target_fps == 0 {
            return Err(anyhow!("camera.target_fps must be at least 1"));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(anyhow!(
                "camera dimensions must be at least 1x1 (got {}x{})",
                self.camera.width,
                self.camera.height
            ));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<TremordConfigFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parse config file {}", path.display()))
}
