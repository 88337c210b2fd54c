//! Synthetic stub source.
//!
//! Selected by `stub://` device paths. Generates a deterministic moving
//! pattern so tests and default configurations can exercise the full
//! capture-and-preprocess path without hardware.

use anyhow::Result;

use super::FrameSource;
use crate::frame::Frame;

/// Configuration for a stub source.
#[derive(Clone, Debug)]
pub struct StubConfig {
    /// Device path (e.g., "stub://camera").
    pub device: String,
    /// Nominal frame rate; the stub itself never blocks.
    pub target_fps: u32,
    /// Frame width.
    pub width: u32,
    /// Frame height.
    pub height: u32,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            device: "stub://camera".to_string(),
            target_fps: 10,
            width: 640,
            height: 480,
        }
    }
}

/// Deterministic synthetic frame generator.
pub struct StubSource {
    config: StubConfig,
    frame_count: u64,
    /// Simulated scene state; bumps occasionally so consecutive frames show
    /// "motion" without any randomness.
    scene_state: u8,
}

impl StubSource {
    pub fn new(config: StubConfig) -> Self {
        Self {
            config,
            frame_count: 0,
            scene_state: 0,
        }
    }

    fn generate_pixels(&mut self) -> Vec<u8> {
        let pixel_count = (self.config.width * self.config.height * 3) as usize;

        if self.frame_count % 50 == 0 {
            self.scene_state = self.scene_state.wrapping_add(1);
        }

        // Mix frame count, scene state, and position for variation.
        let mut pixels = vec![0u8; pixel_count];
        for (i, pixel) in pixels.iter_mut().enumerate() {
            *pixel = ((i as u64 + self.frame_count + self.scene_state as u64) % 256) as u8;
        }
        pixels
    }
}

impl FrameSource for StubSource {
    fn connect(&mut self) -> Result<()> {
        log::info!(
            "StubSource: connected to {} ({}x{} @ {} fps)",
            self.config.device,
            self.config.width,
            self.config.height,
            self.config.target_fps
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame> {
        self.frame_count += 1;
        let pixels = self.generate_pixels();
        Ok(Frame::rgb8(pixels, self.config.width, self.config.height))
    }

    fn is_healthy(&self) -> bool {
        true
    }

    fn descriptor(&self) -> String {
        self.config.device.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_produces_valid_frames() -> Result<()> {
        let mut source = StubSource::new(StubConfig {
            width: 32,
            height: 24,
            ..StubConfig::default()
        });
        source.connect()?;

        let frame = source.next_frame()?;
        assert_eq!(frame.width(), 32);
        assert_eq!(frame.height(), 24);
        assert_eq!(frame.channels(), 3);
        assert!(frame.validate().is_ok());
        Ok(())
    }

    #[test]
    fn stub_is_deterministic_per_frame_index() -> Result<()> {
        let config = StubConfig {
            width: 16,
            height: 16,
            ..StubConfig::default()
        };
        let mut a = StubSource::new(config.clone());
        let mut b = StubSource::new(config);
        a.connect()?;
        b.connect()?;

        assert_eq!(a.next_frame()?, b.next_frame()?);
        assert_eq!(a.next_frame()?, b.next_frame()?);
        Ok(())
    }

    #[test]
    fn consecutive_frames_differ() -> Result<()> {
        let mut source = StubSource::new(StubConfig::default());
        source.connect()?;
        let first = source.next_frame()?;
        let second = source.next_frame()?;
        assert_ne!(first, second);
        Ok(())
    }
}
