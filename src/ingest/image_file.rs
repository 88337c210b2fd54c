//! Still-image file source.
//!
//! Decodes a local JPEG or PNG once on connect and replays it as the
//! captured frame on every poll. Useful for bench setups where a fixed
//! scene stands in for a live camera, and for exercising the pipeline on
//! saved captures. Local paths only; no URL fetching.

use anyhow::{anyhow, Context, Result};

use super::FrameSource;
use crate::frame::Frame;

/// Configuration for a still-image source.
#[derive(Clone, Debug, Default)]
pub struct ImageFileConfig {
    /// Local image path (e.g., "/var/lib/tremor/scene.png").
    pub path: String,
}

/// Frame source backed by a decoded still image.
pub struct ImageFileSource {
    config: ImageFileConfig,
    decoded: Option<Frame>,
    frame_count: u64,
}

impl ImageFileSource {
    pub fn new(config: ImageFileConfig) -> Self {
        Self {
            config,
            decoded: None,
            frame_count: 0,
        }
    }
}

impl FrameSource for ImageFileSource {
    fn connect(&mut self) -> Result<()> {
        let image = image::open(&self.config.path)
            .with_context(|| format!("decode image {}", self.config.path))?
            .to_rgb8();
        let (width, height) = image.dimensions();
        self.decoded = Some(Frame::rgb8(image.into_raw(), width, height));
        log::info!(
            "ImageFileSource: loaded {} ({}x{})",
            self.config.path,
            width,
            height
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame> {
        let frame = self
            .decoded
            .as_ref()
            .ok_or_else(|| anyhow!("image source not connected"))?;
        self.frame_count += 1;
        Ok(frame.clone())
    }

    fn is_healthy(&self) -> bool {
        self.decoded.is_some()
    }

    fn descriptor(&self) -> String {
        self.config.path.clone()
    }
}
