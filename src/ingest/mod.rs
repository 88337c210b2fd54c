//! Frame ingestion sources.
//!
//! This module provides the sources a capture session can poll frames from:
//! - Stub source (`stub://` device paths, deterministic synthetic frames)
//! - Still-image files (JPEG/PNG replayed as frames)
//! - USB/V4L2 devices (feature: ingest-v4l2)
//!
//! All sources produce `Frame` values that flow into the capture session.
//! The ingestion layer is responsible for:
//! - Opening and owning the device/file handle
//! - Handing over raw RGB24 buffers as owned `Frame`s
//! - Reporting health so the session can surface stalls
//!
//! Frame validation is NOT an ingestion concern; the preprocessing entry
//! point enforces the input contract on whatever the driver produced.

use anyhow::{anyhow, Result};

use crate::frame::Frame;

mod image_file;
mod stub;
#[cfg(feature = "ingest-v4l2")]
pub mod v4l2;

pub use image_file::{ImageFileConfig, ImageFileSource};
pub use stub::{StubConfig, StubSource};
#[cfg(feature = "ingest-v4l2")]
pub use v4l2::{V4l2Config, V4l2Source};

/// A producer of frames for a capture session.
///
/// Every source exposes the same small surface: connect once, then poll
/// `next_frame` at whatever cadence the caller chooses.
pub trait FrameSource {
    /// Open the underlying device, file, or generator.
    fn connect(&mut self) -> Result<()>;

    /// Capture the next frame. Errors from the driver propagate.
    fn next_frame(&mut self) -> Result<Frame>;

    /// Whether the source is currently producing frames without errors.
    fn is_healthy(&self) -> bool;

    /// Human-readable identifier for logs (device path, file path).
    fn descriptor(&self) -> String;
}

/// Open a source for a device string.
///
/// - `stub://...` selects the synthetic stub source.
/// - Paths ending in a supported image extension select the still-image
///   source.
/// - Anything else is treated as a V4L2 device node, which requires the
///   `ingest-v4l2` feature.
pub fn open_source(device: &str, target_fps: u32, width: u32, height: u32) -> Result<Box<dyn FrameSource>> {
    if !is_local_device(device) {
        return Err(anyhow!(
            "ingestion only supports local devices and paths (no URL schemes)"
        ));
    }
    if device.starts_with("stub://") {
        return Ok(Box::new(StubSource::new(StubConfig {
            device: device.to_string(),
            target_fps,
            width,
            height,
        })));
    }
    if has_image_extension(device) {
        return Ok(Box::new(ImageFileSource::new(ImageFileConfig {
            path: device.to_string(),
        })));
    }
    #[cfg(feature = "ingest-v4l2")]
    {
        Ok(Box::new(V4l2Source::new(V4l2Config {
            device: device.to_string(),
            target_fps,
            width,
            height,
        })?))
    }
    #[cfg(not(feature = "ingest-v4l2"))]
    {
        Err(anyhow!(
            "device {} requires the ingest-v4l2 feature",
            device
        ))
    }
}

fn is_local_device(device: &str) -> bool {
    if device.trim().is_empty() {
        return false;
    }
    if device.starts_with("stub://") {
        return true;
    }
    !device.contains("://")
}

fn has_image_extension(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    ["jpg", "jpeg", "png"]
        .iter()
        .any(|ext| lower.ends_with(&format!(".{ext}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_device_selects_stub_source() -> Result<()> {
        let source = open_source("stub://camera", 10, 64, 48)?;
        assert_eq!(source.descriptor(), "stub://camera");
        Ok(())
    }

    #[test]
    fn image_path_selects_image_source() -> Result<()> {
        let source = open_source("/tmp/scene.png", 10, 64, 48)?;
        assert_eq!(source.descriptor(), "/tmp/scene.png");
        Ok(())
    }

    #[test]
    fn url_schemes_rejected() {
        assert!(open_source("rtsp://camera-1", 10, 640, 480).is_err());
        assert!(open_source("http://example/frame.jpg", 10, 640, 480).is_err());
        assert!(open_source("", 10, 640, 480).is_err());
    }
}
