//! tremor-capture
//!
//! Camera-capture wrapper and preprocessing front-end for tremor analysis.
//!
//! The crate does exactly two things:
//!
//! 1. **Capture**: open a frame source (stub generator, still image, or a
//!    V4L2 device behind the `ingest-v4l2` feature), poll individual
//!    frames, and optionally buffer them while a recording is active.
//! 2. **Preprocess**: run each frame through a fixed three-stage pipeline
//!    (luminance reduction, 5x5 Gaussian blur, 11x11 inverted adaptive
//!    threshold) producing a binary image for a downstream motion-analysis
//!    stage that is not part of this crate.
//!
//! No tremor detection, signal analysis, or classification lives here.
//!
//! # Module structure
//!
//! - `frame`: `Frame`, `SampleDepth`, `InvalidFrameFormat`, `RecordingBuffer`
//! - `preprocess`: the pipeline (`preprocess`)
//! - `ingest`: frame sources behind the `FrameSource` trait
//! - `session`: `CaptureSession` (recording lifecycle over a source)
//! - `config`: daemon configuration (TOML file + env overrides)

pub mod config;
pub mod frame;
pub mod ingest;
pub mod preprocess;
pub mod session;

pub use config::TremordConfig;
pub use frame::{Frame, InvalidFrameFormat, RecordingBuffer, SampleDepth};
pub use ingest::{open_source, FrameSource, ImageFileSource, StubSource};
#[cfg(feature = "ingest-v4l2")]
pub use ingest::{V4l2Config, V4l2Source};
pub use preprocess::{preprocess, BLUR_KERNEL_SIZE, THRESHOLD_BLOCK_SIZE, THRESHOLD_OFFSET};
pub use session::{CaptureSession, SessionStats};
