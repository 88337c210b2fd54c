//! Frame representation and the recording buffer.
//!
//! - `Frame`: owned pixel buffer plus geometry metadata. Frames arrive from
//!   drivers as raw buffers, so construction does not validate; callers that
//!   need the preprocessing contract run `Frame::validate()` (the
//!   preprocessing entry point does this itself).
//! - `SampleDepth`: bits per sample. Only 8-bit frames are processable;
//!   16-bit exists so that depth violations are representable and rejected
//!   instead of silently reinterpreted.
//! - `RecordingBuffer`: FIFO of frames accumulated while a recording session
//!   is active, with an optional capacity limit that evicts oldest-first.

use std::collections::VecDeque;

use thiserror::Error;

/// Channel counts a frame may carry and still be processable.
pub const SUPPORTED_CHANNELS: [u8; 2] = [1, 3];

/// Violation of the frame input contract.
///
/// Raised instead of proceeding silently when a frame's geometry or sample
/// depth cannot be preprocessed. Deterministic: retrying on identical input
/// yields the identical error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidFrameFormat {
    #[error("degenerate frame dimensions {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },
    #[error("unsupported channel count {0} (expected 1 or 3)")]
    UnsupportedChannels(u8),
    #[error("unsupported sample depth {0} bits (expected 8)")]
    UnsupportedDepth(u8),
    #[error("pixel buffer length {actual} does not match geometry (expected {expected})")]
    BufferLengthMismatch { expected: usize, actual: usize },
}

/// Bits per intensity sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SampleDepth {
    #[default]
    Eight,
    Sixteen,
}

impl SampleDepth {
    pub fn bits(self) -> u8 {
        match self {
            SampleDepth::Eight => 8,
            SampleDepth::Sixteen => 16,
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleDepth::Eight => 1,
            SampleDepth::Sixteen => 2,
        }
    }
}

/// A single still image captured from a camera.
///
/// Row-major, interleaved samples. Color frames are RGB (3 channels);
/// grayscale and binary frames carry 1 channel. A `Frame` has no identity
/// beyond its pixel contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    depth: SampleDepth,
}

impl Frame {
    /// Wrap a raw pixel buffer. No validation happens here; drivers hand
    /// over whatever they captured and `validate` is the contract gate.
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, depth: SampleDepth) -> Self {
        Self {
            data,
            width,
            height,
            channels,
            depth,
        }
    }

    /// Convenience constructor for 8-bit RGB frames.
    pub fn rgb8(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self::new(data, width, height, 3, SampleDepth::Eight)
    }

    /// Convenience constructor for 8-bit single-channel frames.
    pub fn gray8(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self::new(data, width, height, 1, SampleDepth::Eight)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn depth(&self) -> SampleDepth {
        self.depth
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Check the preprocessing input contract: non-degenerate dimensions,
    /// 1 or 3 channels, 8-bit samples, buffer length matching the geometry.
    pub fn validate(&self) -> Result<(), InvalidFrameFormat> {
        if self.width == 0 || self.height == 0 {
            return Err(InvalidFrameFormat::ZeroDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !SUPPORTED_CHANNELS.contains(&self.channels) {
            return Err(InvalidFrameFormat::UnsupportedChannels(self.channels));
        }
        if self.depth != SampleDepth::Eight {
            return Err(InvalidFrameFormat::UnsupportedDepth(self.depth.bits()));
        }
        let expected = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|v| v.checked_mul(self.channels as usize))
            .and_then(|v| v.checked_mul(self.depth.bytes_per_sample()))
            .ok_or(InvalidFrameFormat::BufferLengthMismatch {
                expected: usize::MAX,
                actual: self.data.len(),
            })?;
        if self.data.len() != expected {
            return Err(InvalidFrameFormat::BufferLengthMismatch {
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// Raw byte length (for buffer memory tracking).
    pub(crate) fn byte_len(&self) -> usize {
        self.data.len()
    }
}

// ----------------------------------------------------------------------------
// RecordingBuffer: FIFO of frames accumulated while recording
// ----------------------------------------------------------------------------

/// Ordered frame accumulator for a recording session.
///
/// Append order is capture order. With a capacity limit set, pushing past
/// the limit evicts the oldest frame; without one the buffer grows until
/// the session stops.
#[derive(Debug, Default)]
pub struct RecordingBuffer {
    frames: VecDeque<Frame>,
    max_frames: Option<usize>,
}

impl RecordingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer that keeps at most `max_frames`, evicting oldest-first.
    pub fn bounded(max_frames: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(max_frames.min(1024)),
            max_frames: Some(max_frames),
        }
    }

    pub fn push(&mut self, frame: Frame) {
        if let Some(max) = self.max_frames {
            if max == 0 {
                return;
            }
            while self.frames.len() >= max {
                self.frames.pop_front();
            }
        }
        self.frames.push_back(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Most recent frame, if any.
    pub fn latest(&self) -> Option<&Frame> {
        self.frames.back()
    }

    /// Hand the accumulated frames over in capture order.
    pub fn into_frames(self) -> Vec<Frame> {
        self.frames.into()
    }

    /// Drain the accumulated frames in capture order, leaving the buffer
    /// empty but reusable.
    pub fn take_frames(&mut self) -> Vec<Frame> {
        self.frames.drain(..).collect()
    }

    /// Memory usage estimate.
    pub fn memory_bytes(&self) -> usize {
        self.frames.iter().map(|f| f.byte_len()).sum()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
