//! Capture session: one source, one recording buffer, one flag.
//!
//! The session is the glue between a frame source and callers that want
//! individual frames plus optional recording: while the recording flag is
//! set, every captured frame is also appended to the recording buffer.
//! Starting a recording clears whatever the previous one left behind;
//! stopping hands the accumulated frames to the caller.

use anyhow::Result;
use std::time::Instant;

use crate::frame::{Frame, RecordingBuffer};
use crate::ingest::FrameSource;

/// Point-in-time view of session counters for health logging.
#[derive(Clone, Debug)]
pub struct SessionStats {
    pub frames_captured: u64,
    pub frames_buffered: usize,
    pub recording: bool,
    pub source_healthy: bool,
    pub source: String,
}

/// A capture session over any frame source.
pub struct CaptureSession {
    source: Box<dyn FrameSource>,
    buffer: RecordingBuffer,
    max_recorded_frames: Option<usize>,
    recording: bool,
    recording_started: Option<Instant>,
    frames_captured: u64,
}

impl CaptureSession {
    pub fn new(source: Box<dyn FrameSource>) -> Self {
        Self {
            source,
            buffer: RecordingBuffer::new(),
            max_recorded_frames: None,
            recording: false,
            recording_started: None,
            frames_captured: 0,
        }
    }

    /// Cap the recording buffer; oldest frames are evicted past the limit.
    pub fn with_max_recorded_frames(mut self, max_frames: Option<usize>) -> Self {
        self.max_recorded_frames = max_frames;
        self
    }

    /// Open the underlying source.
    pub fn connect(&mut self) -> Result<()> {
        self.source.connect()
    }

    /// Capture the next frame. While recording, a copy is appended to the
    /// recording buffer in capture order.
    pub fn get_frame(&mut self) -> Result<Frame> {
        let frame = self.source.next_frame()?;
        self.frames_captured += 1;
        if self.recording {
            self.buffer.push(frame.clone());
        }
        Ok(frame)
    }

    /// Start recording. Returns false if a recording is already active.
    /// Starting clears any frames left from a previous recording.
    pub fn start_recording(&mut self) -> bool {
        if self.recording {
            return false;
        }
        self.recording = true;
        self.recording_started = Some(Instant::now());
        self.buffer = match self.max_recorded_frames {
            Some(max) => RecordingBuffer::bounded(max),
            None => RecordingBuffer::new(),
        };
        log::info!("recording started on {}", self.source.descriptor());
        true
    }

    /// Stop recording and return the accumulated frames in capture order.
    /// Returns None if no recording was active.
    pub fn stop_recording(&mut self) -> Option<Vec<Frame>> {
        if !self.recording {
            return None;
        }
        self.recording = false;
        let elapsed = self
            .recording_started
            .take()
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        let frames = self.buffer.take_frames();
        log::info!("recording stopped: {} frames in {:.1}s", frames.len(), elapsed);
        Some(frames)
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            frames_captured: self.frames_captured,
            frames_buffered: self.buffer.len(),
            recording: self.recording,
            source_healthy: self.source.is_healthy(),
            source: self.source.descriptor(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{StubConfig, StubSource};

    fn stub_session() -> CaptureSession {
        CaptureSession::new(Box::new(StubSource::new(StubConfig {
            width: 8,
            height: 8,
            ..StubConfig::default()
        })))
    }

    #[test]
    fn frames_only_buffered_while_recording() -> Result<()> {
        let mut session = stub_session();
        session.connect()?;

        session.get_frame()?;
        assert_eq!(session.stats().frames_buffered, 0);

        assert!(session.start_recording());
        session.get_frame()?;
        session.get_frame()?;
        assert_eq!(session.stats().frames_buffered, 2);

        let clip = session.stop_recording().expect("recording was active");
        assert_eq!(clip.len(), 2);
        assert_eq!(session.stats().frames_buffered, 0);
        Ok(())
    }

    #[test]
    fn double_start_is_rejected() {
        let mut session = stub_session();
        assert!(session.start_recording());
        assert!(!session.start_recording());
    }

    #[test]
    fn stop_without_start_returns_none() {
        let mut session = stub_session();
        assert!(session.stop_recording().is_none());
    }

    #[test]
    fn start_clears_previous_clip() -> Result<()> {
        let mut session = stub_session();
        session.connect()?;

        session.start_recording();
        session.get_frame()?;
        session.stop_recording();

        session.start_recording();
        assert_eq!(session.stats().frames_buffered, 0);
        session.get_frame()?;
        let clip = session.stop_recording().expect("recording was active");
        assert_eq!(clip.len(), 1);
        Ok(())
    }

    #[test]
    fn recording_cap_applies() -> Result<()> {
        let mut session = stub_session().with_max_recorded_frames(Some(2));
        session.connect()?;
        session.start_recording();
        for _ in 0..5 {
            session.get_frame()?;
        }
        let clip = session.stop_recording().expect("recording was active");
        assert_eq!(clip.len(), 2);
        Ok(())
    }
}
