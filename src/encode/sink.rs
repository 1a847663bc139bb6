use std::sync::{Arc, Mutex, MutexGuard};

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{GridtileError, GridtileResult};
use crate::render::backend::FrameRGBA;

/// Configuration handed to a [`FrameSink`] when a recording starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureConfig {
    /// Output frames-per-second.
    pub fps: Fps,
    /// Number of frames the recording will push.
    pub total_frames: u64,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Encoder quality hint in `[0, 1]`.
    pub quality: f64,
    /// Target video bitrate in kbit/s.
    pub bitrate_kbps: u32,
}

impl CaptureConfig {
    /// Total length of the capture in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.total_frames)
    }

    pub(crate) fn frame_len(&self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }

    pub(crate) fn check_frame(&self, frame: &FrameRGBA) -> GridtileResult<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(GridtileError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        if frame.data.len() != self.frame_len() {
            return Err(GridtileError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }
        Ok(())
    }
}

/// Capture collaborator consuming rendered frames.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order between
/// one `begin` and the matching `end`.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed. An error aborts the recording before it starts.
    fn begin(&mut self, cfg: CaptureConfig) -> GridtileResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> GridtileResult<()>;
    /// Finalize the output. Called once, after the last frame or when recording is cancelled.
    fn end(&mut self) -> GridtileResult<()>;
}

/// Shared handle, so a caller can keep inspecting a sink the recorder owns.
impl<S: FrameSink> FrameSink for Arc<Mutex<S>> {
    fn begin(&mut self, cfg: CaptureConfig) -> GridtileResult<()> {
        lock(self)?.begin(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> GridtileResult<()> {
        lock(self)?.push_frame(idx, frame)
    }

    fn end(&mut self) -> GridtileResult<()> {
        lock(self)?.end()
    }
}

fn lock<S>(shared: &Mutex<S>) -> GridtileResult<MutexGuard<'_, S>> {
    shared
        .lock()
        .map_err(|_| GridtileError::capture("shared sink lock poisoned"))
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<CaptureConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<CaptureConfig> {
        self.cfg
    }

    /// Frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// `true` once `end` has been called for the current capture.
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: CaptureConfig) -> GridtileResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> GridtileResult<()> {
        if self.cfg.is_none() {
            return Err(GridtileError::capture("in-memory sink not started"));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> GridtileResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
