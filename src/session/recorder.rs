use rand::RngCore;

use crate::assets::decode::PreparedImage;
use crate::compose::grid::render_composition;
use crate::compose::random::RandomSource;
use crate::encode::sink::{CaptureConfig, FrameSink};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{GridtileError, GridtileResult};
use crate::model::params::{AnimatedFields, ParameterSet};
use crate::render::backend::FrameRGBA;
use crate::render::cpu::CpuSurface;
use crate::session::animate::{
    AnimatedParams, BITRATE_KBPS, FPS, QUALITY, RESEED_EVERY, TOTAL_FRAMES,
};

struct RecordingSession {
    tick: u64,
    total: u64,
    snapshot: AnimatedFields,
    canvas: Canvas,
    surface: CpuSurface,
    sink: Box<dyn FrameSink>,
}

/// One frame produced by [`Recorder::tick`].
#[derive(Clone, Debug)]
pub struct RecordedFrame {
    pub index: FrameIndex,
    /// `tick / total * 100` for the tick that produced this frame.
    pub progress_percent: f64,
    pub frame: FrameRGBA,
    /// `true` when this was the last frame and the recording has stopped.
    pub finished: bool,
}

/// Fixed-length recording state machine: Idle or Recording.
///
/// While recording, each tick drives the animated parameters, renders at the selected canvas
/// size and pushes the frame to the sink. Stopping (automatically after the last frame, or on
/// request) finalizes the sink and restores the parameters that were animated.
#[derive(Default)]
pub struct Recorder {
    session: Option<RecordingSession>,
    progress_percent: f64,
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("recording", &self.is_recording())
            .field("tick", &self.session.as_ref().map(|s| s.tick))
            .field("progress_percent", &self.progress_percent)
            .finish()
    }
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    pub fn progress_percent(&self) -> f64 {
        self.progress_percent
    }

    /// Frames pushed so far in the active recording.
    pub fn frames_recorded(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.tick)
    }

    /// Frame size of the active recording.
    pub fn canvas(&self) -> Option<Canvas> {
        self.session.as_ref().map(|s| s.canvas)
    }

    /// The capture configuration used for a recording of `canvas`.
    pub fn capture_config(canvas: Canvas) -> CaptureConfig {
        CaptureConfig {
            fps: Fps { num: FPS, den: 1 },
            total_frames: TOTAL_FRAMES,
            width: canvas.width,
            height: canvas.height,
            quality: QUALITY,
            bitrate_kbps: BITRATE_KBPS,
        }
    }

    /// Begin recording at the canvas size selected in `params`.
    ///
    /// Returns `Ok(false)` without touching `sink` when a recording is already active. When the
    /// sink fails to start the recorder stays Idle and `params` are untouched.
    pub fn start(
        &mut self,
        params: &ParameterSet,
        sink: Box<dyn FrameSink>,
    ) -> GridtileResult<bool> {
        self.start_at(params.canvas_size().canvas(), params, sink)
    }

    /// [`Recorder::start`] with an explicit frame size.
    #[tracing::instrument(level = "debug", skip(self, params, sink))]
    pub fn start_at(
        &mut self,
        canvas: Canvas,
        params: &ParameterSet,
        mut sink: Box<dyn FrameSink>,
    ) -> GridtileResult<bool> {
        if self.session.is_some() {
            tracing::debug!("start ignored: already recording");
            return Ok(false);
        }
        let surface = CpuSurface::new(canvas)?;
        let cfg = Self::capture_config(canvas);
        sink.begin(cfg).map_err(as_capture)?;

        self.session = Some(RecordingSession {
            tick: 0,
            total: cfg.total_frames,
            snapshot: params.animated_fields(),
            canvas,
            surface,
            sink,
        });
        self.progress_percent = 0.0;
        tracing::info!(
            width = canvas.width,
            height = canvas.height,
            frames = cfg.total_frames,
            "recording started"
        );
        Ok(true)
    }

    /// Produce the next frame. Returns `Ok(None)` while Idle.
    ///
    /// `seeds` supplies a fresh seed for `rng` on every reseed tick. A sink error aborts the
    /// recording (restoring `params`) and is returned.
    pub fn tick(
        &mut self,
        params: &mut ParameterSet,
        background: Option<&PreparedImage>,
        rng: &mut dyn RandomSource,
        seeds: &mut dyn RngCore,
    ) -> GridtileResult<Option<RecordedFrame>> {
        let Some(session) = self.session.as_mut() else {
            return Ok(None);
        };

        let idx = session.tick;
        let progress = idx as f64 / session.total as f64;
        params.write_animated_fields(AnimatedParams::at(progress).fields());
        if idx % RESEED_EVERY == 0 {
            rng.reseed(seeds.next_u64());
        }

        let width = f64::from(session.canvas.width);
        let height = f64::from(session.canvas.height);
        render_composition(
            &mut session.surface,
            width,
            height,
            params,
            background,
            rng,
        );
        let frame = session.surface.read_frame();

        if let Err(e) = session.sink.push_frame(FrameIndex(idx), &frame) {
            tracing::warn!(frame = idx, error = %e, "capture failed; aborting recording");
            if let Err(end_err) = self.stop(params) {
                tracing::warn!(error = %end_err, "sink did not finalize after failure");
            }
            return Err(as_capture(e));
        }

        session.tick += 1;
        self.progress_percent = progress * 100.0;
        let finished = session.tick >= session.total;
        tracing::trace!(frame = idx, progress = self.progress_percent, "frame recorded");

        if finished {
            self.stop(params)?;
        }
        Ok(Some(RecordedFrame {
            index: FrameIndex(idx),
            progress_percent: progress * 100.0,
            frame,
            finished,
        }))
    }

    /// Finalize the sink and restore the snapshotted parameters.
    ///
    /// Returns `Ok(false)` while Idle. Parameters are restored even when the sink fails to
    /// finalize; that error is returned afterwards.
    pub fn stop(&mut self, params: &mut ParameterSet) -> GridtileResult<bool> {
        let Some(mut session) = self.session.take() else {
            return Ok(false);
        };
        params.write_animated_fields(session.snapshot);
        self.progress_percent = 0.0;
        let ended = session.sink.end().map_err(as_capture);
        tracing::info!(
            frames = session.tick,
            total = session.total,
            ok = ended.is_ok(),
            "recording stopped"
        );
        ended.map(|()| true)
    }
}

fn as_capture(e: GridtileError) -> GridtileError {
    match e {
        GridtileError::Capture(_) => e,
        other => GridtileError::capture(other.to_string()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/recorder.rs"]
mod tests;
