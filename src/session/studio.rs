use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::assets::background::BackgroundSlot;
use crate::assets::decode::PreparedImage;
use crate::assets::loader::{ImageLoader, ImageRef};
use crate::compose::grid::{CompositionStats, render_composition};
use crate::compose::random::{RandomSource, SeededRandom};
use crate::encode::sink::FrameSink;
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{GridtileError, GridtileResult};
use crate::model::params::ParameterSet;
use crate::model::presets::{CanvasSize, Preset, STARTUP_PRESET};
use crate::render::backend::{FrameRGBA, encode_png};
use crate::render::cpu::CpuSurface;
use crate::session::recorder::Recorder;

/// Receives host events a UI would reflect (record button, progress display).
///
/// Every method has a no-op default.
pub trait StudioObserver: Send {
    fn frame_rendered(&mut self, _stats: CompositionStats) {}
    fn recording_started(&mut self, _canvas: Canvas) {}
    fn recording_progress(&mut self, _percent: f64) {}
    fn recording_stopped(&mut self, _frames: u64) {}
}

/// Observer that forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl StudioObserver for LogObserver {
    fn frame_rendered(&mut self, stats: CompositionStats) {
        tracing::debug!(cells = stats.cells, shapes = stats.shapes, "frame rendered");
    }

    fn recording_started(&mut self, canvas: Canvas) {
        tracing::info!(width = canvas.width, height = canvas.height, "recording");
    }

    fn recording_progress(&mut self, percent: f64) {
        tracing::trace!(percent, "recording progress");
    }

    fn recording_stopped(&mut self, frames: u64) {
        tracing::info!(frames, "recording finished");
    }
}

/// What one call to [`Studio::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// Nothing requested a render.
    Idle,
    /// The live view was re-rendered.
    Rendered(CompositionStats),
    /// A recording frame was captured.
    Recorded {
        index: FrameIndex,
        progress_percent: f64,
        finished: bool,
    },
}

/// A still rendered offscreen at the selected canvas size.
#[derive(Clone, Debug)]
pub struct ExportedStill {
    /// Suggested download name, `composition-<size>-<stamp>.png`.
    pub file_name: String,
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// `composition-<size slug>-<UTC stamp>.<ext>`, with `:` and `.` in the stamp replaced by `-`.
pub fn output_file_name(size: &CanvasSize, now: DateTime<Utc>, ext: &str) -> String {
    let stamp = now
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
        .replace([':', '.'], "-");
    format!("composition-{}-{stamp}.{ext}", size.slug())
}

/// Host owning the single [`ParameterSet`] and every render target.
///
/// Edits mark the live view dirty; [`Studio::tick`] is the render loop and re-renders only when
/// something requested it, except while recording, where every tick captures a frame.
pub struct Studio {
    params: ParameterSet,
    render_requested: bool,
    background: BackgroundSlot,
    rng: SeededRandom,
    seeds: StdRng,
    viewport: Canvas,
    live: CpuSurface,
    frame: Option<FrameRGBA>,
    recorder: Recorder,
    observer: Box<dyn StudioObserver>,
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("params", &self.params)
            .field("render_requested", &self.render_requested)
            .field("viewport", &self.viewport)
            .field("recorder", &self.recorder)
            .finish_non_exhaustive()
    }
}

impl Studio {
    /// Create a host with the startup preset applied and its background requested.
    ///
    /// `seed` makes every layout reproducible; `None` seeds from OS entropy. The live viewport
    /// starts at the selected canvas size.
    pub fn new(loader: Arc<dyn ImageLoader>, seed: Option<u64>) -> GridtileResult<Self> {
        let params = ParameterSet::default();
        let viewport = params.canvas_size().canvas();
        let mut seeds = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let rng = SeededRandom::new(seeds.next_u64());
        let mut studio = Self {
            live: CpuSurface::new(viewport)?,
            params,
            render_requested: true,
            background: BackgroundSlot::new(loader),
            rng,
            seeds,
            viewport,
            frame: None,
            recorder: Recorder::new(),
            observer: Box::new(LogObserver),
        };
        studio.apply_preset(STARTUP_PRESET)?;
        Ok(studio)
    }

    pub fn with_observer(mut self, observer: Box<dyn StudioObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    pub fn recording_progress(&self) -> f64 {
        self.recorder.progress_percent()
    }

    pub fn render_requested(&self) -> bool {
        self.render_requested
    }

    /// Most recent live frame (mirrors the capture frame while recording).
    pub fn frame(&self) -> Option<&FrameRGBA> {
        self.frame.as_ref()
    }

    pub fn viewport(&self) -> Canvas {
        self.viewport
    }

    pub fn background_image(&self) -> Option<Arc<PreparedImage>> {
        self.background.current()
    }

    pub fn request_render(&mut self) {
        self.render_requested = true;
    }

    fn ensure_idle(&self, what: &str) -> GridtileResult<()> {
        if self.recorder.is_recording() {
            return Err(GridtileError::validation(format!(
                "cannot {what} while recording"
            )));
        }
        Ok(())
    }

    /// Apply an edit to a copy of the parameters and commit it only if it succeeds.
    pub fn edit<F>(&mut self, f: F) -> GridtileResult<()>
    where
        F: FnOnce(&mut ParameterSet) -> GridtileResult<()>,
    {
        self.ensure_idle("edit parameters")?;
        let mut next = self.params.clone();
        f(&mut next)?;
        self.params = next;
        self.request_render();
        Ok(())
    }

    /// Apply preset `index` and load (or clear) its background image.
    pub fn apply_preset(&mut self, index: usize) -> GridtileResult<&'static Preset> {
        self.ensure_idle("apply a preset")?;
        let preset = self.params.apply_preset(index)?;
        self.preset_applied(preset);
        Ok(preset)
    }

    /// Load (or clear) the background of a preset already written into the parameters.
    pub(crate) fn preset_applied(&mut self, preset: &'static Preset) {
        match preset.background {
            Some(rel) => {
                self.background.request(ImageRef::Asset(rel.to_owned()));
            }
            None => self.background.clear(),
        }
        tracing::info!(preset = preset.name, "preset applied");
        self.request_render();
    }

    /// Select the output size used by export and recording.
    pub fn select_canvas_size(&mut self, index: usize) -> GridtileResult<&'static CanvasSize> {
        self.ensure_idle("change the canvas size")?;
        self.params.set_canvas_size(index)?;
        self.request_render();
        Ok(self.params.canvas_size())
    }

    /// Load `source` as the background, or fall back to the flat color with `None`.
    pub fn set_background_image(&mut self, source: Option<ImageRef>) {
        match source {
            Some(src) => {
                self.background.request(src);
            }
            None => {
                self.background.clear();
                self.request_render();
            }
        }
    }

    /// Resize the live view.
    pub fn set_viewport(&mut self, viewport: Canvas) -> GridtileResult<()> {
        self.live.resize(viewport)?;
        self.viewport = viewport;
        self.request_render();
        Ok(())
    }

    /// Draw a fresh layout with the current parameters.
    pub fn regenerate(&mut self) {
        self.request_render();
    }

    /// Block until pending background loads settle. Returns `true` if the image changed.
    pub fn wait_for_background(&mut self, timeout: Duration) -> bool {
        let changed = self.background.wait(timeout);
        if changed {
            self.request_render();
        }
        changed
    }

    /// Run one iteration of the render loop.
    pub fn tick(&mut self) -> GridtileResult<TickOutcome> {
        if self.background.poll() {
            self.request_render();
        }

        if self.recorder.is_recording() {
            return self.tick_recording();
        }
        if !self.render_requested {
            return Ok(TickOutcome::Idle);
        }
        self.render_requested = false;

        self.rng.reseed(self.seeds.next_u64());
        let background = self.background.current();
        let stats = render_composition(
            &mut self.live,
            f64::from(self.viewport.width),
            f64::from(self.viewport.height),
            &self.params,
            background.as_deref(),
            &mut self.rng,
        );
        self.frame = Some(self.live.read_frame());
        self.observer.frame_rendered(stats);
        Ok(TickOutcome::Rendered(stats))
    }

    fn tick_recording(&mut self) -> GridtileResult<TickOutcome> {
        let background = self.background.current();
        let result = self.recorder.tick(
            &mut self.params,
            background.as_deref(),
            &mut self.rng,
            &mut self.seeds,
        );
        let recorded = match result {
            Ok(Some(r)) => r,
            Ok(None) => return Ok(TickOutcome::Idle),
            Err(e) => {
                self.observer.recording_stopped(0);
                self.request_render();
                return Err(e);
            }
        };

        self.observer.recording_progress(recorded.progress_percent);
        if recorded.finished {
            self.observer.recording_stopped(recorded.index.0 + 1);
            self.request_render();
        }
        let outcome = TickOutcome::Recorded {
            index: recorded.index,
            progress_percent: recorded.progress_percent,
            finished: recorded.finished,
        };
        self.frame = Some(recorded.frame);
        Ok(outcome)
    }

    /// Start a 300-frame recording at the selected canvas size.
    ///
    /// Returns `Ok(false)` when already recording.
    pub fn start_recording(&mut self, sink: Box<dyn FrameSink>) -> GridtileResult<bool> {
        let canvas = self.params.canvas_size().canvas();
        self.start_recording_at(canvas, sink)
    }

    /// [`Studio::start_recording`] with an explicit frame size.
    pub fn start_recording_at(
        &mut self,
        canvas: Canvas,
        sink: Box<dyn FrameSink>,
    ) -> GridtileResult<bool> {
        let started = self.recorder.start_at(canvas, &self.params, sink)?;
        if started {
            self.observer.recording_started(canvas);
        }
        Ok(started)
    }

    /// Stop an active recording early. Returns `Ok(false)` when Idle.
    pub fn stop_recording(&mut self) -> GridtileResult<bool> {
        let frames = self.recorder.frames_recorded().unwrap_or(0);
        let stopped = self.recorder.stop(&mut self.params);
        if !matches!(stopped, Ok(false)) {
            self.observer.recording_stopped(frames);
            self.request_render();
        }
        stopped
    }

    /// Render a still at the selected canvas size and encode it as PNG.
    pub fn export_still(&mut self) -> GridtileResult<ExportedStill> {
        self.export_still_at(Utc::now())
    }

    /// [`Studio::export_still`] with an explicit timestamp for the file name.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn export_still_at(&mut self, now: DateTime<Utc>) -> GridtileResult<ExportedStill> {
        let size = self.params.canvas_size();
        let canvas = size.canvas();
        let mut surface = CpuSurface::new(canvas)?;
        let mut rng = SeededRandom::new(self.seeds.next_u64());
        let background = self.background.current();
        let stats = render_composition(
            &mut surface,
            f64::from(canvas.width),
            f64::from(canvas.height),
            &self.params,
            background.as_deref(),
            &mut rng,
        );
        let png = encode_png(&surface.read_frame())?;
        let file_name = output_file_name(size, now, "png");
        tracing::info!(file = %file_name, shapes = stats.shapes, "still exported");
        Ok(ExportedStill {
            file_name,
            png,
            width: canvas.width,
            height: canvas.height,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/studio.rs"]
mod tests;
