use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::sink::{CaptureConfig, FrameSink};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{GridtileError, GridtileResult};
use crate::render::backend::{FrameRGBA, encode_png};

/// Sink writing each frame to `<dir>/frame-NNNNN.png`.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<CaptureConfig>,
    written: u64,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            written: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Frames written since the last `begin`.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("frame-{:05}.png", idx.0))
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: CaptureConfig) -> GridtileResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            GridtileError::capture(format!(
                "failed to create frames directory '{}': {e}",
                self.dir.display()
            ))
        })?;
        self.cfg = Some(cfg);
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> GridtileResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| GridtileError::capture("png sequence sink not started"))?;
        cfg.check_frame(frame)?;
        let png = encode_png(frame)?;
        let path = self.frame_path(idx);
        std::fs::write(&path, png)
            .with_context(|| format!("failed to write frame '{}'", path.display()))?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> GridtileResult<()> {
        if self.cfg.take().is_none() {
            return Err(GridtileError::capture("png sequence sink not started"));
        }
        tracing::info!(dir = %self.dir.display(), frames = self.written, "frame sequence written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png_seq.rs"]
mod tests;
