use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crate::assets::decode::PreparedImage;
use crate::assets::loader::{ImageLoader, ImageRef};
use crate::foundation::error::GridtileResult;

struct LoadDone {
    generation: u64,
    source: ImageRef,
    result: GridtileResult<PreparedImage>,
}

/// Single-writer holder of the background image shared by every render target.
///
/// Loads run on a worker thread; their results are applied only by [`BackgroundSlot::poll`] or
/// [`BackgroundSlot::wait`] on the owning thread, which swap the whole `Arc`. Renders therefore
/// see either the previous image or the new one, never a partial one. Each request bumps a
/// generation counter and results from superseded generations are discarded.
pub struct BackgroundSlot {
    loader: Arc<dyn ImageLoader>,
    current: Option<Arc<PreparedImage>>,
    generation: u64,
    pending: Option<u64>,
    tx: Sender<LoadDone>,
    rx: Receiver<LoadDone>,
}

impl BackgroundSlot {
    pub fn new(loader: Arc<dyn ImageLoader>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            loader,
            current: None,
            generation: 0,
            pending: None,
            tx,
            rx,
        }
    }

    /// Snapshot of the image to render with.
    pub fn current(&self) -> Option<Arc<PreparedImage>> {
        self.current.clone()
    }

    /// `true` while the latest request has not resolved yet.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Start loading `source` in the background. The current image stays until it resolves.
    pub fn request(&mut self, source: ImageRef) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        self.pending = Some(generation);
        tracing::debug!(%source, generation, "background load requested");

        let loader = Arc::clone(&self.loader);
        let tx = self.tx.clone();
        let job_source = source.clone();
        let spawned = std::thread::Builder::new()
            .name("gridtile-bg-load".to_owned())
            .spawn(move || {
                let result = loader.load(&job_source);
                // The slot may have been dropped; nothing to report then.
                let _ = tx.send(LoadDone {
                    generation,
                    source: job_source,
                    result,
                });
            });

        if let Err(e) = spawned {
            tracing::warn!(error = %e, "could not spawn loader thread; loading inline");
            let result = self.loader.load(&source);
            let _ = self.tx.send(LoadDone {
                generation,
                source,
                result,
            });
        }
        generation
    }

    /// Install an already decoded image, cancelling any pending load.
    pub fn set(&mut self, image: PreparedImage) {
        self.generation += 1;
        self.pending = None;
        self.current = Some(Arc::new(image));
    }

    /// Drop the image (flat background color), cancelling any pending load.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.current = None;
    }

    /// Apply finished loads without blocking. Returns `true` when the visible image changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(done) = self.rx.try_recv() {
            changed |= self.apply(done);
        }
        changed
    }

    /// Block until the latest request resolves or `timeout` elapses.
    ///
    /// Returns `true` when the visible image changed.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut changed = self.poll();
        while self.pending.is_some() {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(left) {
                Ok(done) => changed |= self.apply(done),
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!("timed out waiting for background image");
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        changed
    }

    fn apply(&mut self, done: LoadDone) -> bool {
        if self.pending != Some(done.generation) {
            tracing::debug!(
                source = %done.source,
                generation = done.generation,
                "dropping superseded background load"
            );
            return false;
        }
        self.pending = None;
        match done.result {
            Ok(img) => {
                tracing::info!(
                    source = %done.source,
                    width = img.width,
                    height = img.height,
                    "background image loaded"
                );
                self.current = Some(Arc::new(img));
            }
            Err(e) => {
                tracing::warn!(source = %done.source, error = %e, "background image failed to load; using flat color");
                self.current = None;
            }
        }
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/background.rs"]
mod tests;
