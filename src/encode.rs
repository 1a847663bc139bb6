//! Capture sinks.
//!
//! A recording pushes rendered frames into a [`FrameSink`] in strictly increasing frame order.

/// MP4 output through the system `ffmpeg`.
pub mod ffmpeg;
/// Numbered PNG files on disk.
pub mod png_seq;
/// Sink trait, capture configuration and the in-memory sink.
pub mod sink;

pub use ffmpeg::{FfmpegSink, FfmpegSinkOpts, ensure_parent_dir, is_ffmpeg_on_path};
pub use png_seq::PngSequenceSink;
pub use sink::{CaptureConfig, FrameSink, InMemorySink};
