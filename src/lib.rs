//! gridtile renders generative grid compositions: every cell of a columns x rows grid holds a
//! circle, square or oriented triangle, or stays empty.
//!
//! The public API is host-oriented:
//!
//! - Create a [`Studio`] and edit its [`ParameterSet`]
//! - Drive [`Studio::tick`] to render the live view
//! - Export PNG stills or stream a fixed 10 s recording into a [`FrameSink`]
#![forbid(unsafe_code)]

mod foundation;

/// Background image decoding, loading and swapping.
pub mod assets;
/// The grid compositor and its drawing/randomness seams.
pub mod compose;
/// Capture sinks.
pub mod encode;
/// Parameter model, palettes and static tables.
pub mod model;
/// `vello_cpu` raster surface and frame buffers.
pub mod render;
/// Studio host, recorder and configuration.
pub mod session;

pub use crate::foundation::core::{Affine, BezPath, Canvas, Fps, FrameIndex, Point, Rect, Vec2};
pub use crate::foundation::error::{GridtileError, GridtileResult};

pub use crate::assets::background::BackgroundSlot;
pub use crate::assets::decode::{PreparedImage, decode_image};
pub use crate::assets::loader::{FsImageLoader, ImageLoader, ImageRef};
pub use crate::compose::grid::{CompositionStats, GridGeometry, render_composition};
pub use crate::compose::random::{RandomSource, SeededRandom, SequenceRandom};
pub use crate::compose::surface::{RecordingSurface, Surface};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::png_seq::PngSequenceSink;
pub use crate::encode::sink::{CaptureConfig, FrameSink, InMemorySink};
pub use crate::model::color::Rgb8;
pub use crate::model::palette::Palette;
pub use crate::model::params::{ParameterSet, Shape, ShapeMode};
pub use crate::model::presets::{CANVAS_SIZES, CanvasSize, PRESETS, Preset};
pub use crate::render::backend::{FrameRGBA, encode_png};
pub use crate::render::cpu::CpuSurface;
pub use crate::session::config::StudioConfig;
pub use crate::session::studio::{ExportedStill, Studio, StudioObserver, TickOutcome};
