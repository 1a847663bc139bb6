//! Grid compositor: turns a [`ParameterSet`](crate::model::params::ParameterSet) plus a random
//! source into draw calls on a [`Surface`].

pub mod grid;
pub mod random;
pub mod surface;

pub use grid::{
    CompositionStats, GridGeometry, Orientation, cover_rect, render_composition, triangle_vertices,
};
pub use random::{RandomSource, SeededRandom, SequenceRandom, pick};
pub use surface::{DrawOp, RecordingSurface, Surface};
