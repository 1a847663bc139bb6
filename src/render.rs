//! Rasterization: the `vello_cpu` surface behind every render target and the frame buffers it
//! produces.

pub mod backend;
pub mod cpu;

pub use backend::{FrameRGBA, encode_png};
pub use cpu::CpuSurface;
