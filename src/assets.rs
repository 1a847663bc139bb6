//! Background images: decoding, loading and the swap slot shared by every render target.

pub mod background;
pub mod decode;
pub mod loader;

pub use decode::PreparedImage;
