//! Parameter model: the mutable [`ParameterSet`] plus the static preset and canvas-size tables.

pub mod color;
pub mod palette;
pub mod params;
pub mod presets;
