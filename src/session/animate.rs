use std::f64::consts::PI;

use crate::model::params::{AnimatedFields, ShapeMode};

/// Recording frame rate.
pub const FPS: u32 = 30;
/// Frames in one recording (10 s at 30 fps).
pub const TOTAL_FRAMES: u64 = 300;
/// The random source is reseeded on every tick divisible by this.
pub const RESEED_EVERY: u64 = 20;
/// Encoder quality hint.
pub const QUALITY: f64 = 0.95;
/// Target video bitrate in kbit/s.
pub const BITRATE_KBPS: u32 = 15_000;

/// Round half toward positive infinity.
pub fn js_round(x: f64) -> f64 {
    (x + 0.5).floor()
}

fn osc(x: f64) -> f64 {
    x * 0.5 + 0.5
}

/// Parameter values a recording drives at a given progress in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimatedParams {
    pub padding_percent: f64,
    pub empty_probability: f64,
    pub columns: f64,
    pub rows: f64,
}

impl AnimatedParams {
    pub fn at(progress: f64) -> Self {
        Self {
            padding_percent: 5.0 + 40.0 * osc((progress * 4.0 * PI).sin()),
            empty_probability: 0.05 + 0.8 * osc((progress * 3.0 * PI).cos()),
            columns: js_round(4.0 + 26.0 * osc((progress * 2.5 * PI).sin())),
            rows: js_round(4.0 + 26.0 * osc((progress * 2.2 * PI).cos())),
        }
    }

    /// The full animated field set; recordings always draw every shape kind.
    pub fn fields(self) -> AnimatedFields {
        AnimatedFields {
            columns: self.columns,
            rows: self.rows,
            padding_percent: self.padding_percent,
            empty_probability: self.empty_probability,
            shape_mode: ShapeMode::Any,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/animate.rs"]
mod tests;
