use crate::foundation::core::Canvas;
use crate::foundation::error::{GridtileError, GridtileResult};
use crate::model::color::Rgb8;
use crate::model::params::ShapeMode;

/// Named bundle of style parameters applied atomically.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub shape: ShapeMode,
    pub padding_percent: f64,
    pub empty_probability: f64,
    /// Single fill color, or `None` for the multi-color palette.
    pub fill: Option<Rgb8>,
    /// Background image path relative to the assets directory.
    pub background: Option<&'static str>,
    pub is_custom: bool,
}

/// Index of the custom (multi-color) preset in [`PRESETS`].
pub const CUSTOM_PRESET: usize = 3;

/// Preset a new studio starts with.
pub const STARTUP_PRESET: usize = 0;

pub static PRESETS: [Preset; 4] = [
    Preset {
        name: "The worm",
        shape: ShapeMode::Circle,
        padding_percent: 9.0,
        empty_probability: 0.32,
        fill: Some(Rgb8::new(0x63, 0xc8, 0xff)),
        background: Some("presets/01.png"),
        is_custom: false,
    },
    Preset {
        name: "The gradient",
        shape: ShapeMode::Triangle,
        padding_percent: 4.0,
        empty_probability: 0.75,
        fill: Some(Rgb8::new(0xaf, 0xcf, 0xd9)),
        background: Some("presets/02.png"),
        is_custom: false,
    },
    Preset {
        name: "dithergrid",
        shape: ShapeMode::Square,
        padding_percent: 35.0,
        empty_probability: 0.6,
        fill: Some(Rgb8::new(0xff, 0xff, 0xff)),
        background: Some("presets/03.png"),
        is_custom: false,
    },
    Preset {
        name: "Custom",
        shape: ShapeMode::Any,
        padding_percent: 12.0,
        empty_probability: 0.25,
        fill: None,
        background: None,
        is_custom: true,
    },
];

impl Preset {
    pub fn get(index: usize) -> GridtileResult<&'static Preset> {
        PRESETS.get(index).ok_or_else(|| {
            GridtileError::validation(format!(
                "preset index {index} out of range (0..{})",
                PRESETS.len()
            ))
        })
    }
}

/// Output canvas size in device pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasSize {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

pub static CANVAS_SIZES: [CanvasSize; 4] = [
    CanvasSize {
        name: "HD Landscape",
        width: 1920,
        height: 1080,
    },
    CanvasSize {
        name: "Portrait",
        width: 1080,
        height: 1920,
    },
    CanvasSize {
        name: "Square",
        width: 1080,
        height: 1080,
    },
    CanvasSize {
        name: "4:5",
        width: 1080,
        height: 1350,
    },
];

impl CanvasSize {
    pub fn get(index: usize) -> GridtileResult<&'static CanvasSize> {
        CANVAS_SIZES.get(index).ok_or_else(|| {
            GridtileError::validation(format!(
                "canvas size index {index} out of range (0..{})",
                CANVAS_SIZES.len()
            ))
        })
    }

    /// Sizes offered in a size picker. Index 0 is the implicit default and is not listed.
    pub fn selectable() -> impl Iterator<Item = (usize, &'static CanvasSize)> {
        CANVAS_SIZES.iter().enumerate().skip(1)
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Lowercase file-name slug: runs of non-alphanumerics become a single `-`.
    pub fn slug(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        let mut pending_dash = false;
        for ch in self.name.chars() {
            if ch.is_ascii_alphanumeric() {
                if pending_dash && !out.is_empty() {
                    out.push('-');
                }
                pending_dash = false;
                out.push(ch.to_ascii_lowercase());
            } else {
                pending_dash = true;
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/presets.rs"]
mod tests;
