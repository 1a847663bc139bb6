use serde::{Deserialize, Serialize};

use crate::foundation::error::{GridtileError, GridtileResult};
use crate::model::color::Rgb8;
use crate::model::palette::Palette;
use crate::model::presets::{CanvasSize, PRESETS, Preset};

/// A concrete shape drawn into one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Circle,
    Square,
    Triangle,
}

impl Shape {
    /// Candidates for [`ShapeMode::Any`], in pick order.
    pub const ANY_ORDER: [Shape; 3] = [Shape::Circle, Shape::Triangle, Shape::Square];
}

/// Which shape(s) the compositor draws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeMode {
    Circle,
    Square,
    Triangle,
    /// Pick uniformly per cell.
    #[default]
    Any,
}

impl ShapeMode {
    /// The forced shape, or `None` for [`ShapeMode::Any`].
    pub fn fixed(self) -> Option<Shape> {
        match self {
            ShapeMode::Circle => Some(Shape::Circle),
            ShapeMode::Square => Some(Shape::Square),
            ShapeMode::Triangle => Some(Shape::Triangle),
            ShapeMode::Any => None,
        }
    }
}

impl std::str::FromStr for ShapeMode {
    type Err = GridtileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "circle" => Ok(Self::Circle),
            "square" => Ok(Self::Square),
            "triangle" => Ok(Self::Triangle),
            "any" => Ok(Self::Any),
            other => Err(GridtileError::validation(format!(
                "unknown shape mode \"{other}\" (expected circle, square, triangle or any)"
            ))),
        }
    }
}

/// The fields a recording animates and restores afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimatedFields {
    pub columns: f64,
    pub rows: f64,
    pub padding_percent: f64,
    pub empty_probability: f64,
    pub shape_mode: ShapeMode,
}

/// The single mutable configuration every render reads.
///
/// Fields are private; setters validate before writing so a failed call leaves the set as it
/// was.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSet {
    columns: f64,
    rows: f64,
    padding_percent: f64,
    empty_probability: f64,
    background_color: Rgb8,
    palette: Palette,
    shape_mode: ShapeMode,
    active_preset: Option<usize>,
    canvas_size: usize,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            columns: 12.0,
            rows: 12.0,
            padding_percent: 12.0,
            empty_probability: 0.25,
            background_color: Rgb8::new(0x0a, 0x0a, 0x0a),
            palette: Palette::default(),
            shape_mode: ShapeMode::Any,
            active_preset: Some(0),
            canvas_size: 0,
        }
    }
}

fn finite(name: &str, v: f64) -> GridtileResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(GridtileError::validation(format!(
            "{name} must be finite, got {v}"
        )))
    }
}

impl ParameterSet {
    pub fn columns(&self) -> f64 {
        self.columns
    }

    pub fn rows(&self) -> f64 {
        self.rows
    }

    /// Columns as rendered: floored, at least one.
    pub fn grid_columns(&self) -> u32 {
        self.columns.floor().max(1.0) as u32
    }

    /// Rows as rendered: floored, at least one.
    pub fn grid_rows(&self) -> u32 {
        self.rows.floor().max(1.0) as u32
    }

    pub fn padding_percent(&self) -> f64 {
        self.padding_percent
    }

    pub fn empty_probability(&self) -> f64 {
        self.empty_probability
    }

    pub fn background_color(&self) -> Rgb8 {
        self.background_color
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Palette operations keep entries unique, so handing out `&mut` is safe.
    pub fn palette_mut(&mut self) -> &mut Palette {
        &mut self.palette
    }

    pub fn shape_mode(&self) -> ShapeMode {
        self.shape_mode
    }

    pub fn active_preset(&self) -> Option<usize> {
        self.active_preset
    }

    pub fn canvas_size_index(&self) -> usize {
        self.canvas_size
    }

    pub fn canvas_size(&self) -> &'static CanvasSize {
        // Index is validated on every write.
        &crate::model::presets::CANVAS_SIZES[self.canvas_size]
    }

    /// `true` when cells pick their color from the whole palette rather than its first entry.
    pub fn cycles_palette(&self) -> bool {
        self.active_preset
            .and_then(|i| PRESETS.get(i))
            .is_some_and(|p| p.is_custom)
    }

    pub fn set_columns(&mut self, columns: f64) -> GridtileResult<()> {
        self.columns = finite("columns", columns)?;
        Ok(())
    }

    pub fn set_rows(&mut self, rows: f64) -> GridtileResult<()> {
        self.rows = finite("rows", rows)?;
        Ok(())
    }

    /// Values above 100 are allowed and collapse shapes to zero size.
    pub fn set_padding_percent(&mut self, padding: f64) -> GridtileResult<()> {
        self.padding_percent = finite("padding_percent", padding)?;
        Ok(())
    }

    /// Out-of-range probabilities are honored as-is.
    pub fn set_empty_probability(&mut self, p: f64) -> GridtileResult<()> {
        self.empty_probability = finite("empty_probability", p)?;
        Ok(())
    }

    pub fn set_background_color(&mut self, color: Rgb8) {
        self.background_color = color;
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    pub fn set_shape_mode(&mut self, mode: ShapeMode) {
        self.shape_mode = mode;
    }

    /// Track a preset without applying it; `None` marks the set as custom and untracked.
    pub fn set_active_preset(&mut self, index: Option<usize>) -> GridtileResult<()> {
        if let Some(i) = index {
            Preset::get(i)?;
        }
        self.active_preset = index;
        Ok(())
    }

    pub fn set_canvas_size(&mut self, index: usize) -> GridtileResult<()> {
        CanvasSize::get(index)?;
        self.canvas_size = index;
        Ok(())
    }

    /// Overwrite the style fields from preset `index` and make it active.
    ///
    /// Background loading is the caller's concern; the returned preset carries the path.
    pub fn apply_preset(&mut self, index: usize) -> GridtileResult<&'static Preset> {
        let preset = Preset::get(index)?;
        self.active_preset = Some(index);
        self.shape_mode = preset.shape;
        self.padding_percent = preset.padding_percent;
        self.empty_probability = preset.empty_probability;
        match preset.fill {
            Some(fill) if !preset.is_custom => self.palette = Palette::single(fill),
            _ => {
                if self.palette.is_empty() {
                    self.palette = Palette::default();
                }
            }
        }
        Ok(preset)
    }

    pub fn animated_fields(&self) -> AnimatedFields {
        AnimatedFields {
            columns: self.columns,
            rows: self.rows,
            padding_percent: self.padding_percent,
            empty_probability: self.empty_probability,
            shape_mode: self.shape_mode,
        }
    }

    /// Write the animated fields verbatim. Used by the recorder for both per-tick animation and
    /// restoring the pre-recording snapshot.
    pub(crate) fn write_animated_fields(&mut self, fields: AnimatedFields) {
        self.columns = fields.columns;
        self.rows = fields.rows;
        self.padding_percent = fields.padding_percent;
        self.empty_probability = fields.empty_probability;
        self.shape_mode = fields.shape_mode;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/params.rs"]
mod tests;
