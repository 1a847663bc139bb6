use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{GridtileError, GridtileResult};
use crate::model::color::{Rgb8, parse_color_list};

/// Multi-color palette used by the custom preset and reseeded when it is emptied.
pub const DEFAULT_PALETTE: [Rgb8; 5] = [
    Rgb8::new(0xff, 0xff, 0xff),
    Rgb8::new(0xff, 0x00, 0x00),
    Rgb8::new(0x00, 0x15, 0xff),
    Rgb8::new(0x20, 0xed, 0x09),
    Rgb8::new(0xfb, 0xff, 0x00),
];

/// Ordered set of fill colors.
///
/// Every mutation keeps the entries unique; the palette may be empty, in which case the
/// compositor draws no shapes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Palette(Vec<Rgb8>);

impl Default for Palette {
    fn default() -> Self {
        Self(DEFAULT_PALETTE.to_vec())
    }
}

impl<'de> Deserialize<'de> for Palette {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let colors = Vec::<Rgb8>::deserialize(deserializer)?;
        Ok(Self::from_colors(colors))
    }
}

impl Palette {
    /// An empty palette.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Build a palette, dropping repeated colors after their first occurrence.
    pub fn from_colors(colors: impl IntoIterator<Item = Rgb8>) -> Self {
        let mut out = Self::empty();
        for c in colors {
            out.push_unique(c);
        }
        out
    }

    /// A single-entry palette, as installed by single-color presets.
    pub fn single(color: Rgb8) -> Self {
        Self(vec![color])
    }

    pub fn colors(&self) -> &[Rgb8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<Rgb8> {
        self.0.first().copied()
    }

    pub fn get(&self, idx: usize) -> Option<Rgb8> {
        self.0.get(idx).copied()
    }

    /// Replace the whole palette from free text.
    ///
    /// Returns the number of colors installed. When nothing valid parses the palette is left
    /// untouched and `0` is returned.
    pub fn replace_from_text(&mut self, text: &str) -> usize {
        let parsed = parse_color_list(text);
        if parsed.is_empty() {
            return 0;
        }
        self.0 = parsed;
        self.0.len()
    }

    /// Append `color` unless it is already present. Returns `true` if it was added.
    pub fn add(&mut self, color: Rgb8) -> bool {
        self.push_unique(color)
    }

    /// Remove the entry at `idx`.
    pub fn remove(&mut self, idx: usize) -> GridtileResult<Rgb8> {
        if idx >= self.0.len() {
            return Err(GridtileError::validation(format!(
                "palette index {idx} out of range (len {})",
                self.0.len()
            )));
        }
        Ok(self.0.remove(idx))
    }

    /// Fisher-Yates shuffle of the entry order.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.0.shuffle(rng);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    fn push_unique(&mut self, color: Rgb8) -> bool {
        if self.0.contains(&color) {
            return false;
        }
        self.0.push(color);
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/palette.rs"]
mod tests;
