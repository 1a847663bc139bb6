use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::error::GridtileError;

/// Opaque sRGB color in its canonical `#rrggbb` form.
///
/// Equality is byte equality, which matches equality of the canonical lowercase hex string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Build a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Straight-alpha RGBA8 with full opacity.
    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }

    /// Canonical lowercase `#rrggbb` string.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb8 {
    type Err = GridtileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = normalize_hex(s)
            .ok_or_else(|| GridtileError::validation(format!("invalid hex color \"{s}\"")))?;
        parse_canonical(&hex)
            .ok_or_else(|| GridtileError::validation(format!("invalid hex color \"{s}\"")))
    }
}

impl Serialize for Rgb8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Normalize one free-text color entry to canonical `#rrggbb`.
///
/// Trims whitespace, prefixes a missing `#`, expands `#rgb` shorthand, then accepts only six hex
/// digits. Returns `None` for anything else.
pub fn normalize_hex(entry: &str) -> Option<String> {
    let v = entry.trim();
    if v.is_empty() {
        return None;
    }
    let digits = v.strip_prefix('#').unwrap_or(v);
    let expanded: String = if digits.chars().count() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_owned()
    };
    if expanded.len() != 6 || !expanded.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("#{}", expanded.to_ascii_lowercase()))
}

/// Normalize a list of entries, dropping invalid ones and keeping the first of any duplicates.
pub fn normalize_hex_list<S: AsRef<str>>(entries: &[S]) -> Vec<Rgb8> {
    let mut out = Vec::<Rgb8>::with_capacity(entries.len());
    for entry in entries {
        let Some(hex) = normalize_hex(entry.as_ref()) else {
            continue;
        };
        let Some(c) = parse_canonical(&hex) else {
            continue;
        };
        if !out.contains(&c) {
            out.push(c);
        }
    }
    out
}

/// Parse a comma-separated (or single) color list as typed into the palette field.
pub fn parse_color_list(text: &str) -> Vec<Rgb8> {
    let parts: Vec<&str> = text.split(',').collect();
    normalize_hex_list(&parts)
}

fn parse_canonical(hex: &str) -> Option<Rgb8> {
    let digits = hex.strip_prefix('#')?;
    let byte = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some(Rgb8::new(byte(0)?, byte(2)?, byte(4)?))
}

#[cfg(test)]
#[path = "../../tests/unit/model/color.rs"]
mod tests;
