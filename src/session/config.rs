use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assets::loader::ImageRef;
use crate::foundation::error::{GridtileError, GridtileResult};
use crate::model::color::{Rgb8, normalize_hex_list};
use crate::model::palette::Palette;
use crate::model::params::ShapeMode;
use crate::session::studio::Studio;

/// Environment variable naming the default assets directory.
pub const ASSETS_DIR_ENV: &str = "GRIDTILE_ASSETS_DIR";

/// Startup configuration for a [`Studio`], read from JSON.
///
/// Every field is optional; unset fields keep the studio defaults. Presets apply first, so
/// explicit fields override the preset's values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    pub preset: Option<usize>,
    pub canvas_size: Option<usize>,
    pub columns: Option<f64>,
    pub rows: Option<f64>,
    pub padding_percent: Option<f64>,
    pub empty_probability: Option<f64>,
    pub shape: Option<ShapeMode>,
    /// Colors in any accepted syntax; invalid entries are dropped.
    pub palette: Option<Vec<String>>,
    pub background_color: Option<String>,
    /// Background image file, relative to the working directory.
    pub background_image: Option<PathBuf>,
    pub assets_dir: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl StudioConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> GridtileResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| GridtileError::serde(format!("parse studio config JSON: {e}")))
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> GridtileResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            GridtileError::validation(format!("open studio config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Field-wise merge; values set in `overrides` win.
    pub fn merged(self, overrides: StudioConfig) -> StudioConfig {
        StudioConfig {
            preset: overrides.preset.or(self.preset),
            canvas_size: overrides.canvas_size.or(self.canvas_size),
            columns: overrides.columns.or(self.columns),
            rows: overrides.rows.or(self.rows),
            padding_percent: overrides.padding_percent.or(self.padding_percent),
            empty_probability: overrides.empty_probability.or(self.empty_probability),
            shape: overrides.shape.or(self.shape),
            palette: overrides.palette.or(self.palette),
            background_color: overrides.background_color.or(self.background_color),
            background_image: overrides.background_image.or(self.background_image),
            assets_dir: overrides.assets_dir.or(self.assets_dir),
            seed: overrides.seed.or(self.seed),
        }
    }

    /// `assets_dir`, else `$GRIDTILE_ASSETS_DIR`, else `./assets`.
    pub fn resolved_assets_dir(&self) -> PathBuf {
        self.assets_dir
            .clone()
            .or_else(|| std::env::var_os(ASSETS_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("assets"))
    }

    /// Apply the configured values to `studio`, all or nothing for the parameter fields.
    ///
    /// Every field is validated on a copy of the parameters; backgrounds are requested only
    /// after that copy is committed. A palette with no valid entry is ignored.
    pub fn apply(&self, studio: &mut Studio) -> GridtileResult<()> {
        let mut applied_preset = None;
        studio.edit(|p| {
            let background_color = self
                .background_color
                .as_deref()
                .map(str::parse::<Rgb8>)
                .transpose()?;
            if let Some(index) = self.preset {
                applied_preset = Some(p.apply_preset(index)?);
            }
            if let Some(index) = self.canvas_size {
                p.set_canvas_size(index)?;
            }
            if let Some(v) = self.columns {
                p.set_columns(v)?;
            }
            if let Some(v) = self.rows {
                p.set_rows(v)?;
            }
            if let Some(v) = self.padding_percent {
                p.set_padding_percent(v)?;
            }
            if let Some(v) = self.empty_probability {
                p.set_empty_probability(v)?;
            }
            if let Some(mode) = self.shape {
                p.set_shape_mode(mode);
            }
            if let Some(entries) = &self.palette {
                let colors = normalize_hex_list(entries);
                if colors.is_empty() {
                    tracing::warn!(?entries, "no valid palette color; keeping the current palette");
                } else {
                    p.set_palette(Palette::from_colors(colors));
                }
            }
            if let Some(color) = background_color {
                p.set_background_color(color);
            }
            Ok(())
        })?;
        if let Some(preset) = applied_preset {
            studio.preset_applied(preset);
        }
        if let Some(path) = &self.background_image {
            studio.set_background_image(Some(ImageRef::File(path.clone())));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
