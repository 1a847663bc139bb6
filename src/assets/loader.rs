use std::fmt;
use std::path::{Path, PathBuf};

use crate::assets::decode::{PreparedImage, decode_image};
use crate::foundation::error::{GridtileError, GridtileResult};

/// Where a background image comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageRef {
    /// Path relative to the assets directory (preset backgrounds).
    Asset(String),
    /// Any file the user picked.
    File(PathBuf),
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRef::Asset(rel) => write!(f, "asset:{rel}"),
            ImageRef::File(p) => write!(f, "{}", p.display()),
        }
    }
}

/// Loads and decodes background images. Called off the render thread.
pub trait ImageLoader: Send + Sync {
    fn load(&self, source: &ImageRef) -> GridtileResult<PreparedImage>;
}

/// Filesystem loader rooted at an assets directory.
#[derive(Clone, Debug)]
pub struct FsImageLoader {
    assets_root: PathBuf,
}

impl FsImageLoader {
    pub fn new(assets_root: impl Into<PathBuf>) -> Self {
        Self {
            assets_root: assets_root.into(),
        }
    }

    pub fn assets_root(&self) -> &Path {
        &self.assets_root
    }

    fn resolve(&self, source: &ImageRef) -> GridtileResult<PathBuf> {
        match source {
            ImageRef::Asset(rel) => {
                let norm = normalize_rel_path(rel)?;
                Ok(self.assets_root.join(Path::new(&norm)))
            }
            ImageRef::File(p) => Ok(p.clone()),
        }
    }
}

impl ImageLoader for FsImageLoader {
    fn load(&self, source: &ImageRef) -> GridtileResult<PreparedImage> {
        let path = self
            .resolve(source)
            .map_err(|e| GridtileError::image_load(e.to_string()))?;
        let bytes = std::fs::read(&path).map_err(|e| {
            GridtileError::image_load(format!("failed to read image '{}': {e}", path.display()))
        })?;
        decode_image(&bytes)
    }
}

/// Normalize and validate asset-relative paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> GridtileResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(GridtileError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(GridtileError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(GridtileError::validation(
                "asset paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(GridtileError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
