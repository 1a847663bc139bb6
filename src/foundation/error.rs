/// Convenience result type used across gridtile.
pub type GridtileResult<T> = Result<T, GridtileError>;

/// Top-level error taxonomy used by studio, compositor and capture APIs.
#[derive(thiserror::Error, Debug)]
pub enum GridtileError {
    /// Invalid user-provided parameters, indices or sizes.
    #[error("validation error: {0}")]
    Validation(String),

    /// A background image could not be read or decoded.
    #[error("image load error: {0}")]
    ImageLoad(String),

    /// The capture sink failed to start, accept a frame, or finalize.
    #[error("capture error: {0}")]
    Capture(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GridtileError {
    /// Build a [`GridtileError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GridtileError::ImageLoad`] value.
    pub fn image_load(msg: impl Into<String>) -> Self {
        Self::ImageLoad(msg.into())
    }

    /// Build a [`GridtileError::Capture`] value.
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Build a [`GridtileError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
