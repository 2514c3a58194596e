/// Convenience result type used across the transcoder.
pub type FxgResult<T> = Result<T, FxgError>;

/// Fatal error taxonomy.
///
/// Recoverable content errors (missing attributes, unreadable images, malformed
/// definitions) are never reported through this type; they are collected as
/// [`crate::Problem`] values and the walk continues.
#[derive(thiserror::Error, Debug)]
pub enum FxgError {
    /// The input scene graph violates a structural guarantee of the DOM.
    #[error("validation error: {0}")]
    Validation(String),

    /// A transcoder invariant was broken (empty container stack, depth collision, ...).
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// Errors while decoding or describing bitmap data.
    #[error("image error: {0}")]
    Image(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FxgError {
    /// Build a [`FxgError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FxgError::Invariant`] value.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    /// Build a [`FxgError::Image`] value.
    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }

    /// Build a [`FxgError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
