use serde::Serialize;

use crate::scene::model::SourcePos;

/// Recoverable content problem found during a transcode.
///
/// The offending node (or fill) contributes nothing to the tag tree and the walk continues.
/// The host reports collected problems once the transcode completes.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Problem {
    /// A required attribute is absent (for example a bitmap `source`).
    #[error("{pos}: missing attribute '{attribute}' on <{node}>")]
    MissingAttribute {
        /// Node location.
        pos: SourcePos,
        /// Attribute name.
        attribute: &'static str,
        /// Element name.
        node: &'static str,
    },

    /// A bitmap source could not be read or decoded.
    #[error("{pos}: error {message} occurred while embedding image {source_name}")]
    ImageEmbedding {
        /// Node location.
        pos: SourcePos,
        /// Underlying IO or decode message.
        message: String,
        /// Resolved source locator.
        source_name: String,
    },

    /// A library definition lacks its required group child.
    #[error("{pos}: definitions must define a single Group child node")]
    MissingRequiredChild {
        /// Definition location.
        pos: SourcePos,
    },

    /// Path data could not be parsed.
    #[error("{pos}: invalid path data: {message}")]
    InvalidPathData {
        /// Path location.
        pos: SourcePos,
        /// Parser message.
        message: String,
    },
}

impl Problem {
    /// Location the problem refers to.
    pub fn pos(&self) -> &SourcePos {
        match self {
            Problem::MissingAttribute { pos, .. }
            | Problem::ImageEmbedding { pos, .. }
            | Problem::MissingRequiredChild { pos }
            | Problem::InvalidPathData { pos, .. } => pos,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transcode/problems.rs"]
mod tests;
