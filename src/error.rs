//! Error taxonomy for scene loading.
//!
//! Loading either yields a complete scene or one of these errors; there is no
//! partially loaded scene. Numeric degeneracies in the light-fit maths are not
//! errors and never show up here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneError {
    /// The document could not be read, parsed or turned into triangle geometry.
    #[error("failed to load scene: {reason}")]
    LoadFailed { reason: String },
    /// The document parsed but references something that does not exist.
    #[error("invalid document: {reason}")]
    InvalidDocument { reason: String },
    /// Failure reported by the resource resolver, passed through unchanged.
    #[error(transparent)]
    Resource(#[from] anyhow::Error),
}

impl SceneError {
    pub fn load(reason: impl Into<String>) -> Self {
        Self::LoadFailed {
            reason: reason.into(),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            reason: reason.into(),
        }
    }

    /// Bounds-checks `index` against a table of `len` entries.
    pub(crate) fn check_index(what: &str, index: usize, len: usize) -> Result<usize, Self> {
        if index < len {
            Ok(index)
        } else {
            Err(Self::invalid(format!(
                "{what} index {index} out of range (len {len})"
            )))
        }
    }
}

impl From<gltf::Error> for SceneError {
    fn from(err: gltf::Error) -> Self {
        match err {
            gltf::Error::Validation(_) => Self::invalid(err.to_string()),
            other => Self::load(other.to_string()),
        }
    }
}

impl From<tobj::LoadError> for SceneError {
    fn from(err: tobj::LoadError) -> Self {
        Self::load(err.to_string())
    }
}
