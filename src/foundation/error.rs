/// Convenience result type used across scenescript.
pub type SceneResult<T> = Result<T, SceneError>;

/// Top-level error taxonomy used by scene, geometry and script APIs.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// Malformed or non-manifold triangle topology.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// Row count disagreement between two buffers that must line up.
    #[error("shape mismatch in {context}: expected {expected} rows, got {actual}")]
    ShapeMismatch {
        /// Where the mismatch was detected (mesh id, update id, stencil).
        context: String,
        /// Row count required by the reference.
        expected: usize,
        /// Row count that was supplied.
        actual: usize,
    },

    /// Invalid attribute access or a value outside its allowed interval.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// Operation not allowed in the current state of a scene or log.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Invalid user-provided parameters or references.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing scripts and buffers.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SceneError {
    /// Build a [`SceneError::InvalidTopology`] value.
    pub fn invalid_topology(msg: impl Into<String>) -> Self {
        Self::InvalidTopology(msg.into())
    }

    /// Build a [`SceneError::ShapeMismatch`] value.
    pub fn shape_mismatch(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }

    /// Build a [`SceneError::OutOfRange`] value.
    pub fn out_of_range(msg: impl Into<String>) -> Self {
        Self::OutOfRange(msg.into())
    }

    /// Build a [`SceneError::InvalidState`] value.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Build a [`SceneError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SceneError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for SceneError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
