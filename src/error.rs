use thiserror::Error;

/// Errors raised by model primitives and operator applications.
///
/// Numerical inconsistencies found by the derivative checker are *not*
/// errors — they are reported as data in the checker's result collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A vector argument disagrees with the model's declared dimensions.
    ///
    /// Raised before any computation proceeds; output buffers are never
    /// partially written.
    #[error("{what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The model does not implement the requested primitive.
    #[error("{op} is not supported by this model")]
    Unsupported { op: &'static str },

    /// A quasi-Newton wrapper was requested for a model with no variables.
    #[error("quasi-Newton approximation requires a positive variable count")]
    NoVariables,
}

impl ModelError {
    /// Shorthand for an [`ModelError::Unsupported`] capability error.
    pub fn unsupported(op: &'static str) -> Self {
        ModelError::Unsupported { op }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ModelError>;
