//! Error types for the twin domain model.

use thiserror::Error;

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while constructing or parsing model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Entity id is not of the form `namespace:name`.
    #[error("Invalid entity id: '{0}'")]
    InvalidEntityId(String),

    /// JSON pointer could not be parsed.
    #[error("Invalid JSON pointer: '{0}'")]
    InvalidPointer(String),

    /// Status code is outside of 100..=599.
    #[error("Invalid status code: {0}")]
    InvalidStatus(u16),

    /// Acknowledgement label does not match the label grammar.
    #[error("Invalid acknowledgement label: '{0}'")]
    InvalidLabel(String),

    /// Thing or feature definition is empty or malformed.
    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),

    /// Header value does not fit the header's declared type.
    #[error("Invalid value '{value}' for header '{key}'")]
    InvalidHeaderValue { key: String, value: String },

    /// Action and resource do not form a known signal, e.g. `deletePolicyId`.
    #[error("Unsupported {action} on resource '{resource}'")]
    UnsupportedAction {
        action: &'static str,
        resource: &'static str,
    },

    /// JSON value has the wrong shape for the expected type.
    #[error("Invalid JSON for {expected}: {message}")]
    InvalidJson {
        expected: &'static str,
        message: String,
    },
}

impl ModelError {
    /// Wrap a serde error for the given target type.
    pub fn json(expected: &'static str, err: impl std::fmt::Display) -> Self {
        Self::InvalidJson {
            expected,
            message: err.to_string(),
        }
    }

    pub fn unsupported(action: &'static str, resource: &'static str) -> Self {
        Self::UnsupportedAction { action, resource }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelError::InvalidEntityId("no-colon".to_string());
        assert!(err.to_string().contains("no-colon"));

        let err = ModelError::json("Thing", "expected object");
        assert!(err.to_string().contains("Thing"));
        assert!(err.to_string().contains("expected object"));
    }
}
