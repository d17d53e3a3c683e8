// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Core error type for volume specification handling
#[derive(Error, Debug, Diagnostic)]
pub enum CoreError {
    /// Volume specification is not usable
    #[error("Invalid volume spec '{target}': {reason}")]
    #[diagnostic(code(localzfs::invalid_spec), help("{suggestion}"))]
    InvalidSpec {
        #[allow(unused)]
        target: String,
        #[allow(unused)]
        reason: String,
        #[allow(unused)]
        suggestion: String,
    },

    /// An immutable property differs between two versions of a spec
    #[error("Property '{property}' of volume '{target}' cannot change from {from} to {to}")]
    #[diagnostic(
        code(localzfs::immutable_property),
        help("Only dedup, compression and (for datasets) recordsize can change after creation. Delete and recreate the volume instead")
    )]
    ImmutableProperty {
        #[allow(unused)]
        target: String,
        #[allow(unused)]
        property: String,
        #[allow(unused)]
        from: String,
        #[allow(unused)]
        to: String,
    },

    /// Serialization error
    #[error("Serialization error: {message}")]
    #[diagnostic(
        code(localzfs::serialization_error),
        help("Ensure the volume spec is valid JSON or YAML")
    )]
    SerializationError {
        #[allow(unused)]
        message: String,
        #[source]
        #[allow(unused)]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create an InvalidSpec error
    pub fn invalid_spec(
        target: impl Into<String>,
        reason: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::InvalidSpec {
            target: target.into(),
            reason: reason.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create an ImmutableProperty error
    pub fn immutable_property(
        target: impl Into<String>,
        property: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self::ImmutableProperty {
            target: target.into(),
            property: property.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization_error(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::SerializationError {
            message: message.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CoreError::invalid_spec("tank/", "volume name is empty", "Set a name");
        assert!(matches!(err, CoreError::InvalidSpec { .. }));
        assert!(err.to_string().contains("volume name is empty"));

        let err = CoreError::immutable_property("tank/vol1", "volumeType", "ZVOL", "DATASET");
        assert!(matches!(err, CoreError::ImmutableProperty { .. }));
        assert!(err.to_string().contains("ZVOL"));
    }
}
