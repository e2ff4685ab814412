//! Error types for the form lifecycle.

use crate::errors::Errors;
use crate::schema::error::AttributeError;

/// Error type for nested record persistence
#[derive(Debug)]
pub enum SaveError {
    /// Save requested while the record slot was empty
    MissingRecord,
    /// The record's persistence layer rejected the save
    Failed(String),
    /// Underlying error surfaced by the record's persistence layer
    Source(Box<dyn std::error::Error + Send + Sync>),
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::MissingRecord => {
                write!(f, "record is not set")
            }
            SaveError::Failed(message) => {
                write!(f, "save failed: {}", message)
            }
            SaveError::Source(error) => {
                write!(f, "save failed: {}", error)
            }
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Source(error) => Some(&**error),
            _ => None,
        }
    }
}

/// Error type for lifecycle operations
#[derive(Debug)]
pub enum FormError {
    /// Strict update rejected by validation
    Invalid(Errors),
    /// Registry access failed during assignment or snapshot
    Attribute(AttributeError),
    /// A save marked record failed to persist
    Save { model: String, source: SaveError },
    /// Other lifecycle error reported by a hook
    Other(String),
}

impl FormError {
    /// Validation errors carried by an `Invalid` error
    #[must_use]
    pub fn validation_errors(&self) -> Option<&Errors> {
        match self {
            FormError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

impl std::fmt::Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::Invalid(errors) => {
                write!(
                    f,
                    "Form validation failed for: {}",
                    errors.attribute_names().join(", ")
                )
            }
            FormError::Attribute(error) => {
                write!(f, "Attribute error: {}", error)
            }
            FormError::Save { model, source } => {
                write!(f, "Failed to save {}: {}", model, source)
            }
            FormError::Other(message) => {
                write!(f, "Form error: {}", message)
            }
        }
    }
}

impl std::error::Error for FormError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormError::Attribute(error) => Some(error),
            FormError::Save { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<AttributeError> for FormError {
    fn from(error: AttributeError) -> Self {
        FormError::Attribute(error)
    }
}
