//! Error types for attribute registry access.
//!
//! This module provides the `AttributeError` enum for failures raised while
//! reading or writing registered attributes.

/// Error type for registry reads and writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    /// Attribute not present in the registry
    UnknownAttribute(String),
    /// Attribute is readable but not writable
    ReadOnly(String),
    /// Delegated attribute reached through an empty record slot
    MissingModel { model: String, attribute: String },
    /// Record rejected the value
    InvalidValue { attribute: String, message: String },
}

impl std::fmt::Display for AttributeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeError::UnknownAttribute(name) => {
                write!(f, "Unknown attribute: {}", name)
            }
            AttributeError::ReadOnly(name) => {
                write!(f, "Attribute is read-only: {}", name)
            }
            AttributeError::MissingModel { model, attribute } => {
                write!(
                    f,
                    "Cannot reach attribute {}: model {} is not set",
                    attribute, model
                )
            }
            AttributeError::InvalidValue { attribute, message } => {
                write!(f, "Invalid value for attribute {}: {}", attribute, message)
            }
        }
    }
}

impl std::error::Error for AttributeError {}
