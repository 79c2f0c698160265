//! Error types for barbican-operator.
//!
//! Separates user-input validation failures ([`Error::Invalid`]) from
//! contract violations ([`Error::Internal`]) so the admission transport can
//! report them under different status reasons.

use thiserror::Error;

use crate::webhooks::field::{FieldErrorList, aggregate};

/// Error type for admission operations
#[derive(Error, Debug)]
pub enum Error {
    /// The resource failed one or more validation rules
    #[error("{kind}.{group} \"{name}\" is invalid: {}", aggregate(.errors))]
    Invalid {
        kind: String,
        group: String,
        name: String,
        errors: FieldErrorList,
    },

    /// A collaborator object required by the admission contract was absent
    #[error("Internal error occurred: {0}")]
    Internal(String),

    /// The submitted object could not be decoded or re-encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Status reason reported back to the API server
    pub fn reason(&self) -> &'static str {
        match self {
            Error::Invalid { .. } => "Invalid",
            Error::Internal(_) | Error::Serialization(_) => "InternalError",
        }
    }

    /// Whether this error is a contract violation rather than bad user input
    pub fn is_internal(&self) -> bool {
        !matches!(self, Error::Invalid { .. })
    }

    /// Field errors carried by an invalid-resource error
    pub fn field_errors(&self) -> &[crate::webhooks::field::FieldError] {
        match self {
            Error::Invalid { errors, .. } => errors,
            _ => &[],
        }
    }
}

/// Result type alias for admission operations
pub type Result<T> = std::result::Result<T, Error>;
