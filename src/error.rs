use thiserror::Error;

use crate::validator::Violation;

/// Errors that can occur while binding the environment to a schema
#[derive(Error, Debug)]
pub enum EnvError {
    /// No environment variable name could be determined for a schema node.
    ///
    /// Raised during compilation, before any validation runs. Distinct from a
    /// missing value: here the binder does not even know which variable to
    /// look for.
    #[error("Cannot infer environment variable name from schema, use an object key or a tag")]
    NameInference,

    /// One or more fields failed validation.
    ///
    /// Every violation across the whole schema is collected before this is
    /// returned; the message starts with a banner line followed by one
    /// tab-indented line per violation, in schema declaration order.
    #[error("{message}")]
    Validation {
        /// Combined banner + per-violation message text
        message: String,
        /// One entry per violation, in declaration order
        details: Vec<Violation>,
    },

    /// The validated object did not deserialize into the requested type
    #[error("Validated environment did not match the requested type: {source}")]
    Deserialize {
        /// Underlying deserialization error
        #[from]
        source: serde_json::Error,
    },
}

impl EnvError {
    /// Assemble a validation error from a banner and the collected violations.
    pub(crate) fn validation(banner: &str, details: Vec<Violation>) -> Self {
        let mut message = String::from(banner);
        for violation in &details {
            message.push_str("\n\t");
            message.push_str(&violation.message);
        }
        Self::Validation { message, details }
    }

    /// The individual violations behind a validation failure.
    ///
    /// Empty for the other error kinds.
    pub fn details(&self) -> &[Violation] {
        match self {
            Self::Validation { details, .. } => details,
            _ => &[],
        }
    }
}

/// Result type alias for binding operations
pub type Result<T> = std::result::Result<T, EnvError>;
