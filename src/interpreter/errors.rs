//! Runtime error types for the host runtime
//!
//! This module defines [`RuntimeError`], which represents all errors that can occur
//! while executing a program (as opposed to parse or instrumentation errors).
//!
//! All runtime errors are fatal: they unwind to the caller of the entry
//! routine unchanged. The language subset has no `try`/`catch`.

use crate::parser::ast::SourceLocation;
use thiserror::Error;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Read of (or assignment to) a name that is not in scope
    #[error("ReferenceError: {name} is not defined (line {})", .location.line)]
    ReferenceError {
        name: String,
        location: SourceLocation,
    },

    /// Calling a non-function, reading a property of `undefined`, ...
    #[error("TypeError: {message} (line {})", .location.line)]
    TypeError {
        message: String,
        location: SourceLocation,
    },

    #[error("TypeError: Assignment to constant variable '{name}' (line {})", .location.line)]
    ConstAssignment {
        name: String,
        location: SourceLocation,
    },

    /// A construct the runtime does not implement
    #[error("Unsupported: {message} (line {})", .location.line)]
    Unsupported {
        message: String,
        location: SourceLocation,
    },

    #[error("execution exceeded the limit of {limit} steps (line {})", .location.line)]
    StepLimitExceeded {
        limit: usize,
        location: SourceLocation,
    },

    #[error("maximum call depth of {limit} exceeded (line {})", .location.line)]
    CallDepthExceeded {
        limit: usize,
        location: SourceLocation,
    },

    /// The loaded program has no default export to call
    #[error("the program has no default export to call")]
    NoDefaultExport,
}

impl RuntimeError {
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            RuntimeError::ReferenceError { location, .. }
            | RuntimeError::TypeError { location, .. }
            | RuntimeError::ConstAssignment { location, .. }
            | RuntimeError::Unsupported { location, .. }
            | RuntimeError::StepLimitExceeded { location, .. }
            | RuntimeError::CallDepthExceeded { location, .. } => Some(location),
            RuntimeError::NoDefaultExport => None,
        }
    }

    pub(crate) fn type_error(message: impl Into<String>, location: SourceLocation) -> Self {
        RuntimeError::TypeError {
            message: message.into(),
            location,
        }
    }
}
