//! Construction-time failures of the instrumenter

use thiserror::Error;

/// The input cannot be instrumented. Raised before any rewriting happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstrumentError {
    #[error("no `export default` declaration found")]
    MissingDefaultExport,

    #[error("found {count} `export default` declarations, expected exactly one")]
    MultipleDefaultExports { count: usize },

    #[error("the default export at line {line} is not a function declaration")]
    NotAFunction { line: usize },

    #[error("the default export at line {line} is an anonymous function; give it a name")]
    AnonymousFunction { line: usize },

    #[error("`{name}` is reserved by the trace scaffold and cannot be used in the source")]
    ReservedName { name: String },
}
