//! Host runtime for instrumented programs
//!
//! This module provides the core execution logic:
//! - [`engine`]: Main interpreter, function calls and execution limits
//! - [`errors`]: Runtime error types
//! - [`console`]: Captured `console.log` output
//!
//! # Execution Model
//!
//! The interpreter walks the tree directly. [`Interpreter::load`] runs a
//! program's top level once; [`Interpreter::call_default_export`] then calls
//! its default export, as many times as needed. Each call is bounded by
//! [`ExecutionLimits`].
//!
//! # Built-in Functions
//!
//! The globals (`Math`, `console`, `parseInt`, ...) and the array and string
//! methods are native functions implemented in `builtins`.

mod builtins;
pub mod console;
pub mod engine;
pub mod errors;
mod expressions;
mod loops;
mod ops;
mod statements;

pub use console::{Console, ConsoleLine};
pub use engine::{ExecutionLimits, Interpreter};
pub use errors::RuntimeError;
