//! Memory model for the host runtime
//!
//! This module provides the core runtime abstractions:
//! - [`value`]: Runtime value representation (primitives, arrays, objects, closures)
//! - [`env`]: Lexical environments (function and block scopes)
//!
//! Arrays, objects and scopes are reference-counted and shared; the runtime
//! is single-threaded, so `Rc<RefCell<..>>` is enough.

pub mod env;
pub mod value;

pub use env::{AssignFailure, Environment};
pub use value::{Closure, NativeFunction, Value};
