//! # Introduction
//!
//! trace-context rewrites a JavaScript module's default-exported function so
//! that calling it records a step for every declaration, assignment, return
//! and branch or loop test, together with the values of every variable seen
//! so far. The rewritten module returns the steps next to the original
//! result.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST → Instrumenter → AST → Codegen → Source
//!                                                   ↘ Interpreter → Trace → Viewer
//! ```
//!
//! 1. [`parser`]: tokenises the source and builds an AST in which every node
//!    carries its [`parser::ast::Origin`].
//! 2. [`instrument`]: rewrites the exported function and builds the recorder
//!    and entry scaffold around it.
//! 3. [`codegen`]: prints an AST back to JavaScript.
//! 4. [`interpreter`] and [`memory`]: a tree-walking evaluator for the same
//!    subset, used to run instrumented code without a JavaScript engine.
//! 5. [`trace`]: detaches the entry's result into plain
//!    [`trace::TraceOutput`] data and walks it as a [`trace::TraceTimeline`].
//! 6. [`ui`]: ratatui viewer that steps through a trace; not part of the
//!    stable library API.
//!
//! [`pipeline`] strings the stages together; [`config`] and [`logging`]
//! serve the command-line tool.
//!
//! ## Example
//!
//! ```
//! use trace_context::{config::TraceConfig, memory::Value, pipeline::run_source};
//!
//! let source = "export default function f(a) {\n  const b = a + 1;\n  return b;\n}";
//! let run = run_source(source, vec![Value::Number(2.0)], &TraceConfig::default()).unwrap();
//! assert_eq!(run.output.return_value.as_number(), Some(3.0));
//! assert!(run.output.steps.last().unwrap().is_return());
//! ```
//!
//! ## Supported JavaScript subset
//!
//! Declarations: `var`, `let`, `const`, function declarations and
//! expressions, arrow functions, rest parameters.
//! Control flow: `if/else`, `while`, `do-while`, `for`, `break`,
//! `continue`, `return`.
//! Expressions: arithmetic, comparison, logical, conditional, assignment and
//! update operators, array and object literals with spread, member access,
//! calls, `typeof`.

pub mod codegen;
pub mod config;
pub mod error;
pub mod instrument;
pub mod interpreter;
pub mod logging;
pub mod memory;
pub mod parser;
pub mod pipeline;
pub mod trace;
pub mod ui;

pub use error::{Error, Result};
