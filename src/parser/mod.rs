//! JavaScript source parser
//!
//! This module transforms source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → AST), extended by `statements`,
//!   `expressions` and `declarations`
//! - [`ast`]: AST node definitions, including the [`ast::Origin`] tag
//! - [`visit`]: read-only traversal and the collectors built on it
//!
//! # Supported Subset
//!
//! - Declarations: `var`, `let`, `const` (identifier declarators), functions
//! - Statements: `if`/`else`, `while`, `do`/`while`, C-style `for`, `return`,
//!   `break`, `continue`, blocks
//! - Expressions: literals, arrays, objects, arrows, calls, member access,
//!   arithmetic, comparison, logical, conditional, assignment, update
//! - Module syntax: `export default` only
//! - No classes, destructuring, template literals, regular expressions,
//!   `switch`, exceptions or labels
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary operators.
//! No external parser generator dependencies.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;
pub mod visit;

pub use parse::{ParseError, Parser};

/// Parse a complete source unit
pub fn parse_program(source: &str) -> Result<ast::Program, ParseError> {
    Parser::new(source)?.parse_program()
}
