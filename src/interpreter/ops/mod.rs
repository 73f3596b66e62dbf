pub mod access;
pub mod assign;
pub mod binary;
pub mod unary;

// Most of these are `impl Interpreter` blocks; `binary` is plain functions
// over already-evaluated operands.
