//! Unary operator evaluation

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::Value;
use crate::parser::ast::*;

impl Interpreter {
    pub(crate) fn evaluate_unary(
        &mut self,
        op: UnOp,
        operand: &Expr,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        // `typeof x` never throws, even for a name that is not in scope
        if let (UnOp::TypeOf, Expr::Identifier(name, _)) = (op, operand) {
            let type_name = self.env.get(name).map_or("undefined", |v| v.type_of());
            return Ok(Value::string(type_name));
        }

        let value = self.evaluate_expr(operand)?;
        tracing::trace!(op = op.as_str(), line = location.line, "unary");
        Ok(match op {
            UnOp::Not => Value::Bool(!value.truthy()),
            UnOp::Neg => Value::Number(-value.to_number()),
            UnOp::Plus => Value::Number(value.to_number()),
            UnOp::TypeOf => Value::string(value.type_of()),
        })
    }
}
