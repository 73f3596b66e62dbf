// Precedence-aware expression printing

use super::{format_number, quote_string, Printer};
use crate::parser::ast::*;

pub(crate) const PREC_SEQUENCE: u8 = 0;
pub(crate) const PREC_ASSIGN: u8 = 1;
const PREC_CONDITIONAL: u8 = 2;
const PREC_OR: u8 = 3;
const PREC_AND: u8 = 4;
const PREC_EQUALITY: u8 = 5;
const PREC_RELATIONAL: u8 = 6;
const PREC_ADDITIVE: u8 = 7;
const PREC_MULTIPLICATIVE: u8 = 8;
const PREC_UNARY: u8 = 9;
const PREC_POSTFIX: u8 = 10;
const PREC_CALL: u8 = 11;
const PREC_PRIMARY: u8 = 12;

fn binary_precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Eq | BinOp::Ne | BinOp::StrictEq | BinOp::StrictNe => PREC_EQUALITY,
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => PREC_RELATIONAL,
        BinOp::Add | BinOp::Sub => PREC_ADDITIVE,
        BinOp::Mul | BinOp::Div | BinOp::Mod => PREC_MULTIPLICATIVE,
    }
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Sequence { .. } => PREC_SEQUENCE,
        Expr::Assign { .. } | Expr::Spread { .. } => PREC_ASSIGN,
        Expr::Function(function) if function.is_arrow => PREC_ASSIGN,
        Expr::Conditional { .. } => PREC_CONDITIONAL,
        Expr::Logical {
            op: LogicalOp::Or, ..
        } => PREC_OR,
        Expr::Logical {
            op: LogicalOp::And,
            ..
        } => PREC_AND,
        Expr::Binary { op, .. } => binary_precedence(*op),
        Expr::Unary { .. } => PREC_UNARY,
        Expr::Update { prefix: true, .. } => PREC_UNARY,
        Expr::Update { prefix: false, .. } => PREC_POSTFIX,
        Expr::Number(n, _) if n.is_sign_negative() && *n != 0.0 => PREC_UNARY,
        Expr::Call { .. } | Expr::Member { .. } => PREC_CALL,
        _ => PREC_PRIMARY,
    }
}

/// Whether `name` can be written as a bare property key or after `.`
pub fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

impl Printer {
    /// Print `expr`, parenthesized when it binds looser than `min_prec`
    pub(crate) fn expr(&mut self, expr: &Expr, min_prec: u8) {
        let wrap = precedence(expr) < min_prec;
        if wrap {
            self.write("(");
        }
        self.expr_unwrapped(expr);
        if wrap {
            self.write(")");
        }
    }

    fn expr_unwrapped(&mut self, expr: &Expr) {
        match expr {
            Expr::Number(n, _) => self.write(&format_number(*n)),
            Expr::String(s, _) => self.write(&quote_string(s)),
            Expr::Bool(b, _) => self.write(if *b { "true" } else { "false" }),
            Expr::Null(_) => self.write("null"),
            Expr::Identifier(name, _) => self.write(name),

            Expr::Array { elements, .. } => {
                self.write("[");
                self.list(elements);
                self.write("]");
            }

            Expr::Object { properties, .. } => {
                if properties.is_empty() {
                    self.write("{}");
                    return;
                }
                self.write("{ ");
                for (i, property) in properties.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    match property {
                        Property::KeyValue {
                            key,
                            value,
                            shorthand,
                        } => {
                            let plain_key = is_identifier_name(key);
                            if plain_key {
                                self.write(key);
                            } else {
                                self.write(&quote_string(key));
                            }
                            let value_is_key =
                                matches!(value, Expr::Identifier(name, _) if name == key);
                            if !(*shorthand && plain_key && value_is_key) {
                                self.write(": ");
                                self.expr(value, PREC_ASSIGN);
                            }
                        }
                        Property::Spread(value) => {
                            self.write("...");
                            self.expr(value, PREC_ASSIGN);
                        }
                    }
                }
                self.write(" }");
            }

            Expr::Function(function) => self.function(function),

            Expr::Unary { op, argument, .. } => {
                self.write(op.as_str());
                // `- -x`, `+ +x`, `- --x`
                let collides = match (op, &**argument) {
                    (UnOp::Neg, Expr::Unary { op: UnOp::Neg, .. })
                    | (UnOp::Plus, Expr::Unary { op: UnOp::Plus, .. })
                    | (
                        UnOp::Neg,
                        Expr::Update {
                            op: UpdateOp::Decrement,
                            prefix: true,
                            ..
                        },
                    )
                    | (
                        UnOp::Plus,
                        Expr::Update {
                            op: UpdateOp::Increment,
                            prefix: true,
                            ..
                        },
                    ) => true,
                    (UnOp::Neg, Expr::Number(n, _)) => n.is_sign_negative() && *n != 0.0,
                    _ => false,
                };
                if collides {
                    self.write(" ");
                }
                self.expr(argument, PREC_UNARY);
            }

            Expr::Update {
                op,
                prefix,
                argument,
                ..
            } => {
                if *prefix {
                    self.write(op.as_str());
                    self.expr(argument, PREC_UNARY);
                } else {
                    self.expr(argument, PREC_CALL);
                    self.write(op.as_str());
                }
            }

            Expr::Binary {
                op, left, right, ..
            } => {
                let prec = binary_precedence(*op);
                self.expr(left, prec);
                self.write(" ");
                self.write(op.as_str());
                self.write(" ");
                self.expr(right, prec + 1);
            }

            Expr::Logical {
                op, left, right, ..
            } => {
                let prec = match op {
                    LogicalOp::Or => PREC_OR,
                    LogicalOp::And => PREC_AND,
                };
                self.expr(left, prec);
                self.write(" ");
                self.write(op.as_str());
                self.write(" ");
                self.expr(right, prec + 1);
            }

            Expr::Assign {
                op, target, value, ..
            } => {
                self.expr(target, PREC_CALL);
                self.write(" ");
                self.write(op.as_str());
                self.write(" ");
                self.expr(value, PREC_ASSIGN);
            }

            Expr::Conditional {
                test,
                consequent,
                alternate,
                ..
            } => {
                self.expr(test, PREC_OR);
                self.write(" ? ");
                self.expr(consequent, PREC_ASSIGN);
                self.write(" : ");
                self.expr(alternate, PREC_ASSIGN);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.expr(callee, PREC_CALL);
                self.write("(");
                self.list(arguments);
                self.write(")");
            }

            Expr::Member {
                object, property, ..
            } => {
                // A bare integer literal would swallow the dot
                let numeric_object = matches!(**object, Expr::Number(..));
                if numeric_object {
                    self.write("(");
                    self.expr(object, PREC_SEQUENCE);
                    self.write(")");
                } else {
                    self.expr(object, PREC_CALL);
                }
                match property {
                    MemberProperty::Named(name) => {
                        self.write(".");
                        self.write(name);
                    }
                    MemberProperty::Computed(index) => {
                        self.write("[");
                        self.expr(index, PREC_SEQUENCE);
                        self.write("]");
                    }
                }
            }

            Expr::Sequence { expressions, .. } => {
                for (i, expression) in expressions.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.expr(expression, PREC_ASSIGN);
                }
            }

            Expr::Spread { argument, .. } => {
                self.write("...");
                self.expr(argument, PREC_ASSIGN);
            }
        }
    }

    /// Comma-separated elements or arguments
    fn list(&mut self, items: &[Expr]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.expr(item, PREC_ASSIGN);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::print_expression;

    fn expr(source: &str) -> Expr {
        let mut parser = crate::parser::Parser::new(source).unwrap();
        parser.parse_expression().unwrap()
    }

    #[test]
    fn test_identifier_names() {
        assert!(is_identifier_name("callCount"));
        assert!(is_identifier_name("$x_1"));
        assert!(!is_identifier_name("1x"));
        assert!(!is_identifier_name("a-b"));
        assert!(!is_identifier_name(""));
    }

    #[test]
    fn test_conditional_nesting() {
        assert_eq!(print_expression(&expr("a ? b : c ? d : e")), "a ? b : c ? d : e");
        assert_eq!(print_expression(&expr("(a ? b : c) ? d : e")), "(a ? b : c) ? d : e");
    }

    #[test]
    fn test_member_on_call_and_literal() {
        assert_eq!(print_expression(&expr("f(1)[i].x")), "f(1)[i].x");
        assert_eq!(print_expression(&expr("(-x).y")), "(-x).y");
    }

    #[test]
    fn test_updates() {
        assert_eq!(print_expression(&expr("a.b++")), "a.b++");
        assert_eq!(print_expression(&expr("-(--a)")), "- --a");
    }
}
