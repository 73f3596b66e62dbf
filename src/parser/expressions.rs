//! Expression parsing implementation
//!
//! This module handles parsing of expressions using precedence climbing
//! for binary operators and recursive descent for other expression forms.
//!
//! # Supported Expressions
//!
//! - Literals: numbers, strings, `true`/`false`, `null`, arrays, objects
//! - Identifiers
//! - Function expressions and arrow functions
//! - Binary operators: arithmetic, comparison, equality, `&&`, `||`
//! - Unary operators: `!`, `-`, `+`, `typeof`, prefix `++`/`--`
//! - Postfix: `[]`, `.`, `()`, `++`, `--`
//! - Ternary `? :`, assignment, comma sequences
//!
//! # Precedence
//!
//! From loosest to tightest: sequence, assignment/arrow, conditional, `||`,
//! `&&`, equality, relational, additive, multiplicative, unary, postfix,
//! call/member, primary.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse expression (top-level entry point, comma sequences included)
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_assignment_expression()?;

        if !self.check(&Token::Comma(self.current_location())) {
            return Ok(first);
        }

        let origin = *first.origin();
        let mut expressions = vec![first];
        while self.match_token(&Token::Comma(self.current_location())) {
            expressions.push(self.parse_assignment_expression()?);
        }

        Ok(Expr::Sequence {
            expressions,
            origin,
        })
    }

    /// Parse assignment, arrow function or conditional (right-associative)
    pub(crate) fn parse_assignment_expression(&mut self) -> Result<Expr, ParseError> {
        if self.at_arrow_function() {
            return self.parse_arrow_function();
        }

        let loc = self.current_location();
        let target = self.parse_conditional()?;

        let op = match self.peek() {
            Token::Eq(_) => AssignOp::Assign,
            Token::PlusEq(_) => AssignOp::AddAssign,
            Token::MinusEq(_) => AssignOp::SubAssign,
            Token::StarEq(_) => AssignOp::MulAssign,
            Token::SlashEq(_) => AssignOp::DivAssign,
            Token::PercentEq(_) => AssignOp::ModAssign,
            _ => return Ok(target),
        };

        if !matches!(target, Expr::Identifier(..) | Expr::Member { .. }) {
            return Err(self.error_here("Invalid assignment target"));
        }
        self.advance();

        let value = self.parse_assignment_expression()?;
        Ok(Expr::Assign {
            op,
            target: Box::new(target),
            value: Box::new(value),
            origin: Origin::Source(loc),
        })
    }

    /// Whether the upcoming tokens start an arrow function: `x =>` or a
    /// parenthesized parameter list followed by `=>`
    fn at_arrow_function(&self) -> bool {
        match self.peek() {
            Token::Ident(_, _) => matches!(self.peek_ahead(1), Some(Token::FatArrow(_))),
            Token::LParen(_) => {
                let mut depth = 0usize;
                let mut offset = 0;
                while let Some(token) = self.peek_ahead(offset) {
                    match token {
                        Token::LParen(_) => depth += 1,
                        Token::RParen(_) => {
                            depth -= 1;
                            if depth == 0 {
                                return matches!(
                                    self.peek_ahead(offset + 1),
                                    Some(Token::FatArrow(_))
                                );
                            }
                        }
                        Token::Eof(_) => return false,
                        _ => {}
                    }
                    offset += 1;
                }
                false
            }
            _ => false,
        }
    }

    fn parse_arrow_function(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();

        let params = if self.match_token(&Token::LParen(loc)) {
            let params = self.parse_parameter_list()?;
            self.expect_rparen("after arrow parameters")?;
            params
        } else {
            vec![Param {
                name: self.expect_identifier()?,
                rest: false,
            }]
        };

        self.expect_token(
            &Token::FatArrow(self.current_location()),
            "Expected '=>' after arrow parameters",
        )?;

        let body_loc = self.current_location();
        let body = if self.match_token(&Token::LBrace(body_loc)) {
            let stmts = self.parse_block_statements()?;
            self.expect_rbrace("after arrow function body")?;
            FunctionBody::Block(stmts)
        } else {
            FunctionBody::Expression(Box::new(self.parse_assignment_expression()?))
        };

        Ok(Expr::Function(Box::new(Function {
            name: None,
            params,
            body,
            is_arrow: true,
            body_origin: Origin::Source(body_loc),
            origin: Origin::Source(loc),
        })))
    }

    /// Parse ternary: condition ? true_expr : false_expr
    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let test = self.parse_logical_or()?;

        if !self.match_token(&Token::Question(self.current_location())) {
            return Ok(test);
        }

        let consequent = self.parse_assignment_expression()?;
        self.expect_token(
            &Token::Colon(self.current_location()),
            "Expected ':' in conditional expression",
        )?;
        let alternate = self.parse_assignment_expression()?;

        let origin = *test.origin();
        Ok(Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
            origin,
        })
    }

    /// Parse logical OR (||)
    fn parse_logical_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_logical_and()?;

        while self.match_token(&Token::OrOr(self.current_location())) {
            let right = self.parse_logical_and()?;
            let origin = *left.origin();
            left = Expr::Logical {
                op: LogicalOp::Or,
                left: Box::new(left),
                right: Box::new(right),
                origin,
            };
        }

        Ok(left)
    }

    /// Parse logical AND (&&)
    fn parse_logical_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;

        while self.match_token(&Token::AndAnd(self.current_location())) {
            let right = self.parse_equality()?;
            let origin = *left.origin();
            left = Expr::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Box::new(right),
                origin,
            };
        }

        Ok(left)
    }

    /// Parse equality (== != === !==)
    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_relational, |token| match token {
            Token::EqEq(_) => Some(BinOp::Eq),
            Token::NotEq(_) => Some(BinOp::Ne),
            Token::EqEqEq(_) => Some(BinOp::StrictEq),
            Token::NotEqEq(_) => Some(BinOp::StrictNe),
            _ => None,
        })
    }

    /// Parse relational (< <= > >=)
    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_additive, |token| match token {
            Token::Lt(_) => Some(BinOp::Lt),
            Token::Le(_) => Some(BinOp::Le),
            Token::Gt(_) => Some(BinOp::Gt),
            Token::Ge(_) => Some(BinOp::Ge),
            _ => None,
        })
    }

    /// Parse additive (+ -)
    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_multiplicative, |token| match token {
            Token::Plus(_) => Some(BinOp::Add),
            Token::Minus(_) => Some(BinOp::Sub),
            _ => None,
        })
    }

    /// Parse multiplicative (* / %)
    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_unary, |token| match token {
            Token::Star(_) => Some(BinOp::Mul),
            Token::Slash(_) => Some(BinOp::Div),
            Token::Percent(_) => Some(BinOp::Mod),
            _ => None,
        })
    }

    /// One left-associative precedence level: `operand (op operand)*`
    fn parse_binary_level(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, ParseError>,
        operator: fn(&Token) -> Option<BinOp>,
    ) -> Result<Expr, ParseError> {
        let mut left = operand(self)?;

        while let Some(op) = operator(self.peek()) {
            self.advance();
            let right = operand(self)?;
            let origin = *left.origin();
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                origin,
            };
        }

        Ok(left)
    }

    /// Parse unary (! - + typeof ++x --x)
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();
        let origin = Origin::Source(loc);

        let op = match self.peek() {
            Token::Bang(_) => Some(UnOp::Not),
            Token::Minus(_) => Some(UnOp::Neg),
            Token::Plus(_) => Some(UnOp::Plus),
            Token::Typeof(_) => Some(UnOp::TypeOf),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let argument = self.parse_unary()?;
            return Ok(Expr::Unary {
                op,
                argument: Box::new(argument),
                origin,
            });
        }

        let update = match self.peek() {
            Token::PlusPlus(_) => Some(UpdateOp::Increment),
            Token::MinusMinus(_) => Some(UpdateOp::Decrement),
            _ => None,
        };
        if let Some(op) = update {
            self.advance();
            let argument = self.parse_unary()?;
            Self::check_update_target(&argument, loc)?;
            return Ok(Expr::Update {
                op,
                prefix: true,
                argument: Box::new(argument),
                origin,
            });
        }

        self.parse_postfix()
    }

    /// Parse postfix `x++` / `x--`; the operator must be on the same line
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_call_member()?;

        let op = match self.peek() {
            Token::PlusPlus(_) if !self.newline_before_current() => UpdateOp::Increment,
            Token::MinusMinus(_) if !self.newline_before_current() => UpdateOp::Decrement,
            _ => return Ok(expr),
        };
        let loc = self.current_location();
        Self::check_update_target(&expr, loc)?;
        self.advance();

        let origin = *expr.origin();
        Ok(Expr::Update {
            op,
            prefix: false,
            argument: Box::new(expr),
            origin,
        })
    }

    fn check_update_target(target: &Expr, loc: SourceLocation) -> Result<(), ParseError> {
        if matches!(target, Expr::Identifier(..) | Expr::Member { .. }) {
            Ok(())
        } else {
            Err(ParseError {
                message: "Invalid update target".to_string(),
                location: loc,
            })
        }
    }

    /// Parse calls and member access: `f(x)`, `a.b`, `a[i]`
    fn parse_call_member(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            let loc = self.current_location();
            let origin = *expr.origin();

            if self.match_token(&Token::Dot(loc)) {
                let name = self.expect_property_name()?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property: MemberProperty::Named(name),
                    origin,
                };
            } else if self.match_token(&Token::LBracket(loc)) {
                let index = self.parse_expression()?;
                self.expect_token(
                    &Token::RBracket(self.current_location()),
                    "Expected ']' after computed member",
                )?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property: MemberProperty::Computed(Box::new(index)),
                    origin,
                };
            } else if self.match_token(&Token::LParen(loc)) {
                let arguments = self.parse_argument_list()?;
                self.expect_rparen("after function arguments")?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    arguments,
                    origin,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parse argument list up to (not including) `)`
    fn parse_argument_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.parse_element_list(&Token::RParen(self.current_location()))
    }

    /// Comma-separated assignment expressions with optional `...spread`,
    /// allowing a trailing comma before `close`
    fn parse_element_list(&mut self, close: &Token) -> Result<Vec<Expr>, ParseError> {
        let mut elements = Vec::new();

        while !self.check(close) {
            let loc = self.current_location();
            if self.match_token(&Token::Ellipsis(loc)) {
                let argument = self.parse_assignment_expression()?;
                elements.push(Expr::Spread {
                    argument: Box::new(argument),
                    origin: Origin::Source(loc),
                });
            } else {
                elements.push(self.parse_assignment_expression()?);
            }

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(elements)
    }

    /// Identifier after `.` or as an object key; keywords are allowed there
    fn expect_property_name(&mut self) -> Result<String, ParseError> {
        let name = match self.peek() {
            Token::Ident(name, _) => name.clone(),
            Token::Default(_) => "default".to_string(),
            Token::Return(_) => "return".to_string(),
            Token::Function(_) => "function".to_string(),
            Token::Null(_) => "null".to_string(),
            Token::True(_) => "true".to_string(),
            Token::False(_) => "false".to_string(),
            other => {
                return Err(self.error_here(format!("Expected property name, found {}", other)))
            }
        };
        self.advance();
        Ok(name)
    }

    /// Parse primary (literals, identifiers, parenthesized expressions,
    /// array/object literals, function expressions)
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();
        let origin = Origin::Source(loc);

        let expr = match self.peek() {
            Token::NumberLiteral(n, _) => Expr::Number(*n, origin),
            Token::StringLiteral(s, _) => Expr::String(s.clone(), origin),
            Token::True(_) => Expr::Bool(true, origin),
            Token::False(_) => Expr::Bool(false, origin),
            Token::Null(_) => Expr::Null(origin),
            Token::Ident(name, _) => Expr::Identifier(name.clone(), origin),
            Token::LParen(_) => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_rparen("after expression")?;
                return Ok(expr);
            }
            Token::LBracket(_) => {
                self.advance();
                let elements = self.parse_element_list(&Token::RBracket(loc))?;
                self.expect_token(
                    &Token::RBracket(self.current_location()),
                    "Expected ']' after array elements",
                )?;
                return Ok(Expr::Array { elements, origin });
            }
            Token::LBrace(_) => {
                self.advance();
                return self.parse_object_literal(origin);
            }
            Token::Function(_) => {
                self.advance();
                let function = self.parse_function_rest(loc, false)?;
                return Ok(Expr::Function(Box::new(function)));
            }
            other => return Err(self.error_here(format!("Unexpected token: {}", other))),
        };

        self.advance();
        Ok(expr)
    }

    /// Parse object literal body after `{`
    fn parse_object_literal(&mut self, origin: Origin) -> Result<Expr, ParseError> {
        let mut properties = Vec::new();

        while !self.check(&Token::RBrace(self.current_location())) {
            if self.match_token(&Token::Ellipsis(self.current_location())) {
                properties.push(Property::Spread(self.parse_assignment_expression()?));
            } else {
                let key_loc = self.current_location();
                let (key, is_identifier) = match self.peek() {
                    Token::StringLiteral(s, _) => {
                        let key = s.clone();
                        self.advance();
                        (key, false)
                    }
                    Token::NumberLiteral(n, _) => {
                        let key = crate::codegen::format_number(*n);
                        self.advance();
                        (key, false)
                    }
                    _ => (self.expect_property_name()?, true),
                };

                if self.match_token(&Token::Colon(self.current_location())) {
                    let value = self.parse_assignment_expression()?;
                    properties.push(Property::KeyValue {
                        key,
                        value,
                        shorthand: false,
                    });
                } else if is_identifier {
                    properties.push(Property::KeyValue {
                        value: Expr::Identifier(key.clone(), Origin::Source(key_loc)),
                        key,
                        shorthand: true,
                    });
                } else {
                    return Err(self.error_here("Expected ':' after property key"));
                }
            }

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        self.expect_rbrace("after object literal")?;
        Ok(Expr::Object { properties, origin })
    }
}
