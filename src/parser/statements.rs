//! Statement parsing implementation
//!
//! This module handles parsing of all statement types of the subset:
//!
//! - Variable declarations: `let x = 42;`
//! - Function declarations
//! - Control flow: `if`, `while`, `for`, `do-while`
//! - Jump statements: `return`, `break`, `continue`
//! - Blocks `{ ... }` and empty statements `;`
//! - Expression statements: calls, assignments
//!
//! # Grammar
//!
//! ```text
//! statement ::= var_decl | function_decl | if_stmt | while_stmt | for_stmt
//!             | do_while_stmt | return_stmt | break_stmt | continue_stmt
//!             | block | ";" | expr_stmt
//! ```
//!
//! Semicolons go through [`Parser::consume_semicolon`], so they may be
//! omitted wherever JavaScript inserts them.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse block statements (inside braces, excluding the braces themselves)
    pub(crate) fn parse_block_statements(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();

        while !self.check(&Token::RBrace(self.current_location())) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.current_location();
        let origin = Origin::Source(loc);

        match self.peek() {
            Token::Var(_) | Token::Let(_) | Token::Const(_) => {
                let decl = self.parse_variable_declaration()?;
                self.consume_semicolon("after variable declaration")?;
                Ok(decl)
            }
            Token::Function(_) => self.parse_function_declaration(),
            Token::Return(_) => {
                self.advance();
                self.parse_return_statement(origin)
            }
            Token::If(_) => {
                self.advance();
                self.parse_if_statement(origin)
            }
            Token::While(_) => {
                self.advance();
                self.parse_while_statement(origin)
            }
            Token::Do(_) => {
                self.advance();
                self.parse_do_while_statement(origin)
            }
            Token::For(_) => {
                self.advance();
                self.parse_for_statement(origin)
            }
            Token::Break(_) => {
                self.advance();
                self.consume_semicolon("after 'break'")?;
                Ok(Stmt::Break { origin })
            }
            Token::Continue(_) => {
                self.advance();
                self.consume_semicolon("after 'continue'")?;
                Ok(Stmt::Continue { origin })
            }
            Token::LBrace(_) => {
                self.advance();
                let body = self.parse_block_statements()?;
                self.expect_rbrace("after block")?;
                Ok(Stmt::Block { body, origin })
            }
            Token::Semicolon(_) => {
                self.advance();
                Ok(Stmt::Empty { origin })
            }
            Token::Export(_) => Err(self.error_here("'export' is only allowed at top level")),
            _ => {
                let expr = self.parse_expression()?;
                self.consume_semicolon("after expression")?;
                Ok(Stmt::Expression { expr, origin })
            }
        }
    }

    /// Parse return statement (after 'return' keyword)
    fn parse_return_statement(&mut self, origin: Origin) -> Result<Stmt, ParseError> {
        // A line break right after `return` ends the statement
        let bare = matches!(
            self.peek(),
            Token::Semicolon(_) | Token::RBrace(_) | Token::Eof(_)
        ) || self.newline_before_current();

        let argument = if bare {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume_semicolon("after return statement")?;

        Ok(Stmt::Return { argument, origin })
    }

    /// Parse if statement (after 'if' keyword)
    fn parse_if_statement(&mut self, origin: Origin) -> Result<Stmt, ParseError> {
        self.expect_lparen("after 'if'")?;
        let test = self.parse_expression()?;
        self.expect_rparen("after if condition")?;

        let consequent = Box::new(self.parse_statement()?);

        let alternate = if self.match_token(&Token::Else(self.current_location())) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            test,
            consequent,
            alternate,
            origin,
        })
    }

    /// Parse while statement (after 'while' keyword)
    fn parse_while_statement(&mut self, origin: Origin) -> Result<Stmt, ParseError> {
        self.expect_lparen("after 'while'")?;
        let test = self.parse_expression()?;
        self.expect_rparen("after while condition")?;

        let body = Box::new(self.parse_statement()?);

        Ok(Stmt::While { test, body, origin })
    }

    /// Parse do-while statement (after 'do' keyword)
    fn parse_do_while_statement(&mut self, origin: Origin) -> Result<Stmt, ParseError> {
        let body = Box::new(self.parse_statement()?);

        self.expect_token(
            &Token::While(self.current_location()),
            "Expected 'while' after do body",
        )?;
        self.expect_lparen("after 'while'")?;
        let test = self.parse_expression()?;
        self.expect_rparen("after do-while condition")?;
        // The semicolon after `do ... while (x)` is always optional
        self.match_token(&Token::Semicolon(self.current_location()));

        Ok(Stmt::DoWhile { body, test, origin })
    }

    /// Parse for statement (after 'for' keyword)
    fn parse_for_statement(&mut self, origin: Origin) -> Result<Stmt, ParseError> {
        self.expect_lparen("after 'for'")?;

        let init = match self.peek() {
            Token::Semicolon(_) => None,
            Token::Var(_) | Token::Let(_) | Token::Const(_) => {
                Some(Box::new(self.parse_variable_declaration()?))
            }
            _ => {
                let init_origin = Origin::Source(self.current_location());
                let expr = self.parse_expression()?;
                Some(Box::new(Stmt::Expression {
                    expr,
                    origin: init_origin,
                }))
            }
        };
        self.expect_token(
            &Token::Semicolon(self.current_location()),
            "Expected ';' after for initializer",
        )?;

        let test = if self.check(&Token::Semicolon(self.current_location())) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_token(
            &Token::Semicolon(self.current_location()),
            "Expected ';' after for condition",
        )?;

        let update = if self.check(&Token::RParen(self.current_location())) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_rparen("after for clauses")?;

        let body = Box::new(self.parse_statement()?);

        Ok(Stmt::For {
            init,
            test,
            update,
            body,
            origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_of(source: &str) -> Vec<Stmt> {
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();
        match program.items.into_iter().last() {
            Some(ModuleItem::ExportDefault {
                declaration: ExportDefault::Function(function),
                ..
            }) => match function.body {
                FunctionBody::Block(stmts) => stmts,
                FunctionBody::Expression(_) => panic!("Expected block body"),
            },
            other => panic!("Expected default export, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_if_else_single_statements() {
        let body = body_of("export default function f(x) { if (x > 0) return 1; else return 0; }");
        match &body[0] {
            Stmt::If {
                consequent,
                alternate,
                ..
            } => {
                assert!(matches!(**consequent, Stmt::Return { .. }));
                assert!(matches!(alternate.as_deref(), Some(Stmt::Return { .. })));
            }
            other => panic!("Expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_for_header() {
        let body = body_of("export default function f() { for (let i = 0; i < 3; i = i + 1) {} }");
        match &body[0] {
            Stmt::For {
                init, test, update, ..
            } => {
                assert!(matches!(init.as_deref(), Some(Stmt::VarDecl { .. })));
                assert!(test.is_some());
                assert!(matches!(update, Some(Expr::Assign { .. })));
            }
            other => panic!("Expected for, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_do_while() {
        let body = body_of("export default function f() { let i = 0; do { i++; } while (i < 3) return i }");
        assert!(matches!(body[1], Stmt::DoWhile { .. }));
        assert!(matches!(body[2], Stmt::Return { .. }));
    }

    #[test]
    fn test_return_followed_by_newline_is_bare() {
        let body = body_of("export default function f() {\n  return\n  1\n}");
        assert!(matches!(body[0], Stmt::Return { argument: None, .. }));
        assert!(matches!(body[1], Stmt::Expression { .. }));
    }

    #[test]
    fn test_statement_lines() {
        let body = body_of("export default function f(a) {\n  const b = a;\n\n  return b;\n}");
        assert_eq!(body[0].origin().line(), Some(2));
        assert_eq!(body[1].origin().line(), Some(4));
    }
}
