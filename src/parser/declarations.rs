//! Declaration parsing implementation
//!
//! This module handles the binding forms of the subset:
//!
//! - Function declarations and expressions: `function name(params) { ... }`
//! - Parameter lists, including a trailing rest parameter `...args`
//! - Variable declarations: `var`/`let`/`const` with identifier declarators
//!
//! # Grammar
//!
//! ```text
//! function    ::= "function" identifier? "(" params ")" "{" statements "}"
//! params      ::= (param ("," param)* ","?)?
//! param       ::= "..."? identifier
//! var_decl    ::= ("var" | "let" | "const") declarator ("," declarator)*
//! declarator  ::= identifier ("=" assignment_expr)?
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse what follows the `function` keyword: optional name, parameters
    /// and block body. `loc` is the location of the keyword.
    pub(crate) fn parse_function_rest(
        &mut self,
        loc: SourceLocation,
        require_name: bool,
    ) -> Result<Function, ParseError> {
        let name = if matches!(self.peek(), Token::Ident(_, _)) {
            Some(self.expect_identifier()?)
        } else if require_name {
            return Err(self.error_here(format!(
                "Expected function name, found {}",
                self.peek()
            )));
        } else {
            None
        };

        self.expect_lparen("after function name")?;
        let params = self.parse_parameter_list()?;
        self.expect_rparen("after parameters")?;

        let body_loc = self.current_location();
        self.expect_lbrace("before function body")?;
        let body = self.parse_block_statements()?;
        self.expect_rbrace("after function body")?;

        Ok(Function {
            name,
            params,
            body: FunctionBody::Block(body),
            is_arrow: false,
            body_origin: Origin::Source(body_loc),
            origin: Origin::Source(loc),
        })
    }

    /// Parse a function declaration statement (the keyword is still pending)
    pub(crate) fn parse_function_declaration(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.current_location();
        self.advance(); // 'function'
        let function = self.parse_function_rest(loc, true)?;
        Ok(Stmt::FunctionDecl {
            function,
            origin: Origin::Source(loc),
        })
    }

    /// Parse parameter list up to (not including) the closing `)`
    pub(crate) fn parse_parameter_list(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();

        while !self.check(&Token::RParen(self.current_location())) {
            let rest = self.match_token(&Token::Ellipsis(self.current_location()));
            let name = self.expect_identifier()?;
            params.push(Param { name, rest });

            if rest {
                // Rest parameter must be last
                break;
            }
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(params)
    }

    /// Parse `var`/`let`/`const` declarators. The keyword is still pending;
    /// the terminating semicolon is left to the caller so that `for` headers
    /// can reuse this.
    pub(crate) fn parse_variable_declaration(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.current_location();
        let kind = match self.peek() {
            Token::Var(_) => VarKind::Var,
            Token::Let(_) => VarKind::Let,
            Token::Const(_) => VarKind::Const,
            other => {
                return Err(self.error_here(format!(
                    "Expected 'var', 'let' or 'const', found {}",
                    other
                )))
            }
        };
        self.advance();

        let mut declarators = Vec::new();
        loop {
            let name = self.expect_identifier()?;
            let init = if self.match_token(&Token::Eq(self.current_location())) {
                Some(self.parse_assignment_expression()?)
            } else {
                None
            };
            declarators.push(Declarator { name, init });

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(Stmt::VarDecl {
            kind,
            declarators,
            origin: Origin::Source(loc),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_statement(source: &str) -> Stmt {
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();
        match program.items.into_iter().next() {
            Some(ModuleItem::Stmt(stmt)) => stmt,
            other => panic!("Expected statement, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_declarators() {
        match first_statement("let a = 1, b, c = a + 2;") {
            Stmt::VarDecl {
                kind, declarators, ..
            } => {
                assert_eq!(kind, VarKind::Let);
                let names: Vec<&str> = declarators.iter().map(|d| d.name.as_str()).collect();
                assert_eq!(names, vec!["a", "b", "c"]);
                assert!(declarators[1].init.is_none());
            }
            other => panic!("Expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_rest_parameter() {
        match first_statement("function sum(first, ...others) { return first; }") {
            Stmt::FunctionDecl { function, .. } => {
                assert_eq!(function.params.len(), 2);
                assert!(!function.params[0].rest);
                assert!(function.params[1].rest);
            }
            other => panic!("Expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_function_declaration_requires_name() {
        let mut parser = Parser::new("function () {}").unwrap();
        assert!(parser.parse_program().is_err());
    }
}
