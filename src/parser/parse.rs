//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, semicolon insertion and the
//!   top-level `export default` handling
//! - `declarations`: function declarations, parameters and `var`/`let`/`const`
//! - `statements`: statements (if, while, for, etc.)
//! - `expressions`: expressions with precedence climbing, arrows included
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.
//!
//! Every node is tagged [`Origin::Source`] with the location of its first
//! token.

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token};
use thiserror::Error;

/// Parser error type
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Parse error at line {}, column {}: {message}", .location.line, .location.column)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Recursive descent parser for the JavaScript subset
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
        })
    }

    /// Parse the entire source unit
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        while !self.is_at_end() {
            let item = if matches!(self.peek(), Token::Export(_)) {
                self.parse_export_default()?
            } else {
                ModuleItem::Stmt(self.parse_statement()?)
            };
            program.items.push(item);
        }

        Ok(program)
    }

    /// Parse `export default function ...` or `export default <expr>;`
    fn parse_export_default(&mut self) -> Result<ModuleItem, ParseError> {
        let loc = self.current_location();
        self.advance(); // 'export'
        self.expect_token(
            &Token::Default(self.current_location()),
            "Expected 'default' after 'export'",
        )?;

        let declaration = if matches!(self.peek(), Token::Function(_)) {
            let fn_loc = self.current_location();
            self.advance();
            let function = self.parse_function_rest(fn_loc, false)?;
            ExportDefault::Function(function)
        } else {
            let expr = self.parse_assignment_expression()?;
            self.consume_semicolon("after export default expression")?;
            ExportDefault::Expression(expr)
        };

        Ok(ModuleItem::ExportDefault {
            declaration,
            origin: Origin::Source(loc),
        })
    }

    // ===== Helper methods =====

    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    pub(crate) fn peek(&self) -> &Token {
        // The lexer always terminates the stream with Eof and advance() never
        // moves past it
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    /// Whether a line break separates the previous token from the next one
    pub(crate) fn newline_before_current(&self) -> bool {
        self.position > 0 && self.current_location().line > self.previous().location().line
    }

    pub(crate) fn error_here(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            location: self.current_location(),
        }
    }

    pub(crate) fn expect_token(
        &mut self,
        token: &Token,
        message: &str,
    ) -> Result<(), ParseError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(format!("{}, found {}", message, self.peek())))
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::LParen(self.current_location()),
            &format!("Expected '(' {ctx}"),
        )
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RParen(self.current_location()),
            &format!("Expected ')' {ctx}"),
        )
    }

    pub(crate) fn expect_lbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::LBrace(self.current_location()),
            &format!("Expected '{{' {ctx}"),
        )
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RBrace(self.current_location()),
            &format!("Expected '}}' {ctx}"),
        )
    }

    /// Consume a `;`, or accept its absence where automatic semicolon
    /// insertion applies: before `}`, at end of input, or after a line break.
    pub(crate) fn consume_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        if self.match_token(&Token::Semicolon(self.current_location())) {
            return Ok(());
        }
        if matches!(self.peek(), Token::RBrace(_) | Token::Eof(_))
            || self.newline_before_current()
        {
            return Ok(());
        }
        Err(self.error_here(format!("Expected ';' {ctx}, found {}", self.peek())))
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let Token::Ident(name, _) = self.peek() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.error_here(format!("Expected identifier, found {}", self.peek())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        let mut parser = Parser::new(source).unwrap();
        parser.parse_program().unwrap()
    }

    #[test]
    fn test_parse_default_export_function() {
        let program = parse("export default function f(a, b) { return a + b; }");

        assert_eq!(program.items.len(), 1);
        match &program.items[0] {
            ModuleItem::ExportDefault {
                declaration: ExportDefault::Function(function),
                origin,
            } => {
                assert_eq!(function.name.as_deref(), Some("f"));
                assert_eq!(function.param_names(), vec!["a", "b"]);
                assert_eq!(function.statements().len(), 1);
                assert_eq!(origin.line(), Some(1));
                assert_eq!(function.body_origin.location(), Some(SourceLocation::new(1, 33)));
            }
            other => panic!("Expected default export, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_prelude_and_export() {
        let program = parse("const K = 2;\nfunction helper(x) { return x * K; }\nexport default function main() { return helper(3); }");

        assert_eq!(program.items.len(), 3);
        assert!(matches!(program.items[0], ModuleItem::Stmt(Stmt::VarDecl { .. })));
        assert!(matches!(program.items[1], ModuleItem::Stmt(Stmt::FunctionDecl { .. })));
        assert_eq!(program.default_exports().count(), 1);
    }

    #[test]
    fn test_parse_export_default_expression() {
        let program = parse("export default 42");
        match &program.items[0] {
            ModuleItem::ExportDefault {
                declaration: ExportDefault::Expression(Expr::Number(n, _)),
                ..
            } => assert_eq!(*n, 42.0),
            other => panic!("Expected expression export, got {:?}", other),
        }
    }

    #[test]
    fn test_semicolon_insertion() {
        let program = parse("let a = 1\nlet b = 2\nexport default function f() { return a + b }");
        assert_eq!(program.items.len(), 3);
    }

    #[test]
    fn test_missing_semicolon_on_same_line() {
        let mut parser = Parser::new("let a = 1 let b = 2").unwrap();
        let err = parser.parse_program().unwrap_err();
        assert_eq!(err.location, SourceLocation::new(1, 11));
        assert!(err.to_string().starts_with("Parse error at line 1, column 11"));
    }
}
