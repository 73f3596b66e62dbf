//! JavaScript code generation
//!
//! Prints a tree (parsed or instrumented) back to source text: two-space
//! indentation, double-quoted strings, integral numbers without a fraction,
//! and only the parentheses precedence requires. Expression statements that
//! would start with `{` or `function` are parenthesized so they re-parse as
//! expressions.

mod expressions;

use crate::parser::ast::*;

pub use expressions::is_identifier_name;

/// Print a whole source unit; every top-level item ends with a newline
pub fn print_program(program: &Program) -> String {
    let mut printer = Printer::new();
    for item in &program.items {
        match item {
            ModuleItem::Stmt(stmt) => printer.statement(stmt),
            ModuleItem::ExportDefault { declaration, .. } => {
                printer.write("export default ");
                match declaration {
                    ExportDefault::Function(function) => printer.function(function),
                    ExportDefault::Expression(expr) => {
                        printer.expr(expr, expressions::PREC_ASSIGN);
                        printer.write(";");
                    }
                }
                printer.write("\n");
            }
        }
    }
    printer.finish()
}

/// Print statements at indentation level 0, one per line
pub fn print_statements(stmts: &[Stmt]) -> String {
    let mut printer = Printer::new();
    for stmt in stmts {
        printer.statement(stmt);
    }
    printer.finish()
}

/// Print a function (declaration form when named) without trailing newline
pub fn print_function(function: &Function) -> String {
    let mut printer = Printer::new();
    printer.function(function);
    printer.finish()
}

pub fn print_expression(expr: &Expr) -> String {
    let mut printer = Printer::new();
    printer.expr(expr, expressions::PREC_SEQUENCE);
    printer.finish()
}

/// Number to text the way JavaScript's `String(n)` spells common values
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

/// Double-quoted JavaScript string literal
pub fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\u{b}' => out.push_str("\\v"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

pub(crate) struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
        }
    }

    fn finish(self) -> String {
        self.out
    }

    pub(crate) fn write(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    /// A statement on its own line(s) at the current indentation
    fn statement(&mut self, stmt: &Stmt) {
        self.write_indent();
        self.statement_inline(stmt);
        self.write("\n");
    }

    /// A statement starting at the current position, without trailing newline
    fn statement_inline(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VarDecl {
                kind, declarators, ..
            } => {
                self.var_decl(*kind, declarators);
                self.write(";");
            }
            Stmt::FunctionDecl { function, .. } => self.function(function),
            Stmt::Expression { expr, .. } => {
                let text = print_expression(expr);
                // Keep the statement from parsing as a block or declaration
                if text.starts_with('{') || text.starts_with("function") {
                    self.write("(");
                    self.expr(expr, expressions::PREC_SEQUENCE);
                    self.write(")");
                } else {
                    self.expr(expr, expressions::PREC_SEQUENCE);
                }
                self.write(";");
            }
            Stmt::Return { argument, .. } => match argument {
                Some(argument) => {
                    self.write("return ");
                    self.expr(argument, expressions::PREC_SEQUENCE);
                    self.write(";");
                }
                None => self.write("return;"),
            },
            Stmt::If {
                test,
                consequent,
                alternate,
                ..
            } => {
                self.write("if (");
                self.expr(test, expressions::PREC_SEQUENCE);
                self.write(") ");
                self.statement_inline(consequent);
                if let Some(alternate) = alternate {
                    if matches!(**consequent, Stmt::Block { .. }) {
                        self.write(" else ");
                    } else {
                        self.write("\n");
                        self.write_indent();
                        self.write("else ");
                    }
                    self.statement_inline(alternate);
                }
            }
            Stmt::While { test, body, .. } => {
                self.write("while (");
                self.expr(test, expressions::PREC_SEQUENCE);
                self.write(") ");
                self.statement_inline(body);
            }
            Stmt::DoWhile { body, test, .. } => {
                self.write("do ");
                self.statement_inline(body);
                if matches!(**body, Stmt::Block { .. }) {
                    self.write(" ");
                } else {
                    self.write("\n");
                    self.write_indent();
                }
                self.write("while (");
                self.expr(test, expressions::PREC_SEQUENCE);
                self.write(");");
            }
            Stmt::For {
                init,
                test,
                update,
                body,
                ..
            } => {
                self.write("for (");
                match init.as_deref() {
                    Some(Stmt::VarDecl {
                        kind, declarators, ..
                    }) => self.var_decl(*kind, declarators),
                    Some(Stmt::Expression { expr, .. }) => {
                        self.expr(expr, expressions::PREC_SEQUENCE)
                    }
                    _ => {}
                }
                self.write(";");
                if let Some(test) = test {
                    self.write(" ");
                    self.expr(test, expressions::PREC_SEQUENCE);
                }
                self.write(";");
                if let Some(update) = update {
                    self.write(" ");
                    self.expr(update, expressions::PREC_SEQUENCE);
                }
                self.write(") ");
                self.statement_inline(body);
            }
            Stmt::Block { body, .. } => self.block(body),
            Stmt::Break { .. } => self.write("break;"),
            Stmt::Continue { .. } => self.write("continue;"),
            Stmt::Empty { .. } => self.write(";"),
        }
    }

    fn var_decl(&mut self, kind: VarKind, declarators: &[Declarator]) {
        self.write(kind.as_str());
        self.write(" ");
        for (i, declarator) in declarators.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(&declarator.name);
            if let Some(init) = &declarator.init {
                self.write(" = ");
                self.expr(init, expressions::PREC_ASSIGN);
            }
        }
    }

    /// `{}` or a braced, indented statement list
    fn block(&mut self, body: &[Stmt]) {
        if body.is_empty() {
            self.write("{}");
            return;
        }
        self.write("{\n");
        self.indent += 1;
        for stmt in body {
            self.statement(stmt);
        }
        self.indent -= 1;
        self.write_indent();
        self.write("}");
    }

    pub(crate) fn params(&mut self, params: &[Param]) {
        self.write("(");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            if param.rest {
                self.write("...");
            }
            self.write(&param.name);
        }
        self.write(")");
    }

    /// `function name(params) { ... }` or an arrow
    pub(crate) fn function(&mut self, function: &Function) {
        if function.is_arrow {
            self.params(&function.params);
            self.write(" => ");
        } else {
            self.write("function ");
            if let Some(name) = &function.name {
                self.write(name);
            }
            self.params(&function.params);
            self.write(" ");
        }

        match &function.body {
            FunctionBody::Block(body) => self.block(body),
            FunctionBody::Expression(expr) => {
                if matches!(**expr, Expr::Object { .. }) {
                    self.write("(");
                    self.expr(expr, expressions::PREC_ASSIGN);
                    self.write(")");
                } else {
                    self.expr(expr, expressions::PREC_ASSIGN);
                }
            }
        }
    }
}
