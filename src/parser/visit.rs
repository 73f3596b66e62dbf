//! Read-only AST traversal
//!
//! [`Visit`] has one hook per node family. Every hook defaults to the
//! matching `walk_*` function, which visits the children in source order, so
//! an implementor overrides only what it cares about and calls `walk_*` to
//! keep descending. Returning without walking prunes the subtree, which is
//! how collectors stop at nested function boundaries.

use crate::parser::ast::*;

pub trait Visit {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    fn visit_function(&mut self, function: &Function) {
        walk_function(self, function);
    }

    /// Called for every name introduced by a declaration or parameter
    fn visit_binding(&mut self, _name: &str) {}
}

pub fn walk_stmt<V: Visit + ?Sized>(v: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::VarDecl { declarators, .. } => {
            for declarator in declarators {
                v.visit_binding(&declarator.name);
                if let Some(init) = &declarator.init {
                    v.visit_expr(init);
                }
            }
        }
        Stmt::FunctionDecl { function, .. } => {
            if let Some(name) = &function.name {
                v.visit_binding(name);
            }
            v.visit_function(function);
        }
        Stmt::Expression { expr, .. } => v.visit_expr(expr),
        Stmt::Return { argument, .. } => {
            if let Some(argument) = argument {
                v.visit_expr(argument);
            }
        }
        Stmt::If {
            test,
            consequent,
            alternate,
            ..
        } => {
            v.visit_expr(test);
            v.visit_stmt(consequent);
            if let Some(alternate) = alternate {
                v.visit_stmt(alternate);
            }
        }
        Stmt::While { test, body, .. } => {
            v.visit_expr(test);
            v.visit_stmt(body);
        }
        Stmt::DoWhile { body, test, .. } => {
            v.visit_stmt(body);
            v.visit_expr(test);
        }
        Stmt::For {
            init,
            test,
            update,
            body,
            ..
        } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            if let Some(test) = test {
                v.visit_expr(test);
            }
            if let Some(update) = update {
                v.visit_expr(update);
            }
            v.visit_stmt(body);
        }
        Stmt::Block { body, .. } => {
            for stmt in body {
                v.visit_stmt(stmt);
            }
        }
        Stmt::Break { .. } | Stmt::Continue { .. } | Stmt::Empty { .. } => {}
    }
}

pub fn walk_expr<V: Visit + ?Sized>(v: &mut V, expr: &Expr) {
    match expr {
        Expr::Number(..)
        | Expr::String(..)
        | Expr::Bool(..)
        | Expr::Null(_)
        | Expr::Identifier(..) => {}
        Expr::Array { elements, .. } => {
            for element in elements {
                v.visit_expr(element);
            }
        }
        Expr::Object { properties, .. } => {
            for property in properties {
                match property {
                    Property::KeyValue { value, .. } => v.visit_expr(value),
                    Property::Spread(value) => v.visit_expr(value),
                }
            }
        }
        Expr::Function(function) => v.visit_function(function),
        Expr::Unary { argument, .. }
        | Expr::Update { argument, .. }
        | Expr::Spread { argument, .. } => v.visit_expr(argument),
        Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
            v.visit_expr(left);
            v.visit_expr(right);
        }
        Expr::Assign { target, value, .. } => {
            v.visit_expr(target);
            v.visit_expr(value);
        }
        Expr::Conditional {
            test,
            consequent,
            alternate,
            ..
        } => {
            v.visit_expr(test);
            v.visit_expr(consequent);
            v.visit_expr(alternate);
        }
        Expr::Call {
            callee, arguments, ..
        } => {
            v.visit_expr(callee);
            for argument in arguments {
                v.visit_expr(argument);
            }
        }
        Expr::Member {
            object, property, ..
        } => {
            v.visit_expr(object);
            if let MemberProperty::Computed(index) = property {
                v.visit_expr(index);
            }
        }
        Expr::Sequence { expressions, .. } => {
            for expression in expressions {
                v.visit_expr(expression);
            }
        }
    }
}

pub fn walk_function<V: Visit + ?Sized>(v: &mut V, function: &Function) {
    for param in &function.params {
        v.visit_binding(&param.name);
    }
    match &function.body {
        FunctionBody::Block(stmts) => {
            for stmt in stmts {
                v.visit_stmt(stmt);
            }
        }
        FunctionBody::Expression(expr) => v.visit_expr(expr),
    }
}

/// Every identifier spelled anywhere in a subtree, nested functions included.
/// Used to keep generated names clear of user names.
#[derive(Debug, Default)]
pub struct NameCollector {
    pub names: rustc_hash::FxHashSet<String>,
}

impl Visit for NameCollector {
    fn visit_expr(&mut self, expr: &Expr) {
        if let Expr::Identifier(name, _) = expr {
            self.names.insert(name.clone());
        }
        walk_expr(self, expr);
    }

    fn visit_function(&mut self, function: &Function) {
        if let Some(name) = &function.name {
            self.names.insert(name.clone());
        }
        walk_function(self, function);
    }

    fn visit_binding(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }
}

impl NameCollector {
    pub fn from_function(function: &Function) -> Self {
        let mut collector = NameCollector::default();
        collector.visit_function(function);
        collector
    }
}

/// Declarations hoisted to the top of a function scope: `var` names and
/// function declarations, not looking inside nested functions.
#[derive(Debug, Default)]
pub struct HoistCollector<'a> {
    pub var_names: Vec<&'a str>,
    pub functions: Vec<&'a Function>,
}

impl<'a> HoistCollector<'a> {
    /// Collect from the statements of one function (or program) body.
    /// Function declarations are only hoisted from the body's top level.
    pub fn collect(stmts: &'a [Stmt]) -> Self {
        let mut collector = HoistCollector::default();
        for stmt in stmts {
            if let Stmt::FunctionDecl { function, .. } = stmt {
                collector.functions.push(function);
            }
            collector.walk(stmt);
        }
        collector
    }

    // Lifetime-carrying walk; the Visit trait hands out short borrows only.
    fn walk(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::VarDecl {
                kind: VarKind::Var,
                declarators,
                ..
            } => {
                for declarator in declarators {
                    if !self.var_names.contains(&declarator.name.as_str()) {
                        self.var_names.push(&declarator.name);
                    }
                }
            }
            Stmt::If {
                consequent,
                alternate,
                ..
            } => {
                self.walk(consequent);
                if let Some(alternate) = alternate {
                    self.walk(alternate);
                }
            }
            Stmt::While { body, .. } | Stmt::DoWhile { body, .. } => self.walk(body),
            Stmt::For { init, body, .. } => {
                if let Some(init) = init {
                    self.walk(init);
                }
                self.walk(body);
            }
            Stmt::Block { body, .. } => {
                for stmt in body {
                    self.walk(stmt);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse::Parser;

    fn export_function(source: &str) -> Function {
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();
        program
            .items
            .into_iter()
            .find_map(|item| match item {
                ModuleItem::ExportDefault {
                    declaration: ExportDefault::Function(f),
                    ..
                } => Some(f),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_name_collector_sees_nested_functions() {
        let f = export_function(
            "export default function f(a) { const g = (x) => x + _uid; return g(a); }",
        );
        let names = NameCollector::from_function(&f).names;
        for expected in ["f", "a", "g", "x", "_uid"] {
            assert!(names.contains(expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_hoist_collector_skips_nested_functions() {
        let f = export_function(
            "export default function f() {\n\
               if (true) { var a = 1; }\n\
               for (var i = 0; i < 1; i++) {}\n\
               let b = 2;\n\
               function inner() { var hidden = 3; }\n\
               return a;\n\
             }",
        );
        let hoisted = HoistCollector::collect(f.statements());
        assert_eq!(hoisted.var_names, vec!["a", "i"]);
        assert_eq!(hoisted.functions.len(), 1);
        assert_eq!(hoisted.functions[0].name.as_deref(), Some("inner"));
    }
}
