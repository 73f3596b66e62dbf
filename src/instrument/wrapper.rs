//! Wrapper assembly: the scaffold around the rewritten function.
//!
//! ```text
//! function __trace(context, step) {
//!   if (step.incrementCallCount) {
//!     context.callCount++;
//!   }
//!   context.steps.push({ callCount: context.callCount, ...step });
//! }
//! let __context;
//! function NAME(PARAMS) { ...rewritten body... }
//! export default function (...args) {
//!   __context = { steps: [], callCount: 0 };
//!   const __returnValue = NAME(...args);
//!   return { steps: __context.steps, returnValue: __returnValue, code: "..." };
//! }
//! ```
//!
//! The rewritten function stays at module level, where the statements
//! around the export can still call it. A fresh trace context is stored in
//! the module's context slot on every call of the entry, and handed to
//! every recorder call by reference.

use super::synth;
use crate::parser::ast::*;

/// Local holding the traced function's result inside the entry
pub const RETURN_VALUE_NAME: &str = "__returnValue";
/// Rest parameter of the entry
pub const ARGS_NAME: &str = "args";

/// `function __trace(context, step) { ... }`
pub fn recorder_function(recorder_name: &str) -> Stmt {
    let context = || synth::ident("context");
    let step = || synth::ident("step");

    let increment = Stmt::If {
        test: synth::member(step(), "incrementCallCount"),
        consequent: Box::new(synth::block(vec![synth::expr_stmt(Expr::Update {
            op: UpdateOp::Increment,
            prefix: false,
            argument: Box::new(synth::member(context(), "callCount")),
            origin: Origin::Synthesized,
        })])),
        alternate: None,
        origin: Origin::Synthesized,
    };

    let push = synth::expr_stmt(synth::call(
        synth::member(synth::member(context(), "steps"), "push"),
        vec![synth::object(vec![
            synth::property("callCount", synth::member(context(), "callCount")),
            Property::Spread(step()),
        ])],
    ));

    let function = synth::function(
        Some(recorder_name),
        vec![synth::param("context"), synth::param("step")],
        vec![increment, push],
    );
    Stmt::FunctionDecl {
        function,
        origin: Origin::Synthesized,
    }
}

/// `let __context;`, the slot each entry call fills with a fresh context
pub fn context_slot(context_name: &str) -> Stmt {
    synth::let_decl(context_name)
}

/// The exported entry that calls the rewritten function `function_name`
pub fn entry_function(context_name: &str, function_name: &str, code: &str) -> Function {
    let reset = synth::expr_stmt(synth::assign(
        context_name,
        synth::object(vec![
            synth::property("steps", synth::array(Vec::new())),
            synth::property("callCount", synth::number(0.0)),
        ]),
    ));

    let call = synth::const_decl(
        RETURN_VALUE_NAME,
        synth::call(
            synth::ident(function_name),
            vec![synth::spread(synth::ident(ARGS_NAME))],
        ),
    );

    let result = synth::return_stmt(synth::object(vec![
        synth::property("steps", synth::member(synth::ident(context_name), "steps")),
        synth::property("returnValue", synth::ident(RETURN_VALUE_NAME)),
        synth::property("code", synth::string(code)),
    ]));

    synth::function(
        None,
        vec![synth::rest_param(ARGS_NAME)],
        vec![reset, call, result],
    )
}

/// The source text reported as `code`: a leading `export default ` is
/// removed (after any leading whitespace) and line breaks are kept, so line
/// numbers in steps still point into it.
pub fn strip_export_default(source: &str) -> String {
    let trimmed = source.trim_start();
    let leading = &source[..source.len() - trimmed.len()];
    match trimmed.strip_prefix("export default ") {
        Some(rest) => format!("{leading}{rest}"),
        None => source.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{print_function, print_statements};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_recorder_shape() {
        let code = print_statements(&[recorder_function("__trace")]);
        assert_eq!(
            code,
            "function __trace(context, step) {\n\
             \x20 if (step.incrementCallCount) {\n\
             \x20   context.callCount++;\n\
             \x20 }\n\
             \x20 context.steps.push({ callCount: context.callCount, ...step });\n\
             }\n"
        );
    }

    #[test]
    fn test_context_slot() {
        assert_eq!(print_statements(&[context_slot("ctx")]), "let ctx;\n");
    }

    #[test]
    fn test_entry_shape() {
        let entry = entry_function("__context", "f", "function f(a) {}");
        assert_eq!(
            print_function(&entry),
            "function (...args) {\n\
             \x20 __context = { steps: [], callCount: 0 };\n\
             \x20 const __returnValue = f(...args);\n\
             \x20 return { steps: __context.steps, returnValue: __returnValue, code: \"function f(a) {}\" };\n\
             }"
        );
    }

    #[test]
    fn test_strip_export_default() {
        assert_eq!(
            strip_export_default("export default function f() {}"),
            "function f() {}"
        );
        assert_eq!(
            strip_export_default("\n\nexport default function f() {}\n"),
            "\n\nfunction f() {}\n"
        );
        assert_eq!(strip_export_default("const x = 1;"), "const x = 1;");
    }
}
