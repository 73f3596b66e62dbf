// Instrumenter output: structure, idempotency, printed code

use pretty_assertions::assert_eq;
use trace_context::config::TraceConfig;
use trace_context::instrument::{InstrumentError, InstrumentOptions, Instrumenter};
use trace_context::memory::Value;
use trace_context::parser::ast::{ExportDefault, FunctionBody, ModuleItem, Program};
use trace_context::parser::parse_program;
use trace_context::pipeline::{instrument_source, run_source, run_uninstrumented};
use trace_context::trace::{TraceOutput, TraceValue};

const LOOPS: &str = "export default function f(n) {
  let total = 0;
  for (let i = 0; i < n; i = i + 1) {
    if (i % 2 === 0) {
      total += i;
    } else {
      let skipped = i;
    }
  }
  do {
    n -= 1;
  } while (n > 0);
  return total;
}";

fn instrument(source: &str) -> Result<String, InstrumentError> {
    let program = parse_program(source).unwrap();
    Instrumenter::new(InstrumentOptions::default())
        .instrument(program, source)
        .map(|p| p.to_source())
}

#[test]
fn test_rewriting_instrumented_body_changes_nothing() {
    let first = instrument_source(LOOPS, &InstrumentOptions::default()).unwrap();
    let traced = first.traced_function().clone();

    let program = Program {
        items: vec![ModuleItem::ExportDefault {
            declaration: ExportDefault::Function(traced.clone()),
            origin: traced.origin,
        }],
    };
    // Fresh scaffold names, since the first pass's names are now in use
    let options = InstrumentOptions {
        recorder_name: "__trace2".to_string(),
        context_name: "__context2".to_string(),
        ..InstrumentOptions::default()
    };
    let second = Instrumenter::new(options).instrument(program, "").unwrap();

    assert_eq!(second.stats.total(), 0);
    assert!(second.stats.skipped > 0);

    let FunctionBody::Block(body) = &second.traced_function().body else {
        panic!("expected a block body");
    };
    // Only the new entry step is added in front
    assert_eq!(&body[1..], traced.statements());
}

#[test]
fn test_printed_output_runs_like_the_ast() {
    let config = TraceConfig::default();
    let run = run_source(LOOPS, vec![Value::Number(5.0)], &config).unwrap();

    let printed = run.instrumented.to_source();
    let result = run_uninstrumented(&printed, vec![Value::Number(5.0)], &config).unwrap();
    let reparsed = TraceOutput::from_value(&result).unwrap();

    assert_eq!(reparsed, run.output);
}

#[test]
fn test_stats_count_every_rule() {
    let instrumented = instrument_source(LOOPS, &InstrumentOptions::default()).unwrap();
    let stats = instrumented.stats;
    // total, skipped
    assert_eq!(stats.declarations, 2);
    // total += i, n -= 1
    assert_eq!(stats.assignments, 2);
    // for, if, do-while
    assert_eq!(stats.tests, 3);
    assert_eq!(stats.updates, 1);
    assert_eq!(stats.returns, 1);
}

#[test]
fn test_names_outside_their_block_report_undefined() {
    let code = instrument(LOOPS).unwrap();
    // Inside the else branch
    assert!(code.contains(
        "__trace(__context, { line: 7, context: { n: n, total: total, i: i, skipped: skipped } });"
    ));
    // After the loop
    assert!(code.contains(
        "__trace(__context, { line: 11, context: { n: n, total: total, i: undefined, skipped: undefined } });"
    ));
    assert!(!code.contains("typeof"));
}

const REDECLARED: &str = "export default function f(x) {
  if (x) {
    let t = 1;
  }
  x = 2;
  let t = 3;
  return t;
}";

#[test]
fn test_uninitialized_binding_is_never_read() {
    let code = instrument(REDECLARED).unwrap();

    // `t` is uninitialized between its first block and its second declaration
    let start = code.find("x = 2;").unwrap();
    let end = code.find("let t = 3;").unwrap();
    assert!(code[start..end].contains("context: { x: x, t: undefined }"));
    assert!(!code[start..end].contains("t: t"));
    assert!(code[end..].contains("line: 6, context: { x: x, t: t }"));

    let run = run_source(REDECLARED, vec![Value::Number(1.0)], &TraceConfig::default()).unwrap();
    assert_eq!(run.output.return_value, TraceValue::Number(3.0));
    let assign = run.output.steps.iter().find(|s| s.line == 5).unwrap();
    assert_eq!(assign.context.get("t"), Some(&TraceValue::Undefined));
}

#[test]
fn test_custom_names_in_output() {
    let source = "export default function f(a) {\n  return a;\n}";
    let options = InstrumentOptions {
        recorder_name: "record".to_string(),
        context_name: "ctx".to_string(),
        temp_prefix: "ret".to_string(),
        ..InstrumentOptions::default()
    };
    let code = instrument_source(source, &options).unwrap().to_source();

    assert!(code.starts_with("function record(context, step) {"));
    assert!(code.contains("let ctx;\nfunction f(a) {"));
    assert!(code.contains("  ctx = { steps: [], callCount: 0 };"));
    assert!(code.contains("const _ret = a;"));
    assert!(code.contains("record(ctx, { line: 2, context: { a: a }, returnValue: _ret });"));
}

#[test]
fn test_prelude_precedes_scaffold() {
    let source = "const LIMIT = 2;\nfunction helper(x) { return x * LIMIT; }\nexport default function f(a) {\n  return helper(a);\n}";
    let code = instrument(source).unwrap();

    let limit = code.find("const LIMIT").unwrap();
    let helper = code.find("function helper").unwrap();
    let recorder = code.find("function __trace").unwrap();
    assert!(limit < helper && helper < recorder);
    // Helpers are not instrumented
    assert!(code.contains("function helper(x) {\n  return x * LIMIT;\n}"));

    let run = run_source(source, vec![Value::Number(4.0)], &TraceConfig::default()).unwrap();
    assert_eq!(run.output.return_value.as_number(), Some(8.0));
    assert_eq!(run.output.steps.len(), 2);
}

#[test]
fn test_code_field_is_original_source() {
    let source = "\n  export default function f() {\n  return 1;\n}\n";
    let instrumented = instrument_source(source, &InstrumentOptions::default()).unwrap();
    assert_eq!(instrumented.code, "\n  function f() {\n  return 1;\n}\n");
}

#[test]
fn test_rejected_inputs() {
    assert_eq!(
        instrument("function f() {}"),
        Err(InstrumentError::MissingDefaultExport)
    );
    assert_eq!(
        instrument("export default function f() {}\nexport default function g() {}"),
        Err(InstrumentError::MultipleDefaultExports { count: 2 })
    );
    assert_eq!(
        instrument("export default 42;"),
        Err(InstrumentError::NotAFunction { line: 1 })
    );
    assert_eq!(
        instrument("export default function () {}"),
        Err(InstrumentError::AnonymousFunction { line: 1 })
    );
    assert_eq!(
        instrument("export default function f() {\n  let __context = 1;\n}"),
        Err(InstrumentError::ReservedName {
            name: "__context".to_string()
        })
    );
}
