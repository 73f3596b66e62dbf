//! Source text to trace, end to end
//!
//! parse → instrument → load into a fresh interpreter → call the entry →
//! detach the result. The binary and the integration tests both go through
//! here.

use crate::config::TraceConfig;
use crate::error::Result;
use crate::instrument::{InstrumentOptions, InstrumentedProgram, Instrumenter};
use crate::interpreter::{ConsoleLine, Interpreter};
use crate::memory::Value;
use crate::parser::parse_program;
use crate::trace::TraceOutput;

/// Everything a traced run produced
#[derive(Debug, Clone)]
pub struct TraceRun {
    pub instrumented: InstrumentedProgram,
    pub output: TraceOutput,
    /// `console.log` lines, from the top level and the call
    pub console: Vec<ConsoleLine>,
}

/// Parse and instrument `source`
pub fn instrument_source(source: &str, options: &InstrumentOptions) -> Result<InstrumentedProgram> {
    let program = parse_program(source)?;
    tracing::info!(items = program.items.len(), "parsed source");
    let instrumented = Instrumenter::new(options.clone()).instrument(program, source)?;
    tracing::info!(
        function = %instrumented.function_name,
        rewrites = instrumented.stats.total(),
        "instrumented"
    );
    Ok(instrumented)
}

/// Instrument `source`, call its entry with `args` and collect the trace
pub fn run_source(source: &str, args: Vec<Value>, config: &TraceConfig) -> Result<TraceRun> {
    let instrumented = instrument_source(source, &config.instrument)?;

    let mut interpreter = Interpreter::new(config.limits);
    interpreter.load(instrumented.clone().into_program())?;
    let result = interpreter.call_default_export(args)?;
    tracing::info!(statements = interpreter.steps_executed(), "executed entry");

    let output = TraceOutput::from_value(&result)?;
    tracing::info!(steps = output.steps.len(), "extracted trace");

    Ok(TraceRun {
        instrumented,
        output,
        console: interpreter.console().lines.clone(),
    })
}

/// Run `source` without instrumentation and return its default export's result
pub fn run_uninstrumented(source: &str, args: Vec<Value>, config: &TraceConfig) -> Result<Value> {
    let program = parse_program(source)?;
    let mut interpreter = Interpreter::new(config.limits);
    interpreter.load(program)?;
    Ok(interpreter.call_default_export(args)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::instrument::InstrumentError;
    use crate::trace::TraceValue;

    #[test]
    fn test_run_source() {
        let run = run_source(
            "export default function f(a) {\n  console.log(a);\n  return a * 2;\n}",
            vec![Value::Number(4.0)],
            &TraceConfig::default(),
        )
        .unwrap();
        assert_eq!(run.output.return_value, TraceValue::Number(8.0));
        assert_eq!(run.console.len(), 1);
        assert_eq!(run.console[0].text, "4");
        assert_eq!(run.output.code, "function f(a) {\n  console.log(a);\n  return a * 2;\n}");
    }

    #[test]
    fn test_errors_are_wrapped_per_stage() {
        let config = TraceConfig::default();
        assert!(matches!(
            run_source("export default function f( {", Vec::new(), &config),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            run_source("const a = 1;", Vec::new(), &config),
            Err(Error::Instrument(InstrumentError::MissingDefaultExport))
        ));
        assert!(matches!(
            run_source("export default function f() { return x; }", Vec::new(), &config),
            Err(Error::Runtime(_))
        ));
    }

    #[test]
    fn test_uninstrumented_matches() {
        let source = "export default function f(n) { let s = 0; for (let i = 1; i <= n; i++) s += i; return s; }";
        let config = TraceConfig::default();
        let plain = run_uninstrumented(source, vec![Value::Number(4.0)], &config).unwrap();
        let traced = run_source(source, vec![Value::Number(4.0)], &config).unwrap();
        assert_eq!(plain, Value::Number(10.0));
        assert_eq!(traced.output.return_value, TraceValue::Number(10.0));
    }
}
