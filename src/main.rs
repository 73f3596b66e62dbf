// trace-context: step-tracing instrumentation for JavaScript functions

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use eyre::{eyre, Result, WrapErr};
use ratatui::{backend::CrosstermBackend, Terminal};

use trace_context::config::TraceConfig;
use trace_context::instrument::TestSequencing;
use trace_context::logging::init_logging;
use trace_context::memory::Value;
use trace_context::pipeline::{instrument_source, run_source};
use trace_context::trace::value_from_json;
use trace_context::ui::App;

/// Instrumentation and evaluation recurse on the AST, so deep nesting or
/// recursion in the traced code needs more than the default main stack.
const WORKER_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Record every step of a JavaScript function's execution.
#[derive(Parser, Debug)]
#[command(name = "trace-context", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,

    #[command(flatten)]
    opts: TraceOpts,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the instrumented module.
    #[command(visible_alias = "i")]
    Instrument {
        file: PathBuf,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Call the default export and print its trace as JSON.
    #[command(visible_alias = "r")]
    Run {
        file: PathBuf,

        #[command(flatten)]
        call: CallArgs,

        /// Pretty-print the JSON.
        #[arg(long)]
        pretty: bool,
    },

    /// Call the default export and step through its trace.
    #[command(visible_alias = "v")]
    View {
        file: PathBuf,

        #[command(flatten)]
        call: CallArgs,
    },
}

#[derive(Args, Debug)]
struct CallArgs {
    /// Arguments as a JSON array; any other JSON value is passed as the only argument.
    #[arg(short, long, value_name = "JSON")]
    args: Option<String>,
}

impl CallArgs {
    fn values(&self) -> Result<Vec<Value>> {
        let Some(text) = &self.args else {
            return Ok(Vec::new());
        };
        let json: serde_json::Value =
            serde_json::from_str(text).wrap_err("--args is not valid JSON")?;
        Ok(match json {
            serde_json::Value::Array(elements) => elements.iter().map(value_from_json).collect(),
            other => vec![value_from_json(&other)],
        })
    }
}

/// Options shared by every command; flags override the config file.
#[derive(Args, Debug)]
struct TraceOpts {
    /// JSON config file.
    #[arg(long, global = true, env = "TRACE_CONTEXT_CONFIG")]
    config: Option<PathBuf>,

    /// Name of the generated recorder routine.
    #[arg(long, global = true)]
    recorder_name: Option<String>,

    /// Name of the generated context variable.
    #[arg(long, global = true)]
    context_name: Option<String>,

    /// How recorder calls are combined with branch and loop tests.
    #[arg(long, global = true, value_enum)]
    sequencing: Option<TestSequencing>,

    /// Statements to execute before giving up.
    #[arg(long, global = true)]
    max_steps: Option<usize>,

    /// Nested calls allowed before giving up.
    #[arg(long, global = true)]
    max_call_depth: Option<usize>,

    /// Debug-level logging.
    #[arg(short, long, global = true)]
    verbose: bool,
}

impl TraceOpts {
    fn config(&self) -> Result<TraceConfig> {
        let mut config = match &self.config {
            Some(path) => TraceConfig::load(path)?,
            None => TraceConfig::default(),
        };
        if let Some(name) = &self.recorder_name {
            config.instrument.recorder_name = name.clone();
        }
        if let Some(name) = &self.context_name {
            config.instrument.context_name = name.clone();
        }
        if let Some(sequencing) = self.sequencing {
            config.instrument.test_sequencing = sequencing;
        }
        if let Some(max_steps) = self.max_steps {
            config.limits.max_steps = max_steps;
        }
        if let Some(max_call_depth) = self.max_call_depth {
            config.limits.max_call_depth = max_call_depth;
        }
        Ok(config)
    }
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))
}

fn dispatch(cli: Cli) -> Result<()> {
    let config = cli.opts.config()?;

    match cli.cmd {
        Command::Instrument { file, output } => {
            let source = read_source(&file)?;
            let code = instrument_source(&source, &config.instrument)?.to_source();
            match output {
                Some(path) => fs::write(&path, code)
                    .wrap_err_with(|| format!("failed to write {}", path.display()))?,
                None => io::stdout().write_all(code.as_bytes())?,
            }
        }
        Command::Run { file, call, pretty } => {
            let source = read_source(&file)?;
            let run = run_source(&source, call.values()?, &config)?;

            let mut stderr = io::stderr().lock();
            for line in &run.console {
                writeln!(stderr, "{}", line.text)?;
            }

            let json = if pretty {
                serde_json::to_string_pretty(&run.output)?
            } else {
                serde_json::to_string(&run.output)?
            };
            writeln!(io::stdout(), "{}", json)?;
        }
        Command::View { file, call } => {
            let source = read_source(&file)?;
            let run = run_source(&source, call.values()?, &config)?;
            view(App::new(run))?;
        }
    }

    Ok(())
}

fn view(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore the terminal before reporting anything
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.wrap_err("viewer failed")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let tui_mode = matches!(cli.cmd, Command::View { .. });
    let _guard = init_logging(cli.opts.verbose, tui_mode)?;

    std::thread::Builder::new()
        .name("trace-context".to_string())
        .stack_size(WORKER_STACK_SIZE)
        .spawn(move || dispatch(cli))?
        .join()
        .map_err(|_| eyre!("worker thread panicked"))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "trace-context",
            "run",
            "f.js",
            "--sequencing",
            "comma",
            "--max-steps",
            "10",
        ]);
        let config = cli.opts.config().unwrap();
        assert_eq!(config.instrument.test_sequencing, TestSequencing::Comma);
        assert_eq!(config.limits.max_steps, 10);
        assert_eq!(config.instrument.recorder_name, "__trace");
    }

    #[test]
    fn test_call_args() {
        let call = CallArgs {
            args: Some("[2, \"a\"]".to_string()),
        };
        let values = call.values().unwrap();
        assert_eq!(values, vec![Value::Number(2.0), Value::string("a")]);

        let single = CallArgs {
            args: Some("5".to_string()),
        };
        assert_eq!(single.values().unwrap(), vec![Value::Number(5.0)]);

        assert!(CallArgs { args: None }.values().unwrap().is_empty());
        assert!(CallArgs {
            args: Some("[".to_string())
        }
        .values()
        .is_err());
    }
}
