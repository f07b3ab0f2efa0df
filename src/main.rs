use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use nimble::ast::Expr;
use nimble::config::{HELP_TEXT, REPL_PROMPT, VERSION, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use nimble::diagnostics::Reporter;
use nimble::highlighter::NimbleHelper;
use nimble::interpreter::Interpreter;
use nimble::lexer::Lexer;
use nimble::parser::{self, ReplParse};
use nimble::resolver;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use tracing_subscriber::EnvFilter;

/// A small tree-walking interpreter.
#[derive(Parser, Debug)]
#[command(name = "nimble")]
#[command(version = VERSION)]
#[command(about = "A tree-walking interpreter for the nimble scripting language")]
#[command(after_help = HELP_TEXT)]
struct CliArgs {
    /// Script file to execute (.nbl or .nimble). Omit for the REPL.
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Log verbosity passed to the tracing subscriber (e.g. "debug", "nimble=trace").
    #[arg(long = "log", value_name = "FILTER")]
    log: Option<String>,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(args.log.as_deref());

    match args.script {
        Some(path) => run_script(&path),
        None => {
            run_repl();
            ExitCode::SUCCESS
        }
    }
}

fn init_logging(filter: Option<&str>) {
    let filter = filter
        .map(|f| f.to_string())
        .unwrap_or_else(|| "nimble=warn".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Runs a `.nbl`/`.nimble` script file and maps the outcome to the process
/// exit codes in spec.md §6: 0 normal, 1 usage error, 2 compile-time error,
/// 3 runtime error.
fn run_script(path: &PathBuf) -> ExitCode {
    let has_valid_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "nbl" || ext == "nimble")
        .unwrap_or(false);

    if !has_valid_extension {
        eprintln!("Usage: nimble [script.nbl|script.nimble]");
        return ExitCode::from(1);
    }

    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Could not read '{}': {}", path.display(), e);
            return ExitCode::from(1);
        }
    };

    let mut reporter = Reporter::new();
    let tokens = Lexer::new(&source).scan_tokens(&mut reporter);
    let stmts = parser::parse(tokens, &mut reporter);
    let locals = resolver::resolve(&stmts, &mut reporter);

    if reporter.had_error() {
        for error in reporter.errors() {
            eprintln!("[line {}] Error: {}", error.line, error.message);
        }
        return ExitCode::from(2);
    }

    let mut interpreter = Interpreter::new();
    interpreter.add_locals(locals);

    match interpreter.interpret(&stmts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}\nOn line {}", e.message, e.line);
            ExitCode::from(3)
        }
    }
}

fn run_repl() {
    let config = Config::builder().auto_add_history(true).build();
    let mut rl = match Editor::with_config(config) {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Failed to initialize REPL: {}", e);
            return;
        }
    };
    rl.set_helper(Some(NimbleHelper::new()));

    let history_file = ".nimble_history";
    let _ = rl.load_history(history_file);

    println!("{} {}", WELCOME_MESSAGE, VERSION);
    println!("{}", WELCOME_SUBTITLE);

    let mut interpreter = Interpreter::new();

    loop {
        match rl.readline(REPL_PROMPT) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                run_repl_line(&mut interpreter, &line);
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    let _ = rl.save_history(history_file);
}

fn run_repl_line(interpreter: &mut Interpreter, line: &str) {
    let mut reporter = Reporter::new();
    let tokens = Lexer::new(line).scan_tokens(&mut reporter);
    let parsed = parser::parse_repl(tokens, &mut reporter);

    if reporter.had_error() {
        println!("Invalid syntax error");
        return;
    }

    match parsed {
        ReplParse::Expression(expr) => eval_repl_expr(interpreter, &expr),
        ReplParse::Statements(stmts) => {
            let locals = resolver::resolve(&stmts, &mut reporter);
            if reporter.had_error() {
                println!("Invalid syntax error");
                return;
            }
            interpreter.add_locals(locals);
            if let Err(e) = interpreter.interpret(&stmts) {
                println!("{}\nOn line {}", e.message, e.line);
            }
        }
    }
}

fn eval_repl_expr(interpreter: &mut Interpreter, expr: &Expr) {
    let mut reporter = Reporter::new();
    let locals = resolver::resolve_expr_for_repl(expr, &mut reporter);
    if reporter.had_error() {
        println!("Invalid syntax error");
        return;
    }
    interpreter.add_locals(locals);

    match interpreter.interpret_expr(expr) {
        Ok(value) => println!("{}", value),
        Err(e) => println!("{}\nOn line {}", e.message, e.line),
    }
}
