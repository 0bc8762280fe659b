//! Ape CLI
//!
//! Command-line interface for compiling, running, and inspecting Ape
//! programs.

use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process;

use ape_compiler::CompilerConfig;
use ape_runtime::Vm;

#[derive(Parser)]
#[command(name = "ape")]
#[command(about = "Ape language compiler, runtime, and disassembler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a .ape source file (and every file it summons) to .apb bytecode
    Compile {
        /// Source file to compile
        input: PathBuf,
    },
    /// Run a compiled .apb bytecode file
    Run {
        /// Bytecode file to run
        input: PathBuf,
    },
    /// Start an interactive read-eval-print loop
    Repl,
    /// Print a human-readable listing of a compiled .apb bytecode file
    Disassemble {
        /// Bytecode file to disassemble
        input: PathBuf,
    },
}

/// Everything the CLI itself can fail on: a thin wrapper unifying
/// `ape_compiler::CompileError`, `ape_runtime::RuntimeError`, and the CLI's
/// own file-handling `std::io::Error`s, so every command can return one
/// `Result` type and `main` has a single place to turn a failure into an
/// exit code. No `anyhow`/`thiserror`, matching the hand-rolled error
/// enums the rest of the workspace uses.
enum CliError {
    /// Bad invocation: wrong extension, missing file argument, etc.
    Usage(String),
    Compile(ape_compiler::CompileError),
    Runtime(ape_runtime::RuntimeError),
    /// File I/O failure while resolving `compile`'s dependency graph.
    Dependency(String),
    /// Every other file-I/O failure (`run`/`disassemble` reads).
    Io(String),
}

impl CliError {
    /// Exit codes mirror the reference CLI's usage: `64` for a bad
    /// invocation, `65` for a compile-time data error, `70` for a runtime
    /// failure, `71` for a dependency-resolution I/O failure, `74` for
    /// every other file-I/O failure.
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => 64,
            CliError::Compile(_) => 65,
            CliError::Runtime(_) => 70,
            CliError::Dependency(_) => 71,
            CliError::Io(_) => 74,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Usage(msg) => writeln!(f, "Error: {msg}"),
            CliError::Compile(e) => writeln!(f, "Error: {e}"),
            // RuntimeError's own Display already ends in a newline.
            CliError::Runtime(e) => write!(f, "{e}"),
            CliError::Dependency(msg) => writeln!(f, "Error: {msg}"),
            CliError::Io(msg) => writeln!(f, "Error: {msg}"),
        }
    }
}

impl From<ape_compiler::CompileError> for CliError {
    fn from(e: ape_compiler::CompileError) -> Self {
        CliError::Compile(e)
    }
}

impl From<ape_runtime::RuntimeError> for CliError {
    fn from(e: ape_runtime::RuntimeError) -> Self {
        CliError::Runtime(e)
    }
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Compile { input } => compile_command(&input),
        Command::Run { input } => run_command(&input),
        Command::Repl => {
            repl_command();
            Ok(())
        }
        Command::Disassemble { input } => disassemble_command(&input),
    };
    if let Err(err) = result {
        eprint!("{err}");
        process::exit(err.exit_code());
    }
}

fn compile_command(input: &Path) -> Result<(), CliError> {
    if input.extension().and_then(|e| e.to_str()) != Some("ape") {
        return Err(CliError::Usage("input file must have a .ape extension".to_string()));
    }
    let mut processed = HashSet::new();
    compile_with_dependencies(input, &mut processed)
}

/// Compiles `path` and everything it `summon`s, depth-first, before
/// compiling `path` itself, so a module is always available as a `.apb`
/// file by the time something that summons it runs. Ported from the
/// reference `compileWithDependencies`, with an owned `HashSet` standing in
/// for its fixed 1024-slot `processedFiles` array.
fn compile_with_dependencies(path: &Path, processed: &mut HashSet<PathBuf>) -> Result<(), CliError> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if processed.contains(&canonical) {
        return Ok(());
    }
    processed.insert(canonical);

    println!("-> Processing: {}", path.display());
    let source = std::fs::read_to_string(path).map_err(|e| {
        CliError::Dependency(format!("could not read '{}': {e}", path.display()))
    })?;

    for dependency in find_dependencies(&source) {
        let dep_path = path
            .parent()
            .map(|dir| dir.join(&dependency))
            .unwrap_or_else(|| PathBuf::from(&dependency));
        compile_with_dependencies(&dep_path, processed)?;
    }

    println!("=> Compiling: {}", path.display());
    let config = CompilerConfig::new();
    let bytecode = ape_compiler::compile_to_bytes(&source, config)?;

    let output = path.with_extension("apb");
    std::fs::write(&output, &bytecode).map_err(|e| {
        CliError::Dependency(format!("could not write '{}': {e}", output.display()))
    })?;
    println!("   Success: {} -> {}", path.display(), output.display());
    Ok(())
}

/// Scans for `summon "path"` occurrences without a full parse, matching the
/// reference `findDependencies`'s lexer-only two-pass approach.
fn find_dependencies(source: &str) -> Vec<String> {
    let mut deps = Vec::new();
    let mut lexer = ape_compiler::Lexer::new(source);
    let mut previous_was_summon = false;
    loop {
        let token = lexer.scan();
        if token.kind == ape_compiler::TokenKind::Eof {
            break;
        }
        if previous_was_summon && token.kind == ape_compiler::TokenKind::String {
            let text = token.text;
            deps.push(text[1..text.len() - 1].to_string());
        }
        previous_was_summon = token.kind == ape_compiler::TokenKind::Summon;
    }
    deps
}

fn run_command(input: &Path) -> Result<(), CliError> {
    if input.extension().and_then(|e| e.to_str()) != Some("apb") {
        return Err(CliError::Usage("input file must have a .apb extension".to_string()));
    }
    let mut bytecode = std::fs::read(input)
        .map_err(|e| CliError::Io(format!("could not read '{}': {e}", input.display())))?;
    bytecode.push(ape_core::TERMINATOR);

    let stdin = std::io::stdin();
    let mut vm = Vm::new(std::io::stdout(), stdin.lock());
    vm.run_script(bytecode)?;
    Ok(())
}

fn repl_command() {
    println!("Ape Interactive REPL. Type 'exit' to quit.");
    let stdin = std::io::stdin();
    // `stdin.lock()` is a view onto Rust's single globally-buffered stdin
    // stream, not a fresh buffer of its own, so `ask()`'s reads inside the
    // VM and this loop's own prompt reads never race over the same bytes.
    let mut vm = Vm::new(std::io::stdout(), std::io::stdin().lock());
    let mut line = String::new();
    loop {
        print!(">> ");
        let _ = std::io::Write::flush(&mut std::io::stdout());
        line.clear();
        if stdin.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        if line == "exit\n" {
            break;
        }
        if let Err(err) = vm.interpret(&line) {
            eprintln!("{err}");
        }
    }
}

fn disassemble_command(input: &Path) -> Result<(), CliError> {
    if input.extension().and_then(|e| e.to_str()) != Some("apb") {
        return Err(CliError::Usage("input file must have a .apb extension".to_string()));
    }
    let bytecode = std::fs::read(input)
        .map_err(|e| CliError::Io(format!("could not read '{}': {e}", input.display())))?;
    let name = input.display().to_string();
    print!("{}", ape_compiler::disassemble(&name, &bytecode));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_dependencies_extracts_summon_paths() {
        let source = r#"summon "lib/math.ape" tree 1"#;
        assert_eq!(find_dependencies(source), vec!["lib/math.ape".to_string()]);
    }

    #[test]
    fn find_dependencies_ignores_unrelated_strings() {
        let source = r#"tree "hello""#;
        assert!(find_dependencies(source).is_empty());
    }

    #[test]
    fn compile_with_dependencies_writes_apb_for_each_summoned_file() {
        let dir = tempfile::tempdir().unwrap();
        let lib_path = dir.path().join("lib.ape");
        let main_path = dir.path().join("main.ape");
        std::fs::write(&lib_path, "tree 1").unwrap();
        std::fs::write(&main_path, r#"summon "lib.ape" tree 2"#).unwrap();

        let mut processed = HashSet::new();
        compile_with_dependencies(&main_path, &mut processed)
            .unwrap_or_else(|e| panic!("{e}"));

        assert!(dir.path().join("lib.apb").exists());
        assert!(dir.path().join("main.apb").exists());
    }

    #[test]
    fn compile_with_dependencies_visits_shared_dependency_once() {
        let dir = tempfile::tempdir().unwrap();
        let lib_path = dir.path().join("lib.ape");
        let a_path = dir.path().join("a.ape");
        let b_path = dir.path().join("b.ape");
        std::fs::write(&lib_path, "tree 1").unwrap();
        std::fs::write(&a_path, r#"summon "lib.ape" tree 2"#).unwrap();
        std::fs::write(&b_path, r#"summon "lib.ape" summon "a.ape" tree 3"#).unwrap();

        let mut processed = HashSet::new();
        compile_with_dependencies(&b_path, &mut processed)
            .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(processed.len(), 3);
    }

    #[test]
    fn compile_with_dependencies_reports_missing_file_as_dependency_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.ape");
        let mut processed = HashSet::new();
        let err = compile_with_dependencies(&missing, &mut processed).unwrap_err();
        assert_eq!(err.exit_code(), 71);
    }
}
