//! Command-line entry point: loads `clap`-parsed file arguments (or stdin)
//! onto the input stream, installs the built-in table, and drives
//! [`m4_engine::Engine::run`] until end-of-input.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use m4_buffer::set_stdio_binary_mode;
use m4_engine::Engine;

/// A streaming m4-style macro preprocessor.
#[derive(Parser, Debug)]
#[command(name = "m4rs", version, about)]
struct Cli {
    /// Files to process, in order. With none given, standard input is read.
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    set_stdio_binary_mode();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("m4rs: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let drain_stdin = cli.files.is_empty();
    let mut engine = Engine::new(drain_stdin);
    m4_builtins::install(&mut engine.symtab);

    // Pushed back right-to-left so the leftmost file's first byte is read
    // first (§6 of the specification).
    for path in cli.files.iter().rev() {
        engine
            .input
            .load_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
    }

    let mut dispatcher = m4_builtins::Dispatcher;
    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    engine
        .run(&mut dispatcher, &mut stdout)
        .context("macro expansion failed")?;
    stdout.flush().context("failed to flush standard output")?;
    Ok(())
}
