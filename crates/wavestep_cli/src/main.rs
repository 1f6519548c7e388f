//! WAVESTEP CLI
//!
//! Interactive replay debugger for VCD simulation traces.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod shell;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use console::style;
use wavestep_replay::{PageFilter, SteppingEngine};

#[derive(Parser)]
#[command(name = "wavestep")]
#[command(about = "WAVESTEP - replay debugger for VCD simulation traces", long_about = None)]
struct Cli {
    /// Trace file to load at startup
    trace: Option<PathBuf>,

    /// Treat only signals whose name starts with this prefix as pages
    #[arg(long)]
    pages: Option<String>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let filter = cli.pages.map_or_else(PageFilter::all, PageFilter::prefix);
    let mut engine = SteppingEngine::new().with_filter(filter);

    println!("{}", style("-- WAVESTEP TRACE REPLAY --").bold());
    println!("Type 'help' for commands.\n");

    let stdout = std::io::stdout();
    let mut output = stdout.lock();

    if let Some(path) = &cli.trace {
        shell::load_trace(&mut engine, &path.display().to_string(), &mut output)?;
    }

    let stdin = std::io::stdin();
    shell::run_repl(&mut engine, &mut stdin.lock(), &mut output)?;
    Ok(())
}
