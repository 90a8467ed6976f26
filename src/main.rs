use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, CommandFactory, Parser as ClapParser, error::ErrorKind};
use colored::Colorize;
use midichlorian::{
    OutputKind, compile,
    frontend::{SourceFile, SourceFileOrigin},
};

#[derive(Debug, ClapParser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// The Midi-chlorian program to compile
    source_file: PathBuf,
    /// The compiler stage to print
    #[arg(value_enum)]
    output: OutputKind,
    /// Log what the compiler is doing; repeat for more detail
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    // RUST_LOG takes precedence over -v
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if !args.source_file.exists() {
        Args::command()
            .error(
                ErrorKind::InvalidValue,
                format!("Source file '{}' does not exist!", args.source_file.display()),
            )
            .exit()
    }

    if !args.source_file.is_file() {
        Args::command()
            .error(
                ErrorKind::InvalidValue,
                format!("Input path '{}' is not a file!", args.source_file.display()),
            )
            .exit()
    }

    if let Err(error) = run(args) {
        #[cfg(feature = "error-backtrace")]
        let message = format!("{error:?}");
        #[cfg(not(feature = "error-backtrace"))]
        let message = format!("{error:#}");

        eprintln!("{}: {message}", "error".red());
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(&args.source_file).with_context(|| {
        format!(
            "Failed to read '{}' (or invalid UTF-8)",
            args.source_file.display()
        )
    })?;

    let source_file = SourceFile {
        contents,
        origin: SourceFileOrigin::File(args.source_file),
    };

    let output = compile(&source_file, args.output)
        .with_context(|| format!("Failed to compile {}", source_file.origin))?;

    print!("{output}");

    Ok(())
}
