use std::{
    error::Error,
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use colored::Colorize;
use symrel::{environment::Environment, evaluate::evaluate, parser::parse, printer::PrintOptions};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "symrel",
    version,
    about = "Evaluate polynomial expressions, assignments and systems of relations",
    after_help = r#"
Every line holds one statement:
  (x + 1)^2                 expand a polynomial
  y := x - 3                bind a variable (once)
  2 x >= 6 & x <= 3         normalize and merge relations

Environment Variables:
  SYMREL_LOG=debug          Log filter for diagnostics on stderr
  SYMREL_PRECISION=6        Digits after the decimal point of reals
"#
)]
struct Cli {
    /// File with one statement per line, standard input if absent
    input: Option<PathBuf>,

    /// Digits printed after the decimal point of real coefficients
    #[arg(long, env = "SYMREL_PRECISION")]
    precision: Option<usize>,

    /// Print `*` between factors so that the output can be read back
    #[arg(long)]
    explicit_mul: bool,

    /// Print the parsed tree of each statement before its value
    #[arg(long)]
    echo_tree: bool,

    /// Disable colored diagnostics
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn print_options(&self) -> PrintOptions {
        let opts = if self.explicit_mul {
            PrintOptions::file()
        } else {
            PrintOptions::new()
        };

        match self.precision {
            Some(p) => opts.with_precision(p),
            None => opts,
        }
    }
}

fn report<W: Write>(err: &mut W, line: usize, e: &dyn Error) -> io::Result<()> {
    writeln!(err, "{} line {}: {}", "error:".red().bold(), line, e)
}

/// Evaluate every statement of `reader`, writing results to `out` and
/// diagnostics to `err`. A line that is not valid UTF-8, or a statement that
/// fails to parse or evaluate, is reported and skipped; only I/O errors stop
/// the run.
fn run<R: BufRead, W: Write, E: Write>(
    mut reader: R,
    out: &mut W,
    err: &mut E,
    cli: &Cli,
) -> io::Result<()> {
    let opts = cli.print_options();
    let mut env = Environment::new();
    let mut buf = vec![];
    let mut line_number = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_number += 1;

        let line = match std::str::from_utf8(&buf) {
            Ok(l) => l,
            Err(e) => {
                report(err, line_number, &e)?;
                continue;
            }
        };

        let input = line.trim();
        if input.is_empty() || input.starts_with('#') {
            continue;
        }

        let statement = match parse(input) {
            Ok(s) => s,
            Err(e) => {
                report(err, line_number, &e)?;
                continue;
            }
        };

        if cli.echo_tree {
            writeln!(out, "{}", statement)?;
        }

        match evaluate(&statement, &mut env) {
            Ok(r) => writeln!(out, "{}", r.printer(opts))?,
            Err(e) => report(err, line_number, &e)?,
        }
    }

    info!("{} variables defined", env.len());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_env("SYMREL_LOG"))
        .init();

    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();

    let res = match &cli.input {
        Some(path) => match File::open(path) {
            Ok(f) => run(BufReader::new(f), &mut out, &mut err, &cli),
            Err(e) => {
                eprintln!(
                    "{} cannot open {}: {}",
                    "error:".red().bold(),
                    path.display(),
                    e
                );
                return ExitCode::FAILURE;
            }
        },
        None => run(io::stdin().lock(), &mut out, &mut err, &cli),
    };

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
