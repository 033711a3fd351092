mod report;

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use log::info;
use report::render_summary;
use spacetruss::{SolverOptions, Truss};

/// Command line arguments.
#[derive(Debug, Default)]
struct Args {
    /// Document to read.
    input: PathBuf,
    /// Document to write with results, if any.
    output: Option<PathBuf>,
    /// Treat the input as a result document and skip solving.
    result_document: bool,
    /// JSON file with solver options.
    options: Option<PathBuf>,
}

fn usage() {
    eprintln!(
        "usage: spacetruss <input.json> [output.json] [--result-document] [--options <options.json>]"
    );
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Option<Args> {
    let mut parsed = Args::default();
    let mut positional = Vec::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--result-document" => parsed.result_document = true,
            "--options" => parsed.options = Some(PathBuf::from(args.next()?)),
            flag if flag.starts_with("--") => return None,
            _ => positional.push(PathBuf::from(arg)),
        }
    }
    let mut positional = positional.into_iter();
    parsed.input = positional.next()?;
    parsed.output = positional.next();
    if positional.next().is_some() {
        return None;
    }
    Some(parsed)
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut truss = Truss::load_from_document(&args.input, args.result_document)?;

    // A result document already carries its solution.
    if !args.result_document {
        if let Some(path) = &args.options {
            let options: SolverOptions = serde_json::from_str(&fs::read_to_string(path)?)?;
            truss.set_options(options);
        }
        truss.solve()?;
    }
    println!("{}", render_summary(&truss));

    if let Some(path) = &args.output {
        truss.dump_to_document(path)?;
        info!("results written to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let Some(args) = parse_args(std::env::args().skip(1)) else {
        usage();
        return ExitCode::from(2);
    };
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}
