//! Command-line front end: parse source files, run one analysis pass,
//! print diagnostics, and write generated units to an output directory.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use log::{info, LevelFilter, Metadata, Record};
use swarm_analyzer::parse::Loader;
use swarm_analyzer::pass;

const USAGE: &str = "usage: swarm_cli [--out DIR] [-v] FILE...";

/// Plain stderr logger, filtered through the global max level.
struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

#[derive(Debug)]
enum CliError {
    Usage(String),
    Io(PathBuf, io::Error),
    Parse(PathBuf, String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Usage(message) => write!(f, "{message}\n{USAGE}"),
            CliError::Io(path, error) => write!(f, "{}: {error}", path.display()),
            CliError::Parse(path, error) => write!(f, "{}: {error}", path.display()),
        }
    }
}

struct Options {
    files: Vec<PathBuf>,
    out_dir: PathBuf,
    verbose: bool,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Options, CliError> {
    let mut options = Options {
        files: Vec::new(),
        out_dir: PathBuf::from("generated"),
        verbose: false,
    };

    let mut args = args;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out" => {
                let dir = args
                    .next()
                    .ok_or_else(|| CliError::Usage("--out requires a directory".to_string()))?;
                options.out_dir = PathBuf::from(dir);
            }
            "-v" | "--verbose" => options.verbose = true,
            other if other.starts_with('-') => {
                return Err(CliError::Usage(format!("unknown option '{other}'")));
            }
            _ => options.files.push(PathBuf::from(arg)),
        }
    }

    if options.files.is_empty() {
        return Err(CliError::Usage("no input files".to_string()));
    }
    Ok(options)
}

/// Returns whether the pass completed without error diagnostics.
fn run(options: &Options) -> Result<bool, CliError> {
    let mut loader = Loader::new();
    for path in &options.files {
        let source =
            fs::read_to_string(path).map_err(|error| CliError::Io(path.clone(), error))?;
        loader
            .add_source(&source)
            .map_err(|error| CliError::Parse(path.clone(), error.to_string()))?;
    }
    let model = loader.finish();

    let output = pass::run(&model);
    for diagnostic in &output.diagnostics {
        eprintln!("{diagnostic}");
    }

    if !output.units.is_empty() {
        fs::create_dir_all(&options.out_dir)
            .map_err(|error| CliError::Io(options.out_dir.clone(), error))?;
    }
    for unit in &output.units {
        let path = options.out_dir.join(format!("{}.rs", unit.name));
        fs::write(&path, unit.code()).map_err(|error| CliError::Io(path.clone(), error))?;
        info!("wrote {}", path.display());
    }
    info!(
        "{} diagnostic(s), {} unit(s)",
        output.diagnostics.len(),
        output.units.len()
    );

    Ok(!output.has_errors())
}

fn main() -> ExitCode {
    let options = match parse_args(env::args().skip(1)) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::FAILURE;
        }
    };

    let _ = log::set_logger(&LOGGER);
    log::set_max_level(if options.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    match run(&options) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}
