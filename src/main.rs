//! StepRunner CLI Entry Point
//!
//! Runs a pipeline definition file step by step.
//!
//! # Usage
//!
//! ```bash
//! # Run every step
//! steprunner pipeline.yaml
//!
//! # Resume from a step, by name or by index
//! steprunner pipeline.yaml build
//! steprunner pipeline.yaml 2
//!
//! # List the steps that can be started from
//! steprunner pipeline.yaml --list
//!
//! # Run commands in another directory
//! steprunner pipeline.yaml --working-dir /path/to/project
//! ```

use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use colored::Colorize;
use log::info;

use steprunner::pipeline::load_pipeline;
use steprunner::{APP_NAME, VERSION};

/// Default pipeline file used when none is specified.
const DEFAULT_PIPELINE: &str = "pipeline.yaml";

/// Command-line configuration parsed from arguments.
#[derive(Debug, PartialEq)]
struct Config {
    pipeline_path: String,
    start: Option<String>,
    list: bool,
    working_dir: Option<PathBuf>,
    verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline_path: DEFAULT_PIPELINE.to_string(),
            start: None,
            list: false,
            working_dir: None,
            verbose: false,
        }
    }
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints usage information.
fn print_usage() {
    println!("Usage: steprunner [OPTIONS] <PIPELINE_FILE> [STEP]");
    println!();
    println!("Arguments:");
    println!("  <PIPELINE_FILE>     Path to pipeline YAML or JSON file");
    println!("  [STEP]              Step to start from, by index or name (default: first)");
    println!();
    println!("Options:");
    println!("  --list              List steps and exit");
    println!("  --working-dir PATH  Run step commands in this directory");
    println!("  --verbose           Enable debug logging");
    println!("  --help              Show this help message");
    println!("  --version           Show version information");
    println!();
    println!("Examples:");
    println!("  steprunner pipeline.yaml");
    println!("  steprunner pipeline.yaml build");
    println!("  steprunner pipeline.yaml 2 --working-dir /srv/app");
}

/// Parses command-line arguments into a Config struct.
fn parse_arguments(args: &[String]) -> Result<Config, String> {
    let mut config = Config::default();
    let mut positional_index = 0;
    let mut i = 1; // Skip program name

    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", APP_NAME, VERSION);
                std::process::exit(0);
            }
            "--list" => {
                config.list = true;
            }
            "--verbose" | "-v" => {
                config.verbose = true;
            }
            "--working-dir" => {
                i += 1;
                if i >= args.len() {
                    return Err("--working-dir requires a path argument".to_string());
                }
                config.working_dir = Some(PathBuf::from(&args[i]));
            }
            arg if arg.starts_with("--") => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => {
                match positional_index {
                    0 => config.pipeline_path = arg.clone(),
                    1 => config.start = Some(arg.clone()),
                    _ => return Err(format!("Unexpected argument: {}", arg)),
                }
                positional_index += 1;
            }
        }
        i += 1;
    }

    Ok(config)
}

/// Main application entry point.
fn run() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();

    let config = parse_arguments(&args).map_err(|e| {
        eprintln!("{} {}", "Error:".red().bold(), e);
        eprintln!();
        print_usage();
        e
    })?;

    setup_logging(config.verbose);

    if let Some(dir) = &config.working_dir {
        if !dir.is_dir() {
            return Err(format!("Working directory does not exist: {}", dir.display()).into());
        }
        info!("Working directory: {}", dir.display());
    }

    let pipeline = load_pipeline(&config.pipeline_path)?;
    let steps = pipeline.to_sequence(config.working_dir.as_deref());

    if config.list {
        for name in steps.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    match &config.start {
        Some(command) => steps.run_from_command(command)?,
        None => steps.run_all()?,
    }

    println!();
    println!("{}", "All steps completed".green());
    Ok(())
}

/// Prints an error followed by its chain of causes.
fn report(error: &dyn Error) {
    eprintln!();
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(e.as_ref());
            ExitCode::FAILURE
        }
    }
}
