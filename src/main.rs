//! VFL Layout CLI
//!
//! Usage:
//!   vfl-layout [OPTIONS] --width <W> --height <H> [FILE]
//!
//! Options:
//!   -c, --config <FILE>   Layout config (TOML: spacing, extended, [metrics])
//!   -s, --spacing <N>     Standard spacing, overrides the config file
//!   --strict              Reject extended syntax (`~`, predicate arithmetic)
//!   -h, --help            Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vfl_layout::{solve, LayoutConfig, LayoutError, VflSource};

#[derive(Parser)]
#[command(name = "vfl-layout")]
#[command(about = "Solve Visual Format Language constraints and print sub-view geometry")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Width of the superview
    #[arg(short = 'W', long)]
    width: f64,

    /// Height of the superview
    #[arg(short = 'H', long)]
    height: f64,

    /// Layout config file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Standard spacing for `-` connections
    #[arg(short, long)]
    spacing: Option<f64>,

    /// Reject extended VFL syntax
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match LayoutConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => LayoutConfig::default(),
    };
    if let Some(spacing) = cli.spacing {
        config = config.with_spacing(spacing);
    }
    if cli.strict {
        config = config.with_extended(false);
    }

    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading from stdin: {}", e);
                return ExitCode::FAILURE;
            }
            (buffer, "<stdin>".to_string())
        }
    };

    let vfl = VflSource::from(source);
    match solve(vfl.clone(), cli.width, cli.height, &config) {
        Ok(view) => {
            for (name, g) in view.sub_views() {
                println!(
                    "{} x={:.1} y={:.1} w={:.1} h={:.1}",
                    name, g.left, g.top, g.width, g.height
                );
            }
            ExitCode::SUCCESS
        }
        Err(LayoutError::Parse(errors)) => {
            let lines = vfl.lines();
            for e in &errors {
                match lines.get(e.line()) {
                    Some(line) => eprint!("{}", e.format(line, &filename)),
                    None => eprintln!("Error: {}", e),
                }
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
