//! Anchor Layout CLI
//!
//! Usage:
//!   anchor-layout [OPTIONS] [FILE]
//!
//! Options:
//!   -O, --optimize <FLAGS>   Direct-resolution passes (direct, barrier, chains, grouping, none)
//!       --rtl                Right-to-left chain heads
//!       --max-iterations <N> Cap on solver passes per container
//!   -s, --stats              Print layout counters after the frames
//!   -v, --verbose            More logging (repeat for trace)
//!   -h, --help               Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use anchor_layout::layout::Optimizations;
use anchor_layout::Scene;

#[derive(Parser)]
#[command(name = "anchor-layout")]
#[command(about = "Lay out a TOML scene of anchored widgets and print their frames")]
struct Cli {
    /// Scene file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Comma separated optimization flags, replacing the scene's own
    #[arg(short = 'O', long, value_delimiter = ',')]
    optimize: Option<Vec<String>>,

    /// Right-to-left: horizontal chains start at their last widget
    #[arg(long)]
    rtl: bool,

    /// Cap on solver passes per container
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Print layout counters after the frames
    #[arg(short, long)]
    stats: bool,

    /// More logging; repeat for trace output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let mut scene = match Scene::parse(&source) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(names) = cli.optimize {
        match Optimizations::try_from(names) {
            Ok(flags) => scene.config.optimizations = flags,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(2);
            }
        }
    }
    if cli.rtl {
        scene.config.rtl = true;
    }
    if let Some(iterations) = cli.max_iterations {
        scene.config = scene.config.with_max_iterations(iterations);
    }
    log::info!("optimizations: {}", scene.config.optimizations);

    match scene.layout() {
        Ok(stats) => {
            print!("{}", scene.report());
            if cli.stats {
                println!(
                    "\n{} containers, {} passes, {} rows, {} direct, {} solver errors",
                    stats.containers,
                    stats.passes,
                    stats.rows,
                    stats.direct_layouts,
                    stats.solver_errors
                );
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
