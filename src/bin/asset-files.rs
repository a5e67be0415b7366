//! asset-files CLI
//!
//! Routine file operations on vendored dependencies, paths relative to the
//! working directory.

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use asset_builder::files::{self, FileOpError, FileOpReport};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "asset-files")]
#[command(about = "Clean, copy or replace files between directories", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove files from a target directory (all files when none are named)
    Clean {
        #[arg(long, short = 't')]
        target: PathBuf,

        /// File name to remove; repeatable
        #[arg(long = "file", short = 'f')]
        files: Vec<String>,
    },

    /// Copy files into a target directory; existing files are kept
    Copy {
        #[arg(long, short = 's')]
        source: PathBuf,

        #[arg(long, short = 't')]
        target: PathBuf,

        /// File name to copy; repeatable
        #[arg(long = "file", short = 'f')]
        files: Vec<String>,
    },

    /// Same as copy, but overwrites existing files
    Replace {
        #[arg(long, short = 's')]
        source: PathBuf,

        #[arg(long, short = 't')]
        target: PathBuf,

        /// File name to replace; repeatable
        #[arg(long = "file", short = 'f')]
        files: Vec<String>,
    },
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let root = match env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: cannot resolve working directory: {}", e);
            process::exit(1);
        }
    };

    match run(cli.command, &root) {
        Ok(report) => println!("{}", report.summary()),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run(command: Commands, root: &Path) -> Result<FileOpReport, FileOpError> {
    match command {
        Commands::Clean { target, files } => files::clean(&root.join(target), &files),
        Commands::Copy {
            source,
            target,
            files,
        } => files::copy(&root.join(source), &root.join(target), &files, false),
        Commands::Replace {
            source,
            target,
            files,
        } => files::copy(&root.join(source), &root.join(target), &files, true),
    }
}
