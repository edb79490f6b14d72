//! Tankobon CLI - merge chapter CBZ archives into volumes

mod commands;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tankobon")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge chapters into volumes for every series in the configuration
    Run {
        /// Library directory containing the series folders
        directory: String,

        /// Configuration file (defaults to <DIRECTORY>/to_refactor.csv)
        #[arg(short, long)]
        config: Option<String>,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,

        /// Do not write a log file into the library directory
        #[arg(long)]
        no_log_file: bool,
    },

    /// Show how each series would be split into volumes, without changing anything
    Plan {
        /// Library directory containing the series folders
        directory: String,

        /// Configuration file (defaults to <DIRECTORY>/to_refactor.csv)
        #[arg(short, long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the configuration file for invalid rows
    Validate {
        /// Library directory containing the configuration file
        directory: String,

        /// Configuration file (defaults to <DIRECTORY>/to_refactor.csv)
        #[arg(short, long)]
        config: Option<String>,
    },
}

/// Configuration file to use for a library directory
fn config_path(directory: &str, config: Option<&str>) -> PathBuf {
    match config {
        Some(path) => PathBuf::from(path),
        None => Path::new(directory).join(tankobon_core::CONFIG_FILE_NAME),
    }
}

/// Fail early when the library directory is missing
fn require_directory(directory: &str) -> Result<()> {
    if !Path::new(directory).is_dir() {
        bail!("'{}' is not a valid directory", directory);
    }
    Ok(())
}

/// Create the timestamped log file for a run
fn open_log_file(directory: &str) -> Result<File> {
    let name = format!(
        "tankobon_{}.log",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let path = Path::new(directory).join(name);
    File::create(&path).with_context(|| format!("Failed to create log file: {}", path.display()))
}

/// Console logging on stderr, plus an optional plain-text log file
fn init_tracing(verbose: bool, log_file: Option<File>) {
    let filter = if verbose {
        "tankobon_cli=debug,tankobon_core=debug"
    } else {
        "tankobon_cli=info,tankobon_core=info"
    };

    let file_layer = log_file.map(|file| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            directory,
            config,
            json,
            no_log_file,
        } => {
            require_directory(&directory)?;
            let log_file = if no_log_file {
                None
            } else {
                Some(open_log_file(&directory)?)
            };
            init_tracing(cli.verbose, log_file);
            commands::run(&directory, &config_path(&directory, config.as_deref()), json)
        }

        Commands::Plan {
            directory,
            config,
            json,
        } => {
            require_directory(&directory)?;
            init_tracing(cli.verbose, None);
            commands::plan(&directory, &config_path(&directory, config.as_deref()), json)
        }

        Commands::Validate { directory, config } => {
            init_tracing(cli.verbose, None);
            commands::validate(&config_path(&directory, config.as_deref()))
        }
    }
}
