use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::RunOptions;

#[derive(Parser, Debug)]
#[command(name = "stmtnorm", version, about = "Standardize multi-section bank statement exports")]
struct Cli {
    /// Statement exports (delimited text) to standardize
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Directory the standardized files are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// TOML file with user labels, location tokens and keywords
    #[arg(long)]
    config: Option<PathBuf>,

    /// Quote fields that contain commas or quotes
    #[arg(long)]
    quoted: bool,

    /// Drop records whose date is in no supported format
    #[arg(long)]
    reject_unparsed_dates: bool,

    /// Print outputs instead of writing files
    #[arg(long)]
    stdout: bool,

    /// Print the batch report as JSON
    #[arg(long, conflicts_with = "stdout")]
    json: bool,
}

impl From<Cli> for RunOptions {
    fn from(cli: Cli) -> Self {
        RunOptions {
            files: cli.files,
            out_dir: cli.out_dir,
            config: cli.config,
            quoted: cli.quoted,
            reject_unparsed_dates: cli.reject_unparsed_dates,
            stdout: cli.stdout,
            json: cli.json,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opts = RunOptions::from(Cli::parse());

    match commands::run(&opts) {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(2),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
