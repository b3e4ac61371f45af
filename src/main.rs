use clap::{Parser, Subcommand};
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use testify_report::storage::{FsStorage, ReportStorage, resolve_report_path};
use testify_report::{config, parse_header};

/// Testify Report - read and manage screenshot test reports
#[derive(Parser, Debug)]
#[command(
    name = "testify-report",
    about = "Inspect and manage structured screenshot-test reports",
    after_help = "ENVIRONMENT VARIABLES:\n\
        TESTIFY_REPORT_DIR     App-private directory for report output\n\
        TESTIFY_EXTERNAL_DIR   Shared external storage root\n\
        TESTIFY_USE_SDCARD     Write the report to external storage"
)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the session summary of a report (exits non-zero on failures)
    Summary {
        /// Report file (default: resolved from environment configuration)
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Output the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the full report document
    Show {
        /// Report file (default: resolved from environment configuration)
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Delete the report file
    Clear {
        /// Report file (default: resolved from environment configuration)
        #[arg(short, long)]
        report: Option<PathBuf>,
    },
}

/// Session summary rendered by the `summary` subcommand
#[derive(Debug, Serialize)]
struct ReportSummary {
    session: String,
    date: String,
    failed: u32,
    passed: u32,
    total: u32,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<ExitCode, Box<dyn Error>> {
    match args.command {
        Commands::Summary { report, json } => {
            let storage = storage_for(report);
            let lines = storage.read_lines()?;
            let header = parse_header(&lines)
                .ok_or_else(|| format!("{}: not a report document", storage.path().display()))?;

            let summary = ReportSummary {
                session: header.session_id,
                date: header.timestamp,
                failed: header.fail_count,
                passed: header.pass_count,
                total: header.test_count,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("session: {}", summary.session);
                println!("date:    {}", summary.date);
                println!("failed:  {}", summary.failed);
                println!("passed:  {}", summary.passed);
                println!("total:   {}", summary.total);
            }

            if summary.failed > 0 {
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }

        Commands::Show { report } => {
            let storage = storage_for(report);
            for line in storage.read_lines()? {
                println!("{}", line);
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Clear { report } => {
            let storage = storage_for(report);
            if storage.exists() {
                std::fs::remove_file(storage.path())?;
            } else {
                eprintln!("Warning: no report at {}", storage.path().display());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Storage for the given path, or the environment-configured location
fn storage_for(report: Option<PathBuf>) -> FsStorage {
    match report {
        Some(path) => FsStorage::new(path),
        None => {
            let config = config::get();
            FsStorage::new(resolve_report_path(config, config))
        }
    }
}
